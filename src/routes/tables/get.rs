use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};

use crate::auth::extractors::IsStaff;
use crate::db_interaction::{get_all_tables, get_table_by_id, TableLookupError};
use crate::utils::{get_pooled_connection, DbPool};

#[tracing::instrument(
    "Getting all tables",
    skip(pool)
)]
pub async fn list_tables(
    pool: web::Data<DbPool>
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let tables = get_all_tables(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(tables))
}

#[tracing::instrument(
    "Getting single table",
    skip(pool)
)]
pub async fn read_table(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let table_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let table = get_table_by_id(conn, table_id)
        .await
        .map_err(|e| {
            match e {
                TableLookupError::NoTableIdError(_) => ErrorNotFound(e),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(table))
}
