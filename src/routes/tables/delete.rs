use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};

use crate::{auth::extractors::IsAdmin, db_interaction::{delete_table, TableLookupError}, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Deleting table",
    skip(pool)
)]
pub async fn remove_table(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _: IsAdmin
) -> Result<HttpResponse, actix_web::Error>{
    let table_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let table = delete_table(conn, table_id)
        .await
        .map_err(|e| {
            match e {
                TableLookupError::NoTableIdError(_) => ErrorNotFound(e),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Deleted table '{}'", table.table_number)
    })))
}
