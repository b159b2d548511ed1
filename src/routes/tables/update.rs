use actix_web::{error::{ErrorInternalServerError, ErrorNotFound, ErrorUnprocessableEntity}, web, HttpResponse};
use serde::Deserialize;

use crate::{auth::extractors::IsStaff, db_interaction::{update_table, TableChangeset, TableLookupError}, models::TableStatus, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct UpdateTableForm{
    pub table_number: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>
}

// Administrative override. Writing `status` here bypasses the
// order/reservation lifecycles and can desynchronize the table from them.
#[tracing::instrument(
    "Updating table fields",
    skip(pool, form)
)]
pub async fn put_table(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<UpdateTableForm>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error>{
    let table_id = path.into_inner();
    let form = form.0;

    if matches!(form.capacity, Some(capacity) if capacity < 1) {
        return Err(ErrorUnprocessableEntity("capacity must be at least 1"))
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let table = update_table(conn, table_id, TableChangeset{
        table_number: form.table_number,
        capacity: form.capacity,
        status: form.status.map(|status| status.as_str().to_string())
    })
    .await
    .map_err(|e| {
        match e {
            TableLookupError::NoTableIdError(_) => ErrorNotFound(e),
            _ => ErrorInternalServerError(e)
        }
    })?;

    Ok(HttpResponse::Ok().json(table))
}
