use actix_web::{error::{ErrorInternalServerError, ErrorUnprocessableEntity}, web, HttpResponse};
use serde::Deserialize;

use crate::{auth::extractors::IsAdmin, db_interaction::insert_table, models::{NewTable, TableStatus}, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct TableForm{
    pub table_number: String,
    pub capacity: i32
}

#[tracing::instrument(
    "Posting new table",
    skip(pool)
)]
pub async fn post_table(
    pool: web::Data<DbPool>,
    form: web::Json<TableForm>,
    _: IsAdmin
) -> Result<HttpResponse, actix_web::Error>{
    let form = form.0;

    if form.capacity < 1 {
        return Err(ErrorUnprocessableEntity("capacity must be at least 1"))
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    // New tables always start out idle
    let table = insert_table(conn, NewTable{
        table_number: form.table_number,
        capacity: form.capacity,
        status: TableStatus::Empty.as_str().to_string()
    })
    .await
    .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Created().json(table))
}
