use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};

use crate::auth::extractors::IsStaff;
use crate::db_interaction::{get_order_by_id, get_todays_orders, GetOrderError};
use crate::utils::{get_pooled_connection, DbPool};

#[tracing::instrument(
    "Getting today's orders",
    skip(pool)
)]
pub async fn list_orders(
    pool: web::Data<DbPool>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let orders = get_todays_orders(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(orders))
}

#[tracing::instrument(
    "Getting single order",
    skip(pool)
)]
pub async fn read_order(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let order_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let order = get_order_by_id(conn, order_id)
        .await
        .map_err(|e| {
            match e {
                GetOrderError::NoOrderIdError(_) => ErrorNotFound(e),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(order))
}
