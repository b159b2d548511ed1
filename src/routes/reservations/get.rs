use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};

use crate::auth::extractors::IsStaff;
use crate::db_interaction::{get_reservation_by_id, get_todays_reservations, GetReservationError};
use crate::utils::{get_pooled_connection, DbPool};

#[tracing::instrument(
    "Getting today's reservations",
    skip(pool)
)]
pub async fn list_reservations(
    pool: web::Data<DbPool>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let reservations = get_todays_reservations(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(reservations))
}

#[tracing::instrument(
    "Getting single reservation",
    skip(pool)
)]
pub async fn read_reservation(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let reservation_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let reservation = get_reservation_by_id(conn, reservation_id)
        .await
        .map_err(|e| {
            match e {
                GetReservationError::NoReservationIdError(_) => ErrorNotFound(e),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(reservation))
}
