use actix_web::{error::ErrorInternalServerError, web, HttpResponse};

use crate::auth::extractors::IsAuthenticated;
use crate::db_interaction::get_current_reservation_for;
use crate::utils::{get_pooled_connection, DbPool};

/// The caller's reservation for today. Having none is a regular answer,
/// reported as `{"reservation": null}` rather than a 404.
#[tracing::instrument(
    "Getting caller's reservation for today",
    skip(pool, auth)
)]
pub async fn my_reservation(
    pool: web::Data<DbPool>,
    auth: IsAuthenticated
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let reservation = get_current_reservation_for(conn, auth.0)
        .await
        .map_err(ErrorInternalServerError)?;

    match reservation {
        Some(reservation) => Ok(HttpResponse::Ok().json(reservation)),
        None => Ok(HttpResponse::Ok().json(serde_json::json!({ "reservation": null })))
    }
}
