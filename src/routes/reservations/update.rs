use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::{auth::extractors::IsStaff, db_interaction::{update_reservation, ReservationChanges, UpdateReservationError}, models::ReservationStatus, utils::{error_fmt_chain, get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct UpdateReservationForm{
    pub reservation_status: ReservationStatus,
    pub response_at: Option<DateTime<Utc>>,
    pub finish_at: Option<DateTime<Utc>>,
    pub cancel_detail: Option<String>
}

#[derive(Error)]
pub enum PatchReservationError{
    #[error("{0}")]
    NotFoundError(#[source] UpdateReservationError),
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for PatchReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for PatchReservationError {
    fn status_code(&self) -> StatusCode {
        match self {
            PatchReservationError::NotFoundError(_) => StatusCode::NOT_FOUND,
            PatchReservationError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).body(format!("{}", self))
    }
}

#[tracing::instrument(
    "Updating reservation",
    skip(pool, form)
)]
pub async fn patch_reservation(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<UpdateReservationForm>,
    staff: IsStaff
) -> Result<HttpResponse, PatchReservationError>{
    let reservation_id = path.into_inner();
    let form = form.0;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let reservation = update_reservation(
        conn,
        reservation_id,
        staff.0,
        ReservationChanges{
            reservation_status: form.reservation_status,
            response_at: form.response_at,
            finish_at: form.finish_at,
            cancel_detail: form.cancel_detail
        }
    )
    .await
    .map_err(|e| {
        match e {
            UpdateReservationError::NoReservationIdError(_) => PatchReservationError::NotFoundError(e),
            _ => PatchReservationError::UnexpectedError(e.into())
        }
    })?;

    Ok(HttpResponse::Ok().json(reservation))
}
