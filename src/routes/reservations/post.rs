use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::{auth::extractors::IsAuthenticated, configuration::ApplicationSettings, db_interaction::{create_reservation, CreateReservationError, ReservationDraft}, utils::{error_fmt_chain, get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct ReservationForm{
    pub table_ids: Vec<i32>,
    pub capacity: i32,
    pub reservation_time: DateTime<Utc>,
    pub customer_amount: i32,
    pub reservation_detail: Option<String>
}

#[derive(Error)]
pub enum PostReservationError{
    #[error("reservation must reference at least one table")]
    NoTablesError,
    #[error("capacity must be at least 1")]
    BadCapacityError,
    #[error("customer_amount must be at least 1")]
    BadCustomerAmountError,
    #[error("{0}")]
    NotFoundError(#[source] CreateReservationError),
    #[error("{0}")]
    TableClaimedError(#[source] CreateReservationError),
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for PostReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for PostReservationError {
    fn status_code(&self) -> StatusCode {
        match self {
            PostReservationError::NoTablesError => StatusCode::UNPROCESSABLE_ENTITY,
            PostReservationError::BadCapacityError => StatusCode::UNPROCESSABLE_ENTITY,
            PostReservationError::BadCustomerAmountError => StatusCode::UNPROCESSABLE_ENTITY,
            PostReservationError::NotFoundError(_) => StatusCode::NOT_FOUND,
            PostReservationError::TableClaimedError(_) => StatusCode::CONFLICT,
            PostReservationError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).body(format!("{}", self))
    }
}

#[tracing::instrument(
    "Posting reservation",
    skip(pool, settings, form)
)]
pub async fn post_reservation(
    pool: web::Data<DbPool>,
    settings: web::Data<ApplicationSettings>,
    form: web::Json<ReservationForm>,
    auth: IsAuthenticated
) -> Result<HttpResponse, PostReservationError> {
    let form = form.0;

    if form.table_ids.is_empty() {
        return Err(PostReservationError::NoTablesError)
    }

    if form.capacity < 1 {
        return Err(PostReservationError::BadCapacityError)
    }

    if form.customer_amount < 1 {
        return Err(PostReservationError::BadCustomerAmountError)
    }

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let reservation = create_reservation(
        conn,
        auth.0,
        ReservationDraft{
            table_ids: form.table_ids,
            capacity: form.capacity,
            reservation_time: form.reservation_time,
            customer_amount: form.customer_amount,
            reservation_detail: form.reservation_detail
        },
        settings.enforce_table_availability
    )
    .await
    .map_err(|e| {
        match e {
            CreateReservationError::NoTableIdError(_) => PostReservationError::NotFoundError(e),
            CreateReservationError::TableClaimedError(_) => PostReservationError::TableClaimedError(e),
            _ => PostReservationError::UnexpectedError(e.into())
        }
    })?;

    Ok(HttpResponse::Created().json(reservation))
}
