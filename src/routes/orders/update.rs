use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::{auth::extractors::IsStaff, db_interaction::{update_order, OrderChanges, UpdateOrderError}, models::OrderStatus, utils::{error_fmt_chain, get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct UpdateOrderForm{
    pub order_status: Option<OrderStatus>,
    pub finish_at: Option<DateTime<Utc>>
}

#[derive(Error)]
pub enum PatchOrderError{
    #[error("{0}")]
    NotFoundError(#[source] UpdateOrderError),
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for PatchOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for PatchOrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            PatchOrderError::NotFoundError(_) => StatusCode::NOT_FOUND,
            PatchOrderError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).body(format!("{}", self))
    }
}

#[tracing::instrument(
    "Updating order",
    skip(pool, form)
)]
pub async fn patch_order(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<UpdateOrderForm>,
    _: IsStaff
) -> Result<HttpResponse, PatchOrderError>{
    let order_id = path.into_inner();
    let form = form.0;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let order = update_order(
        conn,
        order_id,
        OrderChanges{
            order_status: form.order_status,
            finish_at: form.finish_at
        }
    )
    .await
    .map_err(|e| {
        match e {
            UpdateOrderError::NoOrderIdError(_) => PatchOrderError::NotFoundError(e),
            _ => PatchOrderError::UnexpectedError(e.into())
        }
    })?;

    Ok(HttpResponse::Ok().json(order))
}
