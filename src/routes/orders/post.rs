use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

use crate::{auth::extractors::IsStaff, configuration::ApplicationSettings, db_interaction::{create_order, CreateOrderError, OrderDraft, OrderItemDraft}, utils::{error_fmt_chain, get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct OrderForm{
    pub customer_id: Option<i32>,
    #[serde(default)]
    pub table_ids: Vec<i32>,
    pub reservation_id: Option<i32>,
    pub items: Vec<OrderItemDraft>
}

#[derive(Error)]
pub enum PostOrderError{
    #[error("order must contain at least one item")]
    NoItemsError,
    #[error("item quantity must be at least 1")]
    BadQuantityError,
    #[error("{0}")]
    NotFoundError(#[source] CreateOrderError),
    #[error("{0}")]
    TableClaimedError(#[source] CreateOrderError),
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for PostOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for PostOrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            PostOrderError::NoItemsError => StatusCode::UNPROCESSABLE_ENTITY,
            PostOrderError::BadQuantityError => StatusCode::UNPROCESSABLE_ENTITY,
            PostOrderError::NotFoundError(_) => StatusCode::NOT_FOUND,
            PostOrderError::TableClaimedError(_) => StatusCode::CONFLICT,
            PostOrderError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).body(format!("{}", self))
    }
}

#[tracing::instrument(
    "Posting order",
    skip(pool, settings, form)
)]
pub async fn post_order(
    pool: web::Data<DbPool>,
    settings: web::Data<ApplicationSettings>,
    form: web::Json<OrderForm>,
    staff: IsStaff
) -> Result<HttpResponse, PostOrderError> {
    let form = form.0;

    if form.items.is_empty() {
        return Err(PostOrderError::NoItemsError)
    }

    if form.items.iter().any(|item| item.quantity < 1) {
        return Err(PostOrderError::BadQuantityError)
    }

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let order = create_order(
        conn,
        staff.0,
        OrderDraft{
            customer_id: form.customer_id,
            table_ids: form.table_ids,
            reservation_id: form.reservation_id,
            items: form.items
        },
        settings.enforce_table_availability
    )
    .await
    .map_err(|e| {
        match e {
            CreateOrderError::NoCustomerIdError(_)
            | CreateOrderError::NoProductIdError(_) => PostOrderError::NotFoundError(e),
            CreateOrderError::TableClaimedError(_) => PostOrderError::TableClaimedError(e),
            _ => PostOrderError::UnexpectedError(e.into())
        }
    })?;

    Ok(HttpResponse::Created().json(order))
}
