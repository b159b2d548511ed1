use std::{error::Error, fmt::Debug};

use anyhow::Context;
use diesel::OptionalExtension;
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use diesel::prelude::AsChangeset;
use thiserror::Error;

use crate::{models::{NewProduct, Product}, schema::products, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

#[tracing::instrument(
    "Getting all products",
    skip_all
)]
pub async fn get_all_products(
    mut conn: DbConnection
) -> Result<Vec<Product>, anyhow::Error>{
    Ok(spawn_blocking_with_tracing(move || {
        products::table
            .order(products::product_id.asc())
            .load::<Product>(&mut conn)
            .context("Failed to load products")
    })
    .await
    .context("Failed due to threadpool error")??)
}

// Error associated with looking up / mutating a single product
#[derive(Error)]
pub enum ProductLookupError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("product_id: {0} doesn't exist")]
    NoProductIdError(i32)
}

impl Debug for ProductLookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Getting product by id",
    skip(conn)
)]
pub async fn get_product_by_id(
    mut conn: DbConnection,
    product_id: i32
) -> Result<Product, ProductLookupError>{
    let res = spawn_blocking_with_tracing(move || {
        products::table
            .filter(products::product_id.eq(product_id))
            .get_result::<Product>(&mut conn)
            .optional()
    })
    .await??;

    res.ok_or(ProductLookupError::NoProductIdError(product_id))
}

#[tracing::instrument(
    "Inserting new product",
    skip_all
)]
pub async fn insert_product(
    mut conn: DbConnection,
    new_product: NewProduct
) -> Result<Product, anyhow::Error>{
    Ok(spawn_blocking_with_tracing(move || {
        diesel::insert_into(products::table)
            .values(new_product)
            .get_result::<Product>(&mut conn)
            .context("Failed to insert product")
    })
    .await
    .context("Failed due to threadpool error")??)
}

#[derive(AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset{
    pub product_name: Option<String>,
    pub price: Option<i32>,
    pub sweetness_options: Option<Vec<String>>,
    pub milk_type_options: Option<Vec<String>>,
    pub type_options: Option<Vec<String>>,
    pub image: Option<String>
}

impl ProductChangeset {
    fn is_empty(&self) -> bool{
        self.product_name.is_none()
            && self.price.is_none()
            && self.sweetness_options.is_none()
            && self.milk_type_options.is_none()
            && self.type_options.is_none()
            && self.image.is_none()
    }
}

#[tracing::instrument(
    "Updating product fields",
    skip(conn, changes)
)]
pub async fn update_product(
    mut conn: DbConnection,
    product_id: i32,
    changes: ProductChangeset
) -> Result<Product, ProductLookupError>{
    let res = spawn_blocking_with_tracing(move || {
        if changes.is_empty() {
            return products::table
                .filter(products::product_id.eq(product_id))
                .get_result::<Product>(&mut conn)
                .optional()
        }

        diesel::update(products::table.filter(products::product_id.eq(product_id)))
            .set(changes)
            .get_result::<Product>(&mut conn)
            .optional()
    })
    .await??;

    res.ok_or(ProductLookupError::NoProductIdError(product_id))
}

#[tracing::instrument(
    "Deleting product",
    skip(conn)
)]
pub async fn delete_product(
    mut conn: DbConnection,
    product_id: i32
) -> Result<Product, ProductLookupError>{
    let res = spawn_blocking_with_tracing(move || {
        diesel::delete(products::table.filter(products::product_id.eq(product_id)))
            .get_result::<Product>(&mut conn)
            .optional()
    })
    .await??;

    res.ok_or(ProductLookupError::NoProductIdError(product_id))
}
