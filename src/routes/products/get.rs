use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::extractors::MaybeUser;
use crate::db_interaction::{get_all_products, get_product_by_id, ProductLookupError};
use crate::models::Product;
use crate::utils::{get_pooled_connection, DbPool};

// What anonymous callers and plain customers see of the menu
#[derive(Serialize, Deserialize)]
pub struct ProductPublicView{
    pub product_id: i32,
    pub product_name: String,
    pub price: i32,
    pub image: Option<String>
}

impl From<Product> for ProductPublicView {
    fn from(product: Product) -> Self {
        ProductPublicView{
            product_id: product.product_id,
            product_name: product.product_name,
            price: product.price,
            image: product.image
        }
    }
}

fn is_staff_view(user: &MaybeUser) -> bool{
    user.0.as_ref().map(|claims| claims.role.is_staff()).unwrap_or(false)
}

#[tracing::instrument(
    "Getting all products",
    skip(pool, user)
)]
pub async fn list_products(
    pool: web::Data<DbPool>,
    user: MaybeUser
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let products = get_all_products(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    if is_staff_view(&user) {
        return Ok(HttpResponse::Ok().json(products))
    }

    let public: Vec<ProductPublicView> = products
        .into_iter()
        .map(ProductPublicView::from)
        .collect();

    Ok(HttpResponse::Ok().json(public))
}

#[tracing::instrument(
    "Getting single product",
    skip(pool, user)
)]
pub async fn read_product(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    user: MaybeUser
) -> Result<HttpResponse, actix_web::Error> {
    let product_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let product = get_product_by_id(conn, product_id)
        .await
        .map_err(|e| {
            match e {
                ProductLookupError::NoProductIdError(_) => ErrorNotFound(e),
                _ => ErrorInternalServerError(e)
            }
        })?;

    if is_staff_view(&user) {
        return Ok(HttpResponse::Ok().json(product))
    }

    Ok(HttpResponse::Ok().json(ProductPublicView::from(product)))
}
