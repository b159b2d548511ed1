use actix_web::{error::{ErrorInternalServerError, ErrorNotFound, ErrorUnprocessableEntity}, web, HttpResponse};
use serde::Deserialize;

use crate::{auth::extractors::IsStaff, db_interaction::{update_product, ProductChangeset, ProductLookupError}, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct UpdateProductForm{
    pub product_name: Option<String>,
    pub price: Option<i32>,
    pub sweetness_options: Option<Vec<String>>,
    pub milk_type_options: Option<Vec<String>>,
    pub type_options: Option<Vec<String>>,
    pub image: Option<String>
}

#[tracing::instrument(
    "Updating product fields",
    skip(pool, form)
)]
pub async fn put_product(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<UpdateProductForm>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error>{
    let product_id = path.into_inner();
    let form = form.0;

    if matches!(form.price, Some(price) if price < 0) {
        return Err(ErrorUnprocessableEntity("price must not be negative"))
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let product = update_product(conn, product_id, ProductChangeset{
        product_name: form.product_name,
        price: form.price,
        sweetness_options: form.sweetness_options,
        milk_type_options: form.milk_type_options,
        type_options: form.type_options,
        image: form.image
    })
    .await
    .map_err(|e| {
        match e {
            ProductLookupError::NoProductIdError(_) => ErrorNotFound(e),
            _ => ErrorInternalServerError(e)
        }
    })?;

    Ok(HttpResponse::Ok().json(product))
}
