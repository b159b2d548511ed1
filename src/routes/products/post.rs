use actix_web::{error::{ErrorInternalServerError, ErrorUnprocessableEntity}, web, HttpResponse};
use serde::Deserialize;

use crate::{auth::extractors::IsStaff, db_interaction::insert_product, models::NewProduct, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct ProductForm{
    pub product_name: String,
    pub price: i32,
    #[serde(default)]
    pub sweetness_options: Vec<String>,
    #[serde(default)]
    pub milk_type_options: Vec<String>,
    #[serde(default)]
    pub type_options: Vec<String>,
    pub image: Option<String>
}

#[tracing::instrument(
    "Posting new product",
    skip(pool, form)
)]
pub async fn post_product(
    pool: web::Data<DbPool>,
    form: web::Json<ProductForm>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error>{
    let form = form.0;

    if form.price < 0 {
        return Err(ErrorUnprocessableEntity("price must not be negative"))
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let product = insert_product(conn, NewProduct{
        product_name: form.product_name,
        price: form.price,
        sweetness_options: form.sweetness_options,
        milk_type_options: form.milk_type_options,
        type_options: form.type_options,
        image: form.image
    })
    .await
    .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Created().json(product))
}
