use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};

use crate::{auth::extractors::IsStaff, db_interaction::{delete_product, ProductLookupError}, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Deleting product",
    skip(pool)
)]
pub async fn remove_product(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error>{
    let product_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let product = delete_product(conn, product_id)
        .await
        .map_err(|e| {
            match e {
                ProductLookupError::NoProductIdError(_) => ErrorNotFound(e),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Deleted product '{}'", product.product_name)
    })))
}
