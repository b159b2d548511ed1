use actix_web::{error::{ErrorInternalServerError, ErrorUnauthorized}, web, HttpResponse};

use crate::{auth::extractors::IsAuthenticated, db_interaction::{get_user_profile, UserLookupError}, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Get profile data of logged in user",
    skip(pool, auth)
)]
pub async fn get_profile(
    pool: web::Data<DbPool>,
    auth: IsAuthenticated
) -> Result<HttpResponse, actix_web::Error>{
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let profile = get_user_profile(conn, auth.0)
        .await
        .map_err(|e| {
            match e {
                // A token whose subject no longer exists is as good as no
                // token at all
                UserLookupError::NoUserIdError(_) => ErrorUnauthorized("Invalid token"),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(profile))
}
