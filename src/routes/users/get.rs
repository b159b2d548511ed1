use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};

use crate::auth::extractors::IsAdmin;
use crate::db_interaction::{get_all_users, get_user_profile, UserLookupError};
use crate::utils::{get_pooled_connection, DbPool};

#[tracing::instrument(
    "Getting all users",
    skip(pool)
)]
pub async fn list_users(
    pool: web::Data<DbPool>,
    _: IsAdmin
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let users = get_all_users(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(users))
}

#[tracing::instrument(
    "Getting single user",
    skip(pool)
)]
pub async fn read_user(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _: IsAdmin
) -> Result<HttpResponse, actix_web::Error> {
    let user_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let profile = get_user_profile(conn, user_id)
        .await
        .map_err(|e| {
            match e {
                UserLookupError::NoUserIdError(_) => ErrorNotFound(e),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(profile))
}
