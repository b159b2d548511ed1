use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::{auth::extractors::IsAuthenticated, db_interaction::{get_user_by_id, update_user_profile, ProfileChanges, ProfileUpdateError}, domain::UserPassword, password::{compute_password_hash, verify_password}, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, get_pooled_connection, DbPool}};

#[derive(Deserialize)]
pub struct ProfileForm{
    // current password, always required as confirmation
    pub password: SecretString,
    pub name: Option<String>,
    pub email: Option<String>,
    pub tel: Option<String>,
    pub new_password: Option<SecretString>
}

#[derive(Error)]
pub enum PutProfileError{
    #[error("Invalid token")]
    UnknownUserError,
    #[error("password is incorrect")]
    WrongPasswordError,
    #[error("{0}")]
    ValidationError(String),
    #[error("email is already taken")]
    EmailTakenError(#[source] ProfileUpdateError),
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for PutProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for PutProfileError {
    fn status_code(&self) -> StatusCode {
        match self {
            PutProfileError::UnknownUserError => StatusCode::UNAUTHORIZED,
            // Wrong confirmation password is a bad request here, not a
            // failed login
            PutProfileError::WrongPasswordError => StatusCode::BAD_REQUEST,
            PutProfileError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PutProfileError::EmailTakenError(_) => StatusCode::CONFLICT,
            PutProfileError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).body(format!("{}", self))
    }
}

#[tracing::instrument(
    "Updating profile of logged in user",
    skip_all
)]
pub async fn put_profile(
    pool: web::Data<DbPool>,
    form: web::Json<ProfileForm>,
    auth: IsAuthenticated
) -> Result<HttpResponse, PutProfileError>{
    let form = form.0;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let user = get_user_by_id(conn, auth.0)
        .await?
        .ok_or(PutProfileError::UnknownUserError)?;

    let confirmed = verify_password(form.password, user.password.clone())
        .await
        .context("Failed to verify current password")?;

    if !confirmed {
        tracing::info!("Profile update rejected, confirmation password did not match");
        return Err(PutProfileError::WrongPasswordError)
    }

    let new_password_hash = match form.new_password {
        Some(new_password) => {
            let new_password = UserPassword::parse(new_password)
                .map_err(PutProfileError::ValidationError)?;

            let hash = spawn_blocking_with_tracing(move || {
                compute_password_hash(new_password.inner())
            })
            .await
            .context("Failed due to threadpool error")?
            .context("Failed to compute password hash")?;

            Some(hash.expose_secret().to_string())
        },
        None => None
    };

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let profile = update_user_profile(
        conn,
        user.user_id,
        ProfileChanges{
            name: form.name,
            tel: form.tel,
            email: form.email,
            new_password_hash
        }
    )
    .await
    .map_err(|e| {
        match e {
            ProfileUpdateError::EmailTakenError => PutProfileError::EmailTakenError(e),
            _ => PutProfileError::UnexpectedError(e.into())
        }
    })?;

    Ok(HttpResponse::Ok().json(profile))
}
