use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{auth::jwt::UserRole, db_interaction::{insert_user, UserInsertError}, domain::{UserPassword, Username}, utils::{error_fmt_chain, get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct RegistrationForm{
    username: String,
    password: SecretString,
    name: Option<String>,
    email: Option<String>,
    tel: Option<String>
}

#[derive(Serialize, Deserialize)]
pub struct RegisterResponse{
    pub user_id: i32,
    pub username: String,
    pub user_role: String,
    pub name: Option<String>,
    pub email: Option<String>
}

#[derive(Error)]
pub enum RegisterError{
    #[error("{0}")]
    ValidationError(String),
    #[error("username is already taken")]
    UsernameTakenError(#[source] UserInsertError),
    #[error("email is already taken")]
    EmailTakenError(#[source] UserInsertError),
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for RegisterError{
    fn status_code(&self) -> StatusCode {
        match self {
            RegisterError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RegisterError::UsernameTakenError(_) => StatusCode::CONFLICT,
            RegisterError::EmailTakenError(_) => StatusCode::CONFLICT,
            RegisterError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).body(format!("{}", self))
    }
}

#[tracing::instrument(
    "User registration started",
    skip(pool, form)
)]
pub async fn register(
    form: web::Json<RegistrationForm>,
    pool: web::Data<DbPool>
) -> Result<HttpResponse, RegisterError> {
    let form = form.0;

    let username = Username::parse(form.username)
        .map_err(RegisterError::ValidationError)?;
    let password = UserPassword::parse(form.password)
        .map_err(RegisterError::ValidationError)?;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    // Self-registration always lands on the least privileged role
    let user = insert_user(
        conn,
        username.inner(),
        password.inner(),
        UserRole::Customer,
        form.name,
        form.email,
        form.tel
    )
    .await
    .map_err(|e| {
        match e {
            UserInsertError::UsernameTakenError => RegisterError::UsernameTakenError(e),
            UserInsertError::EmailTakenError => RegisterError::EmailTakenError(e),
            UserInsertError::UnexpectedError(_) => RegisterError::UnexpectedError(e.into())
        }
    })?;

    Ok(HttpResponse::Created().json(RegisterResponse{
        user_id: user.user_id,
        username: user.username,
        user_role: user.user_role,
        name: user.name,
        email: user.email
    }))
}
