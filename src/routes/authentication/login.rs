use actix_web::{error::{ErrorInternalServerError, ErrorUnauthorized}, web, HttpResponse};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::{auth::jwt::Tokenizer, db_interaction::get_user_by_username, password::verify_password, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct LoginForm{
    pub username: String,
    pub password: SecretString
}

#[derive(Serialize, Deserialize)]
pub struct TokenResponse{
    pub access_token: String,
    pub token_type: String
}

#[tracing::instrument(
    "Logging in user",
    skip(pool, tokenizer, form)
)]
pub async fn login(
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
    form: web::Json<LoginForm>
) -> Result<HttpResponse, actix_web::Error>{
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let form = form.0;

    let user = match get_user_by_username(conn, form.username).await
                        .map_err(ErrorInternalServerError)?{
        Some(user) => user,
        // Same answer for unknown username and wrong password
        None => return Err(ErrorUnauthorized("Username or password is incorrect"))
    };

    match verify_password(form.password, user.password.clone()).await{
        Ok(true) => {
            let access_token = tokenizer.generate_key(&user);

            Ok(HttpResponse::Ok().json(TokenResponse{
                access_token,
                token_type: "bearer".to_string()
            }))
        },
        Ok(false) => {
            tracing::info!("Passwords did not match");
            Err(ErrorUnauthorized("Username or password is incorrect"))
        },
        Err(e) => {
            let err = e.to_string();
            tracing::error!(err);
            Err(ErrorInternalServerError("Failed to login"))
        }
    }
}
