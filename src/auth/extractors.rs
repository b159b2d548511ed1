use actix_web::{error::{ErrorForbidden, ErrorUnauthorized}, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use super::jwt::{Claims, Tokenizer, UserRole};

// Any authenticated principal
#[derive(Debug)]
pub struct IsAuthenticated(pub i32, pub UserRole);

// Staff or admin
#[derive(Debug)]
pub struct IsStaff(pub i32, pub UserRole);

// Admin only
pub struct IsAdmin(pub i32);

// Claims if a valid token was presented, None otherwise. Never rejects.
pub struct MaybeUser(pub Option<Claims>);

fn claims_from_request(req: &HttpRequest) -> Result<Claims, actix_web::Error>{
    let tokenizer: &web::Data<Tokenizer> = req.app_data()
        .expect("Tokenizer was not registered as app data");

    let header = match req.headers().get("Authorization") {
        Some(header) => header,
        None => return Err(ErrorUnauthorized("Missing bearer token"))
    };

    let token = header.to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer"))
        .map(|value| value.trim());

    let token = match token {
        Some(token) if !token.is_empty() => token,
        _ => return Err(ErrorUnauthorized("Missing bearer token"))
    };

    match tokenizer.decode_key(token.to_string()){
        Some(claims) => Ok(claims),
        None => Err(ErrorUnauthorized("Invalid token"))
    }
}

impl FromRequest for IsAuthenticated {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            claims_from_request(req)
                .map(|claims| IsAuthenticated(claims.sub, claims.role))
        )
    }
}

impl FromRequest for IsStaff {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            claims_from_request(req)
                .and_then(|claims| {
                    if claims.role.is_staff() {
                        Ok(IsStaff(claims.sub, claims.role))
                    } else {
                        Err(ErrorForbidden("Not enough permissions"))
                    }
                })
        )
    }
}

impl FromRequest for IsAdmin {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            claims_from_request(req)
                .and_then(|claims| {
                    match claims.role {
                        UserRole::Admin => Ok(IsAdmin(claims.sub)),
                        _ => Err(ErrorForbidden("Not enough permissions"))
                    }
                })
        )
    }
}

impl FromRequest for MaybeUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(MaybeUser(claims_from_request(req).ok())))
    }
}
