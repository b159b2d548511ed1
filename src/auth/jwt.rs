use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{configuration::JWTSettings, models::User};

#[derive(Clone)]
pub struct Tokenizer{
    pub secret: SecretString,
    pub expiry_minutes: u64
}

impl Tokenizer {
    pub fn new(settings: &JWTSettings) -> Self {
        Self{
            secret: SecretString::new(settings.secret.clone().into()),
            expiry_minutes: settings.expiry_minutes
        }
    }

    pub fn generate_key(&self, user: &User) -> String{
        let expiry = Utc::now() + Duration::minutes(self.expiry_minutes as i64);

        let claims = Claims{
            sub: user.user_id,
            exp: expiry.timestamp() as usize,
            username: user.username.clone(),
            role: UserRole::parse(&user.user_role)
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes())
        )
        .unwrap()
    }

    pub fn decode_key(&self, token: String) -> Option<Claims>{
        match jsonwebtoken::decode::<Claims>(
            &token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256)
        ) {
            Ok(decoded_data) => Some(decoded_data.claims),
            Err(_) => None
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims{
    pub sub: i32,
    pub exp: usize,
    pub username: String,
    pub role: UserRole
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole{
    Customer,
    Staff,
    Admin
}

impl UserRole {
    /// Stored roles come back as text; anything unrecognised gets the
    /// least privileged role.
    pub fn parse(role: &str) -> Self{
        match role {
            "admin" => UserRole::Admin,
            "staff" => UserRole::Staff,
            _ => UserRole::Customer
        }
    }

    pub fn as_str(&self) -> &'static str{
        match self {
            UserRole::Customer => "customer",
            UserRole::Staff => "staff",
            UserRole::Admin => "admin"
        }
    }

    pub fn is_staff(&self) -> bool{
        matches!(self, UserRole::Staff | UserRole::Admin)
    }
}
