use secrecy::{ExposeSecret, SecretString};

const MIN_PASSWORD_LENGTH: usize = 4;

#[derive(Debug)]
pub struct UserPassword(SecretString);

impl UserPassword{
    pub fn parse(password: SecretString) -> Result<UserPassword, String>{
        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            ))
        }

        Ok(Self(password))
    }

    pub fn inner(self) -> SecretString {
        self.0
    }
}
