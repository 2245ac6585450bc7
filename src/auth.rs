use actix_web::{dev::ServiceRequest, web, Error, HttpMessage};
use actix_web_httpauth::extractors::{
    basic::{BasicAuth, Config},
    AuthenticationError,
};
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;

use crate::state::AppState;

const AUTH_REALM: &str = "Clinic Admin";

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
}

/// The single admin account; only the argon2 hash of its password is kept.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn new(username: &str, password: &str) -> Result<Self, password_hash::Error> {
        Ok(Self {
            username: username.to_string(),
            password_hash: hash_password(password)?,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && verify_password(password, &self.password_hash)
    }
}

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = PasswordHash::new(password_hash);
    match parsed_hash {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn admin_validator(
    req: ServiceRequest,
    credentials: BasicAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err((challenge(), req));
    };
    let username = credentials.user_id();
    let password = credentials.password().unwrap_or_default();

    if !state.admin.verify(username, password) {
        log::warn!("Rejected admin login for {username}");
        return Err((challenge(), req));
    }

    req.extensions_mut().insert(AuthUser {
        username: username.to_string(),
    });
    Ok(req)
}

/// 401 carrying a `WWW-Authenticate` header so browsers prompt for credentials.
fn challenge() -> Error {
    AuthenticationError::from(Config::default().realm(AUTH_REALM)).into()
}
