//! Admin authentication: credential check and opaque bearer tokens.
//!
//! Tokens are minted per login and kept in an in-memory table with a TTL;
//! restarting the server invalidates all of them, which is acceptable for a
//! single-admin surface.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,
}

/// Issues and validates opaque admin tokens.
pub struct TokenService {
    admin_user: String,
    admin_password: String,
    ttl: Duration,
    tokens: Mutex<HashMap<String, Instant>>,
}

impl TokenService {
    pub fn new(admin_user: &str, admin_password: &str, ttl: Duration) -> Self {
        Self {
            admin_user: admin_user.to_string(),
            admin_password: admin_password.to_string(),
            ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Check login credentials in constant time.
    pub fn verify_credentials(&self, user: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(user.as_bytes(), self.admin_user.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.admin_password.as_bytes());
        user_ok && pass_ok
    }

    /// Mint a fresh token valid for the configured TTL.
    pub fn issue_token(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut tokens = self.tokens.lock().unwrap();

        let now = Instant::now();
        tokens.retain(|_, expires| *expires > now);
        tokens.insert(token.clone(), now + self.ttl);

        token
    }

    /// Validate a previously issued token.
    pub fn validate_token(&self, token: &str) -> Result<(), AuthError> {
        let tokens = self.tokens.lock().unwrap();
        match tokens.get(token) {
            Some(expires) if *expires > Instant::now() => Ok(()),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
