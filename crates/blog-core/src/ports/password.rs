//! Password hashing port.

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Verify a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError>;
}

/// Hashing errors.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Hashing error: {0}")]
    Hashing(String),
}
