use std::fmt;

use crate::NotifyError;

/// Login for the outbound mail relay.
#[derive(Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of relay credentials, consulted each time a message is sent.
pub trait CredentialProvider: Send + Sync {
    fn smtp_credentials(&self) -> Result<SmtpCredentials, NotifyError>;
}

/// Reads the password from an environment variable at send time.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    username: String,
    password_var: String,
}

impl EnvCredentials {
    pub fn new(username: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_var: password_var.into(),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn smtp_credentials(&self) -> Result<SmtpCredentials, NotifyError> {
        match std::env::var(&self.password_var) {
            Ok(password) if !password.is_empty() => Ok(SmtpCredentials {
                username: self.username.clone(),
                password,
            }),
            _ => Err(NotifyError::Credentials(format!(
                "environment variable {} is not set",
                self.password_var
            ))),
        }
    }
}

/// Fixed credentials, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub SmtpCredentials);

impl CredentialProvider for StaticCredentials {
    fn smtp_credentials(&self) -> Result<SmtpCredentials, NotifyError> {
        Ok(self.0.clone())
    }
}
