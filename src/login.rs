use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoginMethod {
    Official,
    Offline,
    ThirdParty,
}

impl Default for LoginMethod {
    fn default() -> Self {
        LoginMethod::Official
    }
}

impl LoginMethod {
    pub const ALL: [LoginMethod; 3] = [
        LoginMethod::Official,
        LoginMethod::Offline,
        LoginMethod::ThirdParty,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LoginMethod::Official => "Official",
            LoginMethod::Offline => "Offline",
            LoginMethod::ThirdParty => "Third-party",
        }
    }

    pub fn next(self) -> Self {
        match self {
            LoginMethod::Official => LoginMethod::Offline,
            LoginMethod::Offline => LoginMethod::ThirdParty,
            LoginMethod::ThirdParty => LoginMethod::Official,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            LoginMethod::Official => LoginMethod::ThirdParty,
            LoginMethod::Offline => LoginMethod::Official,
            LoginMethod::ThirdParty => LoginMethod::Offline,
        }
    }
}

/// Which login inputs are shown and required for a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFields {
    pub identifier: bool,
    pub secret: bool,
    pub remember: bool,
}

pub fn required_fields(method: LoginMethod) -> RequiredFields {
    match method {
        LoginMethod::Offline => RequiredFields {
            identifier: true,
            secret: false,
            remember: false,
        },
        LoginMethod::Official | LoginMethod::ThirdParty => RequiredFields {
            identifier: true,
            secret: true,
            remember: true,
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    method: LoginMethod,
    pub identifier: String,
    pub secret: String,
    pub remember: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> LoginMethod {
        self.method
    }

    pub fn set_method(&mut self, method: LoginMethod) {
        if self.method != method {
            log::debug!("Login method changed to {}", method.label());
        }
        self.method = method;
    }

    pub fn fields(&self) -> RequiredFields {
        required_fields(self.method)
    }

    pub fn identifier_placeholder(&self) -> &'static str {
        match self.method {
            LoginMethod::Offline => "Game ID",
            LoginMethod::Official | LoginMethod::ThirdParty => "Username / Email",
        }
    }

    /// Validates the given credentials against the current method.
    ///
    /// The form buffers are left untouched; only the returned session carries
    /// the result. The secret is never stored in the session.
    pub fn submit(&self, identifier: &str, secret: &str) -> Result<Session, ValidationError> {
        let fields = self.fields();

        if identifier.is_empty() {
            return Err(match self.method {
                LoginMethod::Offline => ValidationError::MissingGameId,
                _ => ValidationError::MissingCredentials,
            });
        }

        if fields.secret && secret.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }

        Ok(Session::new(
            self.method,
            identifier.to_string(),
            fields.remember && self.remember,
        ))
    }

    pub fn submit_current(&self) -> Result<Session, ValidationError> {
        self.submit(&self.identifier, &self.secret)
    }

    pub fn clear(&mut self) {
        self.identifier.clear();
        self.secret.clear();
    }
}
