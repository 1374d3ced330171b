use thiserror::Error;

use crate::coordinator::LauncherView;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    #[error("Cannot {action} from the {from:?} view")]
    InvalidTransition {
        from: LauncherView,
        action: &'static str,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("Not found")]
    NotFound,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// A required login field was left empty.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your game ID")]
    MissingGameId,

    #[error("Please enter username and password")]
    MissingCredentials,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    #[error("Login timed out")]
    Timeout,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("No account is logged in")]
    NoSession,

    #[error("Launch failed: {0}")]
    Failed(String),
}
