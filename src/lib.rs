pub mod app;
pub mod auth;
pub mod coordinator;
pub mod error;
pub mod launch;
pub mod login;
pub mod logs;
pub mod news;
pub mod runtime;
pub mod settings;
pub mod status;
pub mod ui;
pub mod version;

pub use coordinator::{Command, LauncherView, ViewCoordinator};
pub use error::{Error, Result};
pub use login::LoginMethod;
