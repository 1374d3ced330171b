//! View coordination for the launcher shell.
//!
//! [`ViewCoordinator`] owns every piece of shell state: the active view, the
//! login form, the session, the catalog and the selected version. Handlers
//! get it by `&mut` and return [`Command`]s for work that has to happen off
//! the UI thread. Results of that work come back with the [`Ticket`] they were
//! issued under and are applied only while that ticket is still current.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::auth::{AccountProfile, Session};
use crate::error::{AuthError, LaunchError};
use crate::launch::{launched_message, launching_message, ProcessHandle};
use crate::login::{LoginForm, LoginMethod};
use crate::status::{StatusKind, StatusLine};
use crate::version::{VersionCatalog, VersionSelector};
use crate::{Error, Result};

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LauncherView {
    Login,
    Dashboard,
    VersionSelect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKind {
    Auth,
    Avatar,
    Launch,
}

/// Stamp carried by deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    kind: TicketKind,
}

impl Ticket {
    pub fn kind(&self) -> TicketKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What to put back when the version overlay closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    pub restore_view: LauncherView,
    pub restore_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Default,
    Loaded(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthRequest {
    pub ticket: Ticket,
    pub method: LoginMethod,
    pub identifier: String,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub ticket: Ticket,
    pub version: String,
    pub session: Session,
}

/// Work the coordinator wants done outside the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Authenticate(AuthRequest),
    LoadAvatar { ticket: Ticket, account_id: Uuid },
    Launch(LaunchRequest),
}

#[derive(Debug, Clone, Copy)]
pub struct StatusTimings {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for StatusTimings {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(3),
            failure: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
pub struct ViewCoordinator {
    view: LauncherView,
    login: LoginForm,
    session: Option<Session>,
    pending_session: Option<Session>,
    catalog: VersionCatalog,
    selector: VersionSelector,
    selected_version: String,
    pending: Option<PendingTransition>,
    generation: u64,
    avatar: Avatar,
    status: StatusLine,
    timings: StatusTimings,
}

impl ViewCoordinator {
    pub fn new(catalog: VersionCatalog, default_version: &str) -> Result<Self> {
        if !catalog.contains(default_version) {
            return Err(Error::UnknownVersion(default_version.to_string()));
        }
        Ok(Self::unchecked(catalog, default_version))
    }

    /// `default_version` must already be listed in `catalog`.
    fn unchecked(catalog: VersionCatalog, default_version: &str) -> Self {
        Self {
            view: LauncherView::Login,
            login: LoginForm::new(),
            session: None,
            pending_session: None,
            catalog,
            selector: VersionSelector::default(),
            selected_version: default_version.to_string(),
            pending: None,
            generation: 0,
            avatar: Avatar::Default,
            status: StatusLine::default(),
            timings: StatusTimings::default(),
        }
    }

    pub fn with_timings(mut self, timings: StatusTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn view(&self) -> LauncherView {
        self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn selected_version(&self) -> &str {
        &self.selected_version
    }

    pub fn pending(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }

    pub fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    pub fn picked_version(&self) -> Option<&str> {
        self.selector.picked()
    }

    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    pub fn login_form_mut(&mut self) -> &mut LoginForm {
        &mut self.login
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_logging_in(&self) -> bool {
        self.pending_session.is_some()
    }

    pub fn tick(&mut self, now: Instant) {
        self.status.tick(now);
    }

    fn ticket(&self, kind: TicketKind) -> Ticket {
        Ticket {
            generation: self.generation,
            kind,
        }
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn accepts(&self, ticket: Ticket, kind: TicketKind) -> bool {
        if ticket.kind != kind || ticket.generation != self.generation {
            log::debug!(
                "Dropping stale {:?} result (generation {} != {})",
                ticket.kind,
                ticket.generation,
                self.generation
            );
            return false;
        }

        let view_ok = match kind {
            TicketKind::Auth => self.view == LauncherView::Login,
            TicketKind::Avatar | TicketKind::Launch => self.view != LauncherView::Login,
        };
        if !view_ok {
            log::debug!("Dropping {:?} result, view is now {:?}", kind, self.view);
        }
        view_ok
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            from: self.view,
            action,
        }
    }

    pub fn set_method(&mut self, method: LoginMethod) {
        self.login.set_method(method);
    }

    /// Fills the login form and submits it.
    pub fn submit(&mut self, identifier: &str, secret: &str) -> Result<Command> {
        if self.view != LauncherView::Login {
            return Err(self.invalid("log in"));
        }
        self.login.identifier = identifier.to_string();
        self.login.secret = secret.to_string();
        self.submit_form()
    }

    pub fn submit_form(&mut self) -> Result<Command> {
        if self.view != LauncherView::Login {
            return Err(self.invalid("log in"));
        }

        let session = match self.login.submit_current() {
            Ok(session) => session,
            Err(e) => {
                self.status.show(StatusKind::Error, e.to_string());
                return Err(e.into());
            }
        };

        self.bump_generation();
        let secret = if self.login.fields().secret {
            self.login.secret.clone()
        } else {
            String::new()
        };
        let request = AuthRequest {
            ticket: self.ticket(TicketKind::Auth),
            method: session.login_method,
            identifier: session.identifier.clone(),
            secret,
        };
        self.pending_session = Some(session);
        self.status.show(StatusKind::Info, "Logging in...");

        Ok(Command::Authenticate(request))
    }

    /// Applies an authentication result. Returns the avatar load to start
    /// when the login went through.
    pub fn complete_login(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<AccountProfile, AuthError>,
    ) -> Option<Command> {
        if !self.accepts(ticket, TicketKind::Auth) {
            return None;
        }
        let session = self.pending_session.take()?;

        match result {
            Ok(profile) => {
                let account_id = profile.id;
                let session = session.with_profile(profile);
                log::info!(
                    "Logged in as {} ({})",
                    session.display_name(),
                    session.login_method.label()
                );

                self.session = Some(session);
                self.avatar = Avatar::Default;
                self.view = LauncherView::Dashboard;
                self.bump_generation();
                self.status
                    .flash(StatusKind::Info, "Login successful", self.timings.success);

                Some(Command::LoadAvatar {
                    ticket: self.ticket(TicketKind::Avatar),
                    account_id,
                })
            }
            Err(e) => {
                self.status.flash(
                    StatusKind::Error,
                    format!("Login failed: {}", e),
                    self.timings.failure,
                );
                None
            }
        }
    }

    pub fn apply_avatar(&mut self, ticket: Ticket, result: Result<Vec<u8>>) -> bool {
        if !self.accepts(ticket, TicketKind::Avatar) {
            return false;
        }

        self.avatar = match result {
            Ok(bytes) => Avatar::Loaded(bytes),
            Err(Error::NotFound) => Avatar::Default,
            Err(e) => {
                log::warn!("Failed to load avatar: {}", e);
                Avatar::Default
            }
        };
        true
    }

    /// Handles a deferred task that died without a classified result.
    pub fn abort_deferred(&mut self, ticket: Ticket, reason: &str) -> bool {
        log::error!("{:?} task failed: {}", ticket.kind, reason);
        if !self.accepts(ticket, ticket.kind) {
            return false;
        }

        match ticket.kind {
            TicketKind::Auth => {
                self.pending_session = None;
            }
            TicketKind::Avatar => {
                self.avatar = Avatar::Default;
                return true;
            }
            TicketKind::Launch => {}
        }
        self.status
            .flash(StatusKind::Error, GENERIC_FAILURE, self.timings.failure);
        true
    }

    pub fn open_version_select(&mut self) -> Result<()> {
        if self.view != LauncherView::Dashboard {
            return Err(self.invalid("open version selection"));
        }

        self.pending = Some(PendingTransition {
            restore_view: self.view,
            restore_version: self.selected_version.clone(),
        });
        self.selector.reset();
        self.view = LauncherView::VersionSelect;
        Ok(())
    }

    pub fn select_version(&mut self, id: &str) -> Result<()> {
        if self.view != LauncherView::VersionSelect {
            return Err(self.invalid("select a version"));
        }

        if let Err(e) = self.selector.select(&self.catalog, id) {
            self.status
                .flash(StatusKind::Error, e.to_string(), self.timings.failure);
            return Err(e);
        }
        Ok(())
    }

    /// Closes the overlay. A non-empty `selection` becomes the selected
    /// version; an empty one keeps the version shown before the overlay opened.
    /// Outside the overlay this does nothing.
    pub fn confirm(&mut self, selection: &str) -> Result<()> {
        if self.view != LauncherView::VersionSelect {
            log::debug!("confirm ignored in {:?}", self.view);
            return Ok(());
        }

        if !selection.is_empty() && !self.catalog.contains(selection) {
            self.status.flash(
                StatusKind::Error,
                format!("Unknown version: {}", selection),
                self.timings.failure,
            );
            return Err(Error::UnknownVersion(selection.to_string()));
        }

        let pending = self.pending.take();
        if !selection.is_empty() {
            self.selected_version = selection.to_string();
        } else if let Some(restore) = pending.as_ref() {
            self.selected_version = restore.restore_version.clone();
        }

        self.view = pending
            .map(|p| p.restore_view)
            .unwrap_or(LauncherView::Dashboard);
        self.selector.reset();
        log::info!("Selected version {}", self.selected_version);
        Ok(())
    }

    pub fn confirm_picked(&mut self) -> Result<()> {
        let selection = self.selector.picked().unwrap_or_default().to_string();
        self.confirm(&selection)
    }

    pub fn cancel_version_select(&mut self) -> Result<()> {
        self.confirm("")
    }

    pub fn switch_account(&mut self) -> Result<()> {
        if self.view == LauncherView::VersionSelect {
            return Err(self.invalid("switch account"));
        }

        if let Some(session) = self.session.take() {
            log::info!("Logged out {}", session.display_name());
        }
        self.pending_session = None;
        self.login.clear();
        self.avatar = Avatar::Default;
        self.bump_generation();
        self.view = LauncherView::Login;
        self.status.clear();
        Ok(())
    }

    pub fn request_launch(&mut self) -> Result<Command> {
        if self.view != LauncherView::Dashboard {
            return Err(self.invalid("launch"));
        }
        let session = self.session.clone().ok_or(LaunchError::NoSession)?;

        self.status
            .show(StatusKind::Info, launching_message(&self.selected_version));

        Ok(Command::Launch(LaunchRequest {
            ticket: self.ticket(TicketKind::Launch),
            version: self.selected_version.clone(),
            session,
        }))
    }

    pub fn complete_launch(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<ProcessHandle, LaunchError>,
    ) -> bool {
        if !self.accepts(ticket, TicketKind::Launch) {
            return false;
        }

        match result {
            Ok(handle) => {
                self.status
                    .flash(StatusKind::Info, launched_message(&handle), self.timings.success)
            }
            Err(e) => self
                .status
                .flash(StatusKind::Error, e.to_string(), self.timings.failure),
        }
        true
    }

    /// Swaps in a catalog from the version service. Skipped while the overlay
    /// is open. The selected version is kept and appended if the new list
    /// lacks it.
    pub fn replace_catalog(&mut self, mut versions: Vec<String>) -> Result<bool> {
        if self.view == LauncherView::VersionSelect {
            return Ok(false);
        }

        if !versions.contains(&self.selected_version) {
            versions.push(self.selected_version.clone());
        }
        self.catalog = VersionCatalog::new(versions)?;
        log::info!("Catalog updated with {} versions", self.catalog.len());
        Ok(true)
    }
}

impl Default for ViewCoordinator {
    fn default() -> Self {
        Self::unchecked(VersionCatalog::default(), crate::version::DEFAULT_VERSION)
    }
}
