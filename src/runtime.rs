//! Async boundary between the UI thread and the collaborators.
//!
//! Commands from the coordinator run as tokio tasks. Each task sends exactly
//! one [`AppEvent`] back over a channel that the UI loop drains between input
//! polls, so the coordinator is only ever touched from one place.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::auth::{AccountProfile, AuthService, SimulatedAuthService};
use crate::coordinator::{Command, Ticket, ViewCoordinator};
use crate::error::{AuthError, LaunchError};
use crate::launch::{LaunchService, ProcessHandle};
use crate::settings::Settings;
use crate::version::{ManifestVersionService, StaticVersionService, VersionService};
use crate::Result;

#[derive(Debug)]
pub enum AppEvent {
    LoginFinished {
        ticket: Ticket,
        result: std::result::Result<AccountProfile, AuthError>,
    },
    AvatarLoaded {
        ticket: Ticket,
        result: Result<Vec<u8>>,
    },
    LaunchFinished {
        ticket: Ticket,
        result: std::result::Result<ProcessHandle, LaunchError>,
    },
    CatalogFetched(Result<Vec<String>>),
    TaskFailed {
        ticket: Ticket,
        reason: String,
    },
}

pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub versions: Arc<dyn VersionService>,
    pub launcher: Option<Arc<dyn LaunchService>>,
    pub auth_timeout: Duration,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let avatars_dir = settings.general.avatars_directory.clone();
        let versions: Arc<dyn VersionService> = if settings.versions.fetch_manifest {
            Arc::new(ManifestVersionService::new(
                settings.versions.manifest_url.clone(),
                settings.versions.manifest_limit,
                settings.fetch_timeout(),
                avatars_dir,
            )?)
        } else {
            Arc::new(StaticVersionService::new(settings.catalog()?, avatars_dir))
        };

        Ok(Self {
            auth: Arc::new(SimulatedAuthService::new(settings.auth_delay())),
            versions,
            launcher: None,
            auth_timeout: settings.auth_timeout(),
        })
    }
}

pub struct Runtime {
    services: Services,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
    deferred_catalog: Option<Vec<String>>,
}

impl Runtime {
    pub fn new(services: Services) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            services,
            tx,
            rx,
            deferred_catalog: None,
        }
    }

    /// Runs `task` on its own tokio task; a panic becomes `TaskFailed`.
    fn spawn_guarded<F>(&self, ticket: Option<Ticket>, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match tokio::spawn(task).await {
                Ok(event) => event,
                Err(e) => match ticket {
                    Some(ticket) => AppEvent::TaskFailed {
                        ticket,
                        reason: e.to_string(),
                    },
                    None => AppEvent::CatalogFetched(Err(crate::Error::Other(e.to_string()))),
                },
            };
            if tx.send(event).is_err() {
                log::debug!("UI loop gone, dropping event");
            }
        });
    }

    pub fn dispatch(&self, command: Command) {
        match command {
            Command::Authenticate(request) => {
                let auth = Arc::clone(&self.services.auth);
                let timeout = self.services.auth_timeout;
                let ticket = request.ticket;
                log::info!("Authenticating {} ({})", request.identifier, request.method.label());

                self.spawn_guarded(Some(ticket), async move {
                    let result = match tokio::time::timeout(
                        timeout,
                        auth.authenticate(request.method, &request.identifier, &request.secret),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(AuthError::Timeout),
                    };
                    AppEvent::LoginFinished { ticket, result }
                });
            }
            Command::LoadAvatar { ticket, account_id } => {
                let versions = Arc::clone(&self.services.versions);
                self.spawn_guarded(Some(ticket), async move {
                    let result = versions.resolve_avatar(account_id).await;
                    AppEvent::AvatarLoaded { ticket, result }
                });
            }
            Command::Launch(request) => {
                let Some(launcher) = self.services.launcher.clone() else {
                    log::info!("No launch service configured, {} not started", request.version);
                    return;
                };
                let ticket = request.ticket;
                self.spawn_guarded(Some(ticket), async move {
                    let result = launcher.launch(&request.version, &request.session).await;
                    AppEvent::LaunchFinished { ticket, result }
                });
            }
        }
    }

    pub fn refresh_catalog(&self) {
        let versions = Arc::clone(&self.services.versions);
        self.spawn_guarded(None, async move {
            AppEvent::CatalogFetched(versions.list_versions().await)
        });
    }

    pub fn apply(&mut self, coordinator: &mut ViewCoordinator, event: AppEvent) {
        match event {
            AppEvent::LoginFinished { ticket, result } => {
                if let Some(next) = coordinator.complete_login(ticket, result) {
                    self.dispatch(next);
                }
            }
            AppEvent::AvatarLoaded { ticket, result } => {
                coordinator.apply_avatar(ticket, result);
            }
            AppEvent::LaunchFinished { ticket, result } => {
                coordinator.complete_launch(ticket, result);
            }
            AppEvent::CatalogFetched(Ok(versions)) => {
                self.deferred_catalog = Some(versions);
            }
            AppEvent::CatalogFetched(Err(e)) => {
                log::warn!("Failed to refresh version catalog: {}", e);
            }
            AppEvent::TaskFailed { ticket, reason } => {
                coordinator.abort_deferred(ticket, &reason);
            }
        }

        self.apply_deferred_catalog(coordinator);
    }

    fn apply_deferred_catalog(&mut self, coordinator: &mut ViewCoordinator) {
        let Some(versions) = self.deferred_catalog.take() else {
            return;
        };
        match coordinator.replace_catalog(versions.clone()) {
            Ok(true) => {}
            Ok(false) => self.deferred_catalog = Some(versions),
            Err(e) => log::warn!("Ignoring fetched catalog: {}", e),
        }
    }

    /// Applies every event that has arrived so far without blocking.
    pub fn drain(&mut self, coordinator: &mut ViewCoordinator) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.apply(coordinator, event);
            applied += 1;
        }
        self.apply_deferred_catalog(coordinator);
        applied
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MockAuthService;
    use crate::coordinator::{Avatar, LauncherView};
    use crate::launch::MockLaunchService;
    use crate::login::LoginMethod;
    use crate::version::{MockVersionService, VersionCatalog};
    use async_trait::async_trait;

    struct SlowAuth;

    #[async_trait]
    impl AuthService for SlowAuth {
        async fn authenticate(
            &self,
            _method: LoginMethod,
            identifier: &str,
            _secret: &str,
        ) -> std::result::Result<AccountProfile, AuthError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(AccountProfile::offline(identifier))
        }
    }

    struct PanickingAuth;

    #[async_trait]
    impl AuthService for PanickingAuth {
        async fn authenticate(
            &self,
            _method: LoginMethod,
            _identifier: &str,
            _secret: &str,
        ) -> std::result::Result<AccountProfile, AuthError> {
            panic!("backend exploded");
        }
    }

    fn versions_without_avatar() -> MockVersionService {
        let mut versions = MockVersionService::new();
        versions
            .expect_resolve_avatar()
            .returning(|_| Err(crate::Error::NotFound));
        versions
    }

    fn runtime(auth: Arc<dyn AuthService>, versions: MockVersionService) -> Runtime {
        Runtime::new(Services {
            auth,
            versions: Arc::new(versions),
            launcher: None,
            auth_timeout: Duration::from_secs(5),
        })
    }

    async fn pump(runtime: &mut Runtime, coordinator: &mut ViewCoordinator) {
        let event = runtime.next_event().await.expect("channel open");
        runtime.apply(coordinator, event);
    }

    #[tokio::test(start_paused = true)]
    async fn login_then_avatar() {
        let mut auth = MockAuthService::new();
        auth.expect_authenticate()
            .withf(|method, identifier, secret| {
                *method == LoginMethod::Official && identifier == "user" && secret == "pass"
            })
            .times(1)
            .returning(|_, identifier, _| Ok(AccountProfile::offline(identifier)));

        let mut versions = MockVersionService::new();
        versions
            .expect_resolve_avatar()
            .times(1)
            .returning(|_| Ok(vec![0x89, b'P', b'N', b'G']));

        let mut runtime = runtime(Arc::new(auth), versions);
        let mut coordinator = ViewCoordinator::default();

        runtime.dispatch(coordinator.submit("user", "pass").unwrap());
        pump(&mut runtime, &mut coordinator).await;
        assert_eq!(coordinator.view(), LauncherView::Dashboard);

        pump(&mut runtime, &mut coordinator).await;
        assert_eq!(coordinator.avatar(), &Avatar::Loaded(vec![0x89, b'P', b'N', b'G']));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_auth_succeeds_after_delay() {
        let mut runtime = runtime(
            Arc::new(SimulatedAuthService::default()),
            versions_without_avatar(),
        );
        let mut coordinator = ViewCoordinator::default();
        coordinator.set_method(LoginMethod::Offline);

        runtime.dispatch(coordinator.submit("Alex", "").unwrap());
        assert_eq!(runtime.drain(&mut coordinator), 0);
        assert_eq!(coordinator.view(), LauncherView::Login);

        pump(&mut runtime, &mut coordinator).await;
        assert_eq!(coordinator.view(), LauncherView::Dashboard);
        assert_eq!(coordinator.selected_version(), "1.20.4");
    }

    #[tokio::test(start_paused = true)]
    async fn auth_timeout_stays_on_login() {
        let mut runtime = runtime(Arc::new(SlowAuth), MockVersionService::new());
        let mut coordinator = ViewCoordinator::default();

        runtime.dispatch(coordinator.submit("user", "pass").unwrap());
        pump(&mut runtime, &mut coordinator).await;

        assert_eq!(coordinator.view(), LauncherView::Login);
        assert_eq!(coordinator.status().text(), "Login failed: Login timed out");
        assert!(!coordinator.is_logging_in());
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_auth_becomes_generic_status() {
        let mut runtime = runtime(Arc::new(PanickingAuth), MockVersionService::new());
        let mut coordinator = ViewCoordinator::default();

        runtime.dispatch(coordinator.submit("user", "pass").unwrap());
        pump(&mut runtime, &mut coordinator).await;

        assert_eq!(coordinator.view(), LauncherView::Login);
        assert_eq!(
            coordinator.status().text(),
            "Something went wrong, please try again"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn auth_result_after_switch_account_is_dropped() {
        let mut runtime = runtime(
            Arc::new(SimulatedAuthService::default()),
            MockVersionService::new(),
        );
        let mut coordinator = ViewCoordinator::default();

        runtime.dispatch(coordinator.submit("user", "pass").unwrap());
        coordinator.switch_account().unwrap();
        pump(&mut runtime, &mut coordinator).await;

        assert_eq!(coordinator.view(), LauncherView::Login);
        assert!(coordinator.session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn launch_goes_through_service() {
        let mut launcher = MockLaunchService::new();
        launcher
            .expect_launch()
            .withf(|version, session| version == "1.18.1" && session.identifier == "Alex")
            .times(1)
            .returning(|version, _| Ok(ProcessHandle::new(version, Some(99))));

        let mut runtime = Runtime::new(Services {
            auth: Arc::new(SimulatedAuthService::new(Duration::ZERO)),
            versions: Arc::new(versions_without_avatar()),
            launcher: Some(Arc::new(launcher)),
            auth_timeout: Duration::from_secs(5),
        });
        let mut coordinator = ViewCoordinator::default();
        coordinator.set_method(LoginMethod::Offline);

        runtime.dispatch(coordinator.submit("Alex", "").unwrap());
        pump(&mut runtime, &mut coordinator).await;
        pump(&mut runtime, &mut coordinator).await;

        coordinator.open_version_select().unwrap();
        coordinator.select_version("1.18.1").unwrap();
        coordinator.confirm("1.18.1").unwrap();

        runtime.dispatch(coordinator.request_launch().unwrap());
        pump(&mut runtime, &mut coordinator).await;
        assert_eq!(coordinator.status().text(), "Minecraft 1.18.1 started (pid 99)");
        assert_eq!(coordinator.view(), LauncherView::Dashboard);
    }

    #[tokio::test(start_paused = true)]
    async fn fetched_catalog_waits_for_overlay_to_close() {
        let mut versions = versions_without_avatar();
        versions
            .expect_list_versions()
            .returning(|| Ok(vec!["1.21".to_string(), "1.20.6".to_string()]));

        let mut runtime = runtime(Arc::new(SimulatedAuthService::new(Duration::ZERO)), versions);
        let mut coordinator = ViewCoordinator::default();
        coordinator.set_method(LoginMethod::Offline);
        runtime.dispatch(coordinator.submit("Alex", "").unwrap());
        pump(&mut runtime, &mut coordinator).await;
        pump(&mut runtime, &mut coordinator).await;

        coordinator.open_version_select().unwrap();
        runtime.refresh_catalog();
        pump(&mut runtime, &mut coordinator).await;
        assert_eq!(coordinator.catalog(), &VersionCatalog::default());

        coordinator.cancel_version_select().unwrap();
        runtime.drain(&mut coordinator);
        assert!(coordinator.catalog().contains("1.21"));
        assert!(coordinator.catalog().contains("1.20.4"));
    }
}
