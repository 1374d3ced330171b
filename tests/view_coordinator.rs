use ezmc_launcher::auth::AccountProfile;
use ezmc_launcher::coordinator::{Command, Ticket};
use ezmc_launcher::error::ValidationError;
use ezmc_launcher::{Error, LauncherView, LoginMethod, ViewCoordinator};

fn auth_ticket(command: Command) -> Ticket {
    match command {
        Command::Authenticate(request) => request.ticket,
        other => panic!("expected an auth command, got {:?}", other),
    }
}

fn login(coordinator: &mut ViewCoordinator, identifier: &str, secret: &str) {
    let ticket = auth_ticket(coordinator.submit(identifier, secret).unwrap());
    coordinator.complete_login(ticket, Ok(AccountProfile::offline(identifier)));
}

#[test]
fn offline_login_lands_on_dashboard_with_default_version() {
    let mut coordinator = ViewCoordinator::default();
    coordinator.set_method(LoginMethod::Offline);
    login(&mut coordinator, "Alex", "");

    assert_eq!(coordinator.view(), LauncherView::Dashboard);
    assert_eq!(coordinator.selected_version(), "1.20.4");
    let session = coordinator.session().unwrap();
    assert_eq!(session.login_method, LoginMethod::Offline);
    assert_eq!(session.identifier, "Alex");
    assert!(!session.remember_credentials);
}

#[test]
fn pick_and_confirm_a_version() {
    let mut coordinator = ViewCoordinator::default();
    coordinator.set_method(LoginMethod::Offline);
    login(&mut coordinator, "Alex", "");
    assert_eq!(coordinator.selected_version(), "1.20.4");

    coordinator.open_version_select().unwrap();
    coordinator.select_version("1.18.1").unwrap();
    coordinator.confirm("1.18.1").unwrap();

    assert_eq!(coordinator.view(), LauncherView::Dashboard);
    assert_eq!(coordinator.selected_version(), "1.18.1");
    assert!(coordinator.pending().is_none());
}

#[test]
fn validation_rules_per_method() {
    for method in [LoginMethod::Official, LoginMethod::ThirdParty] {
        let mut coordinator = ViewCoordinator::default();
        coordinator.set_method(method);
        assert!(matches!(
            coordinator.submit("", "secret"),
            Err(Error::Validation(ValidationError::MissingCredentials))
        ));
        assert!(matches!(
            coordinator.submit("identifier", ""),
            Err(Error::Validation(ValidationError::MissingCredentials))
        ));

        login(&mut coordinator, "user", "pass");
        assert_eq!(coordinator.view(), LauncherView::Dashboard);
    }

    let mut coordinator = ViewCoordinator::default();
    coordinator.set_method(LoginMethod::Offline);
    assert!(matches!(
        coordinator.submit("", "anything"),
        Err(Error::Validation(ValidationError::MissingGameId))
    ));
    login(&mut coordinator, "Steve", "");
    assert_eq!(coordinator.view(), LauncherView::Dashboard);
}

#[test]
fn switch_account_from_any_dashboard_state() {
    let mut coordinator = ViewCoordinator::default();
    coordinator.login_form_mut().remember = true;
    login(&mut coordinator, "user", "pass");
    coordinator.open_version_select().unwrap();
    coordinator.select_version("1.19.2").unwrap();
    coordinator.confirm_picked().unwrap();

    coordinator.switch_account().unwrap();

    assert_eq!(coordinator.view(), LauncherView::Login);
    assert!(coordinator.session().is_none());
    assert_eq!(coordinator.login_form().identifier, "");
    assert_eq!(coordinator.login_form().secret, "");
}

#[test]
fn open_then_cancel_restores_everything() {
    let mut coordinator = ViewCoordinator::default();
    login(&mut coordinator, "user", "pass");
    coordinator.open_version_select().unwrap();
    coordinator.select_version("1.17.1").unwrap();
    coordinator.confirm("1.17.1").unwrap();

    let view = coordinator.view();
    let version = coordinator.selected_version().to_string();

    coordinator.open_version_select().unwrap();
    coordinator.confirm("").unwrap();

    assert_eq!(coordinator.view(), view);
    assert_eq!(coordinator.selected_version(), version);
}
