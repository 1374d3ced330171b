use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::ListState;

use crate::coordinator::{Command, LauncherView, ViewCoordinator};
use crate::login::{required_fields, LoginMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Method,
    Identifier,
    Secret,
    Remember,
    Submit,
}

impl LoginField {
    const ORDER: [LoginField; 5] = [
        LoginField::Method,
        LoginField::Identifier,
        LoginField::Secret,
        LoginField::Remember,
        LoginField::Submit,
    ];

    fn visible(self, method: LoginMethod) -> bool {
        let fields = required_fields(method);
        match self {
            LoginField::Secret => fields.secret,
            LoginField::Remember => fields.remember,
            _ => true,
        }
    }

    fn step(self, method: LoginMethod, forward: bool) -> Self {
        let len = Self::ORDER.len();
        let mut index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        loop {
            index = if forward {
                (index + 1) % len
            } else {
                (index + len - 1) % len
            };
            let field = Self::ORDER[index];
            if field.visible(method) {
                return field;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Launch,
    SelectVersion,
    SwitchAccount,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Launch,
        MenuItem::SelectVersion,
        MenuItem::SwitchAccount,
        MenuItem::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Launch => "Launch game",
            MenuItem::SelectVersion => "Select version",
            MenuItem::SwitchAccount => "Switch account",
            MenuItem::Quit => "Quit",
        }
    }
}

pub struct App {
    pub coordinator: ViewCoordinator,
    pub login_focus: LoginField,
    pub menu_state: ListState,
    pub version_state: ListState,
    pub left_panel_percent: u16,
    pub should_quit: bool,
}

impl App {
    pub fn new(coordinator: ViewCoordinator, left_panel_percent: u16) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        Self {
            coordinator,
            login_focus: LoginField::Identifier,
            menu_state,
            version_state: ListState::default(),
            left_panel_percent,
            should_quit: false,
        }
    }

    /// Feeds one key press to the active view. Returns work for the runtime.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        match self.coordinator.view() {
            LauncherView::Login => self.handle_login_key(key),
            LauncherView::Dashboard => self.handle_dashboard_key(key),
            LauncherView::VersionSelect => {
                self.handle_version_key(key);
                None
            }
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Option<Command> {
        let method = self.coordinator.login_form().method();

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => self.login_focus = self.login_focus.step(method, true),
            KeyCode::BackTab | KeyCode::Up => {
                self.login_focus = self.login_focus.step(method, false)
            }
            KeyCode::Left if self.login_focus == LoginField::Method => {
                self.coordinator.set_method(method.previous())
            }
            KeyCode::Right if self.login_focus == LoginField::Method => {
                self.coordinator.set_method(method.next())
            }
            KeyCode::Char(' ') if self.login_focus == LoginField::Remember => {
                let form = self.coordinator.login_form_mut();
                form.remember = !form.remember;
            }
            KeyCode::Enter => {
                if self.coordinator.is_logging_in() {
                    return None;
                }
                return self.coordinator.submit_form().ok();
            }
            KeyCode::Backspace => match self.login_focus {
                LoginField::Identifier => {
                    self.coordinator.login_form_mut().identifier.pop();
                }
                LoginField::Secret => {
                    self.coordinator.login_form_mut().secret.pop();
                }
                _ => {}
            },
            KeyCode::Char(c) => match self.login_focus {
                LoginField::Identifier => self.coordinator.login_form_mut().identifier.push(c),
                LoginField::Secret => self.coordinator.login_form_mut().secret.push(c),
                _ => {}
            },
            _ => {}
        }

        let method = self.coordinator.login_form().method();
        if !self.login_focus.visible(method) {
            self.login_focus = LoginField::Identifier;
        }
        None
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Option<Command> {
        let item = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_menu(false);
                return None;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_menu(true);
                return None;
            }
            KeyCode::Enter => self
                .menu_state
                .selected()
                .and_then(|i| MenuItem::ALL.get(i).copied())?,
            KeyCode::Char('l') => MenuItem::Launch,
            KeyCode::Char('v') => MenuItem::SelectVersion,
            KeyCode::Char('a') => MenuItem::SwitchAccount,
            KeyCode::Char('q') | KeyCode::Esc => MenuItem::Quit,
            _ => return None,
        };

        self.activate(item)
    }

    fn move_menu(&mut self, forward: bool) {
        let selected = self.menu_state.selected().unwrap_or(0);
        let next = if forward {
            (selected + 1).min(MenuItem::ALL.len() - 1)
        } else {
            selected.saturating_sub(1)
        };
        self.menu_state.select(Some(next));
    }

    fn activate(&mut self, item: MenuItem) -> Option<Command> {
        match item {
            MenuItem::Launch => return self.coordinator.request_launch().ok(),
            MenuItem::SelectVersion => {
                if self.coordinator.open_version_select().is_ok() {
                    let current = self.coordinator.selected_version().to_string();
                    self.version_state
                        .select(self.coordinator.catalog().position(&current).or(Some(0)));
                }
            }
            MenuItem::SwitchAccount => {
                if self.coordinator.switch_account().is_ok() {
                    self.login_focus = LoginField::Identifier;
                    self.menu_state.select(Some(0));
                }
            }
            MenuItem::Quit => self.should_quit = true,
        }
        None
    }

    fn handle_version_key(&mut self, key: KeyEvent) {
        let len = self.coordinator.catalog().len();
        let selected = self.version_state.selected().unwrap_or(0);

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.version_state.select(Some(selected.saturating_sub(1)))
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.version_state
                    .select(Some((selected + 1).min(len.saturating_sub(1))))
            }
            KeyCode::Enter => {
                let id = self.coordinator.catalog().get(selected).map(str::to_string);
                if let Some(id) = id {
                    if self.coordinator.select_version(&id).is_ok() {
                        if let Err(e) = self.coordinator.confirm_picked() {
                            log::debug!("Version confirm rejected: {}", e);
                        }
                    }
                }
            }
            KeyCode::Esc => {
                if let Err(e) = self.coordinator.cancel_version_select() {
                    log::debug!("Version cancel rejected: {}", e);
                }
            }
            _ => {}
        }
    }
}
