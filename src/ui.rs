use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, LoginField, MenuItem};
use crate::coordinator::{Avatar, LauncherView};
use crate::news::{render_lines, NEWS};
use crate::status::StatusKind;

const TITLE: &str = "EZMC Launcher";
const ACCENT: Color = Color::Rgb(0x34, 0x98, 0xdb);

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(0),    // active view
            Constraint::Length(3), // status bar
        ])
        .split(f.size());

    match app.coordinator.view() {
        LauncherView::Login => draw_login(f, app, chunks[0]),
        LauncherView::Dashboard | LauncherView::VersionSelect => draw_dashboard(f, app, chunks[0]),
    }

    draw_status(f, app, chunks[1]);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_login(f: &mut Frame, app: &App, area: Rect) {
    let form = app.coordinator.login_form();
    let fields = form.fields();
    let area = centered_rect(50, area);

    let mut constraints = vec![
        Constraint::Length(2), // title
        Constraint::Length(3), // method
        Constraint::Length(3), // identifier
    ];
    if fields.secret {
        constraints.push(Constraint::Length(3));
    }
    if fields.remember {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(3)); // login button
    constraints.push(Constraint::Length(1)); // version label
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    let mut slot = chunks.iter().copied();
    let mut next = || slot.next().unwrap_or_default();

    let title = Paragraph::new(TITLE)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, next());

    let method = Paragraph::new(format!("< {} >", form.method().label()))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Login method")
                .border_style(focus_style(app.login_focus == LoginField::Method)),
        );
    f.render_widget(method, next());

    let identifier = if form.identifier.is_empty() {
        Paragraph::new(form.identifier_placeholder()).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(form.identifier.as_str())
    };
    f.render_widget(
        identifier.block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(app.login_focus == LoginField::Identifier)),
        ),
        next(),
    );

    if fields.secret {
        let masked = "*".repeat(form.secret.chars().count());
        let secret = if masked.is_empty() {
            Paragraph::new("Password").style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(masked)
        };
        f.render_widget(
            secret.block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(focus_style(app.login_focus == LoginField::Secret)),
            ),
            next(),
        );
    }

    if fields.remember {
        let mark = if form.remember { "x" } else { " " };
        let remember = Paragraph::new(format!("[{}] Remember password", mark))
            .style(focus_style(app.login_focus == LoginField::Remember));
        f.render_widget(remember, next());
    }

    let label = if app.coordinator.is_logging_in() {
        "Logging in..."
    } else {
        "Log in"
    };
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).bg(ACCENT))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(app.login_focus == LoginField::Submit)),
        );
    f.render_widget(button, next());

    let version = Paragraph::new(concat!("Version ", env!("CARGO_PKG_VERSION")))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(version, next());
}

fn draw_dashboard(f: &mut Frame, app: &mut App, area: Rect) {
    let left = app.left_panel_percent;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left),
            Constraint::Percentage(100 - left),
        ])
        .split(area);

    draw_account_panel(f, app, chunks[0]);

    if app.coordinator.view() == LauncherView::VersionSelect {
        draw_version_select(f, app, chunks[1]);
    } else {
        draw_news(f, chunks[1]);
    }
}

fn draw_account_panel(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // avatar
            Constraint::Length(2), // login info
            Constraint::Length(3), // version display
            Constraint::Min(0),    // menu
        ])
        .split(inner);

    let avatar = match app.coordinator.avatar() {
        Avatar::Default => Paragraph::new(vec![Line::from("     "); 3])
            .style(Style::default().bg(Color::Green)),
        Avatar::Loaded(bytes) => Paragraph::new(format!("avatar\n{} bytes", bytes.len()))
            .style(Style::default().fg(Color::Black).bg(Color::Gray)),
    };
    f.render_widget(
        avatar
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        centered_rect(60, chunks[0]),
    );

    let info = match app.coordinator.session() {
        Some(session) => vec![
            Line::from(format!("Login method: {}", session.login_method.label())),
            Line::from(format!("Game ID: {}", session.display_name())),
        ],
        None => vec![Line::from("Not logged in")],
    };
    f.render_widget(Paragraph::new(info).alignment(Alignment::Center), chunks[1]);

    let version = Paragraph::new(app.coordinator.selected_version())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Version"));
    f.render_widget(version, chunks[2]);

    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .map(|item| ListItem::new(item.label()))
        .collect();
    let menu = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(menu, chunks[3], &mut app.menu_state);
}

fn draw_news(f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = render_lines(NEWS).into_iter().map(Line::from).collect();
    let news = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Game news")
                .border_style(Style::default().fg(ACCENT)),
        );
    f.render_widget(news, area);
}

fn draw_version_select(f: &mut Frame, app: &mut App, area: Rect) {
    let current = app.coordinator.selected_version().to_string();
    let items: Vec<ListItem> = app
        .coordinator
        .catalog()
        .versions()
        .iter()
        .map(|v| {
            let marker = if *v == current { " (current)" } else { "" };
            ListItem::new(format!("{}{}", v, marker))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select game version")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.version_state);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let hints = match app.coordinator.view() {
        LauncherView::Login => "Tab: Next field | ←/→: Method | Space: Remember | Enter: Log in | Esc: Quit",
        LauncherView::Dashboard => "↑↓: Navigate | Enter: Select | L: Launch | V: Versions | A: Switch account | Q: Quit",
        LauncherView::VersionSelect => "↑↓: Navigate | Enter: Confirm | Esc: Back",
    };

    let status = match app.coordinator.status().current() {
        Some(message) => {
            let color = match message.kind {
                StatusKind::Info => Color::Cyan,
                StatusKind::Error => Color::Red,
            };
            Span::styled(message.text.clone(), Style::default().fg(color))
        }
        None => Span::raw(""),
    };

    let bar = Paragraph::new(vec![
        Line::from(status),
        Line::from(Span::styled(hints, Style::default().fg(Color::Gray))),
    ])
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(bar, area);
}

fn centered_rect(percent_x: u16, r: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(r)[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::ViewCoordinator;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &mut App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn login_screen_hides_password_for_offline() {
        let mut app = App::new(ViewCoordinator::default(), 20);
        let screen = rendered(&mut app);
        assert!(screen.contains("EZMC Launcher"));
        assert!(screen.contains("Remember password"));

        app.coordinator.set_method(crate::login::LoginMethod::Offline);
        let screen = rendered(&mut app);
        assert!(screen.contains("Game ID"));
        assert!(!screen.contains("Remember password"));
    }
}
