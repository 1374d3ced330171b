use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, Terminal};

use ezmc_launcher::app::App;
use ezmc_launcher::coordinator::{StatusTimings, ViewCoordinator};
use ezmc_launcher::runtime::{Runtime, Services};
use ezmc_launcher::settings::{default_settings_path, Settings, SettingsManager};
use ezmc_launcher::{logs, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = SettingsManager::new(default_settings_path())
        .context("failed to load settings")?
        .get()
        .clone();
    logs::init(&settings.logging).context("failed to initialise logging")?;

    let coordinator = ViewCoordinator::new(settings.catalog()?, &settings.versions.default_version)?
        .with_timings(StatusTimings {
            success: std::time::Duration::from_secs(settings.ui.success_status_secs),
            failure: std::time::Duration::from_secs(settings.ui.error_status_secs),
        });
    let mut app = App::new(coordinator, settings.ui.left_panel_percent);
    app.coordinator
        .set_method(settings.general.default_login_method);

    let mut runtime = Runtime::new(Services::from_settings(&settings)?);
    if settings.versions.fetch_manifest {
        runtime.refresh_catalog();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &mut runtime, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("Launcher exited with error: {:?}", err);
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runtime: &mut Runtime,
    settings: &Settings,
) -> Result<()> {
    let tick_rate = settings.tick_rate();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(command) = app.handle_key(key) {
                    runtime.dispatch(command);
                }
            }
        }

        runtime.drain(&mut app.coordinator);
        app.coordinator.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
