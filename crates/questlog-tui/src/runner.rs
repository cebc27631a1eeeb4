// TUI event loop and terminal management
use crate::{App, InputMode, View};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use questlog_api::ReportClient;
use questlog_core::{CatalogSource, QuestRepository};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run_tui(
    mut app: App,
    source: Box<dyn CatalogSource>,
    timeout: Duration,
    reporter: Option<ReportClient>,
) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, source.as_ref(), timeout, reporter.as_ref()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn load_catalog<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    source: &dyn CatalogSource,
    timeout: Duration,
) -> anyhow::Result<()> {
    app.begin_loading();
    terminal.draw(|f| crate::ui::render(f, app))?;
    app.catalog_loaded(QuestRepository::load_with_timeout(source, timeout).await);
    Ok(())
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    source: &dyn CatalogSource,
    timeout: Duration,
    reporter: Option<&ReportClient>,
) -> anyhow::Result<()> {
    load_catalog(terminal, app, source, timeout).await?;
    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<Result<(), String>>();

    loop {
        app.refresh_view();
        terminal.draw(|f| crate::ui::render(f, app))?;

        while let Ok(sent) = report_rx.try_recv() {
            app.report_finished(sent);
        }

        // Poll so a finished report shows up without waiting for a key
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Nothing to browse until a catalog is in
        if app.repository().is_none() {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('r') if app.load_error().is_some() => {
                    info!("Retrying catalog load");
                    load_catalog(terminal, app, source, timeout).await?;
                }
                _ => {}
            }
            continue;
        }

        match app.input_mode {
            InputMode::Searching => match key.code {
                KeyCode::Enter | KeyCode::Esc => app.enter_normal_mode(),
                KeyCode::Char(c) => app.push_search_char(c),
                KeyCode::Backspace => app.pop_search_char(),
                _ => {}
            },
            InputMode::ConfirmReset => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_reset(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_reset(),
                _ => {}
            },
            InputMode::Reporting => match key.code {
                KeyCode::Esc => app.cancel_report(),
                KeyCode::Char(c) => app.report_input.push(c),
                KeyCode::Backspace => {
                    app.report_input.pop();
                }
                KeyCode::Enter => {
                    if let (Some(text), Some(client)) = (app.submit_report(), reporter) {
                        app.report_started();
                        let client = client.clone();
                        let tx = report_tx.clone();
                        tokio::spawn(async move {
                            let sent = client.send(&text).await.map_err(|e| {
                                warn!("Bug report failed: {}", e);
                                e.to_string()
                            });
                            let _ = tx.send(sent);
                        });
                    }
                }
                _ => {}
            },
            InputMode::Normal => {
                app.clear_messages();
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('/') => app.enter_search_mode(),
                    KeyCode::Char('j') | KeyCode::Down => app.next(),
                    KeyCode::Char('k') | KeyCode::Up => app.previous(),
                    KeyCode::Char(' ') | KeyCode::Char('x') => match app.view {
                        View::Quests => app.toggle_selected_quest(),
                        View::Stash => app.toggle_selected_item(),
                    },
                    KeyCode::Char('t') => app.cycle_trader(true),
                    KeyCode::Char('T') => app.cycle_trader(false),
                    KeyCode::Char('m') => app.cycle_mode(),
                    KeyCode::Char('s') => app.cycle_sort(),
                    KeyCode::Tab => app.toggle_view(),
                    KeyCode::Char('R') => app.request_reset(),
                    KeyCode::Char('!') => app.enter_report_mode(),
                    KeyCode::Enter => {
                        if let Some(url) = app.selected_wiki_link() {
                            if let Err(e) = open::that(&url) {
                                app.error_message = Some(format!("Failed to open browser: {}", e));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
