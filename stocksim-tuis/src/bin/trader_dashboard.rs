/// Trader Dashboard
///
/// Per-trader analytics over the simulation feed: searchable, sortable
/// trader list, detail panel for the selected trader, and a 2s-sampled
/// history chart switchable between portfolio, stock, and cash series.
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use rustls::crypto::ring::default_provider;
use tracing::error;

use stocksim_tuis::shared::traders::{
    render_trader_chart, render_trader_detail, render_trader_header, render_trader_list,
};
use stocksim_tuis::{
    ChartMode, ControlClient, DashboardSession, FeedClient, FeedConfig, SortKey, TraderDetail,
    TraderId,
};

/// Get push channel URL from SIM_WS_URL env var (default: ws://127.0.0.1:5000/ws)
fn get_ws_url() -> String {
    std::env::var("SIM_WS_URL").unwrap_or_else(|_| "ws://127.0.0.1:5000/ws".to_string())
}

/// Get control API URL from SIM_API_URL env var (default: http://127.0.0.1:5000)
fn get_api_url() -> String {
    std::env::var("SIM_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
}

/// Route diagnostics to a file when RUST_LOG is set
///
/// Logging to stderr would bleed through the alternate screen, so without a
/// filter no subscriber is installed at all.
fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        return;
    }
    let path =
        std::env::var("SIM_LOG_FILE").unwrap_or_else(|_| "trader-dashboard.log".to_string());
    if let Ok(file) = std::fs::File::options().create(true).append(true).open(path) {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::sync::Arc::new(file))
            .with_ansi(false)
            .init();
    }
}

/// List controls and input focus owned by this binary
struct App {
    search: String,
    searching: bool,
    sort_key: SortKey,
    chart_mode: ChartMode,
}

impl App {
    fn new() -> Self {
        Self {
            search: String::new(),
            searching: false,
            sort_key: SortKey::default(),
            chart_mode: ChartMode::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = default_provider().install_default();

    init_logging();

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Fallible setup stays ahead of raw mode so an early error exits on the
    // normal screen
    let control = ControlClient::new(get_api_url())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Feed client and session
    let config = FeedConfig::new(get_ws_url());
    let events = FeedClient::with_config(config).start();
    let session = DashboardSession::start(events);

    // Initial load so the list is populated before the first push lands
    match control.fetch_traders().await {
        Ok(traders) => session.apply_traders(traders).await,
        Err(e) => error!("{}", e),
    }

    let mut app = App::new();

    // UI loop
    let mut revision = session.revision();
    let mut last_draw = Instant::now();
    let draw_interval = Duration::from_millis(250);
    let min_draw_interval = Duration::from_millis(50);

    let result = loop {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                if app.searching {
                    match key.code {
                        KeyCode::Esc | KeyCode::Enter => app.searching = false,
                        KeyCode::Backspace => {
                            app.search.pop();
                        }
                        KeyCode::Char(c) => app.search.push(c),
                        _ => {}
                    }
                } else {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
                        KeyCode::Char('/') => app.searching = true,
                        KeyCode::Tab => app.sort_key = app.sort_key.next(),
                        KeyCode::Char('m') => app.chart_mode = app.chart_mode.next(),
                        KeyCode::Up => move_selection(&session, &app, -1).await,
                        KeyCode::Down => move_selection(&session, &app, 1).await,
                        _ => {}
                    }
                }
            }
        }

        // Redraw after applied feed events (floored at 50ms) and at least every 250ms
        let dirty = revision.has_changed().unwrap_or(false);
        if last_draw.elapsed() >= draw_interval
            || (dirty && last_draw.elapsed() >= min_draw_interval)
        {
            let _ = revision.borrow_and_update();
            let status = session.status();
            let registry = session.stores().traders.lock().await;
            let visible = registry.visible(&app.search, app.sort_key);
            let detail = registry.selected().map(TraderDetail::project);
            let selected_id = registry.selected_id().cloned();
            let history = session.stores().history.lock().await;

            terminal.draw(|f| {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(10)])
                    .split(f.area());

                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([
                        Constraint::Percentage(42),
                        Constraint::Percentage(28),
                        Constraint::Percentage(30),
                    ])
                    .split(rows[1]);

                render_trader_header(f, rows[0], status, registry.len());
                render_trader_list(
                    f,
                    columns[0],
                    &visible,
                    selected_id.as_ref(),
                    &app.search,
                    app.searching,
                    app.sort_key,
                );
                render_trader_detail(f, columns[1], detail.as_ref());
                render_trader_chart(f, columns[2], &history, selected_id.as_ref(), app.chart_mode);
            })?;
            last_draw = Instant::now();
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    // Cleanup
    session.shutdown_sampler().await;
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Move the selection up or down within the currently visible list
///
/// Wraps at both ends. A selection hidden by the current filter restarts
/// from the top of the visible list.
async fn move_selection(session: &DashboardSession, app: &App, delta: i64) {
    let mut registry = session.stores().traders.lock().await;
    let visible_ids: Vec<TraderId> = registry
        .visible(&app.search, app.sort_key)
        .iter()
        .map(|t| t.id.clone())
        .collect();
    if visible_ids.is_empty() {
        return;
    }

    let next = match registry.selected_id() {
        Some(current) => match visible_ids.iter().position(|id| id == current) {
            Some(i) => {
                let len = visible_ids.len() as i64;
                let next_index = (i as i64 + delta).rem_euclid(len) as usize;
                visible_ids[next_index].clone()
            }
            None => visible_ids[0].clone(),
        },
        None => visible_ids[0].clone(),
    };
    registry.select(Some(next));
}
