/// Market Dashboard
///
/// Live view of the simulated market: per-segment colored price chart,
/// top-of-book depth ladder, and a rolling trade feed, with start/stop/reset
/// controls for the simulation.
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

use stocksim_tuis::shared::market::{
    render_market_stats, render_order_book, render_price_chart, render_trade_feed,
};
use stocksim_tuis::{ControlClient, DashboardSession, FeedClient, FeedConfig};

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
        std::env::var("SIM_LOG_FILE").unwrap_or_else(|_| "market-dashboard.log".to_string());
    if let Ok(file) = std::fs::File::options().create(true).append(true).open(path) {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::sync::Arc::new(file))
            .with_ansi(false)
            .init();
    }
}

/// Simulation run state, tracked from successful control actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
}

impl RunState {
    fn is_running(self) -> bool {
        matches!(self, RunState::Running)
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
    let config = FeedConfig::new(get_ws_url())
        .with_ping_interval(Duration::from_secs(30))
        .with_reconnect_delay(Duration::from_secs(2))
        .with_channel_buffer_size(1000);
    let events = FeedClient::with_config(config).start();
    let session = DashboardSession::start(events);

    let mut run_state = RunState::Idle;

    // UI loop
    let mut revision = session.revision();
    let mut last_draw = Instant::now();
    let draw_interval = Duration::from_millis(250);
    let min_draw_interval = Duration::from_millis(50);

    let result = loop {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
                    KeyCode::Char('s') => match control.start().await {
                        Ok(()) => run_state = RunState::Running,
                        Err(e) => error!("{}", e),
                    },
                    KeyCode::Char('x') => match control.stop().await {
                        Ok(()) => run_state = RunState::Idle,
                        Err(e) => error!("{}", e),
                    },
                    KeyCode::Char('r') => match control.reset().await {
                        Ok(()) => {
                            run_state = RunState::Idle;
                            let mut market = session.stores().market.lock().await;
                            market.clear_history();
                        }
                        Err(e) => error!("{}", e),
                    },
                    _ => {}
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
            let market = session.stores().market.lock().await;

            terminal.draw(|f| {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(6),
                        Constraint::Min(10),
                        Constraint::Length(9),
                    ])
                    .split(f.area());

                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                    .split(rows[1]);

                render_market_stats(f, rows[0], &market, status, run_state.is_running());
                render_price_chart(f, columns[0], &market);
                render_order_book(f, columns[1], &market);
                render_trade_feed(f, rows[2], market.trade_feed());
            })?;
            last_draw = Instant::now();
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
