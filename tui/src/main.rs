//! `vitrine`: search products from the terminal and add them to a wishlist.
//!
//! Logs go to a file (`--log-file`, filtered by `RUST_LOG`) since the terminal is taken by the UI.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use vitrine::{
    ConfirmationLoader, HttpProductSource, ProductSource, QueryTicket, RawProduct, SearchError,
    SearchSession, ViewportConfig, VitrineConfig,
};

mod app;
mod ui;


use app::{Action, App};

const TICK: Duration = Duration::from_millis(16);

type FetchDone = (QueryTicket, Result<Vec<RawProduct>, SearchError>);

#[derive(Debug, Parser)]
#[command(name = "vitrine", version, about = "Search products and build a wishlist")]
struct Cli {
    /// Search endpoint; queries are sent as `?q=<text>`.
    #[arg(long)]
    endpoint: Option<String>,

    /// Height of one row, in list units.
    #[arg(long)]
    row_height: Option<u32>,

    /// Rows materialized beyond each edge of the viewport.
    #[arg(long)]
    overscan: Option<usize>,

    /// Request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long, default_value = "vitrine.log")]
    log_file: PathBuf,
}

impl Cli {
    fn config(&self) -> VitrineConfig {
        let defaults = VitrineConfig::default();
        let viewport = ViewportConfig {
            row_height: self.row_height.unwrap_or(defaults.viewport.row_height),
            overscan: self.overscan.unwrap_or(defaults.viewport.overscan),
            ..defaults.viewport
        };
        let timeout = self
            .timeout_ms
            .map(Duration::from_millis)
            .or(defaults.request_timeout());
        VitrineConfig {
            endpoint: self.endpoint.clone().unwrap_or(defaults.endpoint.clone()),
            ..defaults
        }
        .with_viewport(viewport)
        .with_request_timeout(timeout)
    }
}

fn init_logging(path: &Path) -> Result<WorkerGuard, Box<dyn Error>> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path.file_name().ok_or("log file path has no file name")?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;
    Ok(guard)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_file)?;

    let config = cli.config();
    config.validate()?;
    tracing::info!(endpoint = %config.endpoint, "starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

async fn run(config: VitrineConfig) -> Result<(), Box<dyn Error>> {
    let source = HttpProductSource::from_url(config.endpoint_url()?)
        .with_timeout(config.request_timeout());
    let session = SearchSession::new(Arc::new(source), Arc::new(config.currency));
    let mut app = App::new(session, &config, ConfirmationLoader::new());

    let mut terminal = ratatui::try_init()?;
    let result = event_loop(&mut terminal, &mut app).await;
    ratatui::try_restore()?;
    result
}

async fn event_loop(terminal: &mut DefaultTerminal, app: &mut App) -> Result<(), Box<dyn Error>> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<FetchDone>();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                match app.handle_key(key) {
                    Action::Quit => return Ok(()),
                    Action::Fetch(ticket) => {
                        spawn_fetch(app.session.source(), ticket, done_tx.clone());
                    }
                    Action::LoadConfirmation => {
                        let loader = app.confirmation.clone();
                        tokio::spawn(async move {
                            loader.load().await;
                        });
                    }
                    Action::None => {}
                }
            }
            continue;
        }

        // Give spawned fetches a chance to run between input polls.
        tokio::select! {
            Some((ticket, outcome)) = done_rx.recv() => app.apply_completion(&ticket, outcome),
            _ = tokio::time::sleep(TICK) => {}
        }
    }
}

fn spawn_fetch(
    source: Arc<dyn ProductSource>,
    ticket: QueryTicket,
    done: mpsc::UnboundedSender<FetchDone>,
) {
    tokio::spawn(async move {
        let outcome = source.search(ticket.query()).await;
        if done.send((ticket, outcome)).is_err() {
            tracing::debug!("fetch finished after the UI closed");
        }
    });
}
