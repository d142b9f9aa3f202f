mod assistant;
mod calc;
mod config;
mod ipc;
mod model;
mod roster;
mod seed;
mod store;
mod view;

use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // stdout carries the protocol, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sisd=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn build_state(cfg: config::Config) -> anyhow::Result<ipc::AppState> {
    let students = match cfg.roster_path.as_ref() {
        Some(path) => seed::load_roster_file(path)?,
        None => seed::demo_roster(),
    };
    let service = assistant::GeminiService::new(cfg.ai)?;
    Ok(ipc::AppState {
        store: store::Store::new(students),
        view: view::View::default(),
        assistant: assistant::Assistant::new(Box::new(service)),
    })
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cfg = config::Config::from_env()?;
    let mut state = build_state(cfg)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        students = state.store.len(),
        ai_configured = state.assistant.is_configured(),
        "sisd ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                warn!(error = %e, "bad request line");
                ipc::bad_json(e.to_string())
            }
        };
        writeln!(stdout, "{}", resp)?;
        stdout.flush()?;
    }
    Ok(())
}
