use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing::{error, info, warn};

use edutrackd::config::{self, Cli};
use edutrackd::fixtures;
use edutrackd::ipc;
use edutrackd::repo::Repository;
use edutrackd::session::Session;

fn main() {
    let cli = Cli::parse();
    config::init_tracing(cli.log_format);

    let repo = if cli.no_fixtures {
        Repository::default()
    } else {
        fixtures::demo_repository()
    };
    let mut state = ipc::AppState::new(Session::in_memory(), repo);
    if let Some(path) = cli.workspace.clone() {
        if let Err(e) = ipc::select_workspace(&mut state, path) {
            error!(error = %e, "failed to open workspace");
            std::process::exit(1);
        }
    }
    info!(version = env!("CARGO_PKG_VERSION"), "edutrackd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to answer with.
                warn!(error = %e, "malformed request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() },
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("edutrackd shutting down");
}
