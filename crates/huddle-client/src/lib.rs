pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod modals;
pub mod notice;
pub mod render;
pub mod routes;
pub mod shell;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use huddle_net::{HttpUserDirectory, WebSocketConnector};

use crate::commands::{Command, Flow};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::modals::LoggingHandoff;
use crate::notice::Notice;
use crate::shell::{Shell, ShellDeps};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("huddle_client=debug,huddle_net=debug,huddle_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Wire the shell to the real backends named by `config`.
pub fn build_shell(config: ClientConfig) -> Result<Shell, ClientError> {
    let deps = ShellDeps {
        connector: Arc::new(WebSocketConnector::new()),
        directory: Arc::new(HttpUserDirectory::new(&config.backend_url)?),
        uploads: Arc::new(LoggingHandoff),
    };
    Shell::from_config(config, deps)
}

/// Run the terminal front-end until `/quit` or end of input.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting Huddle terminal client v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let mut shell = build_shell(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    redraw(&mut shell);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                let line = line.trim_end();
                if line.is_empty() {
                    continue;
                }
                match Command::parse(line) {
                    Ok(command) => {
                        if commands::execute(&mut shell, command).await == Flow::Quit {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(input = %line, error = %e, "Invalid command");
                        shell.push_notice(Notice::error(e.to_string()));
                    }
                }
                shell.pump();
                redraw(&mut shell);
            }

            notification = shell.next_session_event() => {
                shell.apply_notification(notification);
                shell.pump();
                redraw(&mut shell);
            }
        }
    }

    shell.shutdown().await;
    info!("Huddle client stopped");
    Ok(())
}

/// Print the view; notices are shown once.
fn redraw(shell: &mut Shell) {
    println!("{}", render::render(shell));
    shell.take_notices();
}
