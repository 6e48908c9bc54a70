use std::sync::Arc;
use std::time::Duration;

use aurex_core::{PriceMonitor, RefreshScheduler};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::EventPrinter;

pub async fn run(cli: &Cli, monitor: Arc<PriceMonitor>, interval: Duration) -> Result<(), CliError> {
    let mut events = monitor.subscribe();
    let mut printer = EventPrinter::new(cli.format);

    if cli.offline {
        monitor.start_offline().await;
    }
    let scheduler = RefreshScheduler::spawn(Arc::clone(&monitor), interval);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if let Err(error) = printer.print(&event) {
                        break Err(error);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break Ok(()),
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match line.trim() {
                    "r" => {
                        if !scheduler.request_refresh() {
                            warn!("refresh scheduler is no longer running");
                        }
                    }
                    "p" => scheduler.set_visible(false),
                    "v" => scheduler.set_visible(true),
                    "q" => break Ok(()),
                    "" => {}
                    other => eprintln!("unknown command '{other}' (r = refresh, p = pause, v = resume, q = quit)"),
                },
                Ok(None) => stdin_open = false,
                Err(error) => break Err(CliError::from(error)),
            },
            signal = &mut ctrl_c => {
                if let Err(error) = signal {
                    warn!(error = %error, "ctrl-c handler failed");
                }
                break Ok(());
            }
        }
    };

    info!("stopping watch");
    scheduler.shutdown().await;
    outcome
}
