mod history;
mod prices;
mod sources;
mod watch;

use std::sync::Arc;

use aurex_core::{MonitorConfig, PriceMonitor, SourceResolverBuilder};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::error::CliError;

pub async fn run(cli: &Cli, config: &AppConfig) -> Result<(), CliError> {
    let monitor_config = effective_monitor_config(cli, &config.monitor);

    match &cli.command {
        Command::Prices => prices::run(cli, &build_monitor(&monitor_config)).await,
        Command::History(args) => history::run(args, cli, &build_monitor(&monitor_config)),
        Command::Sources => sources::run(cli, &build_monitor(&monitor_config)).await,
        Command::Watch(args) => {
            let interval = args
                .interval_secs
                .filter(|secs| *secs > 0)
                .map_or_else(|| monitor_config.refresh_interval(), std::time::Duration::from_secs);
            watch::run(cli, build_monitor(&monitor_config), interval).await
        }
    }
}

fn effective_monitor_config(cli: &Cli, base: &MonitorConfig) -> MonitorConfig {
    let mut config = base.clone();
    if let Some(timeout_ms) = cli.timeout_ms.filter(|timeout_ms| *timeout_ms > 0) {
        config.request_timeout_ms = timeout_ms;
    }
    config
}

fn build_monitor(config: &MonitorConfig) -> Arc<PriceMonitor> {
    let resolver = SourceResolverBuilder::from_config(config).build();
    Arc::new(PriceMonitor::new(resolver, config))
}
