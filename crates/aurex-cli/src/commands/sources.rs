use aurex_core::{Category, PriceMonitor};

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::{self, ChainEntry, ChainView};

pub async fn run(cli: &Cli, monitor: &PriceMonitor) -> Result<(), CliError> {
    if !cli.offline {
        monitor.probe().await;
    }

    let chains = Category::ALL
        .into_iter()
        .map(|category| {
            let status = monitor.provider_status(category);
            ChainView {
                category,
                status,
                label: status.label(),
                providers: monitor
                    .resolver()
                    .sources(category)
                    .iter()
                    .map(|source| ChainEntry {
                        id: source.id(),
                        name: source.id().display_name(),
                        configured: source.is_configured(),
                    })
                    .collect(),
            }
        })
        .collect::<Vec<_>>();

    output::render_chains(monitor.mode(), &chains, cli.format, cli.pretty)
}
