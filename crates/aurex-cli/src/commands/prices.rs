use aurex_core::PriceMonitor;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output;

pub async fn run(cli: &Cli, monitor: &PriceMonitor) -> Result<(), CliError> {
    if cli.offline {
        monitor.start_offline().await;
    } else {
        monitor.start().await;
    }

    output::render_board(&output::board(monitor), cli.format, cli.pretty)
}
