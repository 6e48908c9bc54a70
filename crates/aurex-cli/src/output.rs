use std::collections::BTreeMap;

use aurex_core::{
    Category, DataMode, HistoricalSeries, InstrumentId, MonitorEvent, PriceMonitor, PriceRecord,
    ProviderId, ProviderStatus, UtcDateTime,
};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

const CURRENCY: &str = "￥";
const MARKER_PREFIX: &str = "live data unavailable";

#[derive(Debug, Serialize)]
pub struct BoardView {
    pub mode: DataMode,
    pub last_update: Option<UtcDateTime>,
    pub cards: Vec<CardView>,
    pub sources: Vec<StatusView>,
}

#[derive(Debug, Serialize)]
pub struct CardView {
    #[serde(flatten)]
    pub record: PriceRecord,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub category: Category,
    pub status: ProviderStatus,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ChainView {
    pub category: Category,
    pub status: ProviderStatus,
    pub label: &'static str,
    pub providers: Vec<ChainEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChainEntry {
    pub id: ProviderId,
    pub name: &'static str,
    pub configured: bool,
}

/// Snapshot of everything the board shows.
pub fn board(monitor: &PriceMonitor) -> BoardView {
    let cards = monitor
        .records()
        .into_iter()
        .map(|record| CardView {
            error: monitor.failure(record.instrument),
            record,
        })
        .collect();

    BoardView {
        mode: monitor.mode(),
        last_update: monitor.last_update(),
        cards,
        sources: status_views(monitor),
    }
}

pub fn status_views(monitor: &PriceMonitor) -> Vec<StatusView> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let status = monitor.provider_status(category);
            StatusView {
                category,
                status,
                label: status.label(),
            }
        })
        .collect()
}

pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{payload}");
    Ok(())
}

pub fn render_board(board: &BoardView, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(board, pretty)?,
        OutputFormat::Table => {
            println!("{}", mode_line(board.mode, board.last_update));
            println!();
            for card in &board.cards {
                for line in card_lines(&card.record, card.error.as_deref()) {
                    println!("{line}");
                }
                println!();
            }
            for status in &board.sources {
                println!("{}", status_line(status.category, status.status));
            }
        }
    }
    Ok(())
}

pub fn render_chains(
    mode: DataMode,
    chains: &[ChainView],
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct SourcesView<'a> {
                mode: DataMode,
                categories: &'a [ChainView],
            }
            print_json(
                &SourcesView {
                    mode,
                    categories: chains,
                },
                pretty,
            )?;
        }
        OutputFormat::Table => {
            println!("mode: {}", mode.label());
            for chain in chains {
                println!();
                println!("{}", status_line(chain.category, chain.status));
                for (position, entry) in chain.providers.iter().enumerate() {
                    let note = if entry.configured { "" } else { "  (not configured)" };
                    println!("  {}. {:<18} {}{note}", position + 1, entry.name, entry.id);
                }
            }
        }
    }
    Ok(())
}

pub fn render_history(
    series: &[HistoricalSeries],
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(&series, pretty)?,
        OutputFormat::Table => {
            for (index, item) in series.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                let instrument = item.instrument.instrument();
                println!("{} ({}) {}", instrument.name, instrument.pair, item.period);
                for point in &item.points {
                    println!(
                        "  {}  {CURRENCY}{}",
                        point.date,
                        instrument.format(point.price)
                    );
                }
            }
        }
    }
    Ok(())
}

/// Incremental output for `watch`.
///
/// Markers from `UpdateFailed` are held until the matching card is printed.
#[derive(Debug)]
pub struct EventPrinter {
    format: OutputFormat,
    pending_markers: BTreeMap<InstrumentId, String>,
}

impl EventPrinter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pending_markers: BTreeMap::new(),
        }
    }

    pub fn print(&mut self, event: &MonitorEvent) -> Result<(), CliError> {
        if self.format == OutputFormat::Json {
            return print_json(event, false);
        }
        for line in self.lines(event) {
            println!("{line}");
        }
        Ok(())
    }

    fn lines(&mut self, event: &MonitorEvent) -> Vec<String> {
        match event {
            MonitorEvent::ModeChanged { mode } => vec![format!("mode: {}", mode.label())],
            MonitorEvent::UpdateFailed {
                instrument,
                message,
            } => {
                self.pending_markers.insert(*instrument, message.clone());
                Vec::new()
            }
            MonitorEvent::RecordUpdated { record } => {
                let marker = self.pending_markers.remove(&record.instrument);
                card_lines(record, marker.as_deref())
            }
            MonitorEvent::StatusChanged { category, status } => {
                vec![status_line(*category, *status)]
            }
            MonitorEvent::CycleCompleted {
                updated_at,
                records,
                failures,
            } => vec![format!(
                "updated {} ({records} records, {failures} failed)",
                updated_at.time_label()
            )],
        }
    }
}

pub fn mode_line(mode: DataMode, last_update: Option<UtcDateTime>) -> String {
    let updated = last_update.map_or_else(|| String::from("never"), UtcDateTime::time_label);
    format!("mode: {}  last update: {updated}", mode.label())
}

pub fn status_line(category: Category, status: ProviderStatus) -> String {
    format!("source {:<6} {}", category.label(), status.label())
}

pub fn card_lines(record: &PriceRecord, marker: Option<&str>) -> Vec<String> {
    let instrument = record.instrument.instrument();
    let precision = usize::from(instrument.precision);
    let mut header = format!(
        "{} ({})  {CURRENCY}{}  {:+.precision$} ({:+.2}%)  {}",
        instrument.name,
        instrument.pair,
        instrument.format(record.price),
        record.change,
        record.change_percent,
        instrument.unit,
    );
    if record.is_synthetic() {
        header.push_str("  [synthetic]");
    } else if record.degraded {
        header.push_str("  [estimated]");
    }

    let mut lines = vec![
        header,
        format!(
            "  open {CURRENCY}{}  high {CURRENCY}{}  low {CURRENCY}{}",
            instrument.format(record.open),
            instrument.format(record.high),
            instrument.format(record.low),
        ),
    ];
    if let Some(reason) = marker {
        lines.push(format!("  {MARKER_PREFIX}: {reason}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use aurex_core::{RecordOrigin, SyntheticGenerator};

    use super::*;

    fn live_record() -> PriceRecord {
        PriceRecord::around(InstrumentId::Xau, 462.9704, 2.0, false).expect("finite record")
    }

    #[test]
    fn card_uses_instrument_precision_and_currency_prefix() {
        let lines = card_lines(&live_record(), None);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("￥462.97"));
        assert!(lines[0].contains("+2.00"));
        assert!(lines[1].contains("open ￥461.97"));
        assert!(lines[1].contains("high ￥465.37"));
        assert!(lines[1].contains("low ￥460.57"));
    }

    #[test]
    fn marker_line_is_appended() {
        let record = SyntheticGenerator::with_seed(5).price_record(InstrumentId::Jpy);
        assert_eq!(record.origin, RecordOrigin::Synthetic);

        let lines = card_lines(&record, Some("all providers failed"));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("  live data unavailable: all providers failed")
        );
        assert!(lines[0].ends_with("[synthetic]"));
    }

    #[test]
    fn printer_attaches_failure_to_next_card() {
        let mut printer = EventPrinter::new(OutputFormat::Table);
        let failed = MonitorEvent::UpdateFailed {
            instrument: InstrumentId::Xau,
            message: String::from("timeout"),
        };
        assert!(printer.lines(&failed).is_empty());

        let lines = printer.lines(&MonitorEvent::RecordUpdated {
            record: live_record(),
        });
        assert_eq!(
            lines.last().map(String::as_str),
            Some("  live data unavailable: timeout")
        );

        let again = printer.lines(&MonitorEvent::RecordUpdated {
            record: live_record(),
        });
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn status_and_mode_lines_use_labels() {
        assert_eq!(
            status_line(
                Category::GoldSpot,
                ProviderStatus::Serving(ProviderId::MetalsLive)
            ),
            "source gold   Metals.live"
        );
        assert_eq!(
            status_line(Category::ExchangeRates, ProviderStatus::Failed),
            "source forex  fetch failed"
        );
        assert_eq!(
            mode_line(DataMode::Synthetic, None),
            "mode: synthetic data  last update: never"
        );
    }
}
