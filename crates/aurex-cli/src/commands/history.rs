use aurex_core::{DateRange, InstrumentId, Period, PriceMonitor, ValidationError};

use crate::cli::{Cli, HistoryArgs};
use crate::error::CliError;
use crate::output;

pub fn run(args: &HistoryArgs, cli: &Cli, monitor: &PriceMonitor) -> Result<(), CliError> {
    let period = period(args)?;

    let series = match &args.instrument {
        Some(raw) => {
            let instrument = raw.parse::<InstrumentId>()?;
            vec![monitor.history(instrument, period)]
        }
        None => monitor.chart(period),
    };

    output::render_history(&series, cli.format, cli.pretty)
}

fn period(args: &HistoryArgs) -> Result<Period, ValidationError> {
    match (&args.start, &args.end) {
        (Some(start), Some(end)) => Ok(Period::Custom(DateRange::parse(start, end)?)),
        _ => args.period.as_deref().unwrap_or("1M").parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(period: Option<&str>, start: Option<&str>, end: Option<&str>) -> HistoryArgs {
        HistoryArgs {
            period: period.map(str::to_owned),
            start: start.map(str::to_owned),
            end: end.map(str::to_owned),
            instrument: None,
        }
    }

    #[test]
    fn defaults_to_one_month() {
        assert_eq!(period(&args(None, None, None)), Ok(Period::OneMonth));
        assert_eq!(period(&args(Some("3y"), None, None)), Ok(Period::ThreeYears));
    }

    #[test]
    fn custom_range_must_run_forwards() {
        let custom = period(&args(None, Some("2024-01-01"), Some("2024-01-31"))).expect("range");
        assert_eq!(custom.days(), 30);

        let backwards = period(&args(None, Some("2024-02-01"), Some("2024-01-01")));
        assert!(matches!(
            backwards,
            Err(ValidationError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn unknown_period_is_a_validation_error() {
        assert!(matches!(
            period(&args(Some("2W"), None, None)),
            Err(ValidationError::InvalidPeriod { .. })
        ));
    }
}
