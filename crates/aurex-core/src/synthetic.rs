//! Plausible price data for when live data is unavailable, and for charts.

use std::f64::consts::PI;

use time::Date;

use crate::{
    HistoricalSeries, InstrumentId, Period, PriceRecord, RecordOrigin, SeriesPoint, UtcDateTime,
};

/// Fixed per-instrument reference card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
}

impl Baseline {
    pub const fn for_instrument(id: InstrumentId) -> Self {
        match id {
            InstrumentId::Xau => Self {
                price: 614.50,
                change: 3.61,
                change_percent: 0.59,
                open: 610.89,
                high: 615.42,
                low: 610.25,
            },
            InstrumentId::Usd => Self {
                price: 7.2485,
                change: 0.0145,
                change_percent: 0.20,
                open: 7.2340,
                high: 7.2520,
                low: 7.2315,
            },
            InstrumentId::Chf => Self {
                price: 8.2756,
                change: 0.0223,
                change_percent: 0.27,
                open: 8.2533,
                high: 8.2862,
                low: 8.2428,
            },
            InstrumentId::Jpy => Self {
                price: 4.6825,
                change: -0.0185,
                change_percent: -0.39,
                open: 4.7010,
                high: 4.7125,
                low: 4.6580,
            },
        }
    }
}

/// Random-walk generator over [`Baseline`]s. Output is not reproducible
/// unless built with [`SyntheticGenerator::with_seed`].
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    rng: fastrand::Rng,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticGenerator {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Baseline perturbed by a uniform change in `[-0.5%, +0.5%)`.
    pub fn price_record(&mut self, id: InstrumentId) -> PriceRecord {
        let base = Baseline::for_instrument(id);
        let change_percent = self.rng.f64() - 0.5;
        let change = base.price * change_percent / 100.0;
        let price = base.price + change;

        PriceRecord {
            instrument: id,
            price,
            change,
            change_percent,
            open: base.open,
            high: base.high.max(price),
            low: base.low.min(price),
            origin: RecordOrigin::Synthetic,
            degraded: false,
            as_of: UtcDateTime::now(),
        }
    }

    /// Day-by-day series for `period`, ending on `today` for preset periods.
    ///
    /// Each point is `baseline · (1 + 0.05·sin(4π·p) + U[-0.01, 0.01) + 0.03·p)`
    /// with `p` the fraction of the series elapsed, rounded to the
    /// instrument's display precision.
    pub fn history(&mut self, id: InstrumentId, period: Period, today: Date) -> HistoricalSeries {
        let instrument = id.instrument();
        let base = Baseline::for_instrument(id);
        let days = period.days().max(1);
        let mut date = period.start_date(today);
        let mut points = Vec::with_capacity(days as usize + 1);

        for step in 0..=days {
            let progress = f64::from(step) / f64::from(days);
            let cycle = (progress * 4.0 * PI).sin() * 0.05;
            let jitter = (self.rng.f64() - 0.5) * 0.02;
            let drift = progress * 0.03;
            points.push(SeriesPoint {
                date,
                price: instrument.round(base.price * (1.0 + cycle + jitter + drift)),
            });

            match date.next_day() {
                Some(next) => date = next,
                None => break,
            }
        }

        HistoricalSeries {
            instrument: id,
            period,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    #[test]
    fn synthetic_records_stay_near_baseline() {
        let mut generator = SyntheticGenerator::with_seed(11);
        for id in InstrumentId::ALL {
            let base = Baseline::for_instrument(id);
            for _ in 0..100 {
                let record = generator.price_record(id);
                assert!(record.is_synthetic());
                assert!(record.change_percent >= -0.5 && record.change_percent < 0.5);
                assert!((record.price - base.price).abs() <= base.price * 0.005);
                assert_eq!(record.open, base.open);
                assert!(record.low <= record.price && record.price <= record.high);
            }
        }
    }

    #[test]
    fn custom_history_starts_at_range_start() {
        let start = Date::from_calendar_date(2023, Month::December, 30).expect("date");
        let end = Date::from_calendar_date(2024, Month::January, 4).expect("date");
        let period = Period::Custom(crate::DateRange::new(start, end).expect("range"));
        let today = Date::from_calendar_date(2030, Month::June, 1).expect("date");

        let series = SyntheticGenerator::with_seed(3).history(InstrumentId::Usd, period, today);

        assert_eq!(series.points.len(), 6);
        assert_eq!(series.points[0].date, start);
        assert_eq!(series.points[5].date, end);
    }

    #[test]
    fn history_prices_follow_envelope_and_precision() {
        let today = Date::from_calendar_date(2024, Month::June, 30).expect("date");
        let series = SyntheticGenerator::new().history(InstrumentId::Xau, Period::OneYear, today);
        let base = Baseline::for_instrument(InstrumentId::Xau).price;

        for point in &series.points {
            assert!(point.price >= base * 0.93 && point.price <= base * 1.09);
            assert_eq!(point.price, InstrumentId::Xau.instrument().round(point.price));
        }
    }
}
