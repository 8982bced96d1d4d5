use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use shelfwatch_core::{Catalog, DomainError, Sku};

use crate::history::{SalesHistory, SalesRecord};
use crate::result::ForecastError;
use crate::stats::SeriesStats;

/// One point of a forecast run.
///
/// Historical points are exact copies of the input series; projected points
/// follow on consecutive days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub sku: Sku,
    pub date: NaiveDate,
    pub sales_estimate: u64,
    pub is_projected: bool,
}

impl From<&SalesRecord> for ForecastPoint {
    fn from(record: &SalesRecord) -> Self {
        Self {
            sku: record.sku.clone(),
            date: record.date,
            sales_estimate: record.sales_count,
            is_projected: false,
        }
    }
}

/// Normal-distribution demand projection.
///
/// Model:
/// - Mean and sample standard deviation over the SKU's full series.
/// - Each future day draws from N(mean, std), rounded to whole units and
///   floored at zero.
/// - Fewer than two points projects flat (std = 0); no history projects zero.
#[derive(Debug, Clone)]
pub struct Forecaster {
    catalog: Arc<Catalog>,
    history: Arc<SalesHistory>,
}

impl Forecaster {
    pub fn new(catalog: Arc<Catalog>, history: Arc<SalesHistory>) -> Self {
        Self { catalog, history }
    }

    /// Forecast `horizon_days` beyond the last recorded day.
    ///
    /// Recomputed from the current series on every call.
    pub fn forecast(
        &self,
        sku: &Sku,
        horizon_days: i64,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let today = Utc::now().date_naive();
        self.forecast_with(sku, horizon_days, today, &mut rand::thread_rng())
    }

    /// Forecast with an explicit anchor day and random source.
    ///
    /// `today` only matters when the SKU has no history: projection then
    /// starts the day after it.
    pub fn forecast_with<R>(
        &self,
        sku: &Sku,
        horizon_days: i64,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<ForecastPoint>, ForecastError>
    where
        R: Rng + ?Sized,
    {
        self.catalog.require(sku)?;

        let series = self.history.series(sku)?;
        let stats = match SeriesStats::from_series(sku, &series) {
            Ok(stats) => stats,
            Err(DomainError::InsufficientHistory(_)) => {
                tracing::warn!(sku = %sku, "no sales history; projecting flat zero");
                SeriesStats::flat_zero()
            }
            Err(e) => return Err(e.into()),
        };

        let mut points: Vec<ForecastPoint> = series.iter().map(ForecastPoint::from).collect();

        let horizon = u64::try_from(horizon_days).unwrap_or(0);
        if horizon == 0 {
            return Ok(points);
        }

        let normal = Normal::new(stats.mean, stats.std_dev)
            .map_err(|e| ForecastError::Internal(format!("invalid distribution: {e}")))?;
        let last_day = series.last().map(|r| r.date).unwrap_or(today);
        if last_day.checked_add_days(Days::new(horizon)).is_none() {
            return Err(ForecastError::InvalidInput(format!(
                "horizon of {horizon} days overflows the calendar"
            )));
        }

        for offset in 1..=horizon {
            let date = last_day + Days::new(offset);
            points.push(ForecastPoint {
                sku: sku.clone(),
                date,
                sales_estimate: to_units(normal.sample(rng)),
                is_projected: true,
            });
        }

        tracing::debug!(
            sku = %sku,
            history = stats.count,
            horizon,
            mean = stats.mean,
            std_dev = stats.std_dev,
            "forecast computed"
        );

        Ok(points)
    }
}

fn to_units(sample: f64) -> u64 {
    if sample.is_finite() && sample > 0.0 {
        sample.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use shelfwatch_core::CatalogItem;

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn test_forecaster(values: &[u64]) -> (Forecaster, Vec<SalesRecord>) {
        let catalog = Catalog::new(vec![
            CatalogItem::new(sku("C789"), "Product C", 8),
            CatalogItem::new(sku("A123"), "Product A", 10),
        ])
        .unwrap();
        let history = SalesHistory::new();
        let mut records = Vec::new();
        for (i, &v) in values.iter().enumerate() {
            let record = SalesRecord {
                sku: sku("C789"),
                date: day(1) + Days::new(i as u64),
                sales_count: v,
            };
            history.append(record.clone()).unwrap();
            records.push(record);
        }
        (Forecaster::new(Arc::new(catalog), Arc::new(history)), records)
    }

    fn historical(records: &[SalesRecord]) -> Vec<ForecastPoint> {
        records.iter().map(ForecastPoint::from).collect()
    }

    #[test]
    fn projects_horizon_after_history() {
        let (forecaster, records) = test_forecaster(&[3, 5, 4, 6, 5]);
        let mut rng = StdRng::seed_from_u64(7);
        let points = forecaster
            .forecast_with(&sku("C789"), 3, day(20), &mut rng)
            .unwrap();

        assert_eq!(points.len(), 8);
        assert_eq!(points[..5], historical(&records)[..]);
        let projected = &points[5..];
        assert!(projected.iter().all(|p| p.is_projected));
        assert_eq!(projected[0].date, day(6));
        assert_eq!(projected[2].date, day(8));
    }

    #[test]
    fn runs_are_stochastic_but_share_the_prefix() {
        let (forecaster, records) = test_forecaster(&[3, 5, 4, 6, 5]);
        let a = forecaster
            .forecast_with(&sku("C789"), 30, day(20), &mut StdRng::seed_from_u64(1))
            .unwrap();
        let b = forecaster
            .forecast_with(&sku("C789"), 30, day(20), &mut StdRng::seed_from_u64(2))
            .unwrap();

        assert_eq!(a[..5], historical(&records)[..]);
        assert_eq!(a[..5], b[..5]);
        let pa: Vec<_> = a[5..].iter().map(|p| p.sales_estimate).collect();
        let pb: Vec<_> = b[5..].iter().map(|p| p.sales_estimate).collect();
        assert_ne!(pa, pb);
    }

    #[test]
    fn zero_horizon_returns_history_only() {
        let (forecaster, records) = test_forecaster(&[3, 5, 4, 6, 5]);
        assert_eq!(forecaster.forecast(&sku("C789"), 0).unwrap(), historical(&records));
        assert_eq!(forecaster.forecast(&sku("C789"), -4).unwrap(), historical(&records));
    }

    #[test]
    fn single_point_projects_flat() {
        let (forecaster, _) = test_forecaster(&[6]);
        let points = forecaster.forecast(&sku("C789"), 5).unwrap();
        assert!(points[1..].iter().all(|p| p.sales_estimate == 6));
    }

    #[test]
    fn no_history_projects_zero_from_today() {
        let (forecaster, _) = test_forecaster(&[]);
        let points = forecaster
            .forecast_with(&sku("A123"), 2, day(10), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.is_projected && p.sales_estimate == 0));
        assert_eq!(points[0].date, day(11));
    }

    #[test]
    fn unknown_sku_is_rejected() {
        let (forecaster, _) = test_forecaster(&[1, 2]);
        let err = forecaster.forecast(&sku("Z999"), 3).unwrap_err();
        assert!(matches!(err, ForecastError::Domain(DomainError::UnknownSku(_))));
    }

    #[test]
    fn horizon_past_the_calendar_is_rejected() {
        let (forecaster, _) = test_forecaster(&[4]);
        let err = forecaster
            .forecast_with(&sku("C789"), i64::MAX, day(1), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));
    }

    #[test]
    fn negative_draws_floor_at_zero() {
        assert_eq!(to_units(-3.7), 0);
        assert_eq!(to_units(f64::NAN), 0);
        assert_eq!(to_units(4.5), 5);
        assert_eq!(to_units(4.49), 4);
    }

    proptest! {
        /// Property: the historical prefix of any forecast equals the input.
        #[test]
        fn historical_prefix_round_trips(
            values in proptest::collection::vec(0u64..50, 0..20),
            horizon in 0i64..15,
            seed in any::<u64>(),
        ) {
            let (forecaster, records) = test_forecaster(&values);
            let points = forecaster
                .forecast_with(&sku("C789"), horizon, day(28), &mut StdRng::seed_from_u64(seed))
                .unwrap();
            let expected = historical(&records);
            prop_assert_eq!(points.len(), records.len() + horizon as usize);
            prop_assert_eq!(&points[..records.len()], expected.as_slice());
            prop_assert!(points[records.len()..].iter().all(|p| p.is_projected));
        }
    }
}
