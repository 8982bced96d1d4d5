use std::collections::HashMap;
use std::io::Read;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shelfwatch_core::{DomainError, Sku};

use crate::result::ForecastError;

/// Units of one SKU sold on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub sku: Sku,
    pub date: NaiveDate,
    pub sales_count: u64,
}

/// Row layout of a sales upload: `date,sku,sales`.
#[derive(Debug, Deserialize)]
struct SalesRow {
    date: NaiveDate,
    sku: Sku,
    sales: i64,
}

/// Append-only daily sales series, one per SKU.
///
/// Each series is kept in strictly ascending date order.
#[derive(Debug, Default)]
pub struct SalesHistory {
    series: RwLock<HashMap<Sku, Vec<SalesRecord>>>,
}

impl SalesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record to its SKU's series.
    pub fn append(&self, record: SalesRecord) -> Result<(), ForecastError> {
        let mut map = self.write()?;
        let series = map.entry(record.sku.clone()).or_default();
        ensure_after(series.last(), &record)?;
        series.push(record);
        Ok(())
    }

    /// Import a CSV upload with columns `date,sku,sales`.
    ///
    /// All-or-nothing: any malformed, negative or out-of-order row rejects
    /// the whole upload. Returns the number of records imported.
    pub fn import_csv(&self, reader: impl Read) -> Result<usize, ForecastError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for row in rdr.deserialize::<SalesRow>() {
            let row = row?;
            let sales_count = u64::try_from(row.sales).map_err(|_| {
                ForecastError::InvalidInput(format!(
                    "negative sales ({}) for {} on {}",
                    row.sales, row.sku, row.date
                ))
            })?;
            rows.push(SalesRecord {
                sku: row.sku,
                date: row.date,
                sales_count,
            });
        }

        let mut map = self.write()?;

        // Validate against current tails plus earlier rows of this upload.
        let mut tails: HashMap<&Sku, NaiveDate> = HashMap::new();
        for record in &rows {
            let last = match tails.get(&record.sku) {
                Some(date) => Some(*date),
                None => map.get(&record.sku).and_then(|s| s.last()).map(|r| r.date),
            };
            if let Some(last) = last {
                if record.date <= last {
                    return Err(out_of_order(&record.sku, record.date, last).into());
                }
            }
            tails.insert(&record.sku, record.date);
        }

        let imported = rows.len();
        for record in rows {
            map.entry(record.sku.clone()).or_default().push(record);
        }

        tracing::info!(records = imported, "sales history imported");
        Ok(imported)
    }

    /// Full series for a SKU (empty when nothing was recorded).
    pub fn series(&self, sku: &Sku) -> Result<Vec<SalesRecord>, ForecastError> {
        Ok(self.read()?.get(sku).cloned().unwrap_or_default())
    }

    /// The most recent `days` records of a SKU's series.
    pub fn trend(&self, sku: &Sku, days: usize) -> Result<Vec<SalesRecord>, ForecastError> {
        let map = self.read()?;
        let Some(series) = map.get(sku) else {
            return Ok(vec![]);
        };
        let start = series.len().saturating_sub(days);
        Ok(series[start..].to_vec())
    }

    pub fn skus(&self) -> Result<Vec<Sku>, ForecastError> {
        let mut skus: Vec<_> = self.read()?.keys().cloned().collect();
        skus.sort();
        Ok(skus)
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Sku, Vec<SalesRecord>>>, ForecastError> {
        self.series
            .read()
            .map_err(|_| ForecastError::Internal("sales history lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<Sku, Vec<SalesRecord>>>, ForecastError> {
        self.series
            .write()
            .map_err(|_| ForecastError::Internal("sales history lock poisoned".to_string()))
    }
}

fn ensure_after(last: Option<&SalesRecord>, record: &SalesRecord) -> Result<(), DomainError> {
    match last {
        Some(last) if record.date <= last.date => {
            Err(out_of_order(&record.sku, record.date, last.date))
        }
        _ => Ok(()),
    }
}

fn out_of_order(sku: &Sku, date: NaiveDate, last: NaiveDate) -> DomainError {
    DomainError::validation(format!(
        "sales for {sku} on {date} is not after the last recorded day {last}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(s: &str, d: u32, sales: u64) -> SalesRecord {
        SalesRecord {
            sku: sku(s),
            date: day(d),
            sales_count: sales,
        }
    }

    #[test]
    fn append_keeps_series_ordered() {
        let history = SalesHistory::new();
        history.append(record("A123", 1, 4)).unwrap();
        history.append(record("A123", 2, 6)).unwrap();

        let err = history.append(record("A123", 2, 1)).unwrap_err();
        assert!(matches!(err, ForecastError::Domain(DomainError::Validation(_))));
        assert_eq!(history.series(&sku("A123")).unwrap().len(), 2);
    }

    #[test]
    fn import_csv_groups_rows_by_sku() {
        let history = SalesHistory::new();
        let csv = "date,sku,sales\n\
                   2024-01-01,A123,4\n\
                   2024-01-01,B456,2\n\
                   2024-01-02,A123,5\n";
        assert_eq!(history.import_csv(csv.as_bytes()).unwrap(), 3);
        assert_eq!(history.series(&sku("A123")).unwrap().len(), 2);
        assert_eq!(history.skus().unwrap(), vec![sku("A123"), sku("B456")]);
    }

    #[test]
    fn import_csv_is_all_or_nothing() {
        let history = SalesHistory::new();
        let csv = "date,sku,sales\n\
                   2024-01-02,A123,4\n\
                   2024-01-01,A123,5\n";
        assert!(history.import_csv(csv.as_bytes()).is_err());
        assert!(history.series(&sku("A123")).unwrap().is_empty());
    }

    #[test]
    fn import_csv_rejects_negative_sales() {
        let history = SalesHistory::new();
        let csv = "date,sku,sales\n2024-01-01,A123,-3\n";
        assert!(matches!(
            history.import_csv(csv.as_bytes()),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn import_csv_respects_existing_tail() {
        let history = SalesHistory::new();
        history.append(record("A123", 5, 1)).unwrap();
        let csv = "date,sku,sales\n2024-01-03,A123,2\n";
        assert!(history.import_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn trend_returns_most_recent_days() {
        let history = SalesHistory::new();
        for d in 1..=10 {
            history.append(record("A123", d, u64::from(d))).unwrap();
        }
        let trend = history.trend(&sku("A123"), 7).unwrap();
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, day(4));
        assert_eq!(trend[6].date, day(10));
        assert!(history.trend(&sku("Z999"), 7).unwrap().is_empty());
    }
}
