//! Forecast report (`sku,date,sales_estimate,is_projected`).

use std::io::Write;

use crate::forecaster::ForecastPoint;
use crate::result::ForecastError;

/// Write forecast points as CSV. Returns the number of rows written.
pub fn write_forecast_csv<W: Write>(
    points: &[ForecastPoint],
    writer: W,
) -> Result<usize, ForecastError> {
    let mut out = csv::Writer::from_writer(writer);
    for point in points {
        out.serialize(point)?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(points.len())
}
