//! Sample sensor dataset
//!
//! A small, deterministic table users can download and upload back to try the
//! explorer without data of their own. A handful of rows get injected spikes.

use crate::error::{ExplorerError, Result};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::info;

const MACHINES: [&str; 5] = ["M01", "M02", "M03", "M04", "M05"];

/// Rows whose index is a multiple of this get a spike in one sensor.
const SPIKE_EVERY: usize = 37;

pub fn generate(rows: usize, seed: u64) -> Result<DataFrame> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ExplorerError::InvalidConfig("invalid sample start time".to_string()))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut timestamps = Vec::with_capacity(rows);
    let mut machines = Vec::with_capacity(rows);
    let mut temperature = Vec::with_capacity(rows);
    let mut vibration = Vec::with_capacity(rows);
    let mut pressure = Vec::with_capacity(rows);

    for i in 0..rows {
        let at = start + Duration::minutes(10 * i as i64);
        timestamps.push(at.format("%Y-%m-%d %H:%M").to_string());
        machines.push(MACHINES[i % MACHINES.len()].to_string());

        let mut t = 60.0 + rng.gen_range(-2.0..2.0);
        let mut v = 0.5 + rng.gen_range(-0.05..0.05);
        let mut p = 101.3 + rng.gen_range(-0.5..0.5);

        if i > 0 && i % SPIKE_EVERY == 0 {
            match (i / SPIKE_EVERY) % 3 {
                0 => t += 35.0,
                1 => v *= 6.0,
                _ => p -= 20.0,
            }
        }

        temperature.push(round2(t));
        vibration.push(round2(v));
        pressure.push(round2(p));
    }

    let df = df! [
        "timestamp" => timestamps,
        "machine_id" => machines,
        "temperature" => temperature,
        "vibration" => vibration,
        "pressure" => pressure,
    ]?;
    Ok(df)
}

pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)?;

    info!("Wrote {} sample rows to {}", df.height(), path.display());
    Ok(df.height())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ColumnKind, Dataset};

    #[test]
    fn test_sample_shape_and_schema() {
        let df = generate(120, 0).unwrap();
        assert_eq!(df.height(), 120);

        let dataset = Dataset::from_frame(df);
        assert_eq!(
            dataset.numeric_columns(),
            vec!["temperature", "vibration", "pressure"]
        );
        assert_eq!(dataset.column_kind("timestamp"), Some(ColumnKind::Categorical));
        assert_eq!(
            dataset.distinct_axis_labels("timestamp").unwrap()[1],
            "2024-01-01 00:10"
        );
    }

    #[test]
    fn test_sample_is_deterministic() {
        let a = generate(50, 7).unwrap();
        let b = generate(50, 7).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_spikes_are_injected() {
        let dataset = Dataset::from_frame(generate(40, 0).unwrap());
        let temperature = dataset.numeric_values("temperature").unwrap();
        let vibration = dataset.numeric_values("vibration").unwrap();
        // Row 37 is the first spike and lands on vibration.
        assert!(vibration[37] > 2.0);
        assert!(temperature.iter().all(|t| *t < 63.0));
    }
}
