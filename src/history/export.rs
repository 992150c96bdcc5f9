//! CSV serialization of history records.

use chrono::{DateTime, NaiveDate, Utc};

use crate::telemetry::models::HistoryRecord;

pub const HEADER: [&str; 10] = [
    "Data/Hora",
    "Localização",
    "Temperatura (°C)",
    "Humidade (%)",
    "Solo (%)",
    "Gás (ppm)",
    "Fumaça (ppm)",
    "Luminosidade (lx)",
    "Pressão (hPa)",
    "CO₂ (ppm)",
];

/// Timestamp layout used in the table and the export (`dd/mm/YYYY HH:MM:SS`).
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Fixed-precision formatting, rounding half away from zero.
pub fn fixed(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // `-0.0` would otherwise print with a sign.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.decimals$}")
}

/// Table cells of one record in `HEADER` order.
pub fn row(record: &HistoryRecord) -> [String; 10] {
    [
        format_timestamp(&record.timestamp),
        record.location.clone(),
        fixed(record.temperature, 1),
        fixed(record.humidity, 1),
        fixed(record.soil_moisture, 1),
        fixed(record.gas, 0),
        fixed(record.smoke, 0),
        fixed(record.luminosity, 0),
        fixed(record.atmospheric_pressure, 1),
        fixed(record.co2, 0),
    ]
}

/// Header plus one line per record, joined by `\n` without a trailing newline.
pub fn to_csv(records: &[HistoryRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.join(","));
    for record in records {
        let cells = row(record);
        let escaped: Vec<String> = cells.iter().map(|c| escape(c)).collect();
        lines.push(escaped.join(","));
    }
    lines.join("\n")
}

/// Download name, e.g. `historico-sensores-2024-05-01.csv`.
pub fn filename(date: NaiveDate) -> String {
    format!("historico-sensores-{}.csv", date.format("%Y-%m-%d"))
}

/// Line breaks become spaces so every record stays on one line.
fn escape(cell: &str) -> String {
    let cell = cell.replace(['\r', '\n'], " ");
    if cell.contains([',', '"']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell
    }
}
