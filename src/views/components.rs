//! Building blocks shared by the views.

use chrono::{DateTime, Utc};

use crate::{
    alerts::{detail_path, dismiss_path},
    dashboard::Trend,
    history::export::fixed,
    telemetry::models::{Alert, Metric, SensorReading, Severity},
};

pub const CHART_WIDTH: f64 = 600.0;
pub const CHART_HEIGHT: f64 = 240.0;
/// Padding between the plot area and the SVG border.
const CHART_PAD: f64 = 12.0;
/// Added below the minimum and above the maximum of a series.
pub const CHART_MARGIN: f64 = 5.0;

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// `[min - 5, max + 5]` of `values`, `None` for an empty series.
pub fn y_domain(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some((min - CHART_MARGIN, max + CHART_MARGIN))
}

/// SVG coordinates of `values`, evenly spaced left to right.
pub fn chart_points(values: &[f64]) -> Vec<(f64, f64)> {
    let Some((lo, hi)) = y_domain(values) else {
        return Vec::new();
    };
    let plot_w = CHART_WIDTH - 2.0 * CHART_PAD;
    let plot_h = CHART_HEIGHT - 2.0 * CHART_PAD;
    let step = if values.len() > 1 {
        plot_w / (values.len() - 1) as f64
    } else {
        0.0
    };
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = if values.len() > 1 {
                CHART_PAD + step * i as f64
            } else {
                CHART_WIDTH / 2.0
            };
            let y = CHART_PAD + (hi - v) / (hi - lo) * plot_h;
            (x, y)
        })
        .collect()
}

fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn color(metric: Metric) -> &'static str {
    match metric {
        Metric::Temperature => "#10b981",
        Metric::Humidity => "#3b82f6",
        Metric::SoilMoisture => "#8b5cf6",
        Metric::Gas => "#f59e0b",
        Metric::Smoke => "#6b7280",
        Metric::Luminosity => "#eab308",
        Metric::AtmosphericPressure => "#0ea5e9",
        Metric::Co2 => "#ef4444",
    }
}

pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M").to_string()
}

/// Everything the chart template needs, precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub title: &'static str,
    pub unit: &'static str,
    pub color: &'static str,
    pub points: Vec<(f64, f64)>,
    /// Rendered `points` attribute of the polyline.
    pub polyline: String,
    pub y_min: String,
    pub y_max: String,
    pub first_time: String,
    pub last_time: String,
}

impl ChartModel {
    pub fn new(metric: Metric, history: &[SensorReading]) -> Self {
        let values: Vec<f64> = history.iter().map(|r| metric.of(r)).collect();
        let points = chart_points(&values);
        let (y_min, y_max) = y_domain(&values)
            .map(|(lo, hi)| (fixed(lo, metric.precision()), fixed(hi, metric.precision())))
            .unwrap_or_default();
        Self {
            title: metric.label(),
            unit: metric.unit(),
            color: color(metric),
            polyline: points_attr(&points),
            points,
            y_min,
            y_max,
            first_time: history.first().map(|r| format_time(&r.timestamp)).unwrap_or_default(),
            last_time: history.last().map(|r| format_time(&r.timestamp)).unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn view_box(&self) -> String {
        format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")
    }
}

// ---------------------------------------------------------------------------
// Cards and badges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CardModel {
    pub title: &'static str,
    pub value: String,
    pub unit: &'static str,
    pub trend: Trend,
}

impl CardModel {
    pub fn new(metric: Metric, reading: &SensorReading, trend: Trend) -> Self {
        Self {
            title: metric.label(),
            value: fixed(metric.of(reading), metric.precision()),
            unit: metric.unit(),
            trend,
        }
    }
}

pub fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "badge badge-high",
        Severity::Medium => "badge badge-medium",
        Severity::Low => "badge badge-low",
    }
}

pub fn alert_card_class(alert: &Alert) -> &'static str {
    if alert.resolved {
        "alert-card resolved"
    } else {
        "alert-card"
    }
}

markup::define! {
    SensorCard<'a>(card: &'a CardModel) {
        div."sensor-card" {
            div."sensor-card-title" { @card.title }
            div."sensor-card-body" {
                div {
                    div."sensor-value" { @card.value }
                    p."sensor-unit" { @card.unit }
                }
                span[class = card.trend.css_class()] { @card.trend.label() }
            }
        }
    }

    SensorChart<'a>(chart: &'a ChartModel) {
        div."chart-card" {
            h3 { @chart.title }
            p.muted { "Dados recentes (" @chart.unit ")" }
            @if chart.is_empty() {
                p."chart-empty" { "Sem dados para o período." }
            } else {
                svg[
                    class = "chart",
                    viewBox = chart.view_box(),
                    preserveAspectRatio = "none",
                    role = "img",
                    "aria-label" = chart.title,
                ] {
                    polyline[
                        fill = "none",
                        stroke = chart.color,
                        "stroke-width" = "3",
                        points = chart.polyline.as_str(),
                    ] {}
                    @for (x, y) in chart.points.iter() {
                        circle[cx = format!("{x:.1}"), cy = format!("{y:.1}"), r = "4", fill = chart.color] {}
                    }
                }
                div."chart-axis" {
                    span { @chart.first_time }
                    span { @chart.y_min " – " @chart.y_max " " @chart.unit }
                    span { @chart.last_time }
                }
            }
        }
    }

    AlertBanner<'a>(alerts: &'a [Alert]) {
        @if !alerts.is_empty() {
            div."alert-banner" {
                @for alert in alerts.iter() {
                    div."alert-banner-item" {
                        span { "⚠ " }
                        a[href = detail_path(&alert.id)] { @alert.message }
                        form."banner-dismiss"[method = "post", action = dismiss_path(&alert.id)] {
                            button["type" = "submit", title = "Dispensar", "aria-label" = "Dispensar alerta"] { "×" }
                        }
                    }
                }
            }
        }
    }

    SeverityBadge(severity: Severity) {
        span[class = severity_class(*severity)] { @severity.label() }
    }

    ErrorPanel<'a>(message: &'a str) {
        div."error-panel"[role = "alert"] {
            span { "⚠ " }
            span."error-message" { @message }
        }
    }

    LoadingPanel {
        div."cards-grid" {
            @for _ in 0..4 {
                div."sensor-card loading" {
                    div.placeholder {}
                    div."placeholder wide" {}
                }
            }
        }
        p.muted { "A carregar dados dos sensores..." }
    }
}
