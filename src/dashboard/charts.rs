//! Chart models: the numbers, labels and colors behind each figure
//!
//! All data shaping and coloring happens here so the page script only draws.

use crate::data::{AdvisorPolarity, AdvisorScore, CategoryDetail, SentimentSample};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// COLORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// Score bars, light to dark except for the 3rd and 4th stops
pub const SCORE_SCALE: &[(f64, Rgb)] = &[
    (0.0, Rgb(0xc7, 0xe9, 0xc0)),
    (0.25, Rgb(0xa1, 0xd9, 0x9b)),
    (0.5, Rgb(0x41, 0xab, 0x5d)),
    (0.75, Rgb(0x74, 0xc4, 0x76)),
    (1.0, Rgb(0x00, 0x4b, 0x23)),
];

pub const HEATMAP_SCALE: &[(f64, Rgb)] = &[
    (0.0, Rgb(0xc7, 0xe9, 0xc0)),
    (0.2, Rgb(0xa1, 0xd9, 0x9b)),
    (0.4, Rgb(0x74, 0xc4, 0x76)),
    (0.6, Rgb(0x41, 0xab, 0x5d)),
    (0.8, Rgb(0x23, 0x8b, 0x45)),
    (1.0, Rgb(0x00, 0x6d, 0x2c)),
];

/// ColorBrewer "Greens"
pub const GREENS_SCALE: &[(f64, Rgb)] = &[
    (0.0, Rgb(247, 252, 245)),
    (0.125, Rgb(229, 245, 224)),
    (0.25, Rgb(199, 233, 192)),
    (0.375, Rgb(161, 217, 155)),
    (0.5, Rgb(116, 196, 118)),
    (0.625, Rgb(65, 171, 93)),
    (0.75, Rgb(35, 139, 69)),
    (0.875, Rgb(0, 109, 44)),
    (1.0, Rgb(0, 68, 27)),
];

/// Heatmap color domain. Values outside it take the end colors.
pub const HEATMAP_MIN: f64 = 0.0;
pub const HEATMAP_MAX: f64 = 2.0;

/// Color at position `t` (0..1) of a piecewise-linear scale
pub fn color_at(scale: &[(f64, Rgb)], t: f64) -> String {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    let (first, last) = match (scale.first(), scale.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return "#000000".to_string(),
    };
    if t <= first.0 {
        return first.1.hex();
    }

    for pair in scale.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if t <= p1 {
            let span = p1 - p0;
            let local = if span > 0.0 { (t - p0) / span } else { 1.0 };
            return Rgb::lerp(c0, c1, local).hex();
        }
    }

    last.1.hex()
}

/// Stops as `[position, "#rrggbb"]` for legend gradients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStop(pub f64, pub String);

pub fn scale_stops(scale: &[(f64, Rgb)]) -> Vec<ColorStop> {
    scale.iter().map(|(p, c)| ColorStop(*p, c.hex())).collect()
}

/// Blank cells and NaN both count as missing
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Position of `v` within the finite range of `values`; flat data sits mid-scale
fn normalizer(values: impl Iterator<Item = f64>) -> impl Fn(f64) -> f64 {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    move |v| if max > min { (v - min) / (max - min) } else { 0.5 }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// `0.8` → `"80.00%"`
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

/// Up to three decimals without trailing zeros: `-0.1`, `0.467`, `0`
pub fn format_number(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        _ => s.to_string(),
    }
}

// ============================================================================
// RANKED ADVISOR SCORE BAR
// ============================================================================

/// One bar; `value` is `None` for a blank score, which keeps its slot but draws nothing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBar {
    pub asesor: String,
    pub value: Option<f64>,
    pub label: String,
    pub color: Option<String>,
}

/// Highest score first. Ties keep input order, missing scores go last.
pub fn rank_scores(scores: &[AdvisorScore]) -> Vec<ScoreBar> {
    let mut sorted: Vec<&AdvisorScore> = scores.iter().collect();
    sorted.sort_by(|a, b| descending_missing_last(present(a.puntaje_promedio), present(b.puntaje_promedio)));

    let position = normalizer(scores.iter().filter_map(|s| present(s.puntaje_promedio)));

    sorted
        .into_iter()
        .map(|s| {
            let value = present(s.puntaje_promedio);
            ScoreBar {
                asesor: s.asesor.clone(),
                value,
                label: value.map(|v| format_percent(v, 2)).unwrap_or_default(),
                color: value.map(|v| color_at(SCORE_SCALE, position(v))),
            }
        })
        .collect()
}

fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

// ============================================================================
// CATEGORY HEATMAP
// ============================================================================

/// Advisor × category matrix. Rows follow `advisors`, columns follow `categories`.
///
/// `cells`, `colors` and `hover` share the same shape and are `None` together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub advisors: Vec<String>,
    pub categories: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
    pub colors: Vec<Vec<Option<String>>>,
    /// Tooltip lines, one string per line joined with `\n`
    pub hover: Vec<Vec<Option<String>>>,
    pub zmin: f64,
    pub zmax: f64,
    pub scale: Vec<ColorStop>,
}

fn hover_text(categoria: &str, asesor: &str, value: f64) -> String {
    format!("Categoría: {}\nAsesor: {}\nConteo: {}", categoria, asesor, value)
}

/// Pivot the long table into a dense matrix, labels sorted ascending
pub fn pivot_categories(detail: &[CategoryDetail]) -> Heatmap {
    let advisors: Vec<String> = detail
        .iter()
        .map(|d| d.asesor.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let categories: Vec<String> = detail
        .iter()
        .map(|d| d.categoria.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let row_of: HashMap<&str, usize> = advisors.iter().enumerate().map(|(i, a)| (a.as_str(), i)).collect();
    let col_of: HashMap<&str, usize> = categories.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect();

    let mut cells = vec![vec![None; categories.len()]; advisors.len()];
    for d in detail {
        cells[row_of[d.asesor.as_str()]][col_of[d.categoria.as_str()]] = present(d.promedio_conteo);
    }

    let hover = cells
        .iter()
        .zip(&advisors)
        .map(|(row, asesor)| {
            row.iter()
                .zip(&categories)
                .map(|(cell, categoria)| cell.map(|v| hover_text(categoria, asesor, v)))
                .collect()
        })
        .collect();

    let colors = cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map(|v| color_at(HEATMAP_SCALE, (v - HEATMAP_MIN) / (HEATMAP_MAX - HEATMAP_MIN))))
                .collect()
        })
        .collect();

    Heatmap {
        advisors,
        categories,
        cells,
        colors,
        hover,
        zmin: HEATMAP_MIN,
        zmax: HEATMAP_MAX,
        scale: scale_stops(HEATMAP_SCALE),
    }
}

// ============================================================================
// GAUGES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeBand {
    pub from: f64,
    pub to: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub title: String,
    /// `None` when there is nothing to average
    pub value: Option<f64>,
    pub value_label: String,
    pub min: f64,
    pub max: f64,
    pub reference: f64,
    pub delta: Option<f64>,
    pub delta_label: String,
    pub bar_color: String,
    pub bands: Vec<GaugeBand>,
    pub threshold_color: String,
    pub threshold_width: f64,
    pub threshold_thickness: f64,
}

impl Gauge {
    fn new(title: &str, value: Option<f64>, range: (f64, f64), reference: f64, bands: &[(f64, f64, &str)]) -> Self {
        let delta = value.map(|v| v - reference);
        let delta_label = match delta {
            Some(d) if d > 0.0 => format!("▲{}", format_number(d)),
            Some(d) if d < 0.0 => format!("▼{}", format_number(-d)),
            Some(_) => "0".to_string(),
            None => String::new(),
        };

        Self {
            title: title.to_string(),
            value,
            value_label: value.map(format_number).unwrap_or_else(|| "—".to_string()),
            min: range.0,
            max: range.1,
            reference,
            delta,
            delta_label,
            bar_color: "green".to_string(),
            bands: bands
                .iter()
                .map(|(from, to, color)| GaugeBand { from: *from, to: *to, color: color.to_string() })
                .collect(),
            threshold_color: "black".to_string(),
            threshold_width: 2.0,
            threshold_thickness: 0.75,
        }
    }
}

/// Arithmetic mean; `None` for an empty input. Callers drop missing values first.
pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

pub fn polarity_gauge(samples: &[SentimentSample]) -> Gauge {
    Gauge::new(
        "🔍 Polaridad Promedio General de las Llamadas",
        mean(samples.iter().filter_map(|s| present(s.polarity))),
        (-1.0, 1.0),
        0.0,
        &[(-1.0, -0.3, "#c7e9c0"), (-0.3, 0.3, "#a1d99b"), (0.3, 1.0, "#31a354")],
    )
}

pub fn subjectivity_gauge(samples: &[SentimentSample]) -> Gauge {
    Gauge::new(
        "🔍 Subjectividad Promedio General de las Llamadas",
        mean(samples.iter().filter_map(|s| present(s.subjectivity))),
        (0.0, 1.0),
        0.5,
        &[(0.0, 0.3, "#e5f5e0"), (0.3, 0.7, "#a1d99b"), (0.7, 1.0, "#31a354")],
    )
}

// ============================================================================
// PER-ADVISOR POLARITY BAR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarityBar {
    pub asesor: String,
    pub value: Option<f64>,
    pub label: String,
    pub color: Option<String>,
}

/// One bar per row, input order preserved
pub fn polarity_bars(rows: &[AdvisorPolarity]) -> Vec<PolarityBar> {
    let position = normalizer(rows.iter().filter_map(|r| present(r.polarity)));

    rows.iter()
        .map(|r| {
            let value = present(r.polarity);
            PolarityBar {
                asesor: r.asesor.clone(),
                value,
                label: value.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                color: value.map(|v| color_at(GREENS_SCALE, position(v))),
            }
        })
        .collect()
}
