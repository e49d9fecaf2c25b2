//! Schema-agnostic summary of a conversion payload.
//!
//! Each converter on the service side (PDF, spreadsheet, document, log, XML)
//! returns a differently shaped `data` object. Rather than deserialising into
//! one rigid struct, [`summarize`] runs a fixed, ordered list of independent
//! probes over the untyped [`Value`], and every probe that finds its field
//! yields one [`Metric`].
//!
//! ## Presence rule
//!
//! A field is present when it exists and is not JSON `null`. A count of zero
//! is present and renders as `0`; `"errorCount": 0` on a clean log is
//! information, and so is `"totalPages": 0` on an empty document.
//!
//! ## Probe order
//!
//! Output order follows [`PROBES`], never the key order of the payload:
//! page/slide/sheet counts, then paragraph/table counts, then lines, then
//! errors, then the root element and finally the file type label.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Visual weight of a metric, mapped to a colour class by front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Green,
    Orange,
    Purple,
    Yellow,
    Red,
    Blue,
}

impl Emphasis {
    /// Stylesheet class for web front ends.
    pub fn class(self) -> &'static str {
        match self {
            Emphasis::Green => "text-green-400",
            Emphasis::Orange => "text-orange-400",
            Emphasis::Purple => "text-purple-400",
            Emphasis::Yellow => "text-yellow-400",
            Emphasis::Red => "text-red-400",
            Emphasis::Blue => "text-blue-400",
        }
    }
}

/// One probe: payload field, display label, emphasis.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub field: &'static str,
    pub label: &'static str,
    pub emphasis: Emphasis,
}

/// The fixed probe list. Order is significant.
pub const PROBES: &[Probe] = &[
    Probe { field: "totalPages", label: "Pages", emphasis: Emphasis::Green },
    Probe { field: "totalSlides", label: "Slides", emphasis: Emphasis::Orange },
    Probe { field: "totalSheets", label: "Sheets", emphasis: Emphasis::Green },
    Probe { field: "totalParagraphs", label: "Paragraphs", emphasis: Emphasis::Purple },
    Probe { field: "totalTables", label: "Tables", emphasis: Emphasis::Purple },
    Probe { field: "totalLines", label: "Lines", emphasis: Emphasis::Yellow },
    Probe { field: "errorCount", label: "Errors", emphasis: Emphasis::Red },
    Probe { field: "rootElement", label: "Root element", emphasis: Emphasis::Blue },
    Probe { field: "fileType", label: "Type", emphasis: Emphasis::Blue },
];

/// Field holding the per-level tally on log payloads.
pub const CATEGORY_FIELD: &str = "logLevelStats";

/// A display-ready summary value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    /// Raw payload value; rendered through [`Metric::display_value`].
    pub value: Value,
    pub emphasis: Emphasis,
}

impl Metric {
    /// Best-effort string form of the value: strings unquoted, everything
    /// else as compact JSON.
    pub fn display_value(&self) -> String {
        coerce_to_string(&self.value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.display_value())
    }
}

/// Classification of a category in the secondary tally group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Default,
}

impl Severity {
    /// Classify a category name such as `"ERROR"` or `"Warn"`.
    pub fn classify(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" | "err" | "fatal" | "critical" | "crit" | "severe" | "emergency" | "alert" => {
                Severity::Error
            }
            "warn" | "warning" => Severity::Warning,
            "info" | "information" | "notice" => Severity::Info,
            _ => Severity::Default,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Severity::Error => "text-red-400",
            Severity::Warning => "text-yellow-400",
            Severity::Info => "text-blue-400",
            Severity::Default => "text-gray-400",
        }
    }
}

/// One entry of the secondary category→count group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: Value,
    pub severity: Severity,
}

/// Metrics plus the optional category group, ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub metrics: Vec<Metric>,
    pub categories: Vec<CategoryCount>,
}

impl Summary {
    pub fn of(payload: &Value) -> Self {
        Self {
            metrics: summarize(payload),
            categories: summarize_categories(payload),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.categories.is_empty()
    }
}

/// Probe `payload` for the known fields, in [`PROBES`] order.
///
/// Total over any JSON value: non-objects and absent fields yield nothing.
pub fn summarize(payload: &Value) -> Vec<Metric> {
    PROBES
        .iter()
        .filter_map(|probe| {
            probe_field(payload, probe.field).map(|value| Metric {
                label: probe.label,
                value: value.clone(),
                emphasis: probe.emphasis,
            })
        })
        .collect()
}

/// Extract the `logLevelStats` tally, preserving the payload's key order.
pub fn summarize_categories(payload: &Value) -> Vec<CategoryCount> {
    let Some(Value::Object(stats)) = payload.get(CATEGORY_FIELD) else {
        return Vec::new();
    };
    stats
        .iter()
        .map(|(name, count)| CategoryCount {
            name: name.clone(),
            count: count.clone(),
            severity: Severity::classify(name),
        })
        .collect()
}

fn probe_field<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    match payload.get(field) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    }
}

/// String coercion used for every rendered value.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
