//! Per-type validation of staged widget configuration.
//!
//! Editors stage configuration as loosely typed form values (strings for
//! numeric inputs, a raw JSON document for tables). Validation turns those
//! into a field → message map; only an empty map may be committed.

use crate::dashboard::config::{
    ChartConfig, ChartType, TableConfig, TextConfig, VectorConfig, WidgetConfig,
};
use crate::dashboard::widget::WidgetKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const FIELD_CONTENT: &str = "content";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_DATASET: &str = "dataset";
pub const FIELD_CHART_TYPE: &str = "chartType";
pub const FIELD_TABLE_DATA: &str = "tableData";
pub const FIELD_RADIUS: &str = "radius";
pub const FIELD_COLOR: &str = "color";

pub const MSG_TABLE_INVALID_JSON: &str = "Invalid JSON format for table data.";

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").unwrap());

/// Field name → human readable message. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// No edit session is open.
    NoSession,
    UnknownField { kind: WidgetKind, field: String },
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::NoSession => write!(f, "no widget is being edited"),
            StageError::UnknownField { kind, field } => {
                write!(f, "{kind} widgets have no field '{field}'")
            }
        }
    }
}

impl std::error::Error for StageError {}

/// In-progress, not yet validated configuration held by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedConfig {
    Text {
        content: String,
    },
    Chart {
        chart_type: String,
        dataset: Vec<f64>,
        title: String,
    },
    Table {
        raw: String,
    },
    Vector {
        radius: String,
        color: String,
    },
}

impl StagedConfig {
    /// Stage a copy of a committed configuration.
    pub fn from_config(config: &WidgetConfig) -> Self {
        match config {
            WidgetConfig::Text(c) => StagedConfig::Text {
                content: c.content.clone(),
            },
            WidgetConfig::Chart(c) => StagedConfig::Chart {
                chart_type: c.chart_type.as_str().to_string(),
                dataset: c.dataset.clone(),
                title: c.title.clone(),
            },
            WidgetConfig::Table(c) => StagedConfig::Table {
                raw: table_document(c),
            },
            WidgetConfig::Vector(c) => StagedConfig::Vector {
                radius: format_number(c.radius),
                color: c.color.clone(),
            },
        }
    }

    /// Stage an untyped payload. Missing or oddly typed fields stage as
    /// empty values so validation reports them instead of failing here.
    pub fn from_value(kind: WidgetKind, value: &Value) -> Self {
        let text = |key: &str| -> String {
            match value.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                _ => String::new(),
            }
        };
        match kind {
            WidgetKind::Text => StagedConfig::Text {
                content: text(FIELD_CONTENT),
            },
            WidgetKind::Chart => {
                let dataset = match value.get(FIELD_DATASET) {
                    Some(Value::Array(items)) => items.iter().filter_map(Value::as_f64).collect(),
                    Some(Value::String(s)) => parse_dataset(s),
                    _ => Vec::new(),
                };
                let chart_type = match value.get(FIELD_CHART_TYPE) {
                    Some(Value::String(s)) => s.clone(),
                    _ => ChartType::default().as_str().to_string(),
                };
                StagedConfig::Chart {
                    chart_type,
                    dataset,
                    title: text(FIELD_TITLE),
                }
            }
            WidgetKind::Table => {
                let raw = match value.get("rawTableData") {
                    Some(Value::String(s)) => s.clone(),
                    _ => {
                        let doc = json!({
                            "columns": value.get("columns").cloned().unwrap_or_else(|| json!([])),
                            "rows": value.get("rows").cloned().unwrap_or_else(|| json!([])),
                        });
                        serde_json::to_string_pretty(&doc).unwrap_or_default()
                    }
                };
                StagedConfig::Table { raw }
            }
            WidgetKind::Vector => StagedConfig::Vector {
                radius: text(FIELD_RADIUS),
                color: text(FIELD_COLOR),
            },
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            StagedConfig::Text { .. } => WidgetKind::Text,
            StagedConfig::Chart { .. } => WidgetKind::Chart,
            StagedConfig::Table { .. } => WidgetKind::Table,
            StagedConfig::Vector { .. } => WidgetKind::Vector,
        }
    }

    /// Apply one form edit. The dataset field takes comma-separated text.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), StageError> {
        match (self, field) {
            (StagedConfig::Text { content }, FIELD_CONTENT) => *content = value.to_string(),
            (StagedConfig::Chart { title, .. }, FIELD_TITLE) => *title = value.to_string(),
            (StagedConfig::Chart { chart_type, .. }, FIELD_CHART_TYPE) => {
                *chart_type = value.to_string()
            }
            (StagedConfig::Chart { dataset, .. }, FIELD_DATASET) => *dataset = parse_dataset(value),
            (StagedConfig::Table { raw }, FIELD_TABLE_DATA) => *raw = value.to_string(),
            (StagedConfig::Vector { radius, .. }, FIELD_RADIUS) => *radius = value.to_string(),
            (StagedConfig::Vector { color, .. }, FIELD_COLOR) => *color = value.to_string(),
            (staged, _) => {
                return Err(StageError::UnknownField {
                    kind: staged.kind(),
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Current form value of `field`, as an editor would display it.
    pub fn field_value(&self, field: &str) -> Option<String> {
        match (self, field) {
            (StagedConfig::Text { content }, FIELD_CONTENT) => Some(content.clone()),
            (StagedConfig::Chart { title, .. }, FIELD_TITLE) => Some(title.clone()),
            (StagedConfig::Chart { chart_type, .. }, FIELD_CHART_TYPE) => Some(chart_type.clone()),
            (StagedConfig::Chart { dataset, .. }, FIELD_DATASET) => Some(
                dataset
                    .iter()
                    .map(|n| format_number(*n))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            (StagedConfig::Table { raw }, FIELD_TABLE_DATA) => Some(raw.clone()),
            (StagedConfig::Vector { radius, .. }, FIELD_RADIUS) => Some(radius.clone()),
            (StagedConfig::Vector { color, .. }, FIELD_COLOR) => Some(color.clone()),
            _ => None,
        }
    }
}

fn table_document(table: &TableConfig) -> String {
    serde_json::to_string_pretty(table).unwrap_or_else(|_| "{}".into())
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parse comma-separated numbers. Each token contributes its leading number
/// (`"10px"` is 10); tokens without one are dropped.
pub fn parse_dataset(text: &str) -> Vec<f64> {
    text.split(',')
        .filter_map(parse_leading_float)
        .filter(|n| !n.is_nan())
        .collect()
}

/// Value of the longest numeric prefix of `text`: optional sign, digits with
/// an optional fraction, and an optional exponent. The literal `Infinity`
/// yields an infinite value, which validation later rejects.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if trimmed[sign..].starts_with("Infinity") {
        return Some(if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = digits(sign);
    let mut end = sign + int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    trimmed[..end].parse().ok()
}

/// Integer value of the leading digits of `text`, with an optional sign.
/// `"12px"` is 12; `"px"` has no value.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Radius value for editor or stored text: the whole text when it is a
/// positive number, otherwise its positive leading integer.
pub fn radius_from_text(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r > 0.0)
        .or_else(|| parse_leading_int(text).filter(|r| *r > 0).map(|r| r as f64))
}

pub fn is_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

enum TableCheck {
    Empty,
    Malformed,
    WrongShape,
    BadElements,
    Ok(TableConfig),
}

fn check_table(raw: &str) -> TableCheck {
    if raw.trim().is_empty() {
        return TableCheck::Empty;
    }
    let Ok(doc) = serde_json::from_str::<Value>(raw) else {
        return TableCheck::Malformed;
    };
    let columns_ok = doc.get("columns").is_some_and(Value::is_array);
    let rows_ok = doc.get("rows").is_some_and(Value::is_array);
    if !columns_ok || !rows_ok {
        return TableCheck::WrongShape;
    }
    match serde_json::from_value::<TableConfig>(json!({
        "columns": doc["columns"].clone(),
        "rows": doc["rows"].clone(),
    })) {
        Ok(table) => TableCheck::Ok(table),
        Err(_) => TableCheck::BadElements,
    }
}

/// Whether a raw table document parses as JSON at all.
pub fn table_document_parses(raw: &str) -> bool {
    serde_json::from_str::<Value>(raw).is_ok()
}

/// Validate a staged configuration against the rules for its kind.
pub fn validate(staged: &StagedConfig) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    match staged {
        StagedConfig::Text { content } => {
            if content.trim().is_empty() {
                errors.insert(FIELD_CONTENT, "Text content cannot be empty.");
            }
        }
        StagedConfig::Chart {
            chart_type,
            dataset,
            title,
        } => {
            if title.trim().is_empty() {
                errors.insert(FIELD_TITLE, "Chart title cannot be empty.");
            }
            if dataset.is_empty() || dataset.iter().any(|n| !n.is_finite()) {
                errors.insert(
                    FIELD_DATASET,
                    "Dataset must be a comma-separated list of numbers.",
                );
            }
            if ChartType::parse(chart_type).is_none() {
                errors.insert(FIELD_CHART_TYPE, "Chart type must be bar, line or pie.");
            }
        }
        StagedConfig::Table { raw } => match check_table(raw) {
            TableCheck::Empty => errors.insert(FIELD_TABLE_DATA, "Table data cannot be empty."),
            TableCheck::Malformed => errors.insert(FIELD_TABLE_DATA, MSG_TABLE_INVALID_JSON),
            TableCheck::WrongShape => errors.insert(
                FIELD_TABLE_DATA,
                "Table data must be a JSON object with \"columns\" (array) and \"rows\" (array).",
            ),
            TableCheck::BadElements => errors.insert(
                FIELD_TABLE_DATA,
                "Table \"columns\" must contain strings and \"rows\" must contain objects.",
            ),
            TableCheck::Ok(_) => {}
        },
        StagedConfig::Vector { radius, color } => {
            if !parse_leading_int(radius).is_some_and(|r| r > 0) {
                errors.insert(FIELD_RADIUS, "Radius must be a positive number.");
            }
            if !is_hex_color(color) {
                errors.insert(
                    FIELD_COLOR,
                    "Color must be a valid hex code (e.g., #RRGGBB).",
                );
            }
        }
    }
    errors
}

/// Validate and convert a staged configuration into a committed one.
pub fn commit(staged: &StagedConfig) -> Result<WidgetConfig, ValidationErrors> {
    let errors = validate(staged);
    if !errors.is_empty() {
        return Err(errors);
    }
    let config = match staged {
        StagedConfig::Text { content } => WidgetConfig::Text(TextConfig {
            content: content.clone(),
        }),
        StagedConfig::Chart {
            chart_type,
            dataset,
            title,
        } => WidgetConfig::Chart(ChartConfig {
            chart_type: ChartType::parse(chart_type).unwrap_or_default(),
            dataset: dataset.clone(),
            title: title.clone(),
        }),
        StagedConfig::Table { raw } => match check_table(raw) {
            TableCheck::Ok(table) => WidgetConfig::Table(table),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.insert(FIELD_TABLE_DATA, MSG_TABLE_INVALID_JSON);
                return Err(errors);
            }
        },
        StagedConfig::Vector { radius, color } => WidgetConfig::Vector(VectorConfig {
            radius: radius_from_text(radius).unwrap_or_default(),
            color: color.clone(),
        }),
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_with_negative_radius_and_named_color_fails_both() {
        let staged = StagedConfig::from_value(
            WidgetKind::Vector,
            &json!({"radius": -5, "color": "blue"}),
        );
        let errors = validate(&staged);
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(FIELD_RADIUS));
        assert!(errors.contains(FIELD_COLOR));
    }

    #[test]
    fn blank_text_is_rejected() {
        let staged = StagedConfig::from_value(WidgetKind::Text, &json!({"content": "  "}));
        let errors = validate(&staged);
        assert_eq!(errors.get(FIELD_CONTENT), Some("Text content cannot be empty."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn malformed_table_json_is_a_single_field_error() {
        let staged =
            StagedConfig::from_value(WidgetKind::Table, &json!({"rawTableData": "{not json"}));
        let errors = validate(&staged);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FIELD_TABLE_DATA), Some(MSG_TABLE_INVALID_JSON));
    }

    #[test]
    fn table_requires_array_columns_and_rows() {
        let staged = StagedConfig::Table {
            raw: r#"{"columns": "Name", "rows": []}"#.into(),
        };
        let errors = validate(&staged);
        assert!(errors
            .get(FIELD_TABLE_DATA)
            .unwrap()
            .contains("\"columns\" (array)"));
        let blank = StagedConfig::Table { raw: "   ".into() };
        assert_eq!(
            validate(&blank).get(FIELD_TABLE_DATA),
            Some("Table data cannot be empty.")
        );
        let bad_rows = StagedConfig::Table {
            raw: r#"{"columns": ["a"], "rows": [1]}"#.into(),
        };
        assert!(validate(&bad_rows).contains(FIELD_TABLE_DATA));
    }

    #[test]
    fn chart_dataset_drops_invalid_tokens_then_requires_values() {
        assert_eq!(parse_dataset("1, 2.5, x, ,4"), vec![1.0, 2.5, 4.0]);
        let mut staged = StagedConfig::from_config(&WidgetConfig::default_for(WidgetKind::Chart));
        staged.set_field(FIELD_DATASET, "a,b,c").unwrap();
        let errors = validate(&staged);
        assert_eq!(
            errors.get(FIELD_DATASET),
            Some("Dataset must be a comma-separated list of numbers.")
        );
        staged.set_field(FIELD_DATASET, "1, inf").unwrap();
        assert_eq!(staged.field_value(FIELD_DATASET).as_deref(), Some("1"));
        assert!(!validate(&staged).contains(FIELD_DATASET));
        staged.set_field(FIELD_DATASET, "1, Infinity").unwrap();
        assert!(validate(&staged).contains(FIELD_DATASET));
    }

    #[test]
    fn dataset_tokens_keep_their_numeric_prefix() {
        assert_eq!(parse_dataset("10px, 20px"), vec![10.0, 20.0]);
        assert_eq!(parse_dataset("1e3kg, -.5, +2.e1, 3.x"), vec![1000.0, -0.5, 20.0, 3.0]);
        assert_eq!(parse_dataset("e5, ., -, NaN"), Vec::<f64>::new());
        assert_eq!(parse_leading_float("7e"), Some(7.0));
        assert_eq!(parse_leading_float("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_leading_float("inf"), None);
    }

    #[test]
    fn radius_text_prefers_full_number_then_leading_integer() {
        assert_eq!(radius_from_text("12.5"), Some(12.5));
        assert_eq!(radius_from_text("40px"), Some(40.0));
        assert_eq!(radius_from_text("0"), None);
        assert_eq!(radius_from_text("abc"), None);
    }

    #[test]
    fn chart_title_and_type_are_checked() {
        let staged = StagedConfig::Chart {
            chart_type: "radar".into(),
            dataset: vec![1.0],
            title: " ".into(),
        };
        let errors = validate(&staged);
        assert!(errors.contains(FIELD_TITLE));
        assert!(errors.contains(FIELD_CHART_TYPE));
        assert!(!errors.contains(FIELD_DATASET));
    }

    #[test]
    fn radius_uses_leading_integer() {
        assert_eq!(parse_leading_int("12px"), Some(12));
        assert_eq!(parse_leading_int(" -5"), Some(-5));
        assert_eq!(parse_leading_int("0.9"), Some(0));
        assert_eq!(parse_leading_int("abc"), None);
        let staged = StagedConfig::Vector {
            radius: "0.9".into(),
            color: "#abc".into(),
        };
        assert!(validate(&staged).contains(FIELD_RADIUS));
    }

    #[test]
    fn hex_colors_accept_short_and_long_forms() {
        assert!(is_hex_color("#61dafb"));
        assert!(is_hex_color("#ABC"));
        assert!(!is_hex_color("#abcd"));
        assert!(!is_hex_color("61dafb"));
    }

    #[test]
    fn commit_parses_table_document_into_columns_and_rows() {
        let staged = StagedConfig::Table {
            raw: r#"{"columns": ["City"], "rows": [{"City": "Oslo"}], "extra": 1}"#.into(),
        };
        let WidgetConfig::Table(table) = commit(&staged).unwrap() else {
            panic!("expected table config");
        };
        assert_eq!(table.columns, vec!["City".to_string()]);
        assert_eq!(table.rows[0]["City"], json!("Oslo"));
    }

    #[test]
    fn commit_converts_vector_radius_to_number() {
        let staged = StagedConfig::Vector {
            radius: "75".into(),
            color: "#fff".into(),
        };
        assert_eq!(
            commit(&staged).unwrap(),
            WidgetConfig::Vector(VectorConfig {
                radius: 75.0,
                color: "#fff".into()
            })
        );
    }

    #[test]
    fn staged_defaults_round_trip_through_commit() {
        for kind in WidgetKind::ALL {
            let config = WidgetConfig::default_for(kind);
            let staged = StagedConfig::from_config(&config);
            assert_eq!(commit(&staged).unwrap(), config);
        }
    }

    #[test]
    fn set_field_rejects_fields_of_other_kinds() {
        let mut staged = StagedConfig::Text {
            content: String::new(),
        };
        assert_eq!(
            staged.set_field(FIELD_RADIUS, "3"),
            Err(StageError::UnknownField {
                kind: WidgetKind::Text,
                field: FIELD_RADIUS.into()
            })
        );
    }

    #[test]
    fn dataset_field_value_is_comma_joined() {
        let staged = StagedConfig::Chart {
            chart_type: "bar".into(),
            dataset: vec![10.0, 2.5],
            title: "t".into(),
        };
        assert_eq!(staged.field_value(FIELD_DATASET).as_deref(), Some("10, 2.5"));
    }
}
