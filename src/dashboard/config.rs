use crate::dashboard::widget::WidgetKind;
use crate::dashboard::validate::radius_from_text;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

fn default_text_content() -> String {
    "New Text Block. Click \"Edit\" to change me!".into()
}

fn default_chart_title() -> String {
    "My New Chart".into()
}

fn default_dataset() -> Vec<f64> {
    vec![40.0, 25.0, 60.0, 15.0]
}

fn default_radius() -> f64 {
    50.0
}

fn default_color() -> String {
    "#61dafb".into()
}

/// Stored radii are numbers, but layouts saved straight from the editor form
/// carry the text the user typed. Text without a positive number falls back
/// to the default radius.
fn de_radius<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Radius {
        Number(f64),
        Text(String),
    }

    Ok(match Radius::deserialize(deserializer)? {
        Radius::Number(n) => n,
        Radius::Text(text) => radius_from_text(&text).unwrap_or_else(|| {
            tracing::warn!(%text, "unreadable stored radius; using default");
            default_radius()
        }),
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "bar" => Some(ChartType::Bar),
            "line" => Some(ChartType::Line),
            "pie" => Some(ChartType::Pie),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextConfig {
    #[serde(default = "default_text_content")]
    pub content: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: default_text_content(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default = "default_dataset")]
    pub dataset: Vec<f64>,
    #[serde(default = "default_chart_title")]
    pub title: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Bar,
            dataset: default_dataset(),
            title: default_chart_title(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableConfig {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

impl Default for TableConfig {
    fn default() -> Self {
        let rows = [("A", 10), ("B", 20)]
            .into_iter()
            .map(|(product, quantity)| {
                let mut row = Map::new();
                row.insert("Product".into(), json!(product));
                row.insert("Quantity".into(), json!(quantity));
                row
            })
            .collect();
        Self {
            columns: vec!["Product".into(), "Quantity".into()],
            rows,
        }
    }
}

impl TableConfig {
    /// Columns to display. Falls back to the keys of the first row when no
    /// columns were configured.
    pub fn effective_columns(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        self.rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorConfig {
    #[serde(default = "default_radius", deserialize_with = "de_radius")]
    pub radius: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            color: default_color(),
        }
    }
}

/// Typed configuration payload, one variant per [`WidgetKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetConfig {
    Text(TextConfig),
    Chart(ChartConfig),
    Table(TableConfig),
    Vector(VectorConfig),
}

impl WidgetConfig {
    /// Payload given to widgets freshly dropped from the toolbox.
    pub fn default_for(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Text => WidgetConfig::Text(TextConfig::default()),
            WidgetKind::Chart => WidgetConfig::Chart(ChartConfig::default()),
            WidgetKind::Table => WidgetConfig::Table(TableConfig::default()),
            WidgetKind::Vector => WidgetConfig::Vector(VectorConfig::default()),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetConfig::Text(_) => WidgetKind::Text,
            WidgetConfig::Chart(_) => WidgetKind::Chart,
            WidgetConfig::Table(_) => WidgetKind::Table,
            WidgetConfig::Vector(_) => WidgetKind::Vector,
        }
    }

    /// JSON object form used on the wire and for shallow merges.
    pub fn to_value(&self) -> Value {
        let value = match self {
            WidgetConfig::Text(c) => serde_json::to_value(c),
            WidgetConfig::Chart(c) => serde_json::to_value(c),
            WidgetConfig::Table(c) => serde_json::to_value(c),
            WidgetConfig::Vector(c) => serde_json::to_value(c),
        };
        value.unwrap_or_else(|_| json!({}))
    }

    /// Decode a payload for `kind`. Missing fields take the kind's defaults;
    /// fields of the wrong shape are an error.
    pub fn from_value(kind: WidgetKind, value: &Value) -> Result<Self, serde_json::Error> {
        let value = if value.is_null() {
            json!({})
        } else {
            value.clone()
        };
        Ok(match kind {
            WidgetKind::Text => WidgetConfig::Text(serde_json::from_value(value)?),
            WidgetKind::Chart => WidgetConfig::Chart(serde_json::from_value(value)?),
            WidgetKind::Table => WidgetConfig::Table(serde_json::from_value(value)?),
            WidgetKind::Vector => WidgetConfig::Vector(serde_json::from_value(value)?),
        })
    }

    /// Shallow-merge `partial` over this payload. The kind is preserved.
    pub fn merged(&self, partial: &Value) -> Result<Self, serde_json::Error> {
        Self::from_value(self.kind(), &overlay_fields(self.to_value(), partial))
    }
}

/// Top-level fields of `partial` replace those of `payload`; nested values
/// are swapped whole. A non-object on either side yields `partial`.
pub(crate) fn overlay_fields(payload: Value, partial: &Value) -> Value {
    match (payload, partial) {
        (Value::Object(mut fields), Value::Object(updates)) => {
            fields.extend(updates.iter().map(|(key, value)| (key.clone(), value.clone())));
            Value::Object(fields)
        }
        _ => partial.clone(),
    }
}
