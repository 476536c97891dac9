use crate::dashboard::config::{ChartConfig, ChartType, TableConfig, TextConfig, WidgetConfig};
use crate::dashboard::store::KeyValueStore;
use crate::dashboard::toolbox::ToolboxItem;
use crate::dashboard::widget::{GridPos, GridSize, Widget, WidgetKind};
use anyhow::Context;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Key under which the whole widget collection is stored.
pub const STORAGE_KEY: &str = "dashboardWidgets";

/// Why a stored layout could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Nothing has been saved under the key.
    NotFound,
    /// The stored value failed to parse or does not have the expected shape.
    Corrupted(String),
    /// The store itself could not be read.
    Unavailable(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NotFound => write!(f, "no saved dashboard found"),
            LoadError::Corrupted(reason) => write!(f, "saved dashboard is corrupted: {reason}"),
            LoadError::Unavailable(reason) => write!(f, "dashboard storage unavailable: {reason}"),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Serialize)]
struct StoredWidget<'a> {
    id: &'a str,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    #[serde(rename = "type")]
    kind: WidgetKind,
    data: Value,
}

impl<'a> StoredWidget<'a> {
    fn from_widget(widget: &'a Widget) -> Self {
        Self {
            id: widget.id(),
            x: widget.position.x,
            y: widget.position.y,
            w: widget.size.w,
            h: widget.size.h,
            kind: widget.kind(),
            data: widget.config().to_value(),
        }
    }
}

/// Serializes the widget collection to a [`KeyValueStore`] and back.
pub struct PersistenceAdapter<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Overwrite the stored collection with `widgets`.
    pub fn save(&mut self, widgets: &[Widget]) -> anyhow::Result<()> {
        let records: Vec<StoredWidget<'_>> = widgets.iter().map(StoredWidget::from_widget).collect();
        let json = serde_json::to_string(&records).context("serialize dashboard widgets")?;
        self.store
            .set(&self.key, &json)
            .with_context(|| format!("store dashboard under '{}'", self.key))?;
        tracing::info!(count = widgets.len(), key = %self.key, "dashboard saved");
        Ok(())
    }

    /// Read the stored collection. Never substitutes defaults; callers decide
    /// what to show on [`LoadError::NotFound`] or [`LoadError::Corrupted`].
    pub fn load(&self) -> Result<Vec<Widget>, LoadError> {
        let raw = self
            .store
            .get(&self.key)
            .map_err(|e| LoadError::Unavailable(format!("{e:#}")))?
            .ok_or(LoadError::NotFound)?;
        let widgets = decode_widgets(&raw)?;
        tracing::info!(count = widgets.len(), key = %self.key, "dashboard loaded");
        Ok(widgets)
    }

    /// Delete the stored collection.
    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.store
            .remove(&self.key)
            .with_context(|| format!("remove stored dashboard '{}'", self.key))?;
        tracing::info!(key = %self.key, "stored dashboard cleared");
        Ok(())
    }
}

/// Parse a stored document. The outer shape must be an array of objects
/// that each carry an id; every record must then decode into a widget.
pub fn decode_widgets(raw: &str) -> Result<Vec<Widget>, LoadError> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| LoadError::Corrupted(format!("not valid JSON: {e}")))?;
    let Value::Array(items) = doc else {
        return Err(LoadError::Corrupted("expected an array of widgets".into()));
    };
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(obj) if record_id(obj).is_some() => records.push(obj),
            _ => {
                return Err(LoadError::Corrupted(format!(
                    "entry {index} is not an object with an id"
                )))
            }
        }
    }

    let mut seen = HashSet::new();
    let mut widgets = Vec::with_capacity(records.len());
    for (index, obj) in records.into_iter().enumerate() {
        let widget = decode_widget(obj)
            .map_err(|reason| LoadError::Corrupted(format!("entry {index}: {reason}")))?;
        if !seen.insert(widget.id().to_string()) {
            return Err(LoadError::Corrupted(format!(
                "entry {index}: duplicate id '{}'",
                widget.id()
            )));
        }
        widgets.push(widget);
    }
    Ok(widgets)
}

fn record_id(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("id").or_else(|| obj.get("i"))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn grid_number(obj: &Map<String, Value>, key: &str, fallback: u32, min: u32) -> Result<u32, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(fallback),
        Some(Value::Number(n)) => {
            let value = n.as_f64().filter(|v| v.is_finite()).ok_or_else(|| format!("'{key}' is not finite"))?;
            Ok((value.round().max(min as f64)).min(u32::MAX as f64) as u32)
        }
        Some(_) => Err(format!("'{key}' is not a number")),
    }
}

fn decode_widget(obj: &Map<String, Value>) -> Result<Widget, String> {
    let id = record_id(obj).ok_or("missing id")?;
    let kind = match obj.get("type") {
        Some(Value::String(s)) => {
            WidgetKind::parse(s).ok_or_else(|| format!("unknown widget type '{s}'"))?
        }
        _ => return Err("missing widget type".into()),
    };
    let footprint = ToolboxItem::for_kind(kind);
    let x = grid_number(obj, "x", 0, 0)?;
    let y = grid_number(obj, "y", 0, 0)?;
    let w = grid_number(obj, "w", footprint.w, 1)?;
    let h = grid_number(obj, "h", footprint.h, 1)?;
    let data = obj.get("data").cloned().unwrap_or(Value::Null);
    if !(data.is_null() || data.is_object()) {
        return Err("'data' is not an object".into());
    }
    let config = WidgetConfig::from_value(kind, &data).map_err(|e| format!("bad data: {e}"))?;
    Ok(Widget::new(
        id,
        GridPos::new(x, y),
        GridSize::new(w, h),
        config,
    ))
}

/// The three-widget layout used on first run and after corruption.
pub fn default_seed() -> Vec<Widget> {
    let person = |name: &str, age: u32| {
        let mut row = Map::new();
        row.insert("Name".into(), json!(name));
        row.insert("Age".into(), json!(age));
        row
    };
    vec![
        Widget::new(
            "1",
            GridPos::new(0, 0),
            GridSize::new(2, 3),
            WidgetConfig::Text(TextConfig {
                content: "Welcome to your Dashboard!".into(),
            }),
        ),
        Widget::new(
            "2",
            GridPos::new(2, 0),
            GridSize::new(5, 4),
            WidgetConfig::Chart(ChartConfig {
                chart_type: ChartType::Bar,
                dataset: vec![10.0, 20.0, 30.0],
                title: "My First Chart".into(),
            }),
        ),
        Widget::new(
            "3",
            GridPos::new(7, 0),
            GridSize::new(4, 4),
            WidgetConfig::Table(TableConfig {
                columns: vec!["Name".into(), "Age".into()],
                rows: vec![person("Alice", 30), person("Bob", 24)],
            }),
        ),
    ]
}
