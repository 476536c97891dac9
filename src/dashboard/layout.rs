use crate::dashboard::config::WidgetConfig;
use crate::dashboard::toolbox::ToolboxItem;
use crate::dashboard::widget::{GridPos, GridSize, Widget};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Id the grid renderer uses for the drop preview while a toolbox item is
/// dragged over the dashboard. Never committed as a widget.
pub const DROP_PLACEHOLDER_ID: &str = "__dropping__";

/// One entry of the renderer's layout: where a widget currently sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutItem {
    pub fn new(id: impl Into<String>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
        }
    }

    pub fn from_widget(widget: &Widget) -> Self {
        Self::new(
            widget.id(),
            widget.position.x,
            widget.position.y,
            widget.size.w,
            widget.size.h,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateError {
    /// The partial payload was not a JSON object.
    NotAnObject,
    /// Merging produced a payload that does not fit the widget's kind.
    Incompatible { id: String, reason: String },
}

impl std::fmt::Display for UpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateError::NotAnObject => write!(f, "widget data update must be a JSON object"),
            UpdateError::Incompatible { id, reason } => {
                write!(f, "widget '{id}' rejected data update: {reason}")
            }
        }
    }
}

impl std::error::Error for UpdateError {}

/// Owns the ordered widget collection and applies every mutation to it.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    widgets: Vec<Widget>,
    seq: u64,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine from an existing collection. Later duplicates of an id
    /// are dropped.
    pub fn from_widgets(widgets: Vec<Widget>) -> Self {
        let mut engine = Self::new();
        engine.replace_all(widgets);
        engine
    }

    /// Swap the whole collection, e.g. after loading a saved layout.
    pub fn replace_all(&mut self, widgets: Vec<Widget>) {
        let mut seen = HashSet::new();
        self.widgets = widgets
            .into_iter()
            .filter(|w| {
                let fresh = seen.insert(w.id().to_string());
                if !fresh {
                    tracing::warn!(id = %w.id(), "duplicate widget id dropped");
                }
                fresh
            })
            .collect();
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Position and size of every widget, in collection order, for the
    /// grid renderer.
    pub fn layout(&self) -> Vec<LayoutItem> {
        self.widgets.iter().map(LayoutItem::from_widget).collect()
    }

    fn next_id(&mut self) -> String {
        loop {
            self.seq += 1;
            let id = format!("widget-{}-{}", Local::now().timestamp_millis(), self.seq);
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Create the widget produced by dropping `item` at `drop`.
    pub fn place_new_widget(&mut self, item: &ToolboxItem, drop: GridPos) -> &Widget {
        let id = self.next_id();
        let widget = Widget::new(id, drop, item.size(), WidgetConfig::default_for(item.kind));
        tracing::debug!(
            id = %widget.id(),
            kind = %item.kind,
            x = drop.x,
            y = drop.y,
            "widget placed"
        );
        let index = self.widgets.len();
        self.widgets.push(widget);
        &self.widgets[index]
    }

    /// Apply the renderer's current layout. Widgets missing from `layout`
    /// are dropped; unknown and placeholder entries are ignored. Collection
    /// order is preserved. Returns the number of widgets dropped.
    pub fn reconcile(&mut self, layout: &[LayoutItem]) -> usize {
        // first entry wins when the renderer repeats an id
        let mut by_id: HashMap<&str, &LayoutItem> = HashMap::with_capacity(layout.len());
        for item in layout.iter().filter(|item| item.id != DROP_PLACEHOLDER_ID) {
            by_id.entry(item.id.as_str()).or_insert(item);
        }
        let before = self.widgets.len();
        self.widgets.retain_mut(|widget| match by_id.get(widget.id()) {
            Some(item) => {
                widget.position = GridPos::new(item.x, item.y);
                widget.size = GridSize::new(item.w, item.h);
                true
            }
            None => {
                tracing::debug!(id = %widget.id(), "widget absent from layout; dropped");
                false
            }
        });
        before - self.widgets.len()
    }

    /// Shallow-merge `partial` into the configuration of widget `id`.
    ///
    /// Returns `Ok(false)` when no widget has that id.
    pub fn update_widget_data(&mut self, id: &str, partial: &Value) -> Result<bool, UpdateError> {
        if !partial.is_object() {
            return Err(UpdateError::NotAnObject);
        }
        let Some(widget) = self.widgets.iter_mut().find(|w| w.id() == id) else {
            return Ok(false);
        };
        let merged = widget
            .config()
            .merged(partial)
            .map_err(|e| UpdateError::Incompatible {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        widget.replace_config(merged);
        tracing::debug!(id, "widget data updated");
        Ok(true)
    }

    pub fn remove(&mut self, id: &str) -> Option<Widget> {
        let index = self.widgets.iter().position(|w| w.id() == id)?;
        let removed = self.widgets.remove(index);
        tracing::info!(id, kind = %removed.kind(), "widget removed");
        Some(removed)
    }

    pub fn clear_all(&mut self) {
        tracing::info!(count = self.widgets.len(), "all widgets cleared");
        self.widgets.clear();
    }
}
