use crate::dashboard::config::WidgetConfig;
use serde::{Deserialize, Serialize};

/// Closed set of widget types. The type of a widget never changes after it
/// has been created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Text,
    Chart,
    Table,
    /// Circle drawn with vector primitives. Older layouts stored it as `d3`.
    #[serde(alias = "d3")]
    Vector,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 4] = [
        WidgetKind::Text,
        WidgetKind::Chart,
        WidgetKind::Table,
        WidgetKind::Vector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Text => "text",
            WidgetKind::Chart => "chart",
            WidgetKind::Table => "table",
            WidgetKind::Vector => "vector",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(WidgetKind::Text),
            "chart" => Some(WidgetKind::Chart),
            "table" => Some(WidgetKind::Table),
            "vector" | "d3" => Some(WidgetKind::Vector),
            _ => None,
        }
    }

    /// Human readable name, e.g. `Chart Widget`.
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Widget", first.to_ascii_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-left grid cell of a widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Footprint of a widget in grid cells. Both dimensions are at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub w: u32,
    pub h: u32,
}

impl GridSize {
    pub const fn new(w: u32, h: u32) -> Self {
        Self {
            w: if w == 0 { 1 } else { w },
            h: if h == 0 { 1 } else { h },
        }
    }
}

/// A positioned, sized, typed dashboard element.
///
/// The id and the configuration variant are fixed at construction; only the
/// layout engine can swap the configuration, and only for one of the same
/// kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    id: String,
    pub position: GridPos,
    pub size: GridSize,
    config: WidgetConfig,
}

impl Widget {
    pub fn new(id: impl Into<String>, position: GridPos, size: GridSize, config: WidgetConfig) -> Self {
        Self {
            id: id.into(),
            position,
            size: GridSize::new(size.w, size.h),
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> WidgetKind {
        self.config.kind()
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Replace the configuration. Callers guarantee the kind is unchanged.
    pub(crate) fn replace_config(&mut self, config: WidgetConfig) {
        debug_assert_eq!(config.kind(), self.kind());
        self.config = config;
    }

    /// Heading shown above the widget body, e.g. `Chart Widget: Sales`.
    pub fn title(&self) -> String {
        match &self.config {
            WidgetConfig::Chart(chart) if !chart.title.is_empty() => {
                format!("{}: {}", self.kind().label(), chart.title)
            }
            _ => self.kind().label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::config::{ChartConfig, ChartType};

    #[test]
    fn kind_parses_legacy_d3_name() {
        assert_eq!(WidgetKind::parse("d3"), Some(WidgetKind::Vector));
        assert_eq!(WidgetKind::parse(" Chart "), Some(WidgetKind::Chart));
        assert_eq!(WidgetKind::parse("gauge"), None);
        let kind: WidgetKind = serde_json::from_str("\"d3\"").unwrap();
        assert_eq!(kind, WidgetKind::Vector);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"vector\"");
    }

    #[test]
    fn zero_sized_footprint_is_raised_to_one_cell() {
        let size = GridSize::new(0, 3);
        assert_eq!(size, GridSize { w: 1, h: 3 });
    }

    #[test]
    fn chart_title_is_appended_to_heading() {
        let widget = Widget::new(
            "c",
            GridPos::new(0, 0),
            GridSize::new(4, 4),
            WidgetConfig::Chart(ChartConfig {
                chart_type: ChartType::Line,
                dataset: vec![1.0],
                title: "Sales".into(),
            }),
        );
        assert_eq!(widget.title(), "Chart Widget: Sales");
        let text = Widget::new(
            "t",
            GridPos::default(),
            GridSize::new(2, 2),
            WidgetConfig::default_for(WidgetKind::Text),
        );
        assert_eq!(text.title(), "Text Widget");
    }
}
