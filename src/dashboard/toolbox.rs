use crate::dashboard::widget::{GridSize, WidgetKind};

/// Draggable template spawning a new widget of `kind` with footprint `w`×`h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolboxItem {
    pub kind: WidgetKind,
    pub w: u32,
    pub h: u32,
}

pub const TOOLBOX_ITEMS: [ToolboxItem; 4] = [
    ToolboxItem::new(WidgetKind::Text, 2, 2),
    ToolboxItem::new(WidgetKind::Chart, 4, 4),
    ToolboxItem::new(WidgetKind::Table, 4, 4),
    ToolboxItem::new(WidgetKind::Vector, 3, 3),
];

impl ToolboxItem {
    pub const fn new(kind: WidgetKind, w: u32, h: u32) -> Self {
        Self { kind, w, h }
    }

    pub fn for_kind(kind: WidgetKind) -> Self {
        TOOLBOX_ITEMS
            .iter()
            .copied()
            .find(|item| item.kind == kind)
            .unwrap_or(ToolboxItem::new(kind, 1, 1))
    }

    pub fn size(&self) -> GridSize {
        GridSize::new(self.w, self.h)
    }

    /// Toolbox entry text, e.g. `Chart Widget (4x4)`.
    pub fn label(&self) -> String {
        format!("{} ({}x{})", self.kind.label(), self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_toolbox_entry() {
        for kind in WidgetKind::ALL {
            assert_eq!(ToolboxItem::for_kind(kind).kind, kind);
        }
        assert_eq!(ToolboxItem::for_kind(WidgetKind::Vector).size(), GridSize::new(3, 3));
    }

    #[test]
    fn labels_include_footprint() {
        assert_eq!(TOOLBOX_ITEMS[0].label(), "Text Widget (2x2)");
        assert_eq!(TOOLBOX_ITEMS[3].label(), "Vector Widget (3x3)");
    }
}
