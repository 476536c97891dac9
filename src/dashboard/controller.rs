use crate::dashboard::editor::{SubmitError, WidgetConfigStore};
use crate::dashboard::layout::{LayoutEngine, LayoutItem};
use crate::dashboard::persistence::{default_seed, LoadError, PersistenceAdapter};
use crate::dashboard::store::KeyValueStore;
use crate::dashboard::toolbox::{ToolboxItem, TOOLBOX_ITEMS};
use crate::dashboard::validate::StageError;
use crate::dashboard::widget::{GridPos, Widget};

/// What a removal request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalTarget {
    Widget(String),
    All,
}

/// User-visible outcome of a controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved,
    Loaded { count: usize },
    NothingToLoad,
    /// The stored layout was unusable and the default seed is shown instead.
    CorruptedFallback { reason: String },
    StorageFailed { reason: String },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Saved => "Dashboard layout saved successfully!".into(),
            Notice::Loaded { .. } => "Dashboard layout loaded successfully!".into(),
            Notice::NothingToLoad => "No saved dashboard found!".into(),
            Notice::CorruptedFallback { .. } => {
                "Saved data is corrupted. Loading default layout.".into()
            }
            Notice::StorageFailed { reason } => format!("Dashboard storage failed: {reason}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::CorruptedFallback { .. } | Notice::StorageFailed { .. }
        )
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Operations invoked by the presentation layer. Owns the layout engine,
/// the editor model and the persistence adapter.
pub struct DashboardController<S> {
    layout: LayoutEngine,
    editor: WidgetConfigStore,
    persistence: PersistenceAdapter<S>,
    pending_removal: Option<RemovalTarget>,
    startup_notice: Option<Notice>,
}

impl<S: KeyValueStore> DashboardController<S> {
    /// Start from the saved layout, or from the default seed when nothing
    /// usable is stored. A corrupted or unreadable store leaves a notice for
    /// [`take_startup_notice`](Self::take_startup_notice).
    pub fn open(persistence: PersistenceAdapter<S>) -> Self {
        let (widgets, notice) = match persistence.load() {
            Ok(widgets) => (widgets, None),
            Err(LoadError::NotFound) => (default_seed(), None),
            Err(LoadError::Corrupted(reason)) => {
                tracing::warn!(%reason, "stored dashboard corrupted; starting from default layout");
                (default_seed(), Some(Notice::CorruptedFallback { reason }))
            }
            Err(LoadError::Unavailable(reason)) => {
                tracing::error!(%reason, "reading stored dashboard failed; starting from default layout");
                (default_seed(), Some(Notice::StorageFailed { reason }))
            }
        };
        let mut controller = Self::with_widgets(persistence, widgets);
        controller.startup_notice = notice;
        controller
    }

    pub fn with_widgets(persistence: PersistenceAdapter<S>, widgets: Vec<Widget>) -> Self {
        Self {
            layout: LayoutEngine::from_widgets(widgets),
            editor: WidgetConfigStore::new(),
            persistence,
            pending_removal: None,
            startup_notice: None,
        }
    }

    /// Notice raised while opening, handed out once.
    pub fn take_startup_notice(&mut self) -> Option<Notice> {
        self.startup_notice.take()
    }

    pub fn widgets(&self) -> &[Widget] {
        self.layout.widgets()
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn layout_items(&self) -> Vec<LayoutItem> {
        self.layout.layout()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn toolbox(&self) -> &'static [ToolboxItem] {
        &TOOLBOX_ITEMS
    }

    pub fn editor(&self) -> &WidgetConfigStore {
        &self.editor
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut PersistenceAdapter<S> {
        &mut self.persistence
    }

    /// Handle a toolbox drop. Returns the new widget's id.
    pub fn add_from_toolbox(&mut self, item: &ToolboxItem, drop: GridPos) -> String {
        self.layout.place_new_widget(item, drop).id().to_string()
    }

    /// Apply a layout-change event from the grid renderer.
    pub fn on_layout_change(&mut self, layout: &[LayoutItem]) {
        let dropped = self.layout.reconcile(layout);
        if dropped > 0 {
            tracing::debug!(dropped, "layout change removed widgets");
        }
        let editing_gone = self
            .editor
            .editing_id()
            .is_some_and(|id| !self.layout.contains(id));
        if editing_gone {
            self.editor.close();
        }
    }

    /// Open the editor for widget `id`. Returns false for unknown ids.
    pub fn open_editor(&mut self, id: &str) -> bool {
        match self.layout.get(id) {
            Some(widget) => {
                self.editor.open(widget);
                true
            }
            None => false,
        }
    }

    pub fn edit_field(&mut self, field: &str, value: &str) -> Result<(), StageError> {
        self.editor.edit_field(field, value)
    }

    /// Validate the staged edit and commit it to the layout.
    pub fn save_edit(&mut self) -> Result<(), SubmitError> {
        let committed = self.editor.submit()?;
        match self
            .layout
            .update_widget_data(&committed.widget_id, &committed.config.to_value())
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(id = %committed.widget_id, "edited widget no longer exists")
            }
            Err(e) => tracing::error!(error = %e, "committing edit failed"),
        }
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editor.close();
    }

    /// Stage a removal. Nothing changes until [`confirm_removal`] is called.
    ///
    /// [`confirm_removal`]: Self::confirm_removal
    pub fn request_removal(&mut self, target: RemovalTarget) {
        self.pending_removal = Some(target);
    }

    pub fn pending_removal(&self) -> Option<&RemovalTarget> {
        self.pending_removal.as_ref()
    }

    /// Confirmation prompt for the pending removal.
    pub fn removal_prompt(&self) -> Option<String> {
        match self.pending_removal.as_ref()? {
            RemovalTarget::All => {
                Some("Are you sure you want to remove ALL widgets from the dashboard?".into())
            }
            RemovalTarget::Widget(id) => {
                let kind = self
                    .layout
                    .get(id)
                    .map(|w| w.kind().as_str())
                    .unwrap_or("unknown");
                Some(format!("Are you sure you want to remove this {kind} widget?"))
            }
        }
    }

    /// Carry out the pending removal. Removing everything also deletes the
    /// stored layout; a failure to do so is reported as a notice.
    pub fn confirm_removal(&mut self) -> Option<Notice> {
        let target = self.pending_removal.take()?;
        match target {
            RemovalTarget::All => {
                self.layout.clear_all();
                self.editor.close();
                if let Err(e) = self.persistence.clear() {
                    tracing::error!(error = %format!("{e:#}"), "clearing stored dashboard failed");
                    return Some(Notice::StorageFailed {
                        reason: format!("{e:#}"),
                    });
                }
            }
            RemovalTarget::Widget(id) => {
                self.layout.remove(&id);
                if self.editor.editing_id() == Some(id.as_str()) {
                    self.editor.close();
                }
            }
        }
        None
    }

    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }

    pub fn save_dashboard(&mut self) -> Notice {
        match self.persistence.save(self.layout.widgets()) {
            Ok(()) => Notice::Saved,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "saving dashboard failed");
                Notice::StorageFailed {
                    reason: format!("{e:#}"),
                }
            }
        }
    }

    /// Replace the current layout with the stored one. A missing save leaves
    /// the layout untouched; a corrupted one swaps in the default seed.
    pub fn load_dashboard(&mut self) -> Notice {
        match self.persistence.load() {
            Ok(widgets) => {
                let count = widgets.len();
                self.replace_widgets(widgets);
                Notice::Loaded { count }
            }
            Err(LoadError::NotFound) => Notice::NothingToLoad,
            Err(LoadError::Corrupted(reason)) => {
                tracing::warn!(%reason, "stored dashboard corrupted; loading defaults");
                self.replace_widgets(default_seed());
                Notice::CorruptedFallback { reason }
            }
            Err(LoadError::Unavailable(reason)) => {
                tracing::error!(%reason, "reading stored dashboard failed");
                Notice::StorageFailed { reason }
            }
        }
    }

    fn replace_widgets(&mut self, widgets: Vec<Widget>) {
        self.layout.replace_all(widgets);
        self.editor.close();
        self.pending_removal = None;
    }
}
