use crate::dashboard::config::WidgetConfig;
use crate::dashboard::validate::{
    self, StageError, StagedConfig, ValidationErrors, FIELD_TABLE_DATA, MSG_TABLE_INVALID_JSON,
};
use crate::dashboard::widget::{Widget, WidgetKind};

/// Configuration accepted by a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedEdit {
    pub widget_id: String,
    pub config: WidgetConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    NoSession,
    Invalid(ValidationErrors),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::NoSession => write!(f, "no widget is being edited"),
            SubmitError::Invalid(errors) => write!(f, "invalid widget configuration: {errors}"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Edit state for the widget currently open in the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    widget_id: String,
    staged: StagedConfig,
    errors: ValidationErrors,
}

impl EditSession {
    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    pub fn kind(&self) -> WidgetKind {
        self.staged.kind()
    }

    pub fn staged(&self) -> &StagedConfig {
        &self.staged
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }
}

/// Data model behind the configuration editor: at most one open session
/// with its staged values and field errors.
#[derive(Debug, Default)]
pub struct WidgetConfigStore {
    session: Option<EditSession>,
}

impl WidgetConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload for a newly created widget of `kind`.
    pub fn default_config(kind: WidgetKind) -> WidgetConfig {
        WidgetConfig::default_for(kind)
    }

    /// Start editing `widget`, discarding any previous staged state.
    pub fn open(&mut self, widget: &Widget) {
        tracing::debug!(id = %widget.id(), kind = %widget.kind(), "editor opened");
        self.session = Some(EditSession {
            widget_id: widget.id().to_string(),
            staged: StagedConfig::from_config(widget.config()),
            errors: ValidationErrors::new(),
        });
    }

    pub fn close(&mut self) -> Option<EditSession> {
        self.session.take()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.widget_id.as_str())
    }

    /// Apply a form edit and clear that field's error. A table document that
    /// does not parse is kept as typed and flagged immediately.
    pub fn edit_field(&mut self, field: &str, value: &str) -> Result<(), StageError> {
        let session = self.session.as_mut().ok_or(StageError::NoSession)?;
        session.staged.set_field(field, value)?;
        session.errors.remove(field);
        if let StagedConfig::Table { raw } = &session.staged {
            if !validate::table_document_parses(raw) {
                session.errors.insert(FIELD_TABLE_DATA, MSG_TABLE_INVALID_JSON);
            }
        }
        Ok(())
    }

    /// Validate the staged configuration. On success the session ends and
    /// the committed configuration is returned; otherwise the errors are kept
    /// for display and the session stays open.
    pub fn submit(&mut self) -> Result<CommittedEdit, SubmitError> {
        let session = self.session.as_mut().ok_or(SubmitError::NoSession)?;
        match validate::commit(&session.staged) {
            Ok(config) => {
                session.errors = ValidationErrors::new();
                let widget_id = session.widget_id.clone();
                self.session = None;
                Ok(CommittedEdit { widget_id, config })
            }
            Err(errors) => {
                tracing::debug!(id = %session.widget_id, %errors, "edit rejected");
                session.errors = errors.clone();
                Err(SubmitError::Invalid(errors))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::config::{TextConfig, VectorConfig};
    use crate::dashboard::validate::{FIELD_COLOR, FIELD_CONTENT, FIELD_RADIUS};
    use crate::dashboard::widget::{GridPos, GridSize};

    fn widget(id: &str, config: WidgetConfig) -> Widget {
        Widget::new(id, GridPos::new(0, 0), GridSize::new(2, 2), config)
    }

    #[test]
    fn opening_another_widget_resets_staged_state() {
        let mut store = WidgetConfigStore::new();
        let a = widget("a", WidgetConfig::Text(TextConfig { content: "A".into() }));
        let b = widget("b", WidgetConfig::Text(TextConfig { content: "B".into() }));
        store.open(&a);
        store.edit_field(FIELD_CONTENT, "edited").unwrap();
        store.open(&b);
        let session = store.session().unwrap();
        assert_eq!(session.widget_id(), "b");
        assert_eq!(session.staged().field_value(FIELD_CONTENT).as_deref(), Some("B"));
        assert!(session.errors().is_empty());
    }

    #[test]
    fn failed_submit_keeps_session_and_errors_until_field_edited() {
        let mut store = WidgetConfigStore::new();
        store.open(&widget(
            "v",
            WidgetConfig::Vector(VectorConfig {
                radius: 10.0,
                color: "#000".into(),
            }),
        ));
        store.edit_field(FIELD_RADIUS, "-5").unwrap();
        store.edit_field(FIELD_COLOR, "blue").unwrap();
        let Err(SubmitError::Invalid(errors)) = store.submit() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 2);
        assert!(store.is_open());

        store.edit_field(FIELD_COLOR, "#fff").unwrap();
        let errors = store.session().unwrap().errors();
        assert!(errors.contains(FIELD_RADIUS));
        assert!(!errors.contains(FIELD_COLOR));
    }

    #[test]
    fn malformed_table_edit_is_flagged_and_preserved() {
        let mut store = WidgetConfigStore::new();
        store.open(&widget("t", WidgetConfig::default_for(WidgetKind::Table)));
        store.edit_field(FIELD_TABLE_DATA, "{\"columns\": [").unwrap();
        let session = store.session().unwrap();
        assert_eq!(
            session.errors().get(FIELD_TABLE_DATA),
            Some(MSG_TABLE_INVALID_JSON)
        );
        assert_eq!(
            session.staged().field_value(FIELD_TABLE_DATA).as_deref(),
            Some("{\"columns\": [")
        );

        store
            .edit_field(FIELD_TABLE_DATA, r#"{"columns": ["x"], "rows": []}"#)
            .unwrap();
        assert!(store.session().unwrap().errors().is_empty());
    }

    #[test]
    fn successful_submit_ends_session() {
        let mut store = WidgetConfigStore::new();
        store.open(&widget("t", WidgetConfig::default_for(WidgetKind::Text)));
        store.edit_field(FIELD_CONTENT, "Hello").unwrap();
        let committed = store.submit().unwrap();
        assert_eq!(committed.widget_id, "t");
        assert_eq!(
            committed.config,
            WidgetConfig::Text(TextConfig {
                content: "Hello".into()
            })
        );
        assert!(!store.is_open());
        assert_eq!(store.submit(), Err(SubmitError::NoSession));
    }

    #[test]
    fn unedited_table_submits_cleanly() {
        let mut store = WidgetConfigStore::new();
        let config = WidgetConfigStore::default_config(WidgetKind::Table);
        store.open(&widget("t", config.clone()));
        assert_eq!(store.submit().unwrap().config, config);
    }

    #[test]
    fn editing_without_session_is_an_error() {
        let mut store = WidgetConfigStore::new();
        assert_eq!(
            store.edit_field(FIELD_CONTENT, "x"),
            Err(StageError::NoSession)
        );
    }
}
