pub mod config;
pub mod controller;
pub mod editor;
pub mod layout;
pub mod persistence;
pub mod store;
pub mod toolbox;
pub mod validate;
pub mod widget;

pub use config::{ChartConfig, ChartType, TableConfig, TextConfig, VectorConfig, WidgetConfig};
pub use controller::{DashboardController, Notice, RemovalTarget};
pub use editor::{CommittedEdit, EditSession, SubmitError, WidgetConfigStore};
pub use layout::{LayoutEngine, LayoutItem, UpdateError, DROP_PLACEHOLDER_ID};
pub use persistence::{default_seed, LoadError, PersistenceAdapter, STORAGE_KEY};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use toolbox::{ToolboxItem, TOOLBOX_ITEMS};
pub use validate::{StageError, StagedConfig, ValidationErrors};
pub use widget::{GridPos, GridSize, Widget, WidgetKind};
