//! Error types for the report model.

/// Failures of builder operations. None of these leave the builder partially mutated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuilderError {
    #[error("cell `{0}` does not exist")]
    CellNotFound(String),

    #[error("widget `{0}` does not exist")]
    WidgetNotFound(String),

    #[error("cell `{cell}` already holds widget `{widget}`; remove it before dropping another")]
    CellOccupied { cell: String, widget: String },

    #[error("cell `{cell}` references missing widget `{widget}`")]
    DanglingWidget { cell: String, widget: String },

    #[error("settings for a {expected} widget cannot be applied to a {found} widget")]
    SettingsMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0} widgets have no configurable settings")]
    NoSettings(&'static str),

    #[error("no widget settings are being edited")]
    NoSettingsSession,

    #[error("widget `{0}` cannot be edited inline")]
    NotInlineEditable(String),
}

/// Failures reading a dashboard snapshot or the export handoff.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("report JSON is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("report JSON must be an object")]
    NotAnObject,

    #[error("report JSON is missing `{0}`")]
    MissingField(&'static str),

    #[error("report JSON does not match the expected shape: {0}")]
    Schema(#[source] serde_json::Error),

    #[error(transparent)]
    Integrity(#[from] BuilderError),

    #[error("saved {key} uses format version {found}, expected {expected}")]
    UnsupportedVersion {
        key: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("nothing has been saved for export yet")]
    NothingSaved,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures of the local key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("local storage is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },

    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
