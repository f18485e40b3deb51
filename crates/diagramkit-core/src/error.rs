//! Error handling for DiagramKit
//!
//! Provides error types for the layers of the toolkit:
//! - Scene errors (unknown or mismatched objects)
//! - Tool errors (interactive gesture protocol misuse)
//! - Configuration errors (loading and validation)
//!
//! Geometric degeneracies and invalid link attempts are not errors; they
//! resolve to "no effect" inside the algorithms themselves.

use thiserror::Error;

/// Scene graph error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// No object with this id exists in the scene
    #[error("Unknown object {id}")]
    UnknownObject {
        /// The id that failed to resolve.
        id: u64,
    },

    /// The object exists but is not of the requested kind
    #[error("Object {id} is not a {expected}")]
    WrongKind {
        /// The id of the object.
        id: u64,
        /// The kind that was expected.
        expected: &'static str,
    },
}

/// Interactive tool error type
///
/// Raised only when the tool protocol itself is misused; an unsuccessful
/// gesture is reported through its outcome instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// A gesture is already in progress on this surface
    #[error("A linking gesture is already active")]
    GestureActive,

    /// The call requires an active gesture
    #[error("No linking gesture is active")]
    NoGesture,

    /// The port can neither start nor end a link
    #[error("Port {port} cannot be linked")]
    NotLinkable {
        /// The port id.
        port: u64,
    },

    /// The link cannot be reconnected at the grabbed end
    #[error("Link {link} cannot be relinked at its {end} end")]
    NotRelinkable {
        /// The link id.
        link: u64,
        /// The grabbed end ("from" or "to").
        end: &'static str,
    },
}

/// Configuration error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A configuration value is out of its valid range
    #[error("Invalid setting '{key}': {reason}")]
    InvalidValue {
        /// The setting name.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The file extension is not a supported format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Main error type for DiagramKit
#[derive(Error, Debug)]
pub enum Error {
    /// Scene error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Tool error
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a scene error
    pub fn is_scene_error(&self) -> bool {
        matches!(self, Error::Scene(_))
    }

    /// Check if this is a tool protocol error
    pub fn is_tool_error(&self) -> bool {
        matches!(self, Error::Tool(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
