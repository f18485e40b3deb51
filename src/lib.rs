//! # DiagramKit
//!
//! A diagram editing toolkit centred on link attachment:
//! - Box ports that pick the side a link attaches to from the box
//!   diagonal and spread several links along one side
//! - Orthogonal link routing with staggered end segments
//! - A nearest-port locator with gravity and per-gesture validity caching
//! - An interactive linking tool for drawing and relinking links, with
//!   transactional commit and rollback
//!
//! ## Architecture
//!
//! DiagramKit is organized as a workspace:
//!
//! 1. **diagramkit-core** - Geometry, ids, errors, configuration, events
//! 2. **diagramkit-designer** - Scene graph, box ports, locator, linking tool
//! 3. **diagramkit** - This crate; re-exports both and sets up logging

pub use diagramkit_designer as designer;

pub use diagramkit_core::{
    angle_between, normalize_angle, ConfigError, DiagramEvent, Error, EventBus, EventCategory,
    EventFilter, LinkEnd, LinkingConfig, ObjectId, Point, Rect, Result, SceneError, Size,
    ToolError,
};

pub use diagramkit_designer::{
    BoxPort, CacheState, Diagram, GestureOutcome, Layer, Link, LinkInfo, LinkStyle, LinkingMode,
    LinkingTool, Node, Port, PortCapabilities, PortKind, PortLocator, Scene, SceneEdit, Side,
    SideSet, ToolState, TransactionLog, UndoRedoManager, Viewport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support (defaults to `info`)
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
