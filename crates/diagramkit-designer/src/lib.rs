//! # DiagramKit Designer
//!
//! Scene graph and interactive link editing.
//!
//! ## Port geometry
//!
//! Box ports ([`BoxPort`]) decide per link end which side of their box a
//! link attaches to, using thresholds derived from the box diagonal
//! ([`side`]). Several links on one side are spread along it and, when
//! orthogonal, get staggered end segments.
//!
//! ## Linking
//!
//! [`LinkingTool`] drives a drawing or relinking gesture over a
//! [`Diagram`]: the [`PortLocator`] picks the nearest valid port under the
//! pointer, a temporary port mimics it, and the result is committed to the
//! undo log as one transaction or rolled back.

pub mod box_port;
pub mod diagram;
pub mod history;
pub mod linking_tool;
pub mod locator;
pub mod model;
pub mod port_geometry;
pub mod scene;
pub mod side;
pub mod spatial_index;
pub mod viewport;

pub use box_port::{BoxPort, CacheState, LinkInfo};
pub use diagram::Diagram;
pub use history::{HistoryTransaction, SceneEdit, TransactionLog, UndoRedoManager};
pub use linking_tool::{GestureOutcome, LinkingMode, LinkingTool, ToolState};
pub use locator::PortLocator;
pub use model::{Layer, Link, LinkAttachment, LinkStyle, Node, Port, PortCapabilities, PortKind};
pub use port_geometry::{PointPort, PortGeometry, ProxyPort};
pub use scene::Scene;
pub use side::{diagonal_angle, resolve_side, side_for_angle, Side, SideSet};
pub use spatial_index::{SpatialIndex, SpatialIndexStats};
pub use viewport::Viewport;
