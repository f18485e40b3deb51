//! # DiagramKit Core
//!
//! Core types shared by the DiagramKit crates: geometry primitives,
//! object identifiers, error types, linking configuration and the
//! notification event bus.

pub mod config;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod ids;

pub use config::LinkingConfig;

pub use error::{ConfigError, Error, Result, SceneError, ToolError};

pub use event_bus::{
    DiagramEvent, EventBus, EventBusConfig, EventCategory, EventFilter, SubscriptionId,
};

pub use geometry::{angle_between, nearest_point_on_segment, normalize_angle, Point, Rect, Size};

pub use ids::{LinkEnd, ObjectId};
