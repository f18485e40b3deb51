//! # Event Bus Module
//!
//! Publish/subscribe notifications for diagram edits.
//!
//! The linking tool and the diagram surface publish [`DiagramEvent`]s
//! without knowing who listens. Most subscribers only observe; a veto
//! subscriber may cancel events that announce an upcoming deletion.
//!
//! ## Usage
//!
//! ```rust
//! use diagramkit_core::event_bus::{DiagramEvent, EventBus, EventCategory, EventFilter};
//! use diagramkit_core::ObjectId;
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Link]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.publish(DiagramEvent::LinkCreated {
//!     link: ObjectId(7),
//!     from: Some(ObjectId(1)),
//!     to: Some(ObjectId(2)),
//! });
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
