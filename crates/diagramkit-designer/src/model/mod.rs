//! Scene objects: nodes (the boxes ports surround), ports and links.

mod link;
mod node;
mod port;

pub use link::{Link, LinkStyle};
pub use node::Node;
pub use port::{LinkAttachment, Port, PortCapabilities, PortKind};

use serde::{Deserialize, Serialize};

/// Which layer an object lives in.
///
/// Document objects are persistent: they are searched by the port locator
/// and their edits are undo-logged. Interaction objects exist only while a
/// tool gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layer {
    #[default]
    Document,
    Interaction,
}
