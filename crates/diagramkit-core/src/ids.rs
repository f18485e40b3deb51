//! Identifiers for scene objects and link ends.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a node, port or link within one scene.
///
/// Ids are never reused within a scene, so an id captured before a
/// gesture still names the same object (or nothing) afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl ObjectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<ObjectId> for u64 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

/// One of the two ends of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkEnd {
    /// The source end (`from_port`).
    From,
    /// The destination end (`to_port`).
    To,
}

impl LinkEnd {
    pub fn opposite(self) -> Self {
        match self {
            LinkEnd::From => LinkEnd::To,
            LinkEnd::To => LinkEnd::From,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LinkEnd::From => "from",
            LinkEnd::To => "to",
        }
    }
}

impl fmt::Display for LinkEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
