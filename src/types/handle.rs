//! `Handle`, `ChannelKey`, and the 32-bit handle-table identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The key of an external telemetry channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(pub u32);

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

impl From<u32> for ChannelKey {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A `(node_key, param_name)` pair identifying one value slot in the state
/// container: an output slot for the named node, or a synthetic default slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    /// The owning node's key, or a synthetic `__default_<node>_<param>` key.
    pub node_key: String,
    /// The output parameter name.
    pub param_name: String,
}

impl Handle {
    /// Constructs a handle from its parts.
    pub fn new(node_key: impl Into<String>, param_name: impl Into<String>) -> Self {
        Self {
            node_key: node_key.into(),
            param_name: param_name.into(),
        }
    }

    /// The synthetic handle used for a default-value slot of `param` on `node`.
    pub fn synthetic_default(node_key: &str, param: &str) -> Self {
        Self::new(format!("__default_{node_key}_{param}"), "out")
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_key, self.param_name)
    }
}

/// A 32-bit identifier into the state container's handle table, addressing an
/// interned [`super::Series`]. Handle `0` is always null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesHandle(pub u32);

impl SeriesHandle {
    /// The null/empty handle.
    pub const NULL: Self = Self(0);

    /// True if this is the null handle.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A 32-bit identifier into the state container's handle table, addressing an
/// interned string. Handle `0` is always null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringHandle(pub u32);

impl StringHandle {
    /// The null/empty handle.
    pub const NULL: Self = Self(0);

    /// True if this is the null handle.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_handles_are_null() {
        assert!(SeriesHandle::NULL.is_null());
        assert!(StringHandle::NULL.is_null());
        assert!(!SeriesHandle(1).is_null());
    }

    #[test]
    fn synthetic_handle_naming() {
        let h = Handle::synthetic_default("add_node", "y");
        assert_eq!(h.node_key, "__default_add_node_y");
        assert_eq!(h.param_name, "out");
    }

    #[test]
    fn handle_display() {
        let h = Handle::new("n1", "out");
        assert_eq!(h.to_string(), "n1.out");
    }
}
