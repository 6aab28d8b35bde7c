//! Node identity for cycle and duplicate detection.

use std::fmt;

use super::node::Walk;

/// The identity of a node: its address together with its concrete type.
///
/// A record and its first field may share an address, so the type is part
/// of the identity. Values of zero-sized types can share an address with
/// unrelated values of the same type and are then considered the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    addr: usize,
    type_name: &'static str,
}

impl Identity {
    pub fn of(node: &dyn Walk) -> Self {
        Identity {
            addr: (node as *const dyn Walk).cast::<()>() as usize,
            type_name: node.type_name(),
        }
    }

    pub fn addr(&self) -> usize {
        self.addr
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.type_name, self.addr)
    }
}
