use std::sync::atomic::{AtomicU32, Ordering};

/// Stable copy-identity for an AST node (spec.md §3: "a copy-identity used
/// for structural sharing during passes"). Passes that need to attach data
/// to a node without mutating the tree key their side-tables by this id
/// instead of by a pointer or index, so the annotation survives node
/// cloning during optimistic passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

/// Hands out process-wide-unique `NodeId`s as the parser builds a tree.
/// A single generator is owned per compilation unit; it is not meant to be
/// shared across units (each unit's ids only need to be unique amongst
/// themselves).
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: AtomicU32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    pub fn next(&self) -> NodeId {
        NodeId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
