//! Loop-free overlay computation.
//!
//! [`SpanningTreeBuilder`] grows a uniform-cost tree over a
//! [`TopologyGraph`](crate::topology::TopologyGraph) snapshot; the
//! resulting [`SpanningTree`] bounds every flood decision so the cyclic
//! physical topology never loops traffic.

mod builder;
mod tree;

pub use builder::SpanningTreeBuilder;
pub use tree::SpanningTree;
