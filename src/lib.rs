//! # trellis
//!
//! Segment-by-segment path traversal over a tree of pattern-matching
//! nodes, with parameter capture, record resolution and typed traversal
//! events.
//!
//! This crate re-exports [`trellis_nodes`]; see its documentation for the
//! details of each component.
//!
//! ```
//! use trellis::prelude::*;
//!
//! let root = RootNode::new(
//!     NodeConfig::new().child(NodeConfig::matching(":id").name("item")),
//! )
//! .unwrap();
//!
//! let traversal = root.visit("/42");
//! assert_eq!(traversal.destination().unwrap().params().extract::<u32>(), Ok(42));
//! ```

pub use trellis_nodes::*;
