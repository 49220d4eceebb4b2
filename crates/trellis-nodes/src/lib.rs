//! # trellis-nodes
//!
//! Path traversal over a tree of pattern-matching nodes.
//!
//! A slash-delimited path is split into segments and walked from the root
//! down: each node tests the next segment against its pattern, captures
//! named and positional parameters, optionally resolves a record from a
//! data source, and hands off to its children. Progress is reported as
//! typed events to observers attached at the root, and the node that
//! consumes the final segment renders through its handler.
//!
//! ## Modules
//!
//! - [`pattern`]: segment pattern compilation (`"post-:id"`, regexes)
//! - [`params`]: keyword/positional parameter resolution and typed extraction
//! - [`record`]: records and data sources
//! - [`config`]: node configuration
//! - [`tree`]: the immutable node tree
//! - [`traversal`]: the traverser, handlers and traversal reports
//! - [`events`]: typed events and the root relay
//! - [`root`]: path normalization and the entry point
//! - [`spec`]: declarative (JSON) trees, behind the `spec` feature
//!
//! ## Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use trellis_nodes::prelude::*;
//!
//! struct Page(Arc<Mutex<Vec<String>>>);
//!
//! impl NodeHandler for Page {
//!     fn render(&self, ctx: &RenderContext<'_>) {
//!         self.0.lock().unwrap().push(ctx.full_path.join("/"));
//!     }
//! }
//!
//! let rendered = Arc::new(Mutex::new(Vec::new()));
//! let root = RootNode::new(
//!     NodeConfig::new().child(
//!         NodeConfig::matching("posts")
//!             .child(NodeConfig::matching(":id").handler(Page(rendered.clone()))),
//!     ),
//! )
//! .unwrap();
//!
//! root.visit("posts/7");
//! assert_eq!(*rendered.lock().unwrap(), ["/posts/7"]);
//! ```
//!
//! ## Concurrency
//!
//! A built tree is never mutated. Every traversal keeps its state in its
//! own [`Traversal`](traversal::Traversal), so one [`RootNode`](root::RootNode)
//! can be visited from several threads at once. Observers and handlers run
//! synchronously on the visiting thread.

pub mod config;
pub mod error;
pub mod events;
pub mod params;
pub mod pattern;
pub mod record;
pub mod root;
#[cfg(feature = "spec")]
pub mod spec;
pub mod traversal;
pub mod tree;

pub use config::{AutoRender, NodeConfig, Presentation};
pub use error::{ConfigError, ConfigResult, PathError};
pub use events::{EventKind, EventRelay, NodeEvent, NodeObserver, SubscriptionId};
pub use params::{FromParams, ParamContext, Path};
pub use pattern::{MatcherKind, SegmentPattern, UrlMatch};
pub use record::{Collection, DataSource, Record};
pub use root::{RootNode, normalize_path, split_segments};
pub use traversal::{
	NodeHandler, NodeMatch, NoopHandler, Outcome, RenderContext, TraverseContext, Traversal,
};
pub use tree::{Node, NodeId, Tree};

/// Commonly used types.
pub mod prelude {
	pub use crate::config::{AutoRender, NodeConfig, Presentation};
	pub use crate::events::{EventKind, NodeEvent, NodeObserver};
	pub use crate::params::{FromParams, Path};
	pub use crate::pattern::UrlMatch;
	pub use crate::record::{Collection, DataSource, Record};
	pub use crate::root::RootNode;
	pub use crate::traversal::{NodeHandler, NodeMatch, RenderContext, TraverseContext};
}
