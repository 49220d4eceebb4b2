//! The root entry point.
//!
//! [`RootNode`] owns a built tree and its [`EventRelay`]. Visiting a path
//! normalizes it into segments and walks the tree from the root.
//!
//! # Path normalization
//!
//! An empty path and `"/"` both normalize to the empty string. Any other
//! path gets a leading `/` when it lacks one. Splitting on `/` then always
//! yields the empty string first, which the root's default match-all
//! pattern consumes:
//!
//! | raw path | segments |
//! |----------|----------|
//! | `""` | `[""]` |
//! | `"/"` | `[""]` |
//! | `"/5"` | `["", "5"]` |
//! | `"foo/bar"` | `["", "foo", "bar"]` |
//! | `"/foo/"` | `["", "foo", ""]` |

use crate::config::NodeConfig;
use crate::error::ConfigResult;
use crate::events::{EventRelay, NodeObserver, SubscriptionId};
use crate::traversal::{NodeMatch, Traversal, Traverser};
use crate::tree::{NodeId, Tree};
use std::sync::Arc;

/// Normalizes a raw path.
pub fn normalize_path(raw: &str) -> String {
	if raw.is_empty() || raw == "/" {
		String::new()
	} else if raw.starts_with('/') {
		raw.to_string()
	} else {
		format!("/{}", raw)
	}
}

/// Normalizes a raw path and splits it into segments.
pub fn split_segments(raw: &str) -> Vec<String> {
	normalize_path(raw).split('/').map(str::to_string).collect()
}

/// A built node tree ready to be visited.
///
/// The tree is immutable, so `visit` takes `&self` and may be called from
/// several threads at once. Each call gets its own [`Traversal`]; the only
/// shared state is the relay's current node, which the last destination
/// to be reached wins.
///
/// # Example
///
/// ```
/// use trellis_nodes::config::NodeConfig;
/// use trellis_nodes::root::RootNode;
///
/// let root = RootNode::new(
///     NodeConfig::new()
///         .name("home")
///         .child(NodeConfig::matching(":id").name("item")),
/// )
/// .unwrap();
///
/// let traversal = root.visit("/5");
/// let destination = traversal.destination().unwrap();
/// assert_eq!(destination.kwargs().get("id").map(String::as_str), Some("5"));
/// assert_eq!(root.current_node(), root.tree().find("item"));
/// ```
#[derive(Debug)]
pub struct RootNode {
	tree: Tree,
	relay: EventRelay,
}

impl RootNode {
	/// Builds the tree.
	///
	/// # Errors
	///
	/// Returns a [`ConfigError`](crate::error::ConfigError) if any node's
	/// pattern fails to compile.
	pub fn new(config: NodeConfig) -> ConfigResult<Self> {
		Ok(Self::from_tree(Tree::build(config)?))
	}

	/// Wraps an already built tree.
	pub fn from_tree(tree: Tree) -> Self {
		Self {
			tree,
			relay: EventRelay::new(),
		}
	}

	/// Returns the tree.
	pub fn tree(&self) -> &Tree {
		&self.tree
	}

	/// Returns the event relay.
	pub fn relay(&self) -> &EventRelay {
		&self.relay
	}

	/// Attaches an observer to every event in the tree.
	pub fn subscribe<O>(&self, observer: O) -> SubscriptionId
	where
		O: NodeObserver + 'static,
	{
		self.relay.subscribe(observer)
	}

	/// Attaches a shared observer.
	pub fn subscribe_arc(&self, observer: Arc<dyn NodeObserver>) -> SubscriptionId {
		self.relay.subscribe_arc(observer)
	}

	/// Detaches an observer.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.relay.unsubscribe(id)
	}

	/// Returns the most recently reached destination.
	pub fn current_node(&self) -> Option<NodeId> {
		self.relay.current_node()
	}

	/// Returns the match of the most recently reached destination.
	pub fn current_match(&self) -> Option<NodeMatch> {
		self.relay.current_match()
	}

	/// Visits a path.
	///
	/// Results are delivered through events and render hooks; the returned
	/// report can be ignored.
	pub fn visit(&self, path: &str) -> Traversal {
		let segments = split_segments(path);
		tracing::debug!(path, segments = segments.len(), "Visiting path");
		Traverser::new(&self.tree, &self.relay).run(segments)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	#[rstest]
	#[case("", &[""])]
	#[case("/", &[""])]
	#[case("/5", &["", "5"])]
	#[case("foo/bar", &["", "foo", "bar"])]
	#[case("/foo/", &["", "foo", ""])]
	#[case("//", &["", "", ""])]
	fn test_split_segments(#[case] raw: &str, #[case] expected: &[&str]) {
		assert_eq!(split_segments(raw), expected);
	}

	#[rstest]
	#[case("", "")]
	#[case("/", "")]
	#[case("a", "/a")]
	#[case("/a", "/a")]
	fn test_normalize_path(#[case] raw: &str, #[case] expected: &str) {
		assert_eq!(normalize_path(raw), expected);
	}

	proptest! {
		#[test]
		fn prop_first_segment_is_empty(raw in "[a-z0-9/:.-]{0,24}") {
			let segments = split_segments(&raw);
			prop_assert_eq!(segments[0].as_str(), "");
		}

		#[test]
		fn prop_relative_paths_get_leading_slash(raw in "[a-z0-9][a-z0-9/]{0,16}") {
			let normalized = normalize_path(&raw);
			prop_assert_eq!(normalized, format!("/{}", raw));
		}

		#[test]
		fn prop_segments_rejoin_to_normalized(raw in "/?[a-z0-9/]{0,16}") {
			let segments = split_segments(&raw);
			prop_assert_eq!(segments.join("/"), normalize_path(&raw));
		}
	}
}
