//! Traversal events and the root-level relay.
//!
//! Every state transition during a traversal is reported as a typed
//! [`NodeEvent`]. The traverser hands each event to the tree's single
//! [`EventRelay`], which records the latest destination and forwards the
//! event, unchanged, to every observer subscribed at the root.

use crate::traversal::NodeMatch;
use crate::tree::{Node, NodeId};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The three kinds of traversal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	/// A node's matcher accepted the current segment.
	SegmentMatched,
	/// A node matched the last segment of the path.
	DestinationReached,
	/// Segments remain after a node matched, and no child accepts the next one.
	TraversalFailed,
}

impl EventKind {
	/// Returns the stable event name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SegmentMatched => "segment_matched",
			Self::DestinationReached => "destination_reached",
			Self::TraversalFailed => "traversal_failed",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A traversal event, borrowed from the traversal that produced it.
#[derive(Debug, Clone, Copy)]
pub enum NodeEvent<'a> {
	/// See [`EventKind::SegmentMatched`].
	SegmentMatched {
		/// The node that matched.
		node: &'a Node,
		/// What it matched.
		matched: &'a NodeMatch,
	},
	/// See [`EventKind::DestinationReached`].
	DestinationReached {
		/// The destination node.
		node: &'a Node,
		/// What it matched.
		matched: &'a NodeMatch,
	},
	/// See [`EventKind::TraversalFailed`].
	TraversalFailed {
		/// The deepest node that matched.
		node: &'a Node,
		/// What it matched.
		matched: &'a NodeMatch,
		/// Segments no child could consume.
		remaining: &'a [String],
	},
}

impl<'a> NodeEvent<'a> {
	/// Returns the event kind.
	pub fn kind(&self) -> EventKind {
		match self {
			Self::SegmentMatched { .. } => EventKind::SegmentMatched,
			Self::DestinationReached { .. } => EventKind::DestinationReached,
			Self::TraversalFailed { .. } => EventKind::TraversalFailed,
		}
	}

	/// Returns the node the event is about.
	pub fn node(&self) -> &'a Node {
		match *self {
			Self::SegmentMatched { node, .. }
			| Self::DestinationReached { node, .. }
			| Self::TraversalFailed { node, .. } => node,
		}
	}

	/// Returns the match the event is about.
	pub fn matched(&self) -> &'a NodeMatch {
		match *self {
			Self::SegmentMatched { matched, .. }
			| Self::DestinationReached { matched, .. }
			| Self::TraversalFailed { matched, .. } => matched,
		}
	}

	/// Returns the unconsumed segments of a failed traversal.
	pub fn remaining(&self) -> Option<&'a [String]> {
		match *self {
			Self::TraversalFailed { remaining, .. } => Some(remaining),
			_ => None,
		}
	}
}

/// Receives every event emitted anywhere in a tree.
pub trait NodeObserver: Send + Sync {
	/// Called synchronously, in emission order.
	fn on_event(&self, event: &NodeEvent<'_>);
}

struct FnObserver<F>(F);

impl<F> NodeObserver for FnObserver<F>
where
	F: Fn(&NodeEvent<'_>) + Send + Sync,
{
	fn on_event(&self, event: &NodeEvent<'_>) {
		(self.0)(event)
	}
}

/// Handle returned by [`EventRelay::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The root observer: tracks the current destination and fans events out.
pub struct EventRelay {
	observers: RwLock<Vec<(SubscriptionId, Arc<dyn NodeObserver>)>>,
	next_id: AtomicU64,
	current: RwLock<Option<NodeMatch>>,
}

impl fmt::Debug for EventRelay {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventRelay")
			.field("observers", &self.observer_count())
			.field("current", &self.current_node())
			.finish()
	}
}

impl Default for EventRelay {
	fn default() -> Self {
		Self::new()
	}
}

impl EventRelay {
	/// Creates a relay with no observers.
	pub fn new() -> Self {
		Self {
			observers: RwLock::new(Vec::new()),
			next_id: AtomicU64::new(0),
			current: RwLock::new(None),
		}
	}

	/// Attaches an observer.
	pub fn subscribe<O>(&self, observer: O) -> SubscriptionId
	where
		O: NodeObserver + 'static,
	{
		self.subscribe_arc(Arc::new(observer))
	}

	/// Attaches a shared observer.
	pub fn subscribe_arc(&self, observer: Arc<dyn NodeObserver>) -> SubscriptionId {
		let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.observers.write().push((id, observer));
		id
	}

	/// Attaches a closure as an observer.
	pub fn subscribe_fn<F>(&self, f: F) -> SubscriptionId
	where
		F: Fn(&NodeEvent<'_>) + Send + Sync + 'static,
	{
		self.subscribe(FnObserver(f))
	}

	/// Detaches an observer. Returns false if it was not attached.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut observers = self.observers.write();
		let before = observers.len();
		observers.retain(|(sid, _)| *sid != id);
		observers.len() != before
	}

	/// Returns the number of attached observers.
	pub fn observer_count(&self) -> usize {
		self.observers.read().len()
	}

	/// Returns the most recently reached destination node.
	pub fn current_node(&self) -> Option<NodeId> {
		self.current.read().as_ref().map(NodeMatch::node)
	}

	/// Returns the match of the most recently reached destination.
	pub fn current_match(&self) -> Option<NodeMatch> {
		self.current.read().clone()
	}

	/// Records and forwards one event.
	///
	/// Only destination events move the current node. Observers are called
	/// from a snapshot, so they may subscribe, unsubscribe or start another
	/// traversal without deadlocking.
	pub(crate) fn relay(&self, event: &NodeEvent<'_>) {
		if let NodeEvent::DestinationReached { matched, .. } = event {
			*self.current.write() = Some((*matched).clone());
		}

		let observers: Vec<_> = self
			.observers
			.read()
			.iter()
			.map(|(_, observer)| Arc::clone(observer))
			.collect();
		for observer in observers {
			observer.on_event(event);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::NodeConfig;
	use crate::params::ParamContext;
	use crate::tree::Tree;
	use parking_lot::Mutex;
	use rstest::{fixture, rstest};

	#[fixture]
	fn tree() -> Tree {
		Tree::build(NodeConfig::new().child(NodeConfig::matching("a"))).unwrap()
	}

	fn node_match(id: NodeId, segment: &str) -> NodeMatch {
		NodeMatch::new(
			id,
			segment.to_string(),
			vec![segment.to_string()],
			ParamContext::default(),
			None,
		)
	}

	#[rstest]
	fn test_event_kind_names() {
		assert_eq!(EventKind::SegmentMatched.as_str(), "segment_matched");
		assert_eq!(EventKind::DestinationReached.to_string(), "destination_reached");
		assert_eq!(EventKind::TraversalFailed.as_str(), "traversal_failed");
	}

	#[rstest]
	fn test_relay_forwards_all_events(tree: Tree) {
		let relay = EventRelay::new();
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = Arc::clone(&seen);
		relay.subscribe_fn(move |event| sink.lock().push(event.kind()));

		let root = tree.node(tree.root());
		let matched = node_match(root.id(), "");
		let remaining = vec!["x".to_string()];
		relay.relay(&NodeEvent::SegmentMatched {
			node: root,
			matched: &matched,
		});
		relay.relay(&NodeEvent::TraversalFailed {
			node: root,
			matched: &matched,
			remaining: &remaining,
		});

		assert_eq!(
			*seen.lock(),
			[EventKind::SegmentMatched, EventKind::TraversalFailed]
		);
		// Neither event is a destination.
		assert_eq!(relay.current_node(), None);
	}

	#[rstest]
	fn test_only_destination_moves_current_node(tree: Tree) {
		let relay = EventRelay::new();
		let root = tree.node(tree.root());
		let child = tree.node(root.children()[0]);

		let root_match = node_match(root.id(), "");
		relay.relay(&NodeEvent::DestinationReached {
			node: root,
			matched: &root_match,
		});
		assert_eq!(relay.current_node(), Some(root.id()));

		let child_match = node_match(child.id(), "a");
		relay.relay(&NodeEvent::SegmentMatched {
			node: child,
			matched: &child_match,
		});
		assert_eq!(relay.current_node(), Some(root.id()));

		relay.relay(&NodeEvent::DestinationReached {
			node: child,
			matched: &child_match,
		});
		assert_eq!(relay.current_node(), Some(child.id()));
		assert_eq!(relay.current_match(), Some(child_match));
	}

	#[rstest]
	fn test_unsubscribe(tree: Tree) {
		let relay = EventRelay::new();
		let count = Arc::new(Mutex::new(0usize));
		let sink = Arc::clone(&count);
		let id = relay.subscribe_fn(move |_| *sink.lock() += 1);
		assert_eq!(relay.observer_count(), 1);

		let root = tree.node(tree.root());
		let matched = node_match(root.id(), "");
		let event = NodeEvent::SegmentMatched {
			node: root,
			matched: &matched,
		};
		relay.relay(&event);

		assert!(relay.unsubscribe(id));
		assert!(!relay.unsubscribe(id));
		relay.relay(&event);

		assert_eq!(*count.lock(), 1);
		assert_eq!(relay.observer_count(), 0);
	}
}
