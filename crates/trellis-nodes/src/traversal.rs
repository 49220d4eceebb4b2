//! Depth-first, segment-consuming traversal.
//!
//! Starting at the root, each node's matcher is applied to the next
//! unconsumed segment. A node that matches consumes the segment, resolves
//! its parameters (and record, when it has a data source), reports a
//! segment-matched event and runs its traversal hook. With segments left,
//! its children are tried in order and the first child whose own segment
//! matches wins; when no child matches, a traversal-failed event is
//! reported. With nothing left, the node is the destination: a
//! destination-reached event is reported and the node renders unless its
//! resolved auto-render policy is off.
//!
//! A child counts as a match as soon as its own segment matches, even if
//! its subtree later fails. Later siblings are never tried after that;
//! there is no backtracking.
//!
//! All per-traversal state lives in the [`Traversal`] report, so the tree
//! itself stays immutable and traversals may run concurrently.

use crate::config::Presentation;
use crate::events::{EventRelay, NodeEvent};
use crate::params::{ParamContext, resolve_record};
use crate::record::{DataSource, Record};
use crate::tree::{Node, NodeId, Tree};
use std::collections::HashMap;

/// Callbacks a node runs during traversal.
///
/// Both methods default to doing nothing.
pub trait NodeHandler: Send + Sync {
	/// Called each time the node matches a segment, before its children.
	fn traverse(&self, _ctx: &TraverseContext<'_>) {}

	/// Called when the node is the destination and auto-render is on.
	fn render(&self, _ctx: &RenderContext<'_>) {}
}

/// Handler that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl NodeHandler for NoopHandler {}

/// Context passed to [`NodeHandler::traverse`].
#[derive(Debug)]
pub struct TraverseContext<'a> {
	/// The node being traversed.
	pub node: &'a Node,
	/// The segment it consumed.
	pub segment: &'a str,
	/// Segments not yet consumed.
	pub remaining: &'a [String],
	/// Segments consumed by the ancestors.
	pub parent_path: &'a [String],
	/// Captured parameters.
	pub params: &'a ParamContext,
}

impl TraverseContext<'_> {
	/// Returns the named parameters.
	pub fn kwargs(&self) -> &HashMap<String, String> {
		self.params.kwargs()
	}

	/// Returns the positional parameters.
	pub fn args(&self) -> &[String] {
		self.params.args()
	}
}

/// Context passed to [`NodeHandler::render`].
#[derive(Debug)]
pub struct RenderContext<'a> {
	/// The destination node.
	pub node: &'a Node,
	/// The resolved record, or the node's static model when no lookup ran.
	pub record: Option<&'a Record>,
	/// The node's data source.
	pub data_source: Option<&'a dyn DataSource>,
	/// Positional parameters.
	pub args: &'a [String],
	/// Named parameters.
	pub kwargs: &'a HashMap<String, String>,
	/// Every segment from the root to this node.
	pub full_path: &'a [String],
	/// Presentation options of the node.
	pub presentation: &'a Presentation,
	/// The element to render into, after inheritance.
	pub element: Option<&'a str>,
}

/// What one node matched during a traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMatch {
	node: NodeId,
	segment: String,
	full_path: Vec<String>,
	params: ParamContext,
	record: Option<Record>,
}

impl NodeMatch {
	pub(crate) fn new(
		node: NodeId,
		segment: String,
		full_path: Vec<String>,
		params: ParamContext,
		record: Option<Record>,
	) -> Self {
		Self {
			node,
			segment,
			full_path,
			params,
			record,
		}
	}

	/// Returns the node that matched.
	pub fn node(&self) -> NodeId {
		self.node
	}

	/// Returns the consumed segment.
	pub fn segment(&self) -> &str {
		&self.segment
	}

	/// Returns every segment from the root to this node.
	pub fn full_path(&self) -> &[String] {
		&self.full_path
	}

	/// Returns the captured parameters.
	pub fn params(&self) -> &ParamContext {
		&self.params
	}

	/// Returns the named parameters.
	pub fn kwargs(&self) -> &HashMap<String, String> {
		self.params.kwargs()
	}

	/// Returns the positional parameters.
	pub fn args(&self) -> &[String] {
		self.params.args()
	}

	/// Returns the record resolved from the node's data source.
	pub fn record(&self) -> Option<&Record> {
		self.record.as_ref()
	}
}

/// How a traversal ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	/// The root did not accept the first segment.
	Unmatched,
	/// Every segment was consumed.
	Reached {
		/// The destination.
		node: NodeId,
		/// Whether the render hook ran.
		rendered: bool,
	},
	/// Segments remained that no child of `node` accepted.
	Failed {
		/// The deepest matching node.
		node: NodeId,
		/// The unconsumed segments.
		remaining: Vec<String>,
	},
}

/// Report of a single traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
	segments: Vec<String>,
	matches: Vec<NodeMatch>,
	outcome: Outcome,
}

impl Traversal {
	/// Returns the segments the traversal started from.
	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	/// Returns the matched nodes, root first.
	pub fn matches(&self) -> &[NodeMatch] {
		&self.matches
	}

	/// Returns the match of a given node, if it matched.
	pub fn get(&self, node: NodeId) -> Option<&NodeMatch> {
		self.matches.iter().find(|m| m.node == node)
	}

	/// Returns how the traversal ended.
	pub fn outcome(&self) -> &Outcome {
		&self.outcome
	}

	/// Returns the destination match, if every segment was consumed.
	pub fn destination(&self) -> Option<&NodeMatch> {
		match self.outcome {
			Outcome::Reached { node, .. } => self.get(node),
			_ => None,
		}
	}

	/// Returns whether every segment was consumed.
	pub fn is_reached(&self) -> bool {
		matches!(self.outcome, Outcome::Reached { .. })
	}
}

/// Drives one traversal over a tree, reporting into a relay.
pub(crate) struct Traverser<'t> {
	tree: &'t Tree,
	relay: &'t EventRelay,
}

impl<'t> Traverser<'t> {
	pub(crate) fn new(tree: &'t Tree, relay: &'t EventRelay) -> Self {
		Self { tree, relay }
	}

	/// Runs a traversal from the root over `segments`.
	pub(crate) fn run(&self, segments: Vec<String>) -> Traversal {
		let mut report = Traversal {
			segments: Vec::new(),
			matches: Vec::new(),
			outcome: Outcome::Unmatched,
		};
		let mut consumed = Vec::with_capacity(segments.len());
		self.visit(self.tree.root(), &segments, &mut consumed, &mut report);
		report.segments = segments;
		report
	}

	/// Visits one node with `rest[0]` as its candidate segment.
	///
	/// Returns true when the node's own segment matched, whatever happened
	/// below it.
	fn visit(
		&self,
		id: NodeId,
		rest: &[String],
		consumed: &mut Vec<String>,
		report: &mut Traversal,
	) -> bool {
		let node = self.tree.node(id);
		let Some((segment, remaining)) = rest.split_first() else {
			return false;
		};
		let Some(captures) = node.pattern().captures(segment) else {
			tracing::trace!(node = node.label(), segment = %segment, "Segment not matched");
			return false;
		};

		let parent_len = consumed.len();
		consumed.push(segment.clone());
		let params = ParamContext::from_captures(captures, node.pattern().param_names());
		let lookup_ran = node.collection().is_some() && !params.kwargs().is_empty();
		let record = node
			.collection()
			.filter(|_| lookup_ran)
			.and_then(|source| resolve_record(source.as_ref(), params.kwargs()));
		let matched = NodeMatch::new(id, segment.clone(), consumed.clone(), params, record);

		tracing::debug!(
			node = node.label(),
			segment = %segment,
			remaining = remaining.len(),
			"Segment matched"
		);
		self.relay.relay(&NodeEvent::SegmentMatched {
			node,
			matched: &matched,
		});
		node.handler().traverse(&TraverseContext {
			node,
			segment,
			remaining,
			parent_path: &consumed[..parent_len],
			params: matched.params(),
		});

		if remaining.is_empty() {
			self.arrive(node, &matched, lookup_ran, report);
			report.matches.push(matched);
			return true;
		}

		let index = report.matches.len();
		report.matches.push(matched);

		let found = node
			.children()
			.iter()
			.any(|&child| self.visit(child, remaining, consumed, report));
		if !found {
			let matched = &report.matches[index];
			tracing::debug!(
				node = node.label(),
				remaining = ?remaining,
				"No child matched the remaining path"
			);
			self.relay.relay(&NodeEvent::TraversalFailed {
				node,
				matched,
				remaining,
			});
			report.outcome = Outcome::Failed {
				node: id,
				remaining: remaining.to_vec(),
			};
		}
		true
	}

	/// Handles a node that consumed the final segment.
	fn arrive(&self, node: &Node, matched: &NodeMatch, lookup_ran: bool, report: &mut Traversal) {
		tracing::debug!(node = node.label(), path = ?matched.full_path(), "Destination reached");
		self.relay.relay(&NodeEvent::DestinationReached { node, matched });

		let rendered = node.renders();
		if rendered {
			let record = if lookup_ran {
				matched.record()
			} else {
				node.presentation().model.as_ref()
			};
			node.handler().render(&RenderContext {
				node,
				record,
				data_source: node.collection().map(|source| source.as_ref()),
				args: matched.args(),
				kwargs: matched.kwargs(),
				full_path: matched.full_path(),
				presentation: node.presentation(),
				element: node.element(),
			});
		}
		report.outcome = Outcome::Reached {
			node: node.id(),
			rendered,
		};
	}
}
