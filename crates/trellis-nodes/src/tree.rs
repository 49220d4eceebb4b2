//! The immutable node tree.
//!
//! Nodes live in an arena addressed by [`NodeId`]. Parent links,
//! inherited auto-render policy and inherited render targets are all
//! resolved while building, so a built tree is never mutated again and
//! can be shared by any number of traversals.

use crate::config::{AutoRender, NodeConfig, Presentation};
use crate::error::ConfigResult;
use crate::pattern::SegmentPattern;
use crate::record::DataSource;
use crate::traversal::NodeHandler;
use std::fmt;
use std::sync::Arc;

/// Index of a node within its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
	/// The root of every tree.
	pub const ROOT: Self = Self(0);

	/// Returns the arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A built node.
pub struct Node {
	id: NodeId,
	name: Option<String>,
	pattern: SegmentPattern,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	depth: usize,
	collection: Option<Arc<dyn DataSource>>,
	auto_render: AutoRender,
	renders: bool,
	element: Option<String>,
	handler: Arc<dyn NodeHandler>,
	presentation: Presentation,
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("pattern", &self.pattern.pattern())
			.field("parent", &self.parent)
			.field("children", &self.children)
			.field("has_collection", &self.collection.is_some())
			.field("renders", &self.renders)
			.finish()
	}
}

impl Node {
	/// Returns this node's id.
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Returns the configured label.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns a label for logs: the name, or the pattern when unnamed.
	pub fn label(&self) -> &str {
		self.name.as_deref().unwrap_or_else(|| self.pattern.pattern())
	}

	/// Returns the segment matcher.
	pub fn pattern(&self) -> &SegmentPattern {
		&self.pattern
	}

	/// Returns the parent, `None` at the root.
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	/// Returns the children in priority order.
	pub fn children(&self) -> &[NodeId] {
		&self.children
	}

	/// Returns the distance from the root.
	pub fn depth(&self) -> usize {
		self.depth
	}

	/// Returns the data source, if configured.
	pub fn collection(&self) -> Option<&Arc<dyn DataSource>> {
		self.collection.as_ref()
	}

	/// Returns the auto-render policy as configured on this node.
	pub fn auto_render(&self) -> AutoRender {
		self.auto_render
	}

	/// Returns whether this node renders on arrival, after inheritance.
	pub fn renders(&self) -> bool {
		self.renders
	}

	/// Returns the element this node renders into, after inheritance.
	///
	/// A node with its own `el` uses it. A node with a `tag_name` but no
	/// `el` creates its own element, described by a selector built from
	/// its tag, id and classes (`article#post.entry`). Otherwise the
	/// parent's element is used, including one the parent created.
	pub fn element(&self) -> Option<&str> {
		self.element.as_deref()
	}

	/// Returns the presentation options.
	pub fn presentation(&self) -> &Presentation {
		&self.presentation
	}

	pub(crate) fn handler(&self) -> &dyn NodeHandler {
		self.handler.as_ref()
	}
}

fn created_selector(tag: &str, presentation: &Presentation) -> String {
	let mut selector = tag.to_string();
	if let Some(id) = &presentation.id {
		selector.push('#');
		selector.push_str(id);
	}
	for class in presentation.class_name.iter().flat_map(|c| c.split_whitespace()) {
		selector.push('.');
		selector.push_str(class);
	}
	selector
}

/// An immutable, arena-backed node tree.
#[derive(Debug)]
pub struct Tree {
	nodes: Vec<Node>,
}

impl Tree {
	/// Builds a tree from a root configuration.
	///
	/// # Errors
	///
	/// Returns the first [`ConfigError`](crate::error::ConfigError) raised
	/// while compiling a node's pattern.
	pub fn build(root: NodeConfig) -> ConfigResult<Self> {
		let mut tree = Self { nodes: Vec::new() };
		tree.insert(root, None)?;
		tracing::info!(nodes = tree.nodes.len(), "Built node tree");
		Ok(tree)
	}

	/// Adds a node and its subtree in pre-order, returning the node's id.
	fn insert(&mut self, config: NodeConfig, parent: Option<NodeId>) -> ConfigResult<NodeId> {
		let NodeConfig {
			name,
			url_match,
			children,
			collection,
			auto_render,
			handler,
			presentation,
		} = config;

		let pattern = SegmentPattern::compile(url_match)?;
		let parent_node = parent.map(|id| &self.nodes[id.0]);
		let renders = auto_render.resolve(parent_node.is_none_or(|p| p.renders));
		let element = match (&presentation.el, &presentation.tag_name) {
			(Some(el), _) => Some(el.clone()),
			(None, Some(tag)) => Some(created_selector(tag, &presentation)),
			(None, None) => parent_node.and_then(|p| p.element.clone()),
		};
		let depth = parent_node.map_or(0, |p| p.depth + 1);

		let id = NodeId(self.nodes.len());
		self.nodes.push(Node {
			id,
			name,
			pattern,
			parent,
			children: Vec::with_capacity(children.len()),
			depth,
			collection,
			auto_render,
			renders,
			element,
			handler,
			presentation,
		});

		for child in children {
			let child_id = self.insert(child, Some(id))?;
			self.nodes[id.0].children.push(child_id);
		}
		Ok(id)
	}

	/// Returns the root id.
	pub fn root(&self) -> NodeId {
		NodeId::ROOT
	}

	/// Returns a node.
	///
	/// # Panics
	///
	/// Panics if `id` came from a different tree.
	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.0]
	}

	/// Returns a node, or `None` for an id outside this tree.
	pub fn get(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(id.0)
	}

	/// Returns the number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Always false; a tree has at least its root.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Iterates nodes in pre-order.
	pub fn iter(&self) -> impl Iterator<Item = &Node> {
		self.nodes.iter()
	}

	/// Returns the nodes from the root down to and including `id`.
	pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
		let mut chain = vec![id];
		let mut cursor = self.get(id).and_then(Node::parent);
		while let Some(parent) = cursor {
			chain.push(parent);
			cursor = self.nodes[parent.0].parent;
		}
		chain.reverse();
		chain
	}

	/// Finds the first node, in pre-order, with the given name.
	pub fn find(&self, name: &str) -> Option<NodeId> {
		self.nodes
			.iter()
			.find(|node| node.name() == Some(name))
			.map(Node::id)
	}
}
