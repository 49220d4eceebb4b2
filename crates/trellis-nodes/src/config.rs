//! Node configuration.
//!
//! A tree is described by nesting [`NodeConfig`] values and is then built
//! once into an immutable [`Tree`](crate::tree::Tree). Every recognized
//! option has a named field and a typed default; presentation options are
//! carried through to the render hook untouched.

use crate::pattern::UrlMatch;
use crate::record::{DataSource, Record};
use crate::traversal::{NodeHandler, NoopHandler};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Whether a node renders when it is the destination of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoRender {
	/// Use the parent's resolved value (`true` at the root).
	#[default]
	Inherit,
	/// Always render on arrival.
	Enabled,
	/// Never render on arrival.
	Disabled,
}

impl AutoRender {
	/// Resolves against the parent's resolved value.
	pub fn resolve(self, inherited: bool) -> bool {
		match self {
			Self::Inherit => inherited,
			Self::Enabled => true,
			Self::Disabled => false,
		}
	}
}

impl From<bool> for AutoRender {
	fn from(value: bool) -> Self {
		if value { Self::Enabled } else { Self::Disabled }
	}
}

impl From<Option<bool>> for AutoRender {
	fn from(value: Option<bool>) -> Self {
		value.map(Self::from).unwrap_or_default()
	}
}

/// Presentation options passed through to the render hook.
///
/// None of these are interpreted by traversal, except for element
/// resolution: `el` names the element directly, `tag_name` (with `id` and
/// `class_name`) describes one the node creates, and a node with neither
/// renders into its parent's element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
	/// Static record rendered when no data source lookup happens.
	pub model: Option<Record>,
	/// Selector of the element to render into.
	pub el: Option<String>,
	/// Element id.
	pub id: Option<String>,
	/// Extra element attributes.
	pub attributes: HashMap<String, String>,
	/// Element class.
	pub class_name: Option<String>,
	/// Tag of an element to create for this node.
	pub tag_name: Option<String>,
}

/// Configuration for one node and, recursively, its children.
pub struct NodeConfig {
	pub(crate) name: Option<String>,
	pub(crate) url_match: UrlMatch,
	pub(crate) children: Vec<NodeConfig>,
	pub(crate) collection: Option<Arc<dyn DataSource>>,
	pub(crate) auto_render: AutoRender,
	pub(crate) handler: Arc<dyn NodeHandler>,
	pub(crate) presentation: Presentation,
}

impl Default for NodeConfig {
	fn default() -> Self {
		Self {
			name: None,
			url_match: UrlMatch::Any,
			children: Vec::new(),
			collection: None,
			auto_render: AutoRender::Inherit,
			handler: Arc::new(NoopHandler),
			presentation: Presentation::default(),
		}
	}
}

impl fmt::Debug for NodeConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodeConfig")
			.field("name", &self.name)
			.field("url_match", &self.url_match)
			.field("children", &self.children)
			.field("has_collection", &self.collection.is_some())
			.field("auto_render", &self.auto_render)
			.field("presentation", &self.presentation)
			.finish()
	}
}

impl NodeConfig {
	/// Creates a match-all node with default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a node matching the given pattern.
	pub fn matching(url_match: impl Into<UrlMatch>) -> Self {
		Self::new().url_match(url_match)
	}

	/// Sets a label used in logs and debug output.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Sets the segment matcher.
	pub fn url_match(mut self, url_match: impl Into<UrlMatch>) -> Self {
		self.url_match = url_match.into();
		self
	}

	/// Appends a child. Children are tried in insertion order.
	pub fn child(mut self, child: NodeConfig) -> Self {
		self.children.push(child);
		self
	}

	/// Appends several children.
	pub fn children(mut self, children: impl IntoIterator<Item = NodeConfig>) -> Self {
		self.children.extend(children);
		self
	}

	/// Sets the data source records are resolved from.
	pub fn collection(mut self, source: Arc<dyn DataSource>) -> Self {
		self.collection = Some(source);
		self
	}

	/// Sets the auto-render policy.
	pub fn auto_render(mut self, auto_render: impl Into<AutoRender>) -> Self {
		self.auto_render = auto_render.into();
		self
	}

	/// Sets the traversal and render callbacks.
	pub fn handler(mut self, handler: impl NodeHandler + 'static) -> Self {
		self.handler = Arc::new(handler);
		self
	}

	/// Sets a shared handler.
	pub fn shared_handler(mut self, handler: Arc<dyn NodeHandler>) -> Self {
		self.handler = handler;
		self
	}

	/// Sets the presentation options.
	pub fn presentation(mut self, presentation: Presentation) -> Self {
		self.presentation = presentation;
		self
	}

	/// Sets the static model.
	pub fn model(mut self, model: Record) -> Self {
		self.presentation.model = Some(model);
		self
	}

	/// Sets the element selector.
	pub fn el(mut self, el: impl Into<String>) -> Self {
		self.presentation.el = Some(el.into());
		self
	}

	/// Sets the tag of an element to create.
	pub fn tag_name(mut self, tag_name: impl Into<String>) -> Self {
		self.presentation.tag_name = Some(tag_name.into());
		self
	}
}
