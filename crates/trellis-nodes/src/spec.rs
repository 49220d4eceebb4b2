//! Declarative node trees.
//!
//! A [`NodeSpec`] is the serde form of a [`NodeConfig`], so a tree can be
//! kept in a JSON document. Data sources cannot be serialized; a spec names
//! them and they are looked up in a [`SourceRegistry`] when the spec is
//! turned into configuration. Handlers are attached afterwards by name
//! through [`HandlerRegistry`].
//!
//! ```
//! use std::sync::Arc;
//! use trellis_nodes::record::{Collection, Record};
//! use trellis_nodes::root::RootNode;
//! use trellis_nodes::spec::{NodeSpec, SourceRegistry};
//!
//! let spec = NodeSpec::from_json(r#"{
//!     "name": "home",
//!     "children": [
//!         { "name": "post", "urlMatch": ":id", "collection": "posts" }
//!     ]
//! }"#).unwrap();
//!
//! let mut sources = SourceRegistry::new();
//! sources.register("posts", Arc::new(
//!     [Record::new().with("id", "2").with("title", "Hello")]
//!         .into_iter()
//!         .collect::<Collection>(),
//! ));
//!
//! let root = RootNode::new(spec.into_config(&sources).unwrap()).unwrap();
//! let traversal = root.visit("/2");
//! let record = traversal.destination().and_then(|m| m.record()).unwrap();
//! assert!(record.field_matches("title", "Hello"));
//! ```

use crate::config::{NodeConfig, Presentation};
use crate::error::{ConfigError, ConfigResult};
use crate::pattern::UrlMatch;
use crate::record::{DataSource, Record};
use crate::traversal::NodeHandler;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Either a single child or a list of children.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(Box<NodeSpec>),
	Many(Vec<NodeSpec>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<NodeSpec>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(match OneOrMany::deserialize(deserializer)? {
		OneOrMany::One(child) => vec![*child],
		OneOrMany::Many(children) => children,
	})
}

/// Serializable description of a node and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
	/// Label used in logs and by [`HandlerRegistry`].
	#[serde(default)]
	pub name: Option<String>,
	/// Literal / `:name` segment pattern.
	#[serde(default, alias = "urlMatch")]
	pub url_match: Option<String>,
	/// Regex source, as an alternative to `url_match`.
	#[serde(default)]
	pub regex: Option<String>,
	/// Names for the regex's capture groups.
	#[serde(default, alias = "kwargKeys")]
	pub kwarg_keys: Vec<String>,
	/// Name of a registered data source.
	#[serde(default)]
	pub collection: Option<String>,
	/// Auto-render policy; absent means inherit.
	#[serde(default, alias = "autoRender")]
	pub auto_render: Option<bool>,
	/// Static model, as a JSON object.
	#[serde(default)]
	pub model: Option<serde_json::Value>,
	/// Element selector.
	#[serde(default)]
	pub el: Option<String>,
	/// Element id.
	#[serde(default)]
	pub id: Option<String>,
	/// Element attributes.
	#[serde(default)]
	pub attributes: HashMap<String, String>,
	/// Element class.
	#[serde(default, alias = "className")]
	pub class_name: Option<String>,
	/// Tag of an element to create.
	#[serde(default, alias = "tagName")]
	pub tag_name: Option<String>,
	/// Child nodes, in priority order.
	#[serde(default, deserialize_with = "one_or_many")]
	pub children: Vec<NodeSpec>,
}

impl NodeSpec {
	/// Parses a spec from JSON.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::InvalidSpec`] for malformed documents or
	/// unknown fields.
	pub fn from_json(json: &str) -> ConfigResult<Self> {
		serde_json::from_str(json).map_err(|e| ConfigError::InvalidSpec(e.to_string()))
	}

	/// Converts the spec into configuration without handlers.
	///
	/// # Errors
	///
	/// Returns [`ConfigError`] when both `url_match` and `regex` are set,
	/// when `kwarg_keys` is given without `regex`, when a regex does not
	/// compile, when `model` is not an object, or when a collection name is
	/// not registered.
	pub fn into_config(self, sources: &SourceRegistry) -> ConfigResult<NodeConfig> {
		self.into_config_with(sources, &HandlerRegistry::new())
	}

	/// Converts the spec into configuration, attaching handlers by node name.
	///
	/// # Errors
	///
	/// See [`NodeSpec::into_config`].
	pub fn into_config_with(
		self,
		sources: &SourceRegistry,
		handlers: &HandlerRegistry,
	) -> ConfigResult<NodeConfig> {
		let label = self.name.clone().unwrap_or_default();
		let url_match = match (self.url_match, self.regex) {
			(Some(_), Some(_)) => {
				return Err(ConfigError::InvalidSpec(format!(
					"node '{}' sets both url_match and regex",
					label
				)));
			}
			(None, Some(source)) => UrlMatch::regex(Regex::new(&source)?, self.kwarg_keys),
			(url_match, None) => {
				if !self.kwarg_keys.is_empty() {
					return Err(ConfigError::InvalidSpec(format!(
						"node '{}' sets kwarg_keys without regex",
						label
					)));
				}
				url_match.map_or(UrlMatch::Any, UrlMatch::Pattern)
			}
		};

		let model = self
			.model
			.map(|value| {
				Record::try_from(value).map_err(|_| {
					ConfigError::InvalidSpec(format!("node '{}' model must be an object", label))
				})
			})
			.transpose()?;

		let mut config = NodeConfig::new()
			.url_match(url_match)
			.auto_render(self.auto_render)
			.presentation(Presentation {
				model,
				el: self.el,
				id: self.id,
				attributes: self.attributes,
				class_name: self.class_name,
				tag_name: self.tag_name,
			});

		if let Some(name) = self.collection {
			let source = sources
				.get(&name)
				.ok_or(ConfigError::UnknownSource(name))?;
			config = config.collection(source);
		}
		if let Some(name) = self.name {
			if let Some(handler) = handlers.get(&name) {
				config = config.shared_handler(handler);
			}
			config = config.name(name);
		}

		for child in self.children {
			config = config.child(child.into_config_with(sources, handlers)?);
		}
		Ok(config)
	}
}

/// Named data sources available to [`NodeSpec::into_config`].
#[derive(Debug, Default, Clone)]
pub struct SourceRegistry {
	sources: HashMap<String, Arc<dyn DataSource>>,
}

impl SourceRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a source, replacing any previous source of the same name.
	pub fn register(&mut self, name: impl Into<String>, source: Arc<dyn DataSource>) -> &mut Self {
		self.sources.insert(name.into(), source);
		self
	}

	/// Looks a source up.
	pub fn get(&self, name: &str) -> Option<Arc<dyn DataSource>> {
		self.sources.get(name).cloned()
	}
}

/// Named handlers available to [`NodeSpec::into_config_with`].
#[derive(Default, Clone)]
pub struct HandlerRegistry {
	handlers: HashMap<String, Arc<dyn NodeHandler>>,
}

impl fmt::Debug for HandlerRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerRegistry")
			.field("names", &self.handlers.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl HandlerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a handler for nodes with the given name.
	pub fn register(
		&mut self,
		name: impl Into<String>,
		handler: Arc<dyn NodeHandler>,
	) -> &mut Self {
		self.handlers.insert(name.into(), handler);
		self
	}

	/// Looks a handler up.
	pub fn get(&self, name: &str) -> Option<Arc<dyn NodeHandler>> {
		self.handlers.get(name).cloned()
	}
}
