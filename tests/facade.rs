//! Facade re-export tests
//!
//! Success Criteria:
//! 1. The prelude is enough to build and visit a tree
//! 2. Declarative trees are reachable through the facade
//!
//! Test Categories:
//! - Happy Path: 2 tests

use rstest::*;
use serde_json::json;
use std::sync::Arc;
use trellis::prelude::*;

// ============================================================================
// Happy Path
// ============================================================================

/// A tree built from the prelude alone resolves records by scan.
#[rstest]
#[case("/users/alice", Some(30))]
#[case("/users/bob", None)]
fn test_prelude_tree(#[case] path: &str, #[case] age: Option<i64>) {
	// Arrange
	let alice = json!({ "id": 1, "login": "alice", "age": 30 });
	let users: Collection = [Record::try_from(alice).unwrap()].into_iter().collect();
	let root = RootNode::new(
		NodeConfig::new().child(
			NodeConfig::matching("users")
				.child(NodeConfig::matching(":login").collection(Arc::new(users))),
		),
	)
	.unwrap();

	// Act
	let traversal = root.visit(path);

	// Assert
	let record = traversal.destination().and_then(NodeMatch::record);
	assert_eq!(record.and_then(|r| r.get("age")).and_then(|v| v.as_i64()), age);
}

/// The declarative form builds through the re-exported module.
#[cfg(feature = "spec")]
#[rstest]
fn test_declarative_tree() {
	use trellis::spec::{NodeSpec, SourceRegistry};

	let spec: NodeSpec = serde_json::from_value(json!({
		"name": "home",
		"children": [{ "name": "page", "urlMatch": "page-:n" }]
	}))
	.unwrap();
	let root = RootNode::new(spec.into_config(&SourceRegistry::new()).unwrap()).unwrap();

	let traversal = root.visit("/page-3");

	let destination = traversal.destination().unwrap();
	assert_eq!(root.tree().find("page"), Some(destination.node()));
	assert_eq!(destination.params().kwarg::<u8>("n"), Ok(3));
}
