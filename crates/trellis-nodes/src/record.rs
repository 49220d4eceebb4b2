//! Records and the data sources nodes resolve them from.
//!
//! A node configured with a [`DataSource`] looks up a [`Record`] from the
//! parameters captured out of its segment. Only two operations are needed
//! from a source: lookup by id and a first-match scan in the source's
//! native order. [`Collection`] is the in-memory implementation.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Field that identifies a record.
pub const ID_FIELD: &str = "id";

/// A flat set of named fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
	fields: Map<String, Value>,
}

impl Record {
	/// Creates an empty record.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a field, builder style.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.fields.insert(name.into(), value.into());
		self
	}

	/// Returns the raw value of a field.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.get(name)
	}

	/// Returns the record id rendered as a string.
	pub fn id(&self) -> Option<String> {
		self.get(ID_FIELD).and_then(value_as_key)
	}

	/// Returns the underlying field map.
	pub fn fields(&self) -> &Map<String, Value> {
		&self.fields
	}

	/// Compares a field against a captured string.
	///
	/// Path parameters are always strings, so string fields compare
	/// directly and booleans compare through their display form. Numeric
	/// fields compare by value: `"5"`, `"05"` and `"5.0"` all equal both
	/// `5` and `5.0`. Missing fields, nulls, arrays and objects never
	/// match, and neither does an empty or non-numeric string against a
	/// number.
	pub fn field_matches(&self, name: &str, raw: &str) -> bool {
		match self.get(name) {
			Some(Value::Number(n)) => {
				n.to_string() == raw
					|| raw
						.trim()
						.parse::<f64>()
						.ok()
						.zip(n.as_f64())
						.is_some_and(|(parsed, field)| parsed == field)
			}
			Some(value) => value_as_key(value).is_some_and(|value| value == raw),
			None => false,
		}
	}

	/// Returns true when every `(name, value)` pair matches this record.
	pub fn matches_all(&self, params: &HashMap<String, String>) -> bool {
		params
			.iter()
			.all(|(name, value)| self.field_matches(name, value))
	}
}

impl From<Map<String, Value>> for Record {
	fn from(fields: Map<String, Value>) -> Self {
		Self { fields }
	}
}

impl TryFrom<Value> for Record {
	type Error = Value;

	/// Accepts JSON objects; any other value is handed back.
	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(fields) => Ok(Self { fields }),
			other => Err(other),
		}
	}
}

fn value_as_key(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

/// A record container a node can resolve records from.
pub trait DataSource: Send + Sync + fmt::Debug {
	/// Looks a record up by id.
	fn get(&self, id: &str) -> Option<Record>;

	/// Returns the first record, in source order, accepted by `predicate`.
	fn find(&self, predicate: &dyn Fn(&Record) -> bool) -> Option<Record>;
}

/// An ordered, id-indexed, in-memory record container.
#[derive(Debug, Clone, Default)]
pub struct Collection {
	records: Vec<Record>,
	/// Record position by id; first record wins on duplicate ids.
	by_id: HashMap<String, usize>,
}

impl Collection {
	/// Creates an empty collection.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a record.
	pub fn push(&mut self, record: Record) {
		if let Some(id) = record.id() {
			self.by_id.entry(id).or_insert(self.records.len());
		}
		self.records.push(record);
	}

	/// Returns the number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns whether the collection is empty.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Iterates records in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &Record> {
		self.records.iter()
	}
}

impl FromIterator<Record> for Collection {
	fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
		let mut collection = Self::new();
		for record in iter {
			collection.push(record);
		}
		collection
	}
}

impl DataSource for Collection {
	fn get(&self, id: &str) -> Option<Record> {
		self.by_id.get(id).map(|&idx| self.records[idx].clone())
	}

	fn find(&self, predicate: &dyn Fn(&Record) -> bool) -> Option<Record> {
		self.records.iter().find(|record| predicate(record)).cloned()
	}
}
