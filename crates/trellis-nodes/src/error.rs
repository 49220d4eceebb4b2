//! Error types for node configuration and parameter extraction.
//!
//! Nothing that happens during traversal is an error: a segment that
//! does not match, a subtree that cannot consume the rest of the path and
//! a data source without a matching record are all ordinary outcomes.
//! Errors are raised only while the tree is being built, or when a caller
//! asks for a captured parameter as a type it does not parse into.

use thiserror::Error;

/// Error raised while compiling patterns or building a node tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	/// A `:` in a pattern is not followed by an identifier.
	#[error("Malformed named token at byte {position} in pattern '{pattern}'")]
	MalformedToken {
		/// The offending pattern.
		pattern: String,
		/// Byte offset of the `:` that starts the token.
		position: usize,
	},

	/// The same parameter name appears twice in one pattern.
	#[error("Duplicate parameter '{name}' in pattern '{pattern}'")]
	DuplicateParam {
		/// The offending pattern.
		pattern: String,
		/// The repeated name.
		name: String,
	},

	/// A segment pattern contains a path separator and could never match.
	#[error("Pattern '{0}' contains '/', but patterns match a single segment")]
	SeparatorInPattern(String),

	/// Pattern is longer than the allowed maximum.
	#[error("Pattern length {length} exceeds maximum allowed length of {max} bytes")]
	PatternTooLong {
		/// Length of the rejected pattern.
		length: usize,
		/// The configured maximum.
		max: usize,
	},

	/// The generated or supplied regular expression failed to build.
	#[error("Failed to compile pattern regex: {0}")]
	Regex(String),

	/// A declarative spec names a data source that was never registered.
	#[error("Unknown data source: {0}")]
	UnknownSource(String),

	/// A declarative spec could not be parsed.
	#[error("Invalid node spec: {0}")]
	InvalidSpec(String),
}

impl From<regex::Error> for ConfigError {
	fn from(err: regex::Error) -> Self {
		Self::Regex(err.to_string())
	}
}

/// Result type alias for tree configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Error type for typed parameter extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
	/// Failed to parse a parameter value.
	#[error(
		"Failed to parse parameter{} '{raw_value}' as {param_type}: {reason}",
		index_label(.param_index)
	)]
	ParseError {
		/// Index of the parameter that failed to parse.
		param_index: Option<usize>,
		/// Expected type name.
		param_type: &'static str,
		/// Raw string value that failed to parse.
		raw_value: String,
		/// Error message from parsing.
		reason: String,
	},
	/// Parameter count mismatch.
	#[error("Parameter count mismatch: expected {expected}, got {actual}")]
	CountMismatch {
		/// Expected number of parameters.
		expected: usize,
		/// Actual number of parameters.
		actual: usize,
	},
	/// A named parameter was not captured.
	#[error("Missing parameter: {0}")]
	Missing(String),
}

fn index_label(index: &Option<usize>) -> String {
	index.map(|idx| format!("[{}]", idx)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_path_error_display() {
		let err = PathError::ParseError {
			param_index: Some(0),
			param_type: "i32",
			raw_value: "abc".to_string(),
			reason: "invalid digit".to_string(),
		};
		assert!(err.to_string().contains("parameter[0]"));
		assert!(err.to_string().contains("abc"));
		assert!(err.to_string().contains("i32"));
	}

	#[rstest]
	fn test_path_error_without_index() {
		let err = PathError::ParseError {
			param_index: None,
			param_type: "u8",
			raw_value: "300".to_string(),
			reason: "number too large".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Failed to parse parameter '300' as u8: number too large"
		);
	}

	#[rstest]
	fn test_path_error_count_mismatch() {
		let err = PathError::CountMismatch {
			expected: 2,
			actual: 1,
		};
		assert!(err.to_string().contains("expected 2"));
		assert!(err.to_string().contains("got 1"));
	}

	#[rstest]
	fn test_config_error_display() {
		let err = ConfigError::MalformedToken {
			pattern: "item-:".to_string(),
			position: 5,
		};
		assert_eq!(
			err.to_string(),
			"Malformed named token at byte 5 in pattern 'item-:'"
		);
		assert_eq!(
			ConfigError::UnknownSource("posts".to_string()).to_string(),
			"Unknown data source: posts"
		);
	}
}
