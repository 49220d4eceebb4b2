//! Segment pattern compilation.
//!
//! A node decides whether it accepts the next path segment through a
//! [`SegmentPattern`]. Patterns are compiled once, while the tree is being
//! built, from a [`UrlMatch`] description:
//!
//! - [`UrlMatch::Any`] accepts every segment, including the empty one.
//! - [`UrlMatch::Pattern`] is a literal segment that may contain `:name`
//!   tokens. Each token captures one or more characters and its name is
//!   recorded, in order, as a parameter name.
//! - [`UrlMatch::Compiled`] wraps a caller-supplied regex together with the
//!   names to give its capture groups. The regex is used verbatim.
//!
//! Literal and `:name` patterns are anchored to the whole segment, so
//! `"post-:id"` matches `"post-7"` but neither `"a-post-7"` nor
//! `"post-"`.

use crate::error::{ConfigError, ConfigResult};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;

/// Maximum allowed length for a segment pattern string in bytes.
pub const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed size for a compiled segment regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Raw capture groups of a successful segment match, full match excluded.
///
/// Groups that did not participate in the match are `None`.
pub type Captures = Vec<Option<String>>;

/// How a node matches its segment, as given in configuration.
#[derive(Debug, Clone, Default)]
pub enum UrlMatch {
	/// Matches any single segment, including the empty segment.
	#[default]
	Any,
	/// Literal segment text with optional `:name` tokens.
	Pattern(String),
	/// A prebuilt regex plus names for its leading capture groups.
	Compiled {
		/// The regex, applied to the segment as-is.
		regex: Regex,
		/// Names for the first capture groups; the rest become positional.
		kwarg_keys: Vec<String>,
	},
}

impl UrlMatch {
	/// Creates a literal / `:name` pattern.
	pub fn pattern(pattern: impl Into<String>) -> Self {
		Self::Pattern(pattern.into())
	}

	/// Creates a compiled matcher with names for its capture groups.
	pub fn regex<I, S>(regex: Regex, kwarg_keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Compiled {
			regex,
			kwarg_keys: kwarg_keys.into_iter().map(Into::into).collect(),
		}
	}
}

impl From<&str> for UrlMatch {
	fn from(pattern: &str) -> Self {
		Self::Pattern(pattern.to_string())
	}
}

impl From<String> for UrlMatch {
	fn from(pattern: String) -> Self {
		Self::Pattern(pattern)
	}
}

impl From<Regex> for UrlMatch {
	fn from(regex: Regex) -> Self {
		Self::Compiled {
			regex,
			kwarg_keys: Vec::new(),
		}
	}
}

/// The resolved shape of a [`SegmentPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
	/// Accepts every segment.
	Any,
	/// Exact text, no parameters.
	Literal,
	/// Text with one or more `:name` tokens.
	Named,
	/// Caller-supplied regex.
	Compiled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
	Text(String),
	Param(String),
}

/// A compiled single-segment matcher plus its ordered parameter names.
#[derive(Debug, Clone)]
pub struct SegmentPattern {
	/// The original pattern text (or regex source).
	source: String,
	kind: MatcherKind,
	/// `None` for [`MatcherKind::Any`] and [`MatcherKind::Literal`].
	regex: Option<Regex>,
	/// Parameter names, aligned with the leading capture groups.
	param_names: Vec<String>,
	/// Tokenized pattern, used by [`SegmentPattern::reverse`].
	parts: Vec<Part>,
}

impl Default for SegmentPattern {
	fn default() -> Self {
		Self::any()
	}
}

impl SegmentPattern {
	/// A matcher that accepts any segment.
	pub fn any() -> Self {
		Self {
			source: ".*".to_string(),
			kind: MatcherKind::Any,
			regex: None,
			param_names: Vec::new(),
			parts: Vec::new(),
		}
	}

	/// Compiles a [`UrlMatch`] description.
	///
	/// # Errors
	///
	/// See [`SegmentPattern::new`] for literal patterns. A compiled regex
	/// never fails here.
	pub fn compile(url_match: UrlMatch) -> ConfigResult<Self> {
		match url_match {
			UrlMatch::Any => Ok(Self::any()),
			UrlMatch::Pattern(pattern) => Self::new(&pattern),
			UrlMatch::Compiled { regex, kwarg_keys } => Ok(Self::from_regex(regex, kwarg_keys)),
		}
	}

	/// Wraps a prebuilt regex. Captures beyond `kwarg_keys` are positional.
	pub fn from_regex(regex: Regex, kwarg_keys: Vec<String>) -> Self {
		Self {
			source: regex.as_str().to_string(),
			kind: MatcherKind::Compiled,
			regex: Some(regex),
			param_names: kwarg_keys,
			parts: Vec::new(),
		}
	}

	/// Compiles a literal segment pattern with optional `:name` tokens.
	///
	/// # Errors
	///
	/// Returns [`ConfigError`] if:
	/// - the pattern exceeds [`MAX_PATTERN_LENGTH`]
	/// - the pattern contains `/`
	/// - a `:` is not followed by an identifier (`[A-Za-z0-9_]+`)
	/// - a parameter name is used twice
	pub fn new(pattern: &str) -> ConfigResult<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(ConfigError::PatternTooLong {
				length: pattern.len(),
				max: MAX_PATTERN_LENGTH,
			});
		}
		if pattern.contains('/') {
			return Err(ConfigError::SeparatorInPattern(pattern.to_string()));
		}

		let parts = Self::tokenize(pattern)?;
		let param_names: Vec<String> = parts
			.iter()
			.filter_map(|part| match part {
				Part::Param(name) => Some(name.clone()),
				Part::Text(_) => None,
			})
			.collect();

		if param_names.is_empty() {
			return Ok(Self {
				source: pattern.to_string(),
				kind: MatcherKind::Literal,
				regex: None,
				param_names,
				parts,
			});
		}

		let mut regex_str = String::from("^");
		for part in &parts {
			match part {
				Part::Text(text) => regex_str.push_str(&regex::escape(text)),
				// One or more characters, never a separator
				Part::Param(_) => regex_str.push_str("([^/]+)"),
			}
		}
		regex_str.push('$');

		let regex = RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()?;

		Ok(Self {
			source: pattern.to_string(),
			kind: MatcherKind::Named,
			regex: Some(regex),
			param_names,
			parts,
		})
	}

	/// Splits a pattern into literal text runs and `:name` tokens.
	fn tokenize(pattern: &str) -> ConfigResult<Vec<Part>> {
		let mut parts = Vec::new();
		let mut text = String::new();
		let mut chars = pattern.char_indices().peekable();

		while let Some((position, c)) = chars.next() {
			if c != ':' {
				text.push(c);
				continue;
			}

			let mut name = String::new();
			while let Some(&(_, next)) = chars.peek() {
				if !(next.is_ascii_alphanumeric() || next == '_') {
					break;
				}
				name.push(next);
				chars.next();
			}

			if name.is_empty() {
				return Err(ConfigError::MalformedToken {
					pattern: pattern.to_string(),
					position,
				});
			}
			if parts.contains(&Part::Param(name.clone())) {
				return Err(ConfigError::DuplicateParam {
					pattern: pattern.to_string(),
					name,
				});
			}

			if !text.is_empty() {
				parts.push(Part::Text(std::mem::take(&mut text)));
			}
			parts.push(Part::Param(name));
		}

		if !text.is_empty() {
			parts.push(Part::Text(text));
		}
		Ok(parts)
	}

	/// Returns the original pattern text.
	pub fn pattern(&self) -> &str {
		&self.source
	}

	/// Returns the resolved matcher kind.
	pub fn kind(&self) -> MatcherKind {
		self.kind
	}

	/// Returns the parameter names.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Applies the matcher to one segment.
	///
	/// Returns the capture groups (full match excluded) on success.
	pub fn captures(&self, segment: &str) -> Option<Captures> {
		match self.kind {
			MatcherKind::Any => Some(Vec::new()),
			MatcherKind::Literal => (segment == self.source).then(Vec::new),
			MatcherKind::Named | MatcherKind::Compiled => {
				let caps = self.regex.as_ref()?.captures(segment)?;
				Some(
					caps.iter()
						.skip(1)
						.map(|group| group.map(|m| m.as_str().to_string()))
						.collect(),
				)
			}
		}
	}

	/// Checks if this pattern would accept the given segment.
	pub fn is_match(&self, segment: &str) -> bool {
		match self.kind {
			MatcherKind::Any => true,
			MatcherKind::Literal => segment == self.source,
			MatcherKind::Named | MatcherKind::Compiled => self
				.regex
				.as_ref()
				.is_some_and(|regex| regex.is_match(segment)),
		}
	}

	/// Generates a segment from this pattern with the given parameters.
	///
	/// Returns `None` for matchers that cannot be reversed (`Any`,
	/// compiled regexes) or when a parameter is missing.
	pub fn reverse(&self, params: &HashMap<String, String>) -> Option<String> {
		match self.kind {
			MatcherKind::Any | MatcherKind::Compiled => None,
			MatcherKind::Literal | MatcherKind::Named => {
				let mut result = String::new();
				for part in &self.parts {
					match part {
						Part::Text(text) => result.push_str(text),
						Part::Param(name) => result.push_str(params.get(name)?),
					}
				}
				Some(result)
			}
		}
	}
}

impl PartialEq for SegmentPattern {
	fn eq(&self, other: &Self) -> bool {
		self.kind == other.kind
			&& self.source == other.source
			&& self.param_names == other.param_names
	}
}

impl Eq for SegmentPattern {}

impl fmt::Display for SegmentPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.source)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("")]
	#[case("anything")]
	#[case("42")]
	fn test_any_matches_every_segment(#[case] segment: &str) {
		let pattern = SegmentPattern::any();
		assert_eq!(pattern.captures(segment), Some(Vec::new()));
		assert!(pattern.is_match(segment));
	}

	#[rstest]
	fn test_literal_pattern() {
		let pattern = SegmentPattern::new("users").unwrap();
		assert_eq!(pattern.kind(), MatcherKind::Literal);
		assert!(pattern.is_match("users"));
		assert!(!pattern.is_match("users2"));
		assert!(!pattern.is_match("my-users"));
		assert!(pattern.param_names().is_empty());
	}

	#[rstest]
	fn test_single_param() {
		let pattern = SegmentPattern::new(":id").unwrap();
		assert_eq!(pattern.kind(), MatcherKind::Named);
		assert_eq!(pattern.param_names(), &["id"]);
		assert_eq!(pattern.captures("42"), Some(vec![Some("42".to_string())]));
		assert_eq!(pattern.captures(""), None);
	}

	#[rstest]
	fn test_params_embedded_in_text() {
		let pattern = SegmentPattern::new("post-:year-:slug").unwrap();
		assert_eq!(pattern.param_names(), &["year", "slug"]);

		let caps = pattern.captures("post-2024-hello").unwrap();
		assert_eq!(caps.len(), 2);
		assert!(caps.iter().all(Option::is_some));
		assert!(!pattern.is_match("a-post-2024-hello"));
		assert!(!pattern.is_match("post-"));
	}

	#[rstest]
	fn test_special_chars_escaped() {
		let pattern = SegmentPattern::new("v1.0").unwrap();
		assert!(pattern.is_match("v1.0"));
		assert!(!pattern.is_match("v1X0"));

		let pattern = SegmentPattern::new("report(:id).pdf").unwrap();
		assert_eq!(
			pattern.captures("report(9).pdf"),
			Some(vec![Some("9".to_string())])
		);
	}

	#[rstest]
	#[case(":")]
	#[case("item-:")]
	#[case(":-id")]
	#[case("a::b")]
	fn test_malformed_token_rejected(#[case] source: &str) {
		let result = SegmentPattern::new(source);
		assert!(matches!(result, Err(ConfigError::MalformedToken { .. })));
	}

	#[rstest]
	fn test_malformed_token_reports_position() {
		let err = SegmentPattern::new("ab:").unwrap_err();
		assert_eq!(
			err,
			ConfigError::MalformedToken {
				pattern: "ab:".to_string(),
				position: 2,
			}
		);
	}

	#[rstest]
	fn test_duplicate_param_rejected() {
		let err = SegmentPattern::new(":id-:id").unwrap_err();
		assert_eq!(
			err,
			ConfigError::DuplicateParam {
				pattern: ":id-:id".to_string(),
				name: "id".to_string(),
			}
		);
	}

	#[rstest]
	fn test_separator_rejected() {
		let result = SegmentPattern::new("users/:id");
		assert!(matches!(result, Err(ConfigError::SeparatorInPattern(_))));
	}

	#[rstest]
	fn test_pattern_rejects_excessive_length() {
		// Arrange
		let long_pattern = "a".repeat(MAX_PATTERN_LENGTH + 1);

		// Act
		let result = SegmentPattern::new(&long_pattern);

		// Assert
		assert!(matches!(
			result,
			Err(ConfigError::PatternTooLong { length, max })
				if length == MAX_PATTERN_LENGTH + 1 && max == MAX_PATTERN_LENGTH
		));
	}

	#[rstest]
	fn test_compiled_regex_used_verbatim() {
		let regex = Regex::new(r"^(\d+)-(\w+)$").unwrap();
		let pattern = SegmentPattern::compile(UrlMatch::from(regex)).unwrap();

		assert_eq!(pattern.kind(), MatcherKind::Compiled);
		assert!(pattern.param_names().is_empty());
		assert_eq!(
			pattern.captures("7-seven"),
			Some(vec![Some("7".to_string()), Some("seven".to_string())])
		);
		assert_eq!(pattern.captures("seven"), None);
	}

	#[rstest]
	fn test_compiled_regex_optional_group() {
		let regex = Regex::new(r"^(\d+)(?:\.(\w+))?$").unwrap();
		let pattern = SegmentPattern::compile(UrlMatch::regex(regex, ["id", "format"])).unwrap();

		assert_eq!(pattern.param_names(), &["id", "format"]);
		assert_eq!(
			pattern.captures("12"),
			Some(vec![Some("12".to_string()), None])
		);
	}

	#[rstest]
	fn test_reverse() {
		let pattern = SegmentPattern::new("post-:year-:slug").unwrap();
		let mut params = HashMap::new();
		params.insert("year".to_string(), "2024".to_string());
		params.insert("slug".to_string(), "hello".to_string());

		assert_eq!(pattern.reverse(&params), Some("post-2024-hello".to_string()));

		params.remove("slug");
		assert_eq!(pattern.reverse(&params), None);
		assert_eq!(SegmentPattern::any().reverse(&params), None);
		assert_eq!(
			SegmentPattern::new("about").unwrap().reverse(&HashMap::new()),
			Some("about".to_string())
		);
	}

	#[rstest]
	fn test_pattern_display_and_equality() {
		let p1 = SegmentPattern::new(":id").unwrap();
		let p2 = SegmentPattern::new(":id").unwrap();
		let p3 = SegmentPattern::new(":user_id").unwrap();

		assert_eq!(format!("{}", p1), ":id");
		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
	}
}
