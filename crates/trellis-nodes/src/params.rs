//! Parameter resolution for matched segments.
//!
//! Captures produced by a [`SegmentPattern`](crate::pattern::SegmentPattern)
//! are split into keyword parameters (the leading captures, keyed by the
//! pattern's parameter names) and positional overflow. The same values can
//! then be pulled out as typed data, similar to a backend `Path<T>`
//! extractor.

use std::collections::HashMap;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::PathError;
use crate::pattern::Captures;
use crate::record::{DataSource, ID_FIELD, Record};

/// Parameters captured from one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamContext {
	/// Named parameters.
	kwargs: HashMap<String, String>,
	/// Captures that had no name.
	args: Vec<String>,
	/// Every participating capture in pattern order.
	values: Vec<String>,
}

impl ParamContext {
	/// Creates a parameter context from already-partitioned parameters.
	///
	/// The ordered values are the args only, since the iteration order of
	/// `kwargs` carries no meaning.
	pub fn new(kwargs: HashMap<String, String>, args: Vec<String>) -> Self {
		Self {
			kwargs,
			values: args.clone(),
			args,
		}
	}

	/// Partitions raw captures using the pattern's parameter names.
	///
	/// The first `names.len()` captures are keyed by name; the remainder
	/// become positional args. Groups that did not participate are left out
	/// of both, and names without a corresponding capture are simply absent.
	pub fn from_captures(captures: Captures, names: &[String]) -> Self {
		let mut kwargs = HashMap::new();
		let mut args = Vec::new();
		let mut values = Vec::new();

		for (idx, capture) in captures.into_iter().enumerate() {
			let Some(value) = capture else {
				continue;
			};
			values.push(value.clone());
			match names.get(idx) {
				Some(name) => {
					kwargs.insert(name.clone(), value);
				}
				None => args.push(value),
			}
		}

		Self {
			kwargs,
			args,
			values,
		}
	}

	/// Returns the named parameters.
	pub fn kwargs(&self) -> &HashMap<String, String> {
		&self.kwargs
	}

	/// Returns the positional parameters.
	pub fn args(&self) -> &[String] {
		&self.args
	}

	/// Returns the number of captured values.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns whether nothing was captured.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Parses a named parameter.
	///
	/// # Errors
	///
	/// Returns [`PathError::Missing`] if the name was not captured and
	/// [`PathError::ParseError`] if the value does not parse.
	pub fn kwarg<T>(&self, name: &str) -> Result<T, PathError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		let raw = self
			.kwargs
			.get(name)
			.ok_or_else(|| PathError::Missing(name.to_string()))?;
		parse_value(raw, None)
	}

	/// Parses a positional parameter.
	///
	/// # Errors
	///
	/// Returns [`PathError::CountMismatch`] if there is no arg at `index`
	/// and [`PathError::ParseError`] if the value does not parse.
	pub fn arg<T>(&self, index: usize) -> Result<T, PathError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		let raw = self.args.get(index).ok_or(PathError::CountMismatch {
			expected: index + 1,
			actual: self.args.len(),
		})?;
		parse_value(raw, Some(index))
	}

	/// Extracts every captured value as `T`.
	pub fn extract<T: FromParams>(&self) -> Result<T, PathError> {
		T::from_params(self)
	}
}

fn parse_value<T>(raw: &str, index: Option<usize>) -> Result<T, PathError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	raw.parse::<T>().map_err(|e| PathError::ParseError {
		param_index: index,
		param_type: std::any::type_name::<T>(),
		raw_value: raw.to_string(),
		reason: e.to_string(),
	})
}

/// Resolves the record a set of keyword parameters points at.
///
/// An `id` parameter short-circuits to an id lookup. Otherwise the source
/// is scanned in order for the first record whose fields equal every
/// parameter. Returns `None` when nothing matches.
pub fn resolve_record(source: &dyn DataSource, kwargs: &HashMap<String, String>) -> Option<Record> {
	if let Some(id) = kwargs.get(ID_FIELD) {
		return source.get(id);
	}
	source.find(&|record: &Record| record.matches_all(kwargs))
}

/// Trait for extracting typed values from captured parameters.
pub trait FromParams: Sized {
	/// Extracts Self from the parameter context.
	///
	/// # Errors
	///
	/// Returns [`PathError::CountMismatch`] if the number of values doesn't match.
	/// Returns [`PathError::ParseError`] if parsing fails.
	fn from_params(ctx: &ParamContext) -> Result<Self, PathError>;
}

/// Single captured value extractor.
///
/// # Example
///
/// ```
/// use trellis_nodes::params::{ParamContext, Path};
/// use trellis_nodes::pattern::SegmentPattern;
///
/// let pattern = SegmentPattern::new(":id").unwrap();
/// let captures = pattern.captures("42").unwrap();
/// let ctx = ParamContext::from_captures(captures, pattern.param_names());
///
/// let Path(id) = ctx.extract::<Path<u32>>().unwrap();
/// assert_eq!(id, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
	/// Unwraps the inner value.
	pub fn into_inner(self) -> T {
		self.0
	}
}

impl<T> Deref for Path<T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<T> AsRef<T> for Path<T> {
	fn as_ref(&self) -> &T {
		&self.0
	}
}

impl<T: FromParams> FromParams for Path<T> {
	fn from_params(ctx: &ParamContext) -> Result<Self, PathError> {
		T::from_params(ctx).map(Path)
	}
}

macro_rules! impl_from_params_for_single {
	($($ty:ty),* $(,)?) => {
		$(
			impl FromParams for $ty {
				fn from_params(ctx: &ParamContext) -> Result<Self, PathError> {
					if ctx.values.len() != 1 {
						return Err(PathError::CountMismatch {
							expected: 1,
							actual: ctx.values.len(),
						});
					}
					parse_value(&ctx.values[0], Some(0))
				}
			}
		)*
	};
}

impl_from_params_for_single! {
	i32, i64, u32, u64, usize, bool, String,
}

macro_rules! impl_from_params_for_tuple {
	($($idx:tt => $ty:ident),+ $(,)?) => {
		impl<$($ty),+> FromParams for ($($ty,)+)
		where
			$($ty: FromStr,)+
			$(<$ty as FromStr>::Err: std::fmt::Display,)+
		{
			fn from_params(ctx: &ParamContext) -> Result<Self, PathError> {
				let expected = [$($idx),+].len();
				if ctx.values.len() != expected {
					return Err(PathError::CountMismatch {
						expected,
						actual: ctx.values.len(),
					});
				}

				Ok((
					$(parse_value::<$ty>(&ctx.values[$idx], Some($idx))?,)+
				))
			}
		}
	};
}

impl_from_params_for_tuple!(0 => A, 1 => B);
impl_from_params_for_tuple!(0 => A, 1 => B, 2 => C);
impl_from_params_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D);
