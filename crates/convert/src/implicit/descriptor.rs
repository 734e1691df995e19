use std::str::FromStr;
use std::sync::Arc;

use crate::converter::{BoxError, Converter, InvalidValue};

type ParseFn<T> = Arc<dyn Fn(&str) -> Result<T, InvalidValue> + Send + Sync>;

/// One way a type can be built from a string, in probing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mechanism {
	/// Single string-argument construction.
	Constructor,
	/// A `value_of`-style static factory.
	ValueOf,
	/// A `parse`-style static factory.
	Parse,
	/// Lookup of an enumeration member by exact, case-sensitive name.
	EnumMember,
}

impl Mechanism {
	/// All mechanisms in the order synthesis checks them.
	pub const SELECTION_ORDER: [Mechanism; 4] = [Self::Constructor, Self::ValueOf, Self::Parse, Self::EnumMember];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Constructor => "constructor",
			Self::ValueOf => "value_of",
			Self::Parse => "parse",
			Self::EnumMember => "enum_member",
		}
	}
}

impl std::fmt::Display for Mechanism {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Declared string-parsing affordances of a type.
///
/// Each mechanism is optional. Synthesis picks the first declared one in
/// [`Mechanism::SELECTION_ORDER`] and never falls back to another, even when the
/// chosen one rejects a value.
pub struct TypeDescriptor<T> {
	constructor: Option<ParseFn<T>>,
	value_of: Option<ParseFn<T>>,
	parse: Option<ParseFn<T>>,
	members: Option<(Vec<&'static str>, ParseFn<T>)>,
}

impl<T> Default for TypeDescriptor<T> {
	fn default() -> Self {
		Self {
			constructor: None,
			value_of: None,
			parse: None,
			members: None,
		}
	}
}

impl<T> std::fmt::Debug for TypeDescriptor<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TypeDescriptor")
			.field("mechanisms", &self.mechanisms())
			.finish()
	}
}

impl<T: 'static> TypeDescriptor<T> {
	/// A descriptor declaring no mechanism.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares single string-argument construction.
	pub fn constructor<F>(mut self, f: F) -> Self
	where
		F: Fn(&str) -> Result<T, InvalidValue> + Send + Sync + 'static,
	{
		self.constructor = Some(Arc::new(f));
		self
	}

	/// Declares a `value_of`-style factory.
	pub fn value_of<F>(mut self, f: F) -> Self
	where
		F: Fn(&str) -> Result<T, InvalidValue> + Send + Sync + 'static,
	{
		self.value_of = Some(Arc::new(f));
		self
	}

	/// Declares a `parse`-style factory.
	pub fn parse<F>(mut self, f: F) -> Self
	where
		F: Fn(&str) -> Result<T, InvalidValue> + Send + Sync + 'static,
	{
		self.parse = Some(Arc::new(f));
		self
	}

	/// Declares the enumeration members, matched by exact name.
	pub fn enumeration<I>(mut self, members: I) -> Self
	where
		I: IntoIterator<Item = (&'static str, T)>,
		T: Clone + Send + Sync,
	{
		let members: Vec<(&'static str, T)> = members.into_iter().collect();
		let names: Vec<&'static str> = members.iter().map(|(name, _)| *name).collect();
		let expected = names.join(", ");
		let lookup = move |value: &str| -> Result<T, InvalidValue> {
			members
				.iter()
				.find(|(name, _)| *name == value)
				.map(|(_, member)| member.clone())
				.ok_or_else(|| InvalidValue::new(format!("unknown member '{value}' (expected one of: {expected})")))
		};
		self.members = Some((names, Arc::new(lookup)));
		self
	}

	/// Declares [`FromStr`] as the `parse` mechanism.
	pub fn parse_from_str(self) -> Self
	where
		T: FromStr,
		T::Err: Into<BoxError>,
	{
		self.parse(|value| {
			value
				.parse::<T>()
				.map_err(|e| InvalidValue::caused_by(format!("cannot parse '{value}'"), e))
		})
	}

	/// Declares [`From<String>`] as the constructor.
	pub fn construct_from_string(self) -> Self
	where
		T: From<String>,
	{
		self.constructor(|value| Ok(T::from(value.to_owned())))
	}
}

impl<T> TypeDescriptor<T> {
	/// Declared mechanisms, in probing order.
	pub fn mechanisms(&self) -> Vec<Mechanism> {
		Mechanism::SELECTION_ORDER
			.into_iter()
			.filter(|m| self.get(*m).is_some())
			.collect()
	}

	/// Names accepted by the enumeration mechanism, if declared.
	pub fn member_names(&self) -> Option<&[&'static str]> {
		self.members.as_ref().map(|(names, _)| names.as_slice())
	}

	fn get(&self, mechanism: Mechanism) -> Option<&ParseFn<T>> {
		match mechanism {
			Mechanism::Constructor => self.constructor.as_ref(),
			Mechanism::ValueOf => self.value_of.as_ref(),
			Mechanism::Parse => self.parse.as_ref(),
			Mechanism::EnumMember => self.members.as_ref().map(|(_, f)| f),
		}
	}

	/// First declared mechanism in probing order, as a converter.
	pub(crate) fn select(&self) -> Option<ImplicitConverter<T>> {
		Mechanism::SELECTION_ORDER.into_iter().find_map(|mechanism| {
			self.get(mechanism).map(|f| ImplicitConverter {
				mechanism,
				f: f.clone(),
			})
		})
	}
}

/// A type that declares how to build itself from a string.
///
/// Implement it and submit the type with [`implicit_type!`](crate::implicit_type)
/// to make it convertible without registering a converter.
///
/// ```
/// use tessel_convert::{Converters, InvalidValue, Introspect, TypeDescriptor};
///
/// #[derive(Debug, PartialEq)]
/// struct Port(u16);
///
/// impl Introspect for Port {
/// 	fn describe() -> TypeDescriptor<Self> {
/// 		TypeDescriptor::new().value_of(|s| {
/// 			s.parse().map(Port).map_err(|e| InvalidValue::caused_by("bad port", e))
/// 		})
/// 	}
/// }
///
/// let converters = Converters::new();
/// converters.describe::<Port>();
/// assert_eq!(converters.convert::<Port>("8080").unwrap(), Port(8080));
/// ```
pub trait Introspect: Sized + Send + Sync + 'static {
	fn describe() -> TypeDescriptor<Self>;
}

/// Converter produced by implicit synthesis.
pub struct ImplicitConverter<T> {
	mechanism: Mechanism,
	f: ParseFn<T>,
}

impl<T> ImplicitConverter<T> {
	pub fn mechanism(&self) -> Mechanism {
		self.mechanism
	}
}

impl<T> Converter<T> for ImplicitConverter<T> {
	fn convert(&self, value: &str) -> Result<T, InvalidValue> {
		(self.f)(value)
	}
}
