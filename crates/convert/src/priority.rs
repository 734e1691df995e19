/// Rank of a converter among all converters registered for one target type.
///
/// Higher wins. Registrations that declare nothing get [`Priority::DEFAULT`];
/// every built-in converter sits at [`Priority::BUILTIN`], so any ordinary
/// registration shadows the built-in for the same type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(i32);

impl Priority {
	/// Priority assumed when a converter declares none.
	pub const DEFAULT: Priority = Priority(100);
	/// Priority of every built-in converter.
	pub const BUILTIN: Priority = Priority(1);

	pub const fn new(value: i32) -> Self {
		Self(value)
	}

	pub const fn get(self) -> i32 {
		self.0
	}

	/// Resolves an optional declaration, falling back to [`Priority::DEFAULT`].
	pub fn or_default(declared: Option<Priority>) -> Self {
		declared.unwrap_or_default()
	}
}

impl Default for Priority {
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl From<i32> for Priority {
	fn from(value: i32) -> Self {
		Self(value)
	}
}

impl std::fmt::Display for Priority {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}
