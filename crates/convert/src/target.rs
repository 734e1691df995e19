use std::any::TypeId;
use std::hash::{Hash, Hasher};

/// Exact identity of a conversion target.
///
/// Equality and hashing use [`TypeId`] only. The type name is carried for
/// diagnostics and never participates in lookup, so two distinct types that
/// print the same never collide.
#[derive(Clone, Copy, Debug)]
pub struct TargetType {
	id: TypeId,
	name: &'static str,
}

impl TargetType {
	/// Returns the target identity for `T`.
	#[inline]
	pub fn of<T: 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.id
	}

	/// Fully qualified type name, as reported by [`std::any::type_name`].
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Last path segment of the type name, with generic arguments kept.
	pub fn short_name(&self) -> &'static str {
		let head = self.name.split('<').next().unwrap_or(self.name);
		match head.rfind("::") {
			Some(idx) => &self.name[idx + 2..],
			None => self.name,
		}
	}

	pub fn is<T: 'static>(&self) -> bool {
		self.id == TypeId::of::<T>()
	}
}

impl PartialEq for TargetType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TargetType {}

impl Hash for TargetType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl std::fmt::Display for TargetType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[allow(dead_code)]
	struct Local;
	#[allow(dead_code)]
	struct Wrapper<T>(T);

	#[test]
	fn identity_is_by_type_id() {
		assert_eq!(TargetType::of::<u32>(), TargetType::of::<u32>());
		assert_ne!(TargetType::of::<u32>(), TargetType::of::<i32>());
		assert!(TargetType::of::<Local>().is::<Local>());
	}

	#[test]
	fn short_name_strips_module_path() {
		assert_eq!(TargetType::of::<Local>().short_name(), "Local");
		assert_eq!(TargetType::of::<String>().short_name(), "String");
		assert_eq!(TargetType::of::<Wrapper<u8>>().short_name(), "Wrapper<u8>");
	}
}
