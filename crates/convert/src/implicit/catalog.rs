//! Descriptor catalog: where synthesis looks up a type's affordances.
//!
//! Two layers, consulted in order:
//!
//! 1. Runtime descriptors added with [`DescriptorCatalog::insert`].
//! 2. Link-time descriptors submitted with [`implicit_type!`](crate::implicit_type)
//!    and collected through `inventory`.
//!
//! Factories are called once per synthesized type; building the descriptor
//! is the introspection step.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::descriptor::{Introspect, TypeDescriptor};
use crate::target::TargetType;

type ErasedFactory = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Link-time descriptor submission.
///
/// Built by [`implicit_type!`](crate::implicit_type); not meant to be
/// constructed by hand.
pub struct DescriptorReg {
	/// Module path of the submission, reported when two submissions collide.
	pub origin: &'static str,
	pub target: fn() -> TargetType,
	pub describe: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(DescriptorReg);

impl DescriptorReg {
	#[doc(hidden)]
	pub fn erased_describe<T: Introspect>() -> Box<dyn Any + Send + Sync> {
		Box::new(T::describe())
	}
}

#[derive(Default)]
pub struct DescriptorCatalog {
	runtime: RwLock<FxHashMap<TargetType, ErasedFactory>>,
}

impl std::fmt::Debug for DescriptorCatalog {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DescriptorCatalog")
			.field("runtime", &self.runtime.read().len())
			.finish_non_exhaustive()
	}
}

impl DescriptorCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces the runtime descriptor factory for `T`.
	pub fn insert<T, F>(&self, factory: F)
	where
		T: Send + Sync + 'static,
		F: Fn() -> TypeDescriptor<T> + Send + Sync + 'static,
	{
		let target = TargetType::of::<T>();
		let erased: ErasedFactory = Arc::new(move || Box::new(factory()) as Box<dyn Any + Send + Sync>);
		if self.runtime.write().insert(target, erased).is_some() {
			tracing::debug!(ty = %target, "runtime descriptor replaced");
		}
	}

	pub fn contains(&self, target: TargetType) -> bool {
		self.runtime.read().contains_key(&target) || link_time(target).is_some()
	}

	/// Builds the descriptor for `T`, or `None` when the type declares none.
	pub fn describe<T: 'static>(&self) -> Option<TypeDescriptor<T>> {
		let target = TargetType::of::<T>();
		let factory = self.runtime.read().get(&target).cloned();
		let erased = match factory {
			Some(factory) => factory(),
			None => (link_time(target)?.describe)(),
		};
		match erased.downcast::<TypeDescriptor<T>>() {
			Ok(descriptor) => Some(*descriptor),
			Err(_) => {
				tracing::error!(ty = %target, "descriptor factory produced a descriptor for another type");
				None
			}
		}
	}
}

/// Link-time submission for `target`. Colliding submissions resolve to the
/// lowest origin path so the choice does not depend on link order.
fn link_time(target: TargetType) -> Option<&'static DescriptorReg> {
	let mut found: Vec<&'static DescriptorReg> = inventory::iter::<DescriptorReg>
		.into_iter()
		.filter(|reg| (reg.target)() == target)
		.collect();
	found.sort_by_key(|reg| reg.origin);
	if found.len() > 1 {
		let origins: Vec<&str> = found.iter().map(|r| r.origin).collect();
		tracing::warn!(ty = %target, ?origins, "multiple descriptors submitted for one type");
	}
	found.first().copied()
}
