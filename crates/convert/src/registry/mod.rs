//! Converter registry with atomic publication.
//!
//! # Mental model
//!
//! * Readers load the current [`RegistryTable`] and resolve against that
//!   immutable view; they never block each other or writers.
//! * Writers serialize on one mutex, build a replacement table and publish it
//!   in a single store, so a reader sees either the old or the new entry list
//!   for a type and never a half-inserted one.
//!
//! # Resolution
//!
//! Lookup is by exact [`TargetType`]: no supertype, trait or generic
//! relationships are consulted. Entries for one type rank by priority
//! (higher first), then by registration order (earlier first). Shadowed
//! entries stay in the table, so removing the active one re-exposes the
//! next in rank.
//!
//! # Lifecycle
//!
//! 1. Construction: [`ConverterRegistry::with_builtins`] installs the
//!    built-in set at [`Priority::BUILTIN`].
//! 2. Extension: plugins and runtime callers add entries with `register*`.
//! 3. Re-initialization: `deregister_all*` drops everything for a type except
//!    the built-ins.
//!
//! # Invariants
//!
//! - At most one entry is active per type at any published table.
//! - Built-ins are never removed.
//! - Registering one converter instance twice for a type keeps one entry.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

mod snapshot;

pub use snapshot::{ConverterSource, EntryInfo, RegisteredConverter, RegistrationId, RegistrySnapshot};
pub(crate) use snapshot::{ConverterEntry, RegistryTable};

use crate::converter::Converter;
use crate::priority::Priority;
use crate::target::TargetType;

/// Per-type ranked table of registered converters.
pub struct ConverterRegistry {
	table: ArcSwap<RegistryTable>,
	writer: Mutex<()>,
}

impl Default for ConverterRegistry {
	fn default() -> Self {
		Self::empty()
	}
}

impl std::fmt::Debug for ConverterRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConverterRegistry")
			.field("entries", &self.len())
			.finish_non_exhaustive()
	}
}

impl ConverterRegistry {
	/// Creates a registry with no converters at all, not even built-ins.
	pub fn empty() -> Self {
		Self {
			table: ArcSwap::from_pointee(RegistryTable::default()),
			writer: Mutex::new(()),
		}
	}

	/// Creates a registry holding the built-in converter set.
	pub fn with_builtins() -> Self {
		let registry = Self::empty();
		crate::builtins::install(&registry);
		registry
	}

	/// Registers `converter` for `T` from the runtime API.
	///
	/// `None` means [`Priority::DEFAULT`]. Registering the same instance again
	/// for `T` changes nothing and returns the id of the existing entry.
	pub fn register<T: 'static>(
		&self,
		converter: Arc<dyn Converter<T>>,
		priority: Option<Priority>,
	) -> RegistrationId {
		self.register_from(ConverterSource::Runtime, converter, priority)
	}

	/// Registers `converter` for `T`, recording where it came from.
	pub fn register_from<T: 'static>(
		&self,
		source: ConverterSource,
		converter: Arc<dyn Converter<T>>,
		priority: Option<Priority>,
	) -> RegistrationId {
		let target = TargetType::of::<T>();
		let priority = Priority::or_default(priority);
		let identity = Arc::as_ptr(&converter) as *const () as usize;

		let _guard = self.writer.lock();
		let current = self.table.load_full();
		if let Some(existing) = current.find_identity(target, identity) {
			tracing::debug!(ty = %target, id = %existing, "converter instance already registered");
			return existing;
		}

		let id = current.next_id();
		let entry = ConverterEntry {
			id,
			priority,
			source,
			identity,
			converter: Arc::new(converter),
		};
		let next = current.with_entry(target, entry);
		let active = next.active(target).map(|e| e.id);
		self.table.store(Arc::new(next));

		tracing::debug!(
			ty = %target,
			id = %id,
			priority = priority.get(),
			source = %source,
			active = active == Some(id),
			"converter registered"
		);
		id
	}

	/// Highest-ranked converter registered for exactly `T`.
	#[inline]
	pub fn resolve<T: 'static>(&self) -> Option<RegisteredConverter<T>> {
		self.table.load().resolve::<T>()
	}

	/// Removes one entry. Built-ins cannot be removed.
	///
	/// Returns whether an entry was removed.
	pub fn deregister(&self, id: RegistrationId) -> bool {
		let _guard = self.writer.lock();
		let current = self.table.load_full();
		let Some(entry) = current.entry(id) else {
			return false;
		};
		if entry.source.is_builtin() {
			tracing::warn!(id = %id, "refusing to deregister a builtin converter");
			return false;
		}
		let Some(target) = current.owner(id) else {
			return false;
		};

		let (next, removed) = current.without_where(target, |e| e.id == id);
		self.table.store(Arc::new(next));
		tracing::debug!(ty = %target, id = %id, "converter deregistered");
		removed == 1
	}

	/// Removes every non-built-in entry for `T`. Returns how many were removed.
	pub fn deregister_all<T: 'static>(&self) -> usize {
		self.deregister_all_for(TargetType::of::<T>())
	}

	/// Removes every non-built-in entry for `target`. Returns how many were removed.
	pub fn deregister_all_for(&self, target: TargetType) -> usize {
		let _guard = self.writer.lock();
		let current = self.table.load_full();
		let (next, removed) = current.without_where(target, |e| !e.source.is_builtin());
		if removed > 0 {
			self.table.store(Arc::new(next));
			tracing::debug!(ty = %target, removed, "converters deregistered");
		}
		removed
	}

	/// Entries registered for `T`, in rank order.
	pub fn entries<T: 'static>(&self) -> Vec<EntryInfo> {
		self.table.load().entries(TargetType::of::<T>())
	}

	/// Every type with at least one registered converter, sorted by name.
	pub fn targets(&self) -> Vec<TargetType> {
		self.table.load().targets()
	}

	/// Pins the current table.
	pub fn snapshot(&self) -> RegistrySnapshot {
		RegistrySnapshot {
			table: self.table.load_full(),
		}
	}

	/// Total number of entries across all types.
	pub fn len(&self) -> usize {
		self.table.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests;
