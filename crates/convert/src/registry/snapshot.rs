//! Immutable registry tables and read handles.
//!
//! # Role
//!
//! Pure view types. A [`RegistryTable`] is never mutated after publication;
//! every write builds a replacement table. Nothing here takes a lock.
//!
//! # Invariants
//!
//! - Each per-target entry list is sorted by rank: priority descending, then
//!   registration id ascending. The first element is the active converter.
//! - Every non-empty list is reachable from `owners` for each of its ids.

use std::any::Any;
use std::cmp::Ordering;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::converter::{Converter, InvalidValue};
use crate::priority::Priority;
use crate::target::TargetType;

/// Type-erased `Arc<dyn Converter<T>>`.
pub(crate) type ErasedConverter = Arc<dyn Any + Send + Sync>;

/// Handle returned by registration, unique within one registry.
///
/// Ids grow monotonically, so comparing two ids tells which registration
/// came first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(u64);

impl RegistrationId {
	pub fn get(self) -> u64 {
		self.0
	}
}

impl std::fmt::Display for RegistrationId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Where a registered converter came from.
///
/// Informational only: ranking uses priority and registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverterSource {
	/// Shipped with this crate.
	Builtin,
	/// Installed from a discovered plugin, by plugin id.
	Plugin(&'static str),
	/// Registered directly through the API.
	Runtime,
}

impl ConverterSource {
	pub const fn is_builtin(self) -> bool {
		matches!(self, Self::Builtin)
	}
}

impl std::fmt::Display for ConverterSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Builtin => write!(f, "builtin"),
			Self::Plugin(id) => write!(f, "plugin:{id}"),
			Self::Runtime => write!(f, "runtime"),
		}
	}
}

#[derive(Clone)]
pub(crate) struct ConverterEntry {
	pub(crate) id: RegistrationId,
	pub(crate) priority: Priority,
	pub(crate) source: ConverterSource,
	/// Address of the converter allocation; identifies re-registration of one instance.
	pub(crate) identity: usize,
	pub(crate) converter: ErasedConverter,
}

/// Rank order: priority descending, then first registered first.
pub(crate) fn cmp_rank(a: &ConverterEntry, b: &ConverterEntry) -> Ordering {
	b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id))
}

/// Diagnostic view of one registered converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryInfo {
	pub id: RegistrationId,
	pub priority: Priority,
	pub source: ConverterSource,
	/// Whether this entry is the one `resolve` currently returns.
	pub active: bool,
}

#[derive(Clone, Default)]
pub(crate) struct RegistryTable {
	by_target: FxHashMap<TargetType, Arc<[ConverterEntry]>>,
	owners: FxHashMap<RegistrationId, TargetType>,
	next_id: u64,
}

impl RegistryTable {
	pub(crate) fn next_id(&self) -> RegistrationId {
		RegistrationId(self.next_id)
	}

	pub(crate) fn find_identity(&self, target: TargetType, identity: usize) -> Option<RegistrationId> {
		self.by_target
			.get(&target)?
			.iter()
			.find(|e| e.identity == identity)
			.map(|e| e.id)
	}

	/// Returns a copy of this table with `entry` ranked into its target's list.
	pub(crate) fn with_entry(&self, target: TargetType, entry: ConverterEntry) -> Self {
		let mut next = self.clone();
		let id = entry.id;
		let mut list: Vec<ConverterEntry> = next
			.by_target
			.get(&target)
			.map(|l| l.to_vec())
			.unwrap_or_default();
		list.push(entry);
		list.sort_by(cmp_rank);
		next.by_target.insert(target, list.into());
		next.owners.insert(id, target);
		next.next_id = next.next_id.max(id.0 + 1);
		next
	}

	/// Returns a copy without entries of `target` matching `remove`, plus how many were dropped.
	pub(crate) fn without_where<F>(&self, target: TargetType, remove: F) -> (Self, usize)
	where
		F: Fn(&ConverterEntry) -> bool,
	{
		let Some(list) = self.by_target.get(&target) else {
			return (self.clone(), 0);
		};
		let (dropped, kept): (Vec<ConverterEntry>, Vec<ConverterEntry>) =
			list.iter().cloned().partition(|e| remove(e));
		if dropped.is_empty() {
			return (self.clone(), 0);
		}

		let mut next = self.clone();
		for e in &dropped {
			next.owners.remove(&e.id);
		}
		if kept.is_empty() {
			next.by_target.remove(&target);
		} else {
			next.by_target.insert(target, kept.into());
		}
		(next, dropped.len())
	}

	pub(crate) fn owner(&self, id: RegistrationId) -> Option<TargetType> {
		self.owners.get(&id).copied()
	}

	pub(crate) fn entry(&self, id: RegistrationId) -> Option<&ConverterEntry> {
		let target = self.owner(id)?;
		self.by_target.get(&target)?.iter().find(|e| e.id == id)
	}

	pub(crate) fn active(&self, target: TargetType) -> Option<&ConverterEntry> {
		self.by_target.get(&target).and_then(|l| l.first())
	}

	pub(crate) fn resolve<T: 'static>(&self) -> Option<RegisteredConverter<T>> {
		let target = TargetType::of::<T>();
		let entry = self.active(target)?;
		match RegisteredConverter::from_entry(entry) {
			Some(resolved) => Some(resolved),
			None => {
				tracing::error!(ty = %target, id = %entry.id, "registry entry holds a converter for another type");
				None
			}
		}
	}

	pub(crate) fn entries(&self, target: TargetType) -> Vec<EntryInfo> {
		self.by_target
			.get(&target)
			.map(|list| {
				list.iter()
					.enumerate()
					.map(|(idx, e)| EntryInfo {
						id: e.id,
						priority: e.priority,
						source: e.source,
						active: idx == 0,
					})
					.collect()
			})
			.unwrap_or_default()
	}

	pub(crate) fn targets(&self) -> Vec<TargetType> {
		let mut targets: Vec<TargetType> = self.by_target.keys().copied().collect();
		targets.sort_by_key(|t| t.name());
		targets
	}

	pub(crate) fn len(&self) -> usize {
		self.owners.len()
	}
}

/// The active converter for one type, pinned independently of later writes.
pub struct RegisteredConverter<T> {
	converter: Arc<dyn Converter<T>>,
	id: RegistrationId,
	priority: Priority,
	source: ConverterSource,
}

impl<T> Clone for RegisteredConverter<T> {
	fn clone(&self) -> Self {
		Self {
			converter: self.converter.clone(),
			id: self.id,
			priority: self.priority,
			source: self.source,
		}
	}
}

impl<T> std::fmt::Debug for RegisteredConverter<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegisteredConverter")
			.field("id", &self.id)
			.field("priority", &self.priority)
			.field("source", &self.source)
			.finish()
	}
}

impl<T: 'static> RegisteredConverter<T> {
	fn from_entry(entry: &ConverterEntry) -> Option<Self> {
		let converter = entry.converter.downcast_ref::<Arc<dyn Converter<T>>>()?.clone();
		Some(Self {
			converter,
			id: entry.id,
			priority: entry.priority,
			source: entry.source,
		})
	}
}

impl<T> RegisteredConverter<T> {
	pub fn id(&self) -> RegistrationId {
		self.id
	}

	pub fn priority(&self) -> Priority {
		self.priority
	}

	pub fn source(&self) -> ConverterSource {
		self.source
	}

	pub fn converter(&self) -> &Arc<dyn Converter<T>> {
		&self.converter
	}
}

impl<T> Converter<T> for RegisteredConverter<T> {
	fn convert(&self, value: &str) -> Result<T, InvalidValue> {
		self.converter.convert(value)
	}
}

/// Read handle pinning one published registry table.
///
/// Later registrations and deregistrations publish new tables; a held
/// snapshot keeps answering from the table it was taken from.
#[derive(Clone)]
pub struct RegistrySnapshot {
	pub(crate) table: Arc<RegistryTable>,
}

impl RegistrySnapshot {
	pub fn resolve<T: 'static>(&self) -> Option<RegisteredConverter<T>> {
		self.table.resolve::<T>()
	}

	pub fn entries<T: 'static>(&self) -> Vec<EntryInfo> {
		self.table.entries(TargetType::of::<T>())
	}

	pub fn len(&self) -> usize {
		self.table.len()
	}

	pub fn is_empty(&self) -> bool {
		self.table.len() == 0
	}
}
