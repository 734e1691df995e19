use std::any::Any;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::descriptor::ImplicitConverter;
use crate::target::TargetType;

type Table = FxHashMap<TargetType, Arc<dyn Any + Send + Sync>>;

/// Memoized implicit converters, one per type, never invalidated.
///
/// Reads are lock-free. Inserts serialize and keep the first converter
/// stored for a type, so racing synthesizers all end up sharing one instance.
pub struct ImplicitCache {
	table: ArcSwap<Table>,
	writer: Mutex<()>,
}

impl Default for ImplicitCache {
	fn default() -> Self {
		Self {
			table: ArcSwap::from_pointee(Table::default()),
			writer: Mutex::new(()),
		}
	}
}

impl ImplicitCache {
	pub fn get<T: 'static>(&self) -> Option<Arc<ImplicitConverter<T>>> {
		self.table
			.load()
			.get(&TargetType::of::<T>())
			.and_then(|erased| erased.clone().downcast::<ImplicitConverter<T>>().ok())
	}

	/// Stores `converter` unless one is already cached, returning whichever is cached afterwards.
	pub fn insert<T: 'static>(&self, converter: ImplicitConverter<T>) -> Arc<ImplicitConverter<T>> {
		let target = TargetType::of::<T>();
		let _guard = self.writer.lock();
		if let Some(existing) = self.get::<T>() {
			tracing::debug!(ty = %target, "implicit converter already cached by a concurrent caller");
			return existing;
		}

		let converter = Arc::new(converter);
		let mut next: Table = (**self.table.load()).clone();
		next.insert(target, converter.clone());
		self.table.store(Arc::new(next));
		converter
	}

	pub fn contains(&self, target: TargetType) -> bool {
		self.table.load().contains_key(&target)
	}

	pub fn len(&self) -> usize {
		self.table.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
