use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::converter::InvalidValue;

#[derive(Debug, Clone, PartialEq)]
struct Celsius(String);

fn tagged(tag: &'static str) -> Arc<dyn Converter<Celsius>> {
	Arc::new(move |value: &str| -> Result<Celsius, InvalidValue> { Ok(Celsius(format!("{tag}:{value}"))) })
}

fn convert_with(registry: &ConverterRegistry, value: &str) -> Option<Celsius> {
	registry.resolve::<Celsius>().map(|c| c.convert(value).unwrap())
}

#[test]
fn empty_registry_resolves_nothing() {
	let registry = ConverterRegistry::empty();
	assert!(registry.resolve::<Celsius>().is_none());
	assert!(registry.resolve::<i32>().is_none());
	assert!(registry.is_empty());
}

#[test]
fn higher_priority_wins_and_deregistration_re_exposes_next() {
	let registry = ConverterRegistry::with_builtins();
	let low: Arc<dyn Converter<i32>> = Arc::new(|_: &str| -> Result<i32, InvalidValue> { Ok(50) });
	let high: Arc<dyn Converter<i32>> = Arc::new(|_: &str| -> Result<i32, InvalidValue> { Ok(200) });

	let a = registry.register(low, Some(Priority::new(50)));
	let b = registry.register(high, Some(Priority::new(200)));
	assert_eq!(registry.resolve::<i32>().unwrap().convert("7").unwrap(), 200);

	assert!(registry.deregister(b));
	assert_eq!(registry.resolve::<i32>().unwrap().convert("7").unwrap(), 50);

	assert!(registry.deregister(a));
	let active = registry.resolve::<i32>().unwrap();
	assert_eq!(active.source(), ConverterSource::Builtin);
	assert_eq!(active.priority(), Priority::BUILTIN);
	assert_eq!(active.convert("7").unwrap(), 7);
}

#[test]
fn equal_priority_keeps_first_registered() {
	let registry = ConverterRegistry::empty();
	let first = registry.register(tagged("first"), Some(Priority::new(150)));
	let second = registry.register(tagged("second"), Some(Priority::new(150)));

	assert!(first < second);
	assert_eq!(convert_with(&registry, "x"), Some(Celsius("first:x".into())));

	let entries = registry.entries::<Celsius>();
	assert_eq!(entries.iter().map(|e| (e.id, e.active)).collect::<Vec<_>>(), vec![
		(first, true),
		(second, false),
	]);
}

#[test]
fn unspecified_priority_is_default() {
	let registry = ConverterRegistry::empty();
	let low = registry.register(tagged("low"), Some(Priority::new(99)));
	let default = registry.register(tagged("default"), None);

	let entries = registry.entries::<Celsius>();
	assert_eq!(entries[0].id, default);
	assert_eq!(entries[0].priority, Priority::DEFAULT);
	assert_eq!(entries[1].id, low);
}

#[test]
fn same_instance_registers_once() {
	let registry = ConverterRegistry::empty();
	let converter = tagged("shared");

	let first = registry.register(converter.clone(), Some(Priority::new(10)));
	let again = registry.register(converter.clone(), Some(Priority::new(500)));

	assert_eq!(first, again);
	assert_eq!(registry.len(), 1);
	assert_eq!(registry.entries::<Celsius>()[0].priority, Priority::new(10));
}

#[test]
fn lookup_is_by_exact_type() {
	let registry = ConverterRegistry::empty();
	registry.register(tagged("c"), None);

	assert!(registry.resolve::<Celsius>().is_some());
	assert!(registry.resolve::<Option<Celsius>>().is_none());
	assert!(registry.resolve::<Vec<Celsius>>().is_none());
}

#[test]
fn deregister_all_keeps_builtins() {
	let registry = ConverterRegistry::with_builtins();
	let before = registry.len();
	let custom: Arc<dyn Converter<bool>> = Arc::new(|_: &str| -> Result<bool, InvalidValue> { Ok(true) });
	registry.register(custom, Some(Priority::new(300)));
	let other: Arc<dyn Converter<bool>> = Arc::new(|_: &str| -> Result<bool, InvalidValue> { Ok(true) });
	registry.register(other, None);

	assert!(registry.resolve::<bool>().unwrap().convert("nope").unwrap());
	assert_eq!(registry.deregister_all::<bool>(), 2);
	assert_eq!(registry.len(), before);

	let active = registry.resolve::<bool>().unwrap();
	assert_eq!(active.source(), ConverterSource::Builtin);
	assert!(!active.convert("nope").unwrap());
	assert_eq!(registry.deregister_all::<bool>(), 0);
}

#[test]
fn deregister_all_removes_every_custom_entry() {
	let registry = ConverterRegistry::empty();
	registry.register(tagged("a"), None);
	registry.register(tagged("b"), Some(Priority::new(5)));

	assert_eq!(registry.deregister_all::<Celsius>(), 2);
	assert!(registry.resolve::<Celsius>().is_none());
	assert!(registry.targets().is_empty());
}

#[test]
fn builtins_cannot_be_deregistered_one_by_one() {
	let registry = ConverterRegistry::with_builtins();
	let id = registry.resolve::<i64>().unwrap().id();
	assert!(!registry.deregister(id));
	assert!(registry.resolve::<i64>().is_some());
}

#[test]
fn deregistering_unknown_id_is_a_no_op() {
	let registry = ConverterRegistry::empty();
	let id = registry.register(tagged("a"), None);
	assert!(registry.deregister(id));
	assert!(!registry.deregister(id));
}

#[test]
fn registration_ids_are_not_reused() {
	let registry = ConverterRegistry::empty();
	let a = registry.register(tagged("a"), None);
	registry.deregister(a);
	let b = registry.register(tagged("b"), None);
	assert!(b > a);
}

#[test]
fn snapshot_is_pinned_across_writes() {
	let registry = ConverterRegistry::empty();
	let a = registry.register(tagged("a"), None);
	let snapshot = registry.snapshot();

	registry.register(tagged("b"), Some(Priority::new(900)));
	registry.deregister(a);

	assert_eq!(snapshot.len(), 1);
	assert_eq!(snapshot.resolve::<Celsius>().unwrap().convert("1").unwrap(), Celsius("a:1".into()));
	assert_eq!(convert_with(&registry, "1"), Some(Celsius("b:1".into())));
}

#[test]
fn resolved_converter_outlives_deregistration() {
	let registry = ConverterRegistry::empty();
	let id = registry.register(tagged("held"), None);
	let held = registry.resolve::<Celsius>().unwrap();

	registry.deregister(id);
	assert!(registry.resolve::<Celsius>().is_none());
	assert_eq!(held.convert("x").unwrap(), Celsius("held:x".into()));
}

#[test]
fn targets_are_sorted_by_name() {
	let registry = ConverterRegistry::empty();
	registry.register(tagged("c"), None);
	let n: Arc<dyn Converter<u8>> = Arc::new(|_: &str| -> Result<u8, InvalidValue> { Ok(0) });
	registry.register(n, None);

	let names: Vec<&str> = registry.targets().iter().map(|t| t.name()).collect();
	let mut sorted = names.clone();
	sorted.sort_unstable();
	assert_eq!(names, sorted);
	assert_eq!(names.len(), 2);
}

#[test]
fn concurrent_readers_see_whole_entry_lists() {
	let registry = Arc::new(ConverterRegistry::empty());
	registry.register(tagged("base"), Some(Priority::new(0)));
	let done = Arc::new(AtomicBool::new(false));

	let readers: Vec<_> = (0..4)
		.map(|_| {
			let registry = registry.clone();
			let done = done.clone();
			std::thread::spawn(move || {
				while !done.load(Ordering::Relaxed) {
					let snapshot = registry.snapshot();
					let entries = snapshot.entries::<Celsius>();
					assert!(!entries.is_empty());
					assert_eq!(entries.iter().filter(|e| e.active).count(), 1);
					assert!(entries.windows(2).all(|w| w[0].priority >= w[1].priority));
					assert!(snapshot.resolve::<Celsius>().is_some());
				}
			})
		})
		.collect();

	for round in 0..200 {
		let id = registry.register(tagged("churn"), Some(Priority::new(round % 7)));
		if round % 2 == 0 {
			registry.deregister(id);
		}
	}
	done.store(true, Ordering::Relaxed);
	for reader in readers {
		reader.join().unwrap();
	}

	assert_eq!(registry.len(), 101);
}
