use std::time::Duration;

use devlog_adapters::test_support::FakeModule;

use super::*;

#[test]
fn register_then_get_round_trips() {
    let registry: ModuleRegistry = NamedRegistry::new();
    let module = Arc::new(FakeModule::new(Duration::from_secs(1)));
    registry.register("fake", module.clone()).unwrap();

    let fetched = registry.get("fake").unwrap();
    assert_eq!(fetched.name(), "fake");
}

#[test]
fn register_rejects_duplicate_name() {
    let registry: ModuleRegistry = NamedRegistry::new();
    registry
        .register("fake", Arc::new(FakeModule::new(Duration::from_secs(1))))
        .unwrap();

    let err = registry
        .register("fake", Arc::new(FakeModule::new(Duration::from_secs(1))))
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyRegistered(name) if name == "fake"));
}

#[test]
fn get_unknown_name_is_not_found() {
    let registry: ModuleRegistry = NamedRegistry::new();
    let err = registry.get("missing").unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(name) if name == "missing"));
}

#[test]
fn list_returns_every_registered_entry() {
    let registry: ModuleRegistry = NamedRegistry::new();
    registry
        .register("one", Arc::new(FakeModule::new(Duration::from_secs(1))))
        .unwrap();
    registry
        .register("two", Arc::new(FakeModule::new(Duration::from_secs(1))))
        .unwrap();

    let mut names: Vec<String> = registry.list().into_iter().map(|(name, _)| name).collect();
    names.sort();
    assert_eq!(names, vec!["one".to_string(), "two".to_string()]);
}

#[test]
fn registries_bundle_is_independent_per_table() {
    let registries = Registries::new();
    registries
        .modules
        .register("fake", Arc::new(FakeModule::new(Duration::from_secs(1))))
        .unwrap();
    assert!(registries.modules.contains("fake"));
    assert!(!registries.plugins.contains("fake"));
}
