use std::time::Duration;

use devlog_adapters::test_support::{FailingPlugin, FakePlugin};
use serde_json::json;

use super::*;

fn registry_with(plugins: Vec<Arc<dyn Plugin>>) -> Arc<PluginRegistry> {
    let registry = Arc::new(PluginRegistry::new());
    for plugin in plugins {
        registry.register(plugin.name().to_string(), plugin).unwrap();
    }
    registry
}

#[tokio::test]
async fn start_all_starts_every_enabled_plugin() {
    let a = Arc::new(FakePlugin::new("a", Vec::new()));
    let b = Arc::new(FakePlugin::new("b", vec!["a".to_string()]));
    let registry = registry_with(vec![a.clone() as Arc<dyn Plugin>, b.clone() as Arc<dyn Plugin>]);
    let runtime = PluginRuntime::new(registry, CancellationToken::new());

    runtime
        .start_all(&[("a".to_string(), json!({})), ("b".to_string(), json!({}))])
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(a.has_started());
    assert!(b.has_started());
    assert!(runtime.is_running("a"));
    assert!(runtime.is_running("b"));
}

#[tokio::test]
async fn start_all_rejects_a_dependency_outside_the_enabled_set() {
    let a = Arc::new(FakePlugin::new("a", Vec::new()));
    let b = Arc::new(FakePlugin::new("b", vec!["a".to_string()]));
    let registry = registry_with(vec![a as Arc<dyn Plugin>, b as Arc<dyn Plugin>]);
    let runtime = PluginRuntime::new(registry, CancellationToken::new());

    let err = runtime
        .start_all(&[("b".to_string(), json!({}))])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PluginRuntimeError::Graph(DevLogError::UnmetDependency { .. })
    ));
}

#[tokio::test]
async fn start_all_rejects_a_dependency_cycle() {
    let a = Arc::new(FakePlugin::new("a", vec!["b".to_string()]));
    let b = Arc::new(FakePlugin::new("b", vec!["a".to_string()]));
    let registry = registry_with(vec![a as Arc<dyn Plugin>, b as Arc<dyn Plugin>]);
    let runtime = PluginRuntime::new(registry, CancellationToken::new());

    let err = runtime
        .start_all(&[("a".to_string(), json!({})), ("b".to_string(), json!({}))])
        .await
        .unwrap_err();
    assert!(matches!(err, PluginRuntimeError::Graph(DevLogError::Cycle(_))));
}

#[tokio::test]
async fn stop_plugin_cancels_its_task_and_clears_started_flag() {
    let a = Arc::new(FakePlugin::new("a", Vec::new()));
    let registry = registry_with(vec![a.clone() as Arc<dyn Plugin>]);
    let runtime = PluginRuntime::new(registry, CancellationToken::new());

    runtime.start_plugin("a", json!({})).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(a.has_started());

    runtime.stop_plugin("a").await.unwrap();
    assert!(!a.has_started());
    assert!(!runtime.is_running("a"));
}

#[tokio::test]
async fn restart_plugin_increments_the_restart_counter() {
    let a = Arc::new(FakePlugin::new("a", Vec::new()));
    let registry = registry_with(vec![a as Arc<dyn Plugin>]);
    let runtime = PluginRuntime::new(registry, CancellationToken::new());

    runtime.start_plugin("a", json!({})).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    runtime.restart_plugin("a", json!({})).await.unwrap();

    assert_eq!(runtime.restart_count("a"), 1);
    assert!(runtime.is_running("a"));
}

#[tokio::test]
async fn start_plugin_honours_dependency_order_against_already_running_plugins() {
    let a = Arc::new(FakePlugin::new("a", Vec::new()));
    let b = Arc::new(FakePlugin::new("b", vec!["a".to_string()]));
    let registry = registry_with(vec![a.clone() as Arc<dyn Plugin>, b.clone() as Arc<dyn Plugin>]);
    let runtime = PluginRuntime::new(registry, CancellationToken::new());

    runtime.start_plugin("a", json!({})).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // "b" depends on "a", which is already running rather than part of
    // this start, but that still satisfies the dependency.
    runtime.start_plugin("b", json!({})).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(b.has_started());
}

#[tokio::test]
async fn start_plugin_rejects_an_unmet_dependency_just_like_start_all() {
    let a = Arc::new(FakePlugin::new("a", Vec::new()));
    let b = Arc::new(FakePlugin::new("b", vec!["a".to_string()]));
    let registry = registry_with(vec![a as Arc<dyn Plugin>, b as Arc<dyn Plugin>]);
    let runtime = PluginRuntime::new(registry, CancellationToken::new());

    let err = runtime.start_plugin("b", json!({})).await.unwrap_err();
    assert!(matches!(
        err,
        PluginRuntimeError::Graph(DevLogError::UnmetDependency { .. })
    ));
    assert!(!runtime.is_running("b"));
}

#[tokio::test]
async fn a_plugin_whose_start_errors_is_still_recorded_as_an_instance() {
    let failing = Arc::new(FailingPlugin::new("broken"));
    let registry = registry_with(vec![failing as Arc<dyn Plugin>]);
    let runtime = PluginRuntime::new(registry, CancellationToken::new());

    runtime.start_plugin("broken", json!({})).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(runtime.is_running("broken"));
}
