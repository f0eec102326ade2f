use std::time::Duration;

use devlog_adapters::test_support::FakeModule;
use devlog_config::{ComponentConfig, ConfigDocument, HttpConfig};
use devlog_storage::StorageEngine;
use serde_json::json;
use tempfile::tempdir;

use super::*;
use crate::registries::Registries;

fn doc(modules: &[(&str, bool)]) -> ConfigDocument {
    let mut d = ConfigDocument::default();
    for (name, enabled) in modules {
        d.modules.insert(
            name.to_string(),
            ComponentConfig {
                enabled: *enabled,
                extra: json!({}),
            },
        );
    }
    d
}

fn test_ctx() -> (DiffContext, tempfile::TempDir) {
    let registries = Arc::new(Registries::new());
    registries
        .modules
        .register("fake", Arc::new(FakeModule::new(Duration::from_millis(10))))
        .unwrap();

    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let scheduler = Arc::new(PollerScheduler::new(storage));
    let plugin_registry = Arc::new(crate::registries::PluginRegistry::new());
    let plugin_runtime = Arc::new(PluginRuntime::new(plugin_registry, CancellationToken::new()));

    let dir = tempdir().unwrap();
    let state = Arc::new(StateStore::open(dir.path().join("state.json")).unwrap());

    let ctx = DiffContext::new(
        registries,
        scheduler,
        plugin_runtime,
        state,
        dir.path().to_path_buf(),
        CancellationToken::new(),
    );
    (ctx, dir)
}

#[tokio::test]
async fn start_change_spawns_a_poller_for_a_pollable_module() {
    let (ctx, _dir) = test_ctx();
    let old = ConfigDocument::default();
    let new = doc(&[("fake", true)]);
    let diff = ConfigDiff::compute(&old, &new);

    apply_diff(&ctx, &old, &new, &diff).await.unwrap();
    assert!(ctx.has_poller("fake"));
}

#[tokio::test]
async fn stop_change_removes_the_poller() {
    let (ctx, _dir) = test_ctx();
    let old = ConfigDocument::default();
    let enabled = doc(&[("fake", true)]);
    apply_diff(
        &ctx,
        &old,
        &enabled,
        &ConfigDiff::compute(&old, &enabled),
    )
    .await
    .unwrap();
    assert!(ctx.has_poller("fake"));

    let disabled = doc(&[("fake", false)]);
    apply_diff(
        &ctx,
        &enabled,
        &disabled,
        &ConfigDiff::compute(&enabled, &disabled),
    )
    .await
    .unwrap();
    assert!(!ctx.has_poller("fake"));
}

#[tokio::test]
async fn http_port_change_alone_produces_no_component_changes() {
    let (ctx, _dir) = test_ctx();
    let mut old = ConfigDocument::default();
    old.http = HttpConfig { port: 9000 };
    let mut new = ConfigDocument::default();
    new.http = HttpConfig { port: 9001 };
    let diff = ConfigDiff::compute(&old, &new);

    assert!(diff.is_empty());
    apply_diff(&ctx, &old, &new, &diff).await.unwrap();
}

#[tokio::test]
async fn plugin_start_and_stop_changes_drive_the_plugin_runtime() {
    use devlog_adapters::test_support::FakePlugin;
    use devlog_config::ComponentKind;

    let (ctx, _dir) = test_ctx();
    let plugin = Arc::new(FakePlugin::new("p", Vec::new()));

    let registry = Arc::new(crate::registries::PluginRegistry::new());
    registry
        .register("p", plugin.clone() as Arc<dyn devlog_adapters::Plugin>)
        .unwrap();
    let plugin_runtime = Arc::new(PluginRuntime::new(registry, CancellationToken::new()));
    let ctx = DiffContext::new(
        ctx.registries.clone(),
        ctx.scheduler.clone(),
        plugin_runtime,
        ctx.state.clone(),
        ctx.data_dir.clone(),
        CancellationToken::new(),
    );

    let mut new = ConfigDocument::default();
    new.plugins.insert(
        "p".to_string(),
        ComponentConfig {
            enabled: true,
            extra: json!({}),
        },
    );
    let diff = ConfigDiff {
        changes: vec![(ComponentKind::Plugin, "p".to_string(), ComponentChange::Start)],
    };
    apply_diff(&ctx, &ConfigDocument::default(), &new, &diff)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(plugin.has_started());

    let stop_diff = ConfigDiff {
        changes: vec![(ComponentKind::Plugin, "p".to_string(), ComponentChange::Stop)],
    };
    apply_diff(&ctx, &new, &new, &stop_diff).await.unwrap();
    assert!(!plugin.has_started());
}

/// A single diff can list a dependent plugin's `Start` before its
/// dependency's; since both are staged and started as one batch, the
/// runtime's own topological order decides spawn order, not `diff.changes`'.
#[tokio::test]
async fn plugin_starts_in_one_diff_are_ordered_regardless_of_change_order() {
    use devlog_adapters::test_support::FakePlugin;
    use devlog_config::ComponentKind;

    let (ctx, _dir) = test_ctx();
    let dependency = Arc::new(FakePlugin::new("base", Vec::new()));
    let dependent = Arc::new(FakePlugin::new("derived", vec!["base".to_string()]));

    let registry = Arc::new(crate::registries::PluginRegistry::new());
    registry
        .register("base", dependency.clone() as Arc<dyn devlog_adapters::Plugin>)
        .unwrap();
    registry
        .register("derived", dependent.clone() as Arc<dyn devlog_adapters::Plugin>)
        .unwrap();
    let plugin_runtime = Arc::new(PluginRuntime::new(registry, CancellationToken::new()));
    let ctx = DiffContext::new(
        ctx.registries.clone(),
        ctx.scheduler.clone(),
        plugin_runtime,
        ctx.state.clone(),
        ctx.data_dir.clone(),
        CancellationToken::new(),
    );

    let mut new = ConfigDocument::default();
    for name in ["base", "derived"] {
        new.plugins.insert(
            name.to_string(),
            ComponentConfig {
                enabled: true,
                extra: json!({}),
            },
        );
    }
    // Listed in dependency-violating order on purpose.
    let diff = ConfigDiff {
        changes: vec![
            (ComponentKind::Plugin, "derived".to_string(), ComponentChange::Start),
            (ComponentKind::Plugin, "base".to_string(), ComponentChange::Start),
        ],
    };

    apply_diff(&ctx, &ConfigDocument::default(), &new, &diff).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(dependency.has_started());
    assert!(dependent.has_started());
}
