//! External source loading integration tests.

use modconf_rs_config::{
    ConfigEngine, ConfigError, EngineOptions, SchemaNode, ValidationMode, schema,
};
use modconf_rs_test_utils::StubSource;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn engine_with(source: StubSource) -> ConfigEngine {
    let engine = ConfigEngine::with_options(EngineOptions::new().with_external_source(source));
    engine.define_schema(
        "mod",
        schema([
            ("foo", SchemaNode::leaf("qux")),
            ("extra", SchemaNode::leaf("default")),
        ]),
    );
    engine
}

/// Values from the external source are used when nothing overrides them.
#[tokio::test]
async fn external_values_are_merged() {
    let source = StubSource::new(json!({ "mod": { "extra": "external" } }));
    let engine = engine_with(source);
    let config = engine.get_config("mod").await.expect("config");
    assert_eq!(
        Value::Object(config),
        json!({ "foo": "qux", "extra": "external" })
    );
}

/// Provided sources win over the external one when provided up front.
#[tokio::test]
async fn provided_before_load_wins() {
    let source = StubSource::new(json!({ "mod": { "foo": "external" } }));
    let engine = engine_with(source);
    engine.provide(json!({ "mod": { "foo": "provided" } }));
    let config = engine.get_config("mod").await.expect("config");
    assert_eq!(config["foo"], json!("provided"));
}

/// Provided sources win even when provided after the load completed.
#[tokio::test]
async fn provided_after_load_wins() {
    let source = StubSource::new(json!({ "mod": { "foo": "external" } }));
    let engine = engine_with(source);
    assert_eq!(
        engine.get_config("mod").await.expect("config")["foo"],
        json!("external")
    );
    engine.provide(json!({ "mod": { "foo": "provided" } }));
    assert_eq!(
        engine.get_config("mod").await.expect("config")["foo"],
        json!("provided")
    );
}

/// Provided sources win when provided while the load is in flight.
#[tokio::test]
async fn provided_during_load_wins() {
    let (source, gate) = StubSource::new(json!({ "mod": { "foo": "external" } })).gated();
    let engine = engine_with(source.clone());

    let resolve = engine.get_config("mod");
    let provide = async {
        tokio::task::yield_now().await;
        engine.provide(json!({ "mod": { "foo": "provided" } }));
        gate.open();
    };
    let (config, ()) = tokio::join!(resolve, provide);
    assert_eq!(config.expect("config")["foo"], json!("provided"));
    assert_eq!(source.load_count(), 1);
}

/// Concurrent resolutions share one load.
#[tokio::test]
async fn concurrent_resolutions_share_one_load() {
    let (source, gate) = StubSource::new(json!({ "mod": { "foo": "external" } })).gated();
    let engine = engine_with(source.clone());

    let open = async {
        tokio::task::yield_now().await;
        gate.open();
    };
    let (first, second, devtools, ()) = tokio::join!(
        engine.get_config("mod"),
        engine.get_config("mod"),
        engine.get_devtools_config(),
        open
    );
    assert_eq!(first.expect("first")["foo"], json!("external"));
    assert_eq!(second.expect("second")["foo"], json!("external"));
    assert_eq!(devtools.expect("devtools")["mod"]["foo"], json!("external"));
    assert_eq!(source.load_count(), 1);

    engine.get_config("mod").await.expect("again");
    assert_eq!(source.load_count(), 1);
}

/// A source that cannot be located is not an error.
#[tokio::test]
async fn missing_source_is_not_an_error() {
    let source = StubSource::missing();
    let engine = engine_with(source.clone());
    let config = engine.get_config("mod").await.expect("config");
    assert_eq!(config["foo"], json!("qux"));
    assert_eq!(source.load_count(), 0);
}

/// A failing load reaches every waiter and is remembered until reset.
#[tokio::test]
async fn failed_load_is_fatal_for_every_waiter() {
    let source = StubSource::failing("boom");
    let engine = engine_with(source.clone());

    let (first, second) = tokio::join!(engine.get_config("mod"), engine.get_config("mod"));
    for result in [first, second] {
        match result {
            Err(ConfigError::ExternalLoad(err)) => {
                assert_eq!(err.name, "config-file");
                assert!(err.message.contains("boom"));
            }
            other => panic!("expected external load error, got {other:?}"),
        }
    }
    assert!(engine.get_config("mod").await.is_err());
    assert_eq!(source.load_count(), 1);

    engine.clear_all();
    engine.define_schema("mod", schema([("foo", SchemaNode::leaf("qux"))]));
    assert!(engine.get_config("mod").await.is_err());
    assert_eq!(source.load_count(), 2);
}

/// A loaded value that is not keyed by module is rejected.
#[tokio::test]
async fn non_object_external_source_fails() {
    let engine = engine_with(StubSource::new(json!(["not", "modules"])));
    assert!(matches!(
        engine.get_config("mod").await,
        Err(ConfigError::ExternalLoad(_))
    ));
}

/// Clearing drops the external values and reloads on next use.
#[tokio::test]
async fn clear_all_reloads_external_source() {
    let source = StubSource::new(json!({ "mod": { "foo": "external" } }));
    let engine = engine_with(source.clone());
    engine.get_config("mod").await.expect("config");

    engine.clear_all();
    engine.define_schema("mod", schema([("foo", SchemaNode::leaf("qux"))]));
    let config = engine.get_config("mod").await.expect("config");
    assert_eq!(config["foo"], json!("external"));
    assert_eq!(source.load_count(), 2);
}

/// Strict mode also applies to keys coming from the external source.
#[tokio::test]
async fn strict_mode_checks_external_keys() {
    let engine = ConfigEngine::with_options(
        EngineOptions::new()
            .with_validation_mode(ValidationMode::Strict)
            .with_external_source(StubSource::new(json!({ "mod": { "stray": 1 } }))),
    );
    engine.define_schema("mod", schema([("foo", SchemaNode::leaf("qux"))]));
    assert!(matches!(
        engine.get_config("mod").await,
        Err(ConfigError::UnknownKey { .. })
    ));
}

/// An undeclared module is reported as such even when the external source is broken.
#[tokio::test]
async fn undeclared_module_fails_before_loading() {
    let source = StubSource::failing("boom");
    let engine = engine_with(source.clone());
    assert!(matches!(
        engine.get_config("fake-module").await,
        Err(ConfigError::SchemaNotDefined(module)) if module == "fake-module"
    ));
    assert_eq!(source.load_count(), 0);
}

/// Clearing while a load is in flight drops its result, and the next
/// resolution loads the source again.
#[tokio::test]
async fn clear_all_during_load_starts_a_fresh_load() {
    let (source, gate) = StubSource::new(json!({ "mod": { "foo": "external" } })).gated();
    let engine = engine_with(source.clone());

    let reset = async {
        tokio::task::yield_now().await;
        engine.clear_all();
        engine.define_schema("mod", schema([("foo", SchemaNode::leaf("qux"))]));
        gate.open();
    };
    let (stale, ()) = tokio::join!(engine.get_config("mod"), reset);
    assert_eq!(stale.expect("stale")["foo"], json!("qux"));

    gate.open();
    let config = engine.get_config("mod").await.expect("config");
    assert_eq!(config["foo"], json!("external"));
    assert_eq!(source.load_count(), 2);
}
