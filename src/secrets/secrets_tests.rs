use super::*;
use serde_json::json;

#[test]
fn database_connection_roundtrip() {
    let vault = InMemoryVault::new();
    let config = json!({
        "host": "db.internal",
        "port": 5432,
        "username": "svc_meta",
        "password": "pl4in-text",
    });

    let stored = to_storage_form(tags::DATABASE_CONNECTION, "prod-pg", &config, &vault).unwrap();
    assert_eq!(stored["host"], "db.internal");
    assert_eq!(stored["username"], "svc_meta");
    let reference = stored["password"].as_str().unwrap();
    assert!(reference.starts_with(SECRET_SCHEME));
    assert!(!serde_json::to_string(&stored).unwrap().contains("pl4in-text"));

    let runtime = to_runtime_form(tags::DATABASE_CONNECTION, &stored, &vault).unwrap();
    assert_eq!(runtime, config);
}

#[test]
fn nested_secret_paths_roundtrip() {
    let vault = InMemoryVault::new();
    let config = json!({
        "host_port": "http://airflow:8080",
        "password": "airflow-pass",
        "client": { "api_endpoint": "http://meta:8585", "jwt_token": "ey.raw.token" },
    });

    let stored = to_storage_form(tags::PIPELINE_CONNECTION, "airflow-prod", &config, &vault).unwrap();
    assert!(stored["password"].as_str().unwrap().starts_with(SECRET_SCHEME));
    assert!(stored["client"]["jwt_token"].as_str().unwrap().starts_with(SECRET_SCHEME));
    assert_eq!(stored["client"]["api_endpoint"], "http://meta:8585");
    assert_eq!(vault.len(), 2);

    let runtime = to_runtime_form(tags::PIPELINE_CONNECTION, &stored, &vault).unwrap();
    assert_eq!(runtime, config);
}

#[test]
fn two_scopes_do_not_collide_in_the_vault() {
    let vault = InMemoryVault::new();
    let a = json!({ "password": "secret-a" });
    let b = json!({ "password": "secret-b" });

    let stored_a = to_storage_form(tags::DATABASE_CONNECTION, "svc-a", &a, &vault).unwrap();
    let stored_b = to_storage_form(tags::DATABASE_CONNECTION, "svc-b", &b, &vault).unwrap();
    assert_ne!(stored_a["password"], stored_b["password"]);

    assert_eq!(to_runtime_form(tags::DATABASE_CONNECTION, &stored_a, &vault).unwrap(), a);
    assert_eq!(to_runtime_form(tags::DATABASE_CONNECTION, &stored_b, &vault).unwrap(), b);
}

#[test]
fn unknown_tag_is_identity_both_ways() {
    let vault = InMemoryVault::new();
    let config = json!({ "anything": "goes", "password": "left-alone" });

    let stored = to_storage_form("messaging-connection", "kafka-main", &config, &vault).unwrap();
    assert_eq!(stored, config);
    assert!(vault.is_empty());

    let runtime = to_runtime_form("messaging-connection", &stored, &vault).unwrap();
    assert_eq!(runtime, config);
}

#[test]
fn inputs_are_not_mutated() {
    let vault = InMemoryVault::new();
    let config = json!({ "password": "original" });
    let _ = to_storage_form(tags::DATABASE_CONNECTION, "svc", &config, &vault).unwrap();
    assert_eq!(config["password"], "original");
}

#[test]
fn absent_secret_fields_are_skipped() {
    let vault = InMemoryVault::new();
    let config = json!({ "host_port": "https://tableau.internal" });
    let stored = to_storage_form(tags::DASHBOARD_CONNECTION, "bi-main", &config, &vault).unwrap();
    assert_eq!(stored, config);
    assert!(vault.is_empty());
}

#[test]
fn storage_form_is_not_double_masked() {
    let vault = InMemoryVault::new();
    let config = json!({ "password": "plain" });
    let stored = to_storage_form(tags::DATABASE_CONNECTION, "svc", &config, &vault).unwrap();
    let again = to_storage_form(tags::DATABASE_CONNECTION, "svc", &stored, &vault).unwrap();
    assert_eq!(stored, again);
    assert_eq!(vault.len(), 1);
}

#[test]
fn missing_backing_secret_fails_runtime_form() {
    let vault = InMemoryVault::new();
    let stored = json!({ "password": format!("{}database-connection/gone/password", SECRET_SCHEME) });
    let err = to_runtime_form(tags::DATABASE_CONNECTION, &stored, &vault).unwrap_err();
    assert!(matches!(err, SecretError::Missing { .. }));
}

#[test]
fn duplicate_registration_fails_loudly() {
    let mut reg = TransformerRegistry::new();
    reg.register(std::sync::Arc::new(SsoAuthTransformer)).unwrap();
    let err = reg.register(std::sync::Arc::new(SsoAuthTransformer)).unwrap_err();
    assert_eq!(err.http_status(), 409);
}

#[test]
fn global_registry_serves_all_built_ins() {
    let expected = vec![
        tags::DASHBOARD_CONNECTION,
        tags::DATABASE_CONNECTION,
        tags::PIPELINE_CONNECTION,
        tags::SSO_AUTH,
        tags::STORAGE_CONNECTION,
    ];
    assert_eq!(global().registered_tags(), expected);
}

#[test]
fn unreachable_vault_propagates_unavailable() {
    struct DownVault;
    impl SecretVault for DownVault {
        fn put(&self, _reference: &str, _value: &str) -> Result<(), SecretError> {
            Err(SecretError::Unavailable("vault sealed".into()))
        }
        fn resolve(&self, _reference: &str) -> Result<String, SecretError> {
            Err(SecretError::Unavailable("vault sealed".into()))
        }
    }

    let config = json!({ "password": "plain" });
    let err = to_storage_form(tags::DATABASE_CONNECTION, "svc", &config, &DownVault).unwrap_err();
    assert!(matches!(err, SecretError::Unavailable(_)));
}
