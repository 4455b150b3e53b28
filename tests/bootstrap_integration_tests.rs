//! Startup bootstrap integration tests: admin and bot provisioning through
//! the public surface, plus secret-safe config storage round-trips.
//! These tests exercise the same sequence the embedding server runs on boot.

use std::sync::Arc;

use serde_json::json;

use metaforge_core::identity::{
    AuthMechanism, AuthProviderKind, FIELD_AUTH_MECHANISM, HmacTokenIssuer, Identity,
    IdentityBootstrapper, IdentityStore, InMemoryIdentityStore, LogNotifier, ServiceClientConfig,
};
use metaforge_core::identity::{INGESTION_BOT, resolve_bot_role_name};
use metaforge_core::secrets::{self, InMemoryVault, tags};
use metaforge_core::security;

fn boot_with(store: Arc<InMemoryIdentityStore>) -> IdentityBootstrapper {
    let issuer = Arc::new(HmacTokenIssuer::new(b"integration-key".to_vec(), "metaforge"));
    IdentityBootstrapper::new(store, issuer, Arc::new(LogNotifier))
}

#[test]
fn full_startup_sequence_provisions_admins_and_bots() {
    let store = Arc::new(InMemoryIdentityStore::new());
    let boot = boot_with(store.clone());

    let admins = vec!["admin".to_string(), "ops".to_string()];
    boot.provision_identities(AuthProviderKind::Basic, &admins, "example.com", true);

    let client = ServiceClientConfig { api_endpoint: "http://localhost:8585".into(), jwt_token: None };
    let bot = boot
        .provision_service_identity(Identity::bot(INGESTION_BOT, "example.com"), &client)
        .unwrap()
        .expect("bot stored");

    assert_eq!(store.len(), 3);
    assert!(bot.is_bot);
    assert!(matches!(bot.authentication_mechanism, Some(AuthMechanism::Jwt { .. })));

    let admin = store.find_by_name("admin", &[FIELD_AUTH_MECHANISM]).unwrap();
    assert!(admin.is_admin);
    assert!(matches!(admin.authentication_mechanism, Some(AuthMechanism::Basic { .. })));

    assert_eq!(resolve_bot_role_name(INGESTION_BOT).unwrap(), "IngestionBotRole");
}

#[test]
fn restart_does_not_rotate_credentials() {
    let store = Arc::new(InMemoryIdentityStore::new());
    let names = vec!["admin".to_string()];

    let boot = boot_with(store.clone());
    boot.provision_identities(AuthProviderKind::Basic, &names, "example.com", true);
    let first = store.find_by_name("admin", &[FIELD_AUTH_MECHANISM]).unwrap();

    // Second process start: fresh bootstrapper, same backing store.
    let boot2 = boot_with(store.clone());
    boot2.provision_identities(AuthProviderKind::Basic, &names, "example.com", true);
    let second = store.find_by_name("admin", &[FIELD_AUTH_MECHANISM]).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.authentication_mechanism, second.authentication_mechanism);
    assert_eq!(store.len(), 1);
}

#[test]
fn default_password_fallback_still_authenticates() {
    struct DownNotifier;
    impl metaforge_core::identity::Notifier for DownNotifier {
        fn test_connection(&self) -> anyhow::Result<()> {
            anyhow::bail!("smtp unreachable")
        }
        fn send_credential_email(&self, _identity: &Identity, _from_name: &str) {}
    }

    let store = Arc::new(InMemoryIdentityStore::new());
    let issuer = Arc::new(HmacTokenIssuer::new(b"integration-key".to_vec(), "metaforge"));
    let boot = IdentityBootstrapper::new(store.clone(), issuer, Arc::new(DownNotifier));
    boot.provision_identities(AuthProviderKind::Basic, &["admin".to_string()], "example.com", true);

    let stored = store.find_by_name("admin", &[FIELD_AUTH_MECHANISM]).unwrap();
    match stored.authentication_mechanism {
        Some(AuthMechanism::Basic { ref hashed_password }) => {
            assert!(security::verify_password(hashed_password, security::DEFAULT_ADMIN_PASSWORD));
        }
        ref other => panic!("expected basic mechanism, got {:?}", other),
    }
}

#[test]
fn connection_config_survives_the_storage_boundary() {
    let vault = InMemoryVault::new();
    let config = json!({
        "host": "warehouse.internal",
        "port": 3306,
        "username": "meta_ro",
        "password": "do-not-persist-me",
    });

    let stored = secrets::to_storage_form(tags::DATABASE_CONNECTION, "warehouse", &config, &vault).unwrap();
    let persisted = serde_json::to_string(&stored).unwrap();
    assert!(!persisted.contains("do-not-persist-me"));

    let runtime = secrets::to_runtime_form(tags::DATABASE_CONNECTION, &stored, &vault).unwrap();
    assert_eq!(runtime, config);
}
