//! Settings priority: overrides > environment > file > defaults.

use figment::Jail;
use serde_json::json;
use trellis_config::{BuildMode, ConfigError, Settings, CONFIG_FILE_NAME, DEFAULT_PORT};

fn no_overrides() -> serde_json::Value {
    json!({})
}

#[test]
fn defaults_without_sources() {
    Jail::expect_with(|_jail| {
        let settings = Settings::load(None, &no_overrides()).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.layout.public_path, "/dist/");
        Ok(())
    });
}

#[test]
fn file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            CONFIG_FILE_NAME,
            r#"{ "port": 7100, "layout": { "public_path": "/assets/" } }"#,
        )?;
        let settings = Settings::load(None, &no_overrides()).unwrap();
        assert_eq!(settings.port, 7100);
        assert_eq!(settings.layout.public_path, "/assets/");
        // Untouched layout keys keep their defaults.
        assert_eq!(settings.layout.manifest_name, "manifest.json");
        Ok(())
    });
}

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(CONFIG_FILE_NAME, r#"{ "port": 7100 }"#)?;
        jail.set_env("PORT", "7200");
        jail.set_env("NODE_ENV", "development");
        jail.set_env("TRELLIS_LAYOUT__STATIC_ROOT", "public");

        let settings = Settings::load(None, &no_overrides()).unwrap();
        assert_eq!(settings.port, 7200);
        assert_eq!(settings.node_env.as_deref(), Some("development"));
        assert_eq!(BuildMode::from_signal(settings.node_env.as_deref()), BuildMode::Development);
        assert_eq!(settings.layout.static_root.to_str(), Some("public"));
        Ok(())
    });
}

#[test]
fn overrides_win_over_environment() {
    Jail::expect_with(|jail| {
        jail.set_env("PORT", "7200");
        jail.set_env("NODE_ENV", "development");

        let overrides = json!({ "port": 7300, "node_env": "production" });
        let settings = Settings::load(None, &overrides).unwrap();
        assert_eq!(settings.port, 7300);
        assert_eq!(settings.node_env.as_deref(), Some("production"));
        Ok(())
    });
}

#[test]
fn explicit_config_path_must_exist() {
    Jail::expect_with(|jail| {
        let missing = jail.directory().join("nope.json");
        let err = Settings::load(Some(&missing), &no_overrides()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
        Ok(())
    });
}

#[test]
fn explicit_config_path_is_read() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.json", r#"{ "revision": "cafe" }"#)?;
        let path = jail.directory().join("custom.json");
        let settings = Settings::load(Some(&path), &no_overrides()).unwrap();
        assert_eq!(settings.revision.as_deref(), Some("cafe"));
        Ok(())
    });
}

#[test]
fn unparsable_port_is_an_error() {
    Jail::expect_with(|jail| {
        jail.set_env("PORT", "not-a-port");
        let err = Settings::load(None, &no_overrides()).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
        assert!(err.to_string().contains("not-a-port"), "{err}");
        Ok(())
    });
}
