use std::{env, fs};

use medlab_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    // Create a temporary TOML configuration file
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("medlab.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081
body_limit_bytes = 1024

[database]
host = "localhost"
port = 3306
user = "medlab"
password = "test"
database = "medlab_test"
pool_size = 3

[logging]
level = "debug"

[sql_demo]
enabled = false
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.database.database, "medlab_test");
    assert_eq!(cfg.database.pool_size, 3);
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");
    assert!(!cfg.sql_demo.enabled);

    // 2) Env override should win over file
    unsafe {
        env::set_var("MEDLAB__SERVER__PORT", "9099");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9099);
    // cleanup env var
    unsafe {
        env::remove_var("MEDLAB__SERVER__PORT");
    }

    // 3) Missing file falls back to defaults
    let missing = dir.path().join("does-not-exist.toml");
    let cfg_default = load_config(missing.to_str()).expect("defaults should validate");
    assert_eq!(cfg_default.server.port, 8000);
    assert_eq!(cfg_default.database.database, "medlab_db");

    // 4) Invalid config (unknown logging level) should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[logging]
level = "shouty"
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("logging.level"));
}
