use autosage_core::config::Config;

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn explicit_host_parses_from_partial_toml() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 9000
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    // Untouched sections still take their defaults.
    assert_eq!(config.workspace.jobs_path.to_str().unwrap(), "./data/jobs");
}

#[test]
fn resolved_concurrency_falls_back_to_cpu_count_when_unset() {
    let config = Config::default();
    assert!(config.execution.resolved_concurrency() >= 1);
}
