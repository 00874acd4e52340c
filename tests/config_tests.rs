// Config loading tests - AppConfig::load over full files and error cases
//
// Also checks that the sample config shipped in config/ stays loadable.

use comanda_core::config::{AppConfig, ConfigError, StoreBackend};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("comanda.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn returns_error_when_explicit_file_missing() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/comanda.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn returns_parse_error_for_invalid_toml() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "model = [unclosed");
    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn loads_every_section() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
model = "qwen2.5"

[provider]
type = "openai"
endpoint = "https://api.example.com"
api_key = "EXAMPLE_API_KEY"

[host]
command = "/usr/local/bin/comanda-host"
args = ["--memory"]

[host.env]
RUST_LOG = "debug"

[store]
backend = "MEMORY"

[address]
url = "https://cep.example.com/lookup"
username = "CEP_USER"
password = "CEP_PASSWORD"

[agent]
system_prompt = "  Atenda em português.  "
max_steps = 3
history_window = 0
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("load");

    assert_eq!(config.model, "qwen2.5");
    assert_eq!(config.provider.provider_type, "openai");
    assert_eq!(config.provider.api_key.as_deref(), Some("EXAMPLE_API_KEY"));
    assert_eq!(config.host.command, PathBuf::from("/usr/local/bin/comanda-host"));
    assert!(config.host.explicit);
    assert_eq!(config.host.args, vec!["--memory"]);
    assert_eq!(config.host.env.get("RUST_LOG").map(String::as_str), Some("debug"));
    assert_eq!(config.store.backend, StoreBackend::Memory);

    let address = config.address.expect("address section");
    assert_eq!(address.url, "https://cep.example.com/lookup");
    assert_eq!(address.query_param, "cep");
    assert_eq!(address.address_field, "endereco");
    assert_eq!(address.username.as_deref(), Some("CEP_USER"));

    assert_eq!(config.agent.system_prompt, "Atenda em português.");
    assert_eq!(config.agent.max_steps, 3);
    assert_eq!(config.agent.history_window, 0);
}

#[test]
fn rejects_empty_host_command() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[host]\ncommand = \"\"\n");
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::EmptyHostCommand)
    ));
}

#[test]
fn rejects_address_section_without_url() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[address]\nusername = \"CEP_USER\"\n");
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::EmptyAddressUrl)
    ));
}

#[test]
fn shipped_sample_config_loads() {
    let sample = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/comanda.toml");
    let config = AppConfig::load(Some(&sample)).expect("sample config");

    assert_eq!(config.model, "llama3");
    assert!(!config.host.explicit);
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.store.path, PathBuf::from("orders.db"));
    assert!(config.address.is_none());
    assert!(config.agent.system_prompt.contains("insert_order"));
}

#[test]
#[serial]
fn missing_default_file_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let original = env::current_dir().expect("cwd");
    env::set_current_dir(dir.path()).expect("enter tempdir");

    let result = AppConfig::load(None);

    env::set_current_dir(original).expect("restore cwd");
    let config = result.expect("defaults");
    assert_eq!(config.model, "llama3");
    assert_eq!(config.provider.endpoint, "http://127.0.0.1:11434");
    assert_eq!(config.agent.history_window, 40);
}
