use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_HOST_COMMAND: &str = "comanda-host";

/// How the agent driver launches the tool host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
    /// `false` when `command` is the built-in default rather than configured
    pub explicit: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_HOST_COMMAND.to_string(),
            command: PathBuf::from(DEFAULT_HOST_COMMAND),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
            explicit: false,
        }
    }
}

/// `[host]` as written in the file; every string may reference env vars.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawServer {
    name: Option<String>,
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    workdir: Option<String>,
}

/// `$VAR`, `${VAR}` and `~`; unresolvable references are kept verbatim.
fn expand(value: &str) -> String {
    match shellexpand::full(value) {
        Ok(expanded) => expanded.into_owned(),
        Err(_) => value.to_owned(),
    }
}

impl From<RawServer> for ServerConfig {
    fn from(raw: RawServer) -> Self {
        let explicit = raw.command.is_some();
        let command = match raw.command {
            Some(command) => PathBuf::from(expand(&command)),
            None => PathBuf::from(DEFAULT_HOST_COMMAND),
        };
        let env = raw
            .env
            .into_iter()
            .map(|(key, value)| {
                let value = expand(&value);
                (key, value)
            })
            .collect();

        Self {
            name: raw.name.unwrap_or_else(|| DEFAULT_HOST_COMMAND.into()),
            command,
            args: raw.args.iter().map(|arg| expand(arg)).collect(),
            env,
            workdir: raw.workdir.as_deref().map(expand).map(PathBuf::from),
            explicit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn parse(section: &str) -> ServerConfig {
        ServerConfig::from(toml::from_str::<RawServer>(section).expect("host section"))
    }

    #[test]
    #[serial]
    fn expands_env_vars_in_command_and_args() {
        unsafe {
            env::set_var("COMANDA_TEST_ROOT", "/opt/comanda");
            env::set_var("COMANDA_TEST_DB", "pedidos.db");
        }

        let config = parse(
            r#"
command = "${COMANDA_TEST_ROOT}/bin/comanda-host"
args = ["--database", "$COMANDA_TEST_DB", "$COMANDA_TEST_UNSET"]
workdir = "${COMANDA_TEST_ROOT}/var"
"#,
        );

        unsafe {
            env::remove_var("COMANDA_TEST_ROOT");
            env::remove_var("COMANDA_TEST_DB");
        }

        assert!(config.explicit);
        assert_eq!(config.name, DEFAULT_HOST_COMMAND);
        assert_eq!(config.command, PathBuf::from("/opt/comanda/bin/comanda-host"));
        assert_eq!(
            config.args,
            vec!["--database", "pedidos.db", "$COMANDA_TEST_UNSET"]
        );
        assert_eq!(config.workdir, Some(PathBuf::from("/opt/comanda/var")));
    }

    #[test]
    fn missing_command_keeps_default() {
        let config = parse("name = \"pedidos\"");
        assert!(!config.explicit);
        assert_eq!(config.command, PathBuf::from(DEFAULT_HOST_COMMAND));
        assert_eq!(config.name, "pedidos");
        assert_eq!(ServerConfig::from(RawServer::default()), ServerConfig::default());
    }
}
