//! Layered configuration loading.
//!
//! Sources are merged lowest-priority first: `default.toml`, then the
//! `{environment}.toml` for the current `BRIGADE_APP_ENV`, then
//! `local.toml`, and finally `BRIGADE_*` environment variables. Setting
//! `BRIGADE_CONFIG_FILE` bypasses the layering and loads exactly one file.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat, FileSourceFile};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const ENV_CONFIG_DIR: &str = "BRIGADE_CONFIG_DIR";
const ENV_CONFIG_FILE: &str = "BRIGADE_CONFIG_FILE";
const ENV_PREFIX: &str = "BRIGADE";
const KEY_SEPARATOR: &str = "__";
const DEFAULT_CONFIG_DIR: &str = "config";

/// Resolves where configuration comes from and merges it into [`Settings`].
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Reads `BRIGADE_CONFIG_DIR`, `BRIGADE_CONFIG_FILE` and
    /// `BRIGADE_APP_ENV` to decide the loading strategy.
    ///
    /// The two location variables are mutually exclusive: a config dir
    /// implies layered loading, a config file implies single-file mode.
    pub fn new() -> Result<Self, ConfigError> {
        let dir_var = std::env::var(ENV_CONFIG_DIR).ok();
        let file_var = std::env::var(ENV_CONFIG_FILE).ok();

        if dir_var.is_some() && file_var.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "BRIGADE_CONFIG_DIR and BRIGADE_CONFIG_FILE cannot both be set. \
                 Use BRIGADE_CONFIG_DIR for layered configuration or \
                 BRIGADE_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: dir_var
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file: file_var.map(PathBuf::from),
            environment: AppEnvironment::from_env(),
        })
    }

    /// The application environment this loader resolved at construction.
    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Merges all sources and validates the result.
    ///
    /// In layered mode `default.toml` must exist; the environment and
    /// local files are optional. Environment variables always win, with
    /// `__` separating nested keys (`BRIGADE_SERVER__PORT` -> `server.port`).
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();

        match &self.config_file {
            Some(file) => {
                builder = builder.add_source(Self::file_source(file, true)?);
            }
            None => {
                let environment_file = format!("{}.toml", self.environment.as_str());
                builder = builder
                    .add_source(Self::file_source(&self.config_dir.join("default.toml"), true)?)
                    .add_source(Self::file_source(
                        &self.config_dir.join(environment_file),
                        false,
                    )?)
                    .add_source(Self::file_source(&self.config_dir.join("local.toml"), false)?);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(KEY_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()?
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Builds a TOML file source, failing early when a required file is
    /// missing so the error names the path instead of a merge failure.
    fn file_source(
        path: &Path,
        required: bool,
    ) -> Result<File<FileSourceFile, FileFormat>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()));
        }

        Ok(File::from(path).format(FileFormat::Toml).required(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Loader tests mutate process-wide environment variables, so they
    // must not run concurrently.
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("temp dir for config fixtures");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("config fixture should write");
        }
        temp_dir
    }

    /// Restores every touched environment variable on drop.
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original) in &self.vars_to_restore {
                unsafe {
                    match original {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    /// Starts every test from a clean slate: no loader-related variables set.
    fn scrubbed_env() -> EnvGuard {
        let mut env = EnvGuard {
            vars_to_restore: Vec::new(),
        };
        env.remove("BRIGADE_CONFIG_DIR");
        env.remove("BRIGADE_CONFIG_FILE");
        env.remove("BRIGADE_APP_ENV");
        env
    }

    const DEFAULT_CONFIG: &str = r#"
[application]
name = "brigade-test"
version = "0.9.3"

[server]
host = "127.0.0.1"
port = 8000
request_timeout = 30
keep_alive_timeout = 75

[database]
url = "postgres://localhost/brigade_test"
max_connections = 10
min_connections = 1
connection_timeout = 30

[auth]
token_length = 30
access_token_expiration = 10
default_scope = "read write"

[logger]
level = "info"

[logger.console]
enabled = true
colored = true

[logger.file]
enabled = false
directory = "logs"
filename = "brigade.log"
format = "json"
"#;

    #[test]
    fn test_loader_defaults_without_env() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let _env = scrubbed_env();

        let loader = ConfigLoader::new().expect("loader should construct");
        assert_eq!(loader.config_dir, PathBuf::from("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_loader_reads_location_and_environment_vars() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();
        env.set("BRIGADE_CONFIG_DIR", "/custom/config");
        env.set("BRIGADE_APP_ENV", "production");

        let loader = ConfigLoader::new().expect("loader should construct");
        assert_eq!(loader.config_dir, PathBuf::from("/custom/config"));
        assert_eq!(loader.environment(), AppEnvironment::Production);
    }

    #[test]
    fn test_loader_rejects_dir_and_file_together() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();
        env.set("BRIGADE_CONFIG_DIR", "/custom/config");
        env.set("BRIGADE_CONFIG_FILE", "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("BRIGADE_CONFIG_DIR"));
                assert!(msg.contains("BRIGADE_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_default_toml() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();

        let temp_dir = setup_config_dir(&[]);
        env.set("BRIGADE_CONFIG_DIR", temp_dir.path().to_str().unwrap());

        let result = ConfigLoader::new().expect("loader should construct").load();
        match result {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_load_default_toml_only() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();

        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_CONFIG)]);
        env.set("BRIGADE_CONFIG_DIR", temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new()
            .expect("loader should construct")
            .load()
            .expect("layered settings should load");

        assert_eq!(settings.application.name, "brigade-test");
        assert_eq!(settings.application.version, "0.9.3");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.database.url, "postgres://localhost/brigade_test");
        assert_eq!(settings.auth.token_length, 30);
    }

    #[test]
    fn test_load_with_environment_override() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();

        let production_config = r#"
[server]
host = "0.0.0.0"
port = 8443

[database]
url = "postgres://db.internal/brigade"
max_connections = 40
"#;

        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_CONFIG),
            ("production.toml", production_config),
        ]);
        env.set("BRIGADE_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("BRIGADE_APP_ENV", "production");

        let settings = ConfigLoader::new()
            .expect("loader should construct")
            .load()
            .expect("layered settings should load");

        // production.toml wins where it speaks
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8443);
        assert_eq!(settings.database.url, "postgres://db.internal/brigade");
        assert_eq!(settings.database.max_connections, 40);

        // everything else falls through to default.toml
        assert_eq!(settings.application.name, "brigade-test");
        assert_eq!(settings.server.request_timeout, 30);
        assert_eq!(settings.database.min_connections, 1);
    }

    #[test]
    fn test_load_with_local_override() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();

        let local_config = r#"
[server]
port = 7777

[database]
url = "postgres://localhost/brigade_local"
"#;

        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_CONFIG),
            ("local.toml", local_config),
        ]);
        env.set("BRIGADE_CONFIG_DIR", temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new()
            .expect("loader should construct")
            .load()
            .expect("layered settings should load");

        assert_eq!(settings.server.port, 7777);
        assert_eq!(settings.database.url, "postgres://localhost/brigade_local");
        assert_eq!(settings.application.name, "brigade-test");
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_with_env_var_override() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();

        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_CONFIG)]);
        env.set("BRIGADE_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("BRIGADE_SERVER__PORT", "4410");
        env.set("BRIGADE_DATABASE__URL", "postgres://envhost/brigade");

        let settings = ConfigLoader::new()
            .expect("loader should construct")
            .load()
            .expect("layered settings should load");

        assert_eq!(settings.server.port, 4410);
        assert_eq!(settings.database.url, "postgres://envhost/brigade");
        assert_eq!(settings.application.name, "brigade-test");
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_full_precedence_chain() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();

        let development_config = r#"
[application]
name = "brigade-dev"

[server]
port = 8001

[database]
url = "postgres://dev-db/brigade"
"#;

        let local_config = r#"
[server]
port = 8002

[database]
url = "postgres://scratch/brigade"
"#;

        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_CONFIG),
            ("development.toml", development_config),
            ("local.toml", local_config),
        ]);
        env.set("BRIGADE_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        // BRIGADE_APP_ENV unset, so the environment layer is development.toml
        env.set("BRIGADE_SERVER__PORT", "8003");

        let settings = ConfigLoader::new()
            .expect("loader should construct")
            .load()
            .expect("layered settings should load");

        // env var > local.toml > development.toml > default.toml
        assert_eq!(settings.server.port, 8003);
        assert_eq!(settings.database.url, "postgres://scratch/brigade");
        assert_eq!(settings.application.name, "brigade-dev");
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.application.version, "0.9.3");
    }

    #[test]
    fn test_load_single_file_mode() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();

        let standalone_config = r#"
[application]
name = "brigade-solo"
version = "1.2.0"

[server]
host = "0.0.0.0"
port = 5600
request_timeout = 60
keep_alive_timeout = 120

[database]
url = "postgres://solo/brigade"
max_connections = 20
min_connections = 2
connection_timeout = 60

[logger]
level = "debug"

[logger.console]
enabled = true
colored = false

[logger.file]
enabled = false
"#;

        let temp_dir = setup_config_dir(&[("standalone.toml", standalone_config)]);
        let config_file_path = temp_dir.path().join("standalone.toml");
        env.set("BRIGADE_CONFIG_FILE", config_file_path.to_str().unwrap());

        let settings = ConfigLoader::new()
            .expect("loader should construct")
            .load()
            .expect("layered settings should load");

        assert_eq!(settings.application.name, "brigade-solo");
        assert_eq!(settings.application.version, "1.2.0");
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 5600);
        assert_eq!(settings.database.url, "postgres://solo/brigade");
        // auth section omitted entirely, defaults apply
        assert_eq!(settings.auth.token_length, 30);
    }

    #[test]
    fn test_optional_layers_may_be_absent() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = scrubbed_env();

        // only default.toml exists; staging.toml and local.toml do not
        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_CONFIG)]);
        env.set("BRIGADE_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("BRIGADE_APP_ENV", "staging");

        let settings = ConfigLoader::new()
            .expect("loader should construct")
            .load()
            .expect("layered settings should load");

        assert_eq!(settings.application.name, "brigade-test");
    }
}
