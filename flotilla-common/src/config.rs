use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct BaseConfig {
    pub fleet_id: String,
}

pub trait LoadConfig {
    fn load_config(service_name: &str) -> Result<Self, ConfigError>
    where
        Self: Sized + serde::de::DeserializeOwned,
    {
        // Try development path first
        let dev_path = PathBuf::from("flotilla-deploy/config/development");
        let prod_path = PathBuf::from("/etc/flotilla");

        let config_dir = if dev_path.join(format!("{}.toml", service_name)).exists() {
            dev_path
        } else if prod_path.join(format!("{}.toml", service_name)).exists() {
            prod_path
        } else {
            return Err(ConfigError::NotFound(format!(
                "Config file not found in {:?}",
                prod_path.join(format!("{}.toml", service_name))
            )));
        };

        Self::load_from(&config_dir, service_name)
    }

    fn load_from(config_dir: &Path, service_name: &str) -> Result<Self, ConfigError>
    where
        Self: Sized + serde::de::DeserializeOwned,
    {
        let config = Config::builder()
            // Base config first (if it exists)
            .add_source(File::from(config_dir.join("base.toml")).required(false))
            // Service-specific config (required)
            .add_source(File::from(
                config_dir.join(format!("{}.toml", service_name)),
            ))
            // Environment variables override
            .add_source(Environment::with_prefix("FLOTILLA"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        #[serde(flatten)]
        base: BaseConfig,
        log_level: String,
    }

    impl LoadConfig for TestConfig {}

    #[test]
    fn load_from_layers_base_and_service_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("base.toml"), "fleet_id = \"fleet-test\"\n")?;
        fs::write(dir.path().join("unit.toml"), "log_level = \"debug\"\n")?;

        let config = TestConfig::load_from(dir.path(), "unit")?;
        assert_eq!(config.base.fleet_id, "fleet-test");
        assert_eq!(config.log_level, "debug");
        Ok(())
    }

    #[test]
    fn service_file_overrides_base() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("base.toml"),
            "fleet_id = \"fleet-test\"\nlog_level = \"info\"\n",
        )?;
        fs::write(dir.path().join("unit.toml"), "log_level = \"trace\"\n")?;

        let config = TestConfig::load_from(dir.path(), "unit")?;
        assert_eq!(config.log_level, "trace");
        Ok(())
    }

    #[test]
    fn missing_service_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("base.toml"), "fleet_id = \"fleet-test\"\n")?;

        assert!(TestConfig::load_from(dir.path(), "absent").is_err());
        Ok(())
    }
}
