//! Configuration management for Bifrost
//!
//! This crate persists the defaults the CLI runs with: the protocol revision, the gas limit of
//! top-level executions and the interpreter's engine options. The configuration lives in
//! `$HOME/.bifrost/config.toml` and is created with default values on first use.

/// Error types for the configuration module
pub mod error;

use std::path::{Path, PathBuf};

use crate::error::Error;
use bifrost_common::utils::io::file::{delete_path, read_file, write_file};
use bifrost_vm::core::{analysis::BlockGranularity, revision::Revision, vm::VmConfig};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Command line arguments for the configuration command
#[derive(Debug, Clone, Parser)]
#[clap(
    about = "Display and edit the current configuration",
    override_usage = "bifrost config [OPTIONS] [KEY] [VALUE]"
)]
pub struct ConfigArgs {
    /// The target key to update.
    #[clap(required = false, default_value = "")]
    key: String,

    /// The value to set the key to.
    #[clap(required = false, default_value = "")]
    value: String,
}

/// The [`Configuration`] struct represents the configuration of the CLI. Command line flags take
/// precedence over the values stored here.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// The protocol revision code is executed under.
    pub revision: Revision,

    /// The gas limit of top-level executions.
    pub gas_limit: i64,

    /// Whether static gas and stack requirements are checked once per basic block rather than
    /// once per instruction.
    pub block_metering: bool,

    /// Maximum number of analyzed programs kept in memory.
    pub cache_capacity: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        let engine = VmConfig::default();
        Configuration {
            revision: Revision::LATEST,
            gas_limit: 30_000_000,
            block_metering: engine.block_granularity == BlockGranularity::Block,
            cache_capacity: engine.cache_capacity,
        }
    }
}

/// Returns `$HOME/.bifrost/config.toml`.
#[allow(deprecated)]
fn config_path() -> Result<PathBuf, Error> {
    let mut home = std::env::home_dir().ok_or(Error::NoHomeDirectory)?;
    home.push(".bifrost");
    home.push("config.toml");
    Ok(home)
}

fn path_str(path: &Path) -> Result<&str, Error> {
    path.to_str().ok_or_else(|| Error::InvalidPath(path.to_path_buf()))
}

impl Configuration {
    /// Returns the current configuration, creating the file with default values if it does not
    /// exist yet.
    pub fn load() -> Result<Self, Error> {
        let path = config_path()?;

        // if the config file doesn't exist, create it
        if !path.exists() {
            debug!(path = %path.display(), "creating default configuration");
            Configuration::default().save()?;
        }

        let contents = read_file(path_str(&path)?)
            .map_err(|e| Error::Read { path: path.clone(), reason: e.to_string() })?;

        let config: Configuration = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the current configuration to disk.
    pub fn save(&self) -> Result<(), Error> {
        let path = config_path()?;
        let contents = toml::to_string(&self)?;

        write_file(path_str(&path)?, &contents)
            .map_err(|e| Error::Write { path: path.clone(), reason: e.to_string() })
    }

    /// Deletes the configuration file at `$HOME/.bifrost/config.toml`.
    pub fn delete() -> Result<(), Error> {
        let path = config_path()?;
        if !delete_path(path_str(&path)?) {
            return Err(Error::Write { path, reason: "could not delete the file".to_string() });
        }
        Ok(())
    }

    /// Update a single key/value pair in the configuration and persist it.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let invalid = |e: &dyn std::fmt::Display| Error::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        };

        // update the key in the struct and ensure it's the correct type
        match key {
            "revision" => {
                self.revision =
                    value.parse().map_err(|_: String| Error::InvalidRevision(value.to_string()))?;
            }
            "gas_limit" => {
                let gas_limit: i64 = value.parse().map_err(|e| invalid(&e))?;
                if gas_limit <= 0 {
                    return Err(Error::InvalidGasLimit(gas_limit));
                }
                self.gas_limit = gas_limit;
            }
            "block_metering" => {
                self.block_metering = value.parse().map_err(|e| invalid(&e))?;
            }
            "cache_capacity" => {
                self.cache_capacity = value.parse().map_err(|e| invalid(&e))?;
            }
            _ => return Err(Error::UnknownKey(key.to_string())),
        }

        // write the updated config to disk
        self.save()
    }

    /// Rejects values a hand-edited file can hold but an update cannot set.
    fn validate(&self) -> Result<(), Error> {
        if self.gas_limit <= 0 {
            return Err(Error::InvalidGasLimit(self.gas_limit));
        }
        Ok(())
    }

    /// The engine options this configuration describes.
    pub fn vm_config(&self) -> VmConfig {
        VmConfig {
            block_granularity: if self.block_metering {
                BlockGranularity::Block
            } else {
                BlockGranularity::Instruction
            },
            cache_capacity: self.cache_capacity,
        }
    }
}

/// The `config` command is used to display and edit the current configuration.
pub fn config(args: ConfigArgs) -> Result<(), Error> {
    if !args.key.is_empty() {
        if !args.value.is_empty() {
            // read the config file and update the key/value pair
            let mut config = Configuration::load()?;
            config.update(&args.key, &args.value)?;
            info!("updated configuration! Set \'{}\' = \'{}\' .", &args.key, &args.value);
        } else {
            // key is set, but no value is set
            error!("found key but no value to set. Please specify a value to set, use `bifrost config --help` for more information.");
        }
    } else {
        // no key is set, print the config file
        println!("{:#?}", Configuration::load()?);
        info!("use `bifrost config <KEY> <VALUE>` to set a key/value pair.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_configuration() {
        let config = Configuration::default();
        assert_eq!(config.revision, Revision::Cancun);
        assert_eq!(config.gas_limit, 30_000_000);
        assert!(config.block_metering);
        assert_eq!(config.cache_capacity, 1024);
        assert_eq!(config.vm_config(), VmConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_configuration() {
        Configuration::delete().expect("failed to delete config file");
        let config = Configuration::load().expect("failed to load config file");
        assert_eq!(config, Configuration::default());
    }

    #[test]
    #[serial]
    fn test_save_configuration() {
        Configuration::delete().expect("failed to delete config file");
        let mut config = Configuration::default();

        config.update("revision", "shanghai").expect("failed to update revision");
        config.update("gas_limit", "100000").expect("failed to update gas_limit");
        config.update("block_metering", "false").expect("failed to update block_metering");

        let loaded = Configuration::load().expect("failed to load config file");
        assert_eq!(loaded.revision, Revision::Shanghai);
        assert_eq!(loaded.gas_limit, 100_000);
        assert!(!loaded.block_metering);
        assert_eq!(loaded.vm_config().block_granularity, BlockGranularity::Instruction);

        Configuration::delete().expect("failed to delete config file");
    }

    #[test]
    #[serial]
    fn test_update_rejects_bad_input() {
        Configuration::delete().expect("failed to delete config file");
        let mut config = Configuration::default();

        assert!(matches!(config.update("rpc_url", "x"), Err(Error::UnknownKey(key)) if key == "rpc_url"));
        assert!(matches!(
            config.update("revision", "constantinopel"),
            Err(Error::InvalidRevision(name)) if name == "constantinopel"
        ));
        assert!(matches!(config.update("gas_limit", "-1"), Err(Error::InvalidGasLimit(-1))));
        assert!(matches!(config.update("gas_limit", "0"), Err(Error::InvalidGasLimit(0))));
        assert!(matches!(config.update("gas_limit", "lots"), Err(Error::InvalidValue { .. })));
        assert!(matches!(
            config.update("cache_capacity", "many"),
            Err(Error::InvalidValue { key, .. }) if key == "cache_capacity"
        ));
        assert_eq!(config, Configuration::default());
    }

    #[test]
    #[serial]
    fn test_load_rejects_hand_edited_file() {
        let path = config_path().expect("config path");
        let path = path_str(&path).expect("utf-8 path");

        write_file(path, "revision = \"cancun\"\n").expect("failed to write config file");
        assert!(matches!(Configuration::load(), Err(Error::Parse(_))));

        let mut contents = toml::to_string(&Configuration::default()).expect("serialize");
        contents = contents.replace("gas_limit = 30000000", "gas_limit = 0");
        write_file(path, &contents).expect("failed to write config file");
        assert!(matches!(Configuration::load(), Err(Error::InvalidGasLimit(0))));

        Configuration::delete().expect("failed to delete config file");
    }

    #[test]
    #[serial]
    fn test_delete_configuration() {
        Configuration::delete().expect("failed to delete config file");
        let mut config = Configuration::load().expect("failed to load config file");
        config.update("cache_capacity", "7").expect("failed to update cache_capacity");

        Configuration::delete().expect("failed to delete config file");
        let config = Configuration::load().expect("failed to load config file");
        assert_eq!(config.cache_capacity, 1024);
    }
}
