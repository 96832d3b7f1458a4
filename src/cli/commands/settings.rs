//! Config file commands.

use std::path::Path;

use super::{ConfigAction, report};
use crate::config::{self, Config, ConfigError};

/// Show or create the config file
pub fn cmd_config(action: &ConfigAction, config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let contents = toml::to_string_pretty(config)
                .map_err(|e| report(ConfigError::Serialize(e)))?;
            if let Some(path) = path.map(Path::to_path_buf).or_else(config::config_path) {
                println!("# {}", path.display());
            }
            print!("{}", contents);
        }
        ConfigAction::Init { force } => {
            let target = match path {
                Some(path) => path.to_path_buf(),
                None => config::config_path().ok_or_else(|| report(ConfigError::NoConfigDir))?,
            };
            if target.exists() && !force {
                anyhow::bail!(
                    "Config file {} already exists (use --force to overwrite)",
                    target.display()
                );
            }
            config::save_to(&Config::default(), &target).map_err(report)?;
            println!("Wrote default config to {}", target.display());
        }
    }
    Ok(())
}
