use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub struct FixturedepsConfig {
    pub build_file: Option<PathBuf>,
    pub project: Option<String>,
}

impl FixturedepsConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;

        Ok(Self {
            build_file: raw_config.build.file,
            project: raw_config.build.project,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    build: BuildConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct BuildConfig {
    file: Option<PathBuf>,
    project: Option<String>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("FIXTUREDEPS")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
