use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use lab_layout_core::{
    GridDimensions, DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_WALL_COLUMN,
};
use lab_layout_system_autosave::DEFAULT_QUIET_PERIOD;
use serde::Deserialize;

/// Configuration file looked up in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "lab-layout.toml";

/// Settings read from `lab-layout.toml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) grid: GridConfig,
    pub(crate) autosave: AutosaveConfig,
    pub(crate) store: StoreConfig,
}

/// Fixed grid geometry shared by every saved layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridConfig {
    pub(crate) rows: u32,
    pub(crate) columns: u32,
    pub(crate) wall_column: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_ROWS,
            columns: DEFAULT_GRID_COLUMNS,
            wall_column: DEFAULT_WALL_COLUMN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AutosaveConfig {
    pub(crate) quiet_period_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: u64::try_from(DEFAULT_QUIET_PERIOD.as_millis()).unwrap_or(900),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StoreConfig {
    pub(crate) directory: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("lab-layout-data"),
        }
    }
}

impl Config {
    /// Loads the configuration, falling back to defaults when the default file is absent.
    ///
    /// An explicitly requested file must exist.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound && !explicit => {
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read config at {}", path.display()));
            }
        };

        let config = Self::parse(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))?;
        // Relative store directories resolve against the config file.
        Ok(match path.parent() {
            Some(parent) if config.store.directory.is_relative() && explicit => Self {
                store: StoreConfig {
                    directory: parent.join(&config.store.directory),
                },
                ..config
            },
            _ => config,
        })
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        ensure!(
            config.dimensions().is_valid(),
            "grid of {}x{} cells cannot hold a wall at column {}",
            config.grid.rows,
            config.grid.columns,
            config.grid.wall_column
        );
        Ok(config)
    }

    pub(crate) fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.grid.rows, self.grid.columns, self.grid.wall_column)
    }

    pub(crate) fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.autosave.quiet_period_ms)
    }
}
