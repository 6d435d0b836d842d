//! Configuration loader - YAML plot settings + .env overrides
//!
//! Precedence, highest first: CLI flags, environment, plot.yaml, defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dataset::DatasetError;
use crate::palette;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "plot.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid palette color at index {index}: {value:?}")]
    InvalidColor { index: usize, value: String },
    #[error("Chart title must not be empty")]
    EmptyTitle,
    #[error("Chart title must not contain script or comment markup: {0:?}")]
    UnsafeTitle(String),
    #[error("Config file not found: {0:?}")]
    Missing(PathBuf),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Main configuration loaded from plot.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub chart: ChartConfig,
}

/// Shape of the synthetic dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub seed: u64,
    pub num_lines: usize,
    pub num_groups: usize,
    pub points_per_line: usize,
}

/// Presentation and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: String,
    pub output: PathBuf,
    /// Inline plotly.js so the page works offline; otherwise load it from the CDN
    pub embed_plotly_js: bool,
    pub palette: Vec<String>,
    pub auto_open: bool,
    pub height: Option<usize>,
}

/// Overrides loaded from .env / process environment
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
    pub log_dir: String,
}

/// Overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
    pub no_open: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_lines: 100,
            num_groups: 10,
            points_per_line: 50,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Showing All Groups".to_string(),
            output: PathBuf::from("3d_line_plot.html"),
            embed_plotly_js: true,
            palette: palette::PLOTLY_QUALITATIVE.iter().map(|c| c.to_string()).collect(),
            auto_open: true,
            height: None,
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {:?}", path))?;
        Ok(config)
    }

    /// Load from YAML if the file exists.
    ///
    /// A missing file falls back to defaults only when the path was not
    /// chosen explicitly by the user.
    pub fn load_or_default<P: AsRef<Path>>(path: P, explicit: bool) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading config from {:?}", path);
            Self::load(path)
        } else if explicit {
            Err(ConfigError::Missing(path.to_path_buf()).into())
        } else {
            tracing::warn!("Config file not found: {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn apply_env(&mut self, env: &EnvOverrides) {
        if let Some(output) = &env.output {
            tracing::debug!("Output overridden from environment: {:?}", output);
            self.chart.output = output.clone();
        }
        if let Some(seed) = env.seed {
            tracing::debug!("Seed overridden from environment: {}", seed);
            self.data.seed = seed;
        }
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(output) = &cli.output {
            self.chart.output = output.clone();
        }
        if let Some(seed) = cli.seed {
            self.data.seed = seed;
        }
        if cli.no_open {
            self.chart.auto_open = false;
        }
    }

    /// Check both sections before any data is generated
    pub fn validate(&self) -> Result<()> {
        self.data.validate()?;
        self.chart.validate()?;
        Ok(())
    }
}

impl DataConfig {
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.num_lines == 0 {
            return Err(DatasetError::ZeroCount("num_lines"));
        }
        if self.num_groups == 0 {
            return Err(DatasetError::ZeroCount("num_groups"));
        }
        if self.points_per_line == 0 {
            return Err(DatasetError::ZeroCount("points_per_line"));
        }
        if self.num_lines % self.num_groups != 0 {
            return Err(DatasetError::UnevenGroups {
                num_lines: self.num_lines,
                num_groups: self.num_groups,
            });
        }
        // rows_per_group <= total_rows, so one check covers both products
        if self.num_lines.checked_mul(self.points_per_line).is_none() {
            return Err(DatasetError::TooLarge {
                num_lines: self.num_lines,
                points_per_line: self.points_per_line,
            });
        }
        Ok(())
    }

    pub fn lines_per_group(&self) -> usize {
        self.num_lines / self.num_groups
    }

    pub fn rows_per_group(&self) -> usize {
        self.lines_per_group() * self.points_per_line
    }

    pub fn total_rows(&self) -> usize {
        self.num_lines * self.points_per_line
    }
}

impl ChartConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        // The title is embedded in an inline <script> block
        let lower = self.title.to_ascii_lowercase();
        if lower.contains("<!--") || lower.contains("<script") || lower.contains("</script") {
            return Err(ConfigError::UnsafeTitle(self.title.clone()));
        }
        for (index, value) in self.palette.iter().enumerate() {
            if !palette::is_hex_color(value) {
                return Err(ConfigError::InvalidColor {
                    index,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

impl EnvOverrides {
    /// Load overrides from .env and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build overrides from any variable lookup
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed = match get("LINE_GROUPS_SEED") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                var: "LINE_GROUPS_SEED",
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(EnvOverrides {
            output: get("LINE_GROUPS_OUTPUT").map(PathBuf::from),
            seed,
            log_dir: get("LINE_GROUPS_LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("line_groups_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_match_reference_plot() {
        let config = Config::default();
        assert_eq!(config.data.seed, 42);
        assert_eq!(config.data.lines_per_group(), 10);
        assert_eq!(config.data.rows_per_group(), 500);
        assert_eq!(config.data.total_rows(), 5000);
        assert_eq!(config.chart.palette.len(), 10);
        assert!(config.chart.embed_plotly_js);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "data:\n  num_lines: 12\n  num_groups: 3\nchart:\n  auto_open: false\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.data.num_lines, 12);
        assert_eq!(config.data.points_per_line, 50);
        assert_eq!(config.data.seed, 42);
        assert!(!config.chart.auto_open);
        assert_eq!(config.chart.title, "Showing All Groups");
    }

    #[test]
    fn test_load_from_file() {
        let dir = temp_dir("load");
        let path = dir.join("plot.yaml");
        std::fs::write(&path, "data:\n  seed: 5\nchart:\n  title: Lines\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data.seed, 5);
        assert_eq!(config.chart.title, "Lines");
        assert_eq!(config.data.num_groups, 10);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_default_path_uses_defaults() {
        let path = temp_dir("missing_default").join("plot.yaml");
        let config = Config::load_or_default(&path, false).unwrap();
        assert_eq!(config.data.seed, 42);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let path = temp_dir("missing_explicit").join("typo.yaml");
        let err = Config::load_or_default(&path, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_uneven_groups_rejected() {
        let data = DataConfig {
            num_lines: 10,
            num_groups: 3,
            ..DataConfig::default()
        };
        assert!(matches!(
            data.validate(),
            Err(DatasetError::UnevenGroups { num_lines: 10, num_groups: 3 })
        ));
    }

    #[test]
    fn test_zero_counts_rejected() {
        let data = DataConfig {
            points_per_line: 0,
            ..DataConfig::default()
        };
        assert!(matches!(data.validate(), Err(DatasetError::ZeroCount("points_per_line"))));
    }

    #[test]
    fn test_oversized_counts_rejected() {
        let data = DataConfig {
            num_lines: usize::MAX / 2 + 1,
            num_groups: 1,
            points_per_line: 4,
            ..DataConfig::default()
        };
        assert!(matches!(data.validate(), Err(DatasetError::TooLarge { .. })));
    }

    #[test]
    fn test_bad_palette_rejected() {
        let mut config = Config::default();
        config.chart.palette = vec!["#636EFA".to_string(), "blue".to_string()];
        assert!(matches!(
            config.chart.validate(),
            Err(ConfigError::InvalidColor { index: 1, .. })
        ));
    }

    #[test]
    fn test_script_markup_in_title_rejected() {
        let mut chart = ChartConfig::default();
        chart.title = "<!--<script>".to_string();
        assert!(matches!(chart.validate(), Err(ConfigError::UnsafeTitle(_))));

        chart.title = "a</SCRIPT>b".to_string();
        assert!(matches!(chart.validate(), Err(ConfigError::UnsafeTitle(_))));

        // plotly title markup is still allowed
        chart.title = "<b>Groups</b>".to_string();
        assert!(chart.validate().is_ok());
    }

    #[test]
    fn test_env_vars_parsed() {
        let env = EnvOverrides::from_vars(vars(&[
            ("LINE_GROUPS_OUTPUT", "out/plot.html"),
            ("LINE_GROUPS_SEED", " 7 "),
        ]))
        .unwrap();
        assert_eq!(env.output, Some(PathBuf::from("out/plot.html")));
        assert_eq!(env.seed, Some(7));
        assert_eq!(env.log_dir, "logs");
    }

    #[test]
    fn test_bad_env_seed_is_error() {
        let err = EnvOverrides::from_vars(vars(&[("LINE_GROUPS_SEED", "abc")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { var: "LINE_GROUPS_SEED", ref value } if value == "abc"
        ));
    }

    #[test]
    fn test_precedence_cli_over_env_over_yaml() {
        let yaml = "data:\n  seed: 1\nchart:\n  output: yaml.html\n";
        let env = EnvOverrides::from_vars(vars(&[("LINE_GROUPS_SEED", "2")])).unwrap();
        let cli = CliOverrides {
            seed: Some(3),
            ..CliOverrides::default()
        };

        let mut config: Config = serde_yaml::from_str(yaml).unwrap();
        config.apply_env(&env);
        assert_eq!(config.data.seed, 2);
        assert_eq!(config.chart.output, PathBuf::from("yaml.html"));

        config.apply_cli(&cli);
        assert_eq!(config.data.seed, 3);
        // untouched layers keep the lower-precedence value
        assert_eq!(config.chart.output, PathBuf::from("yaml.html"));
        assert_eq!(config.data.points_per_line, 50);
        assert!(config.chart.auto_open);

        config.apply_cli(&CliOverrides {
            output: Some(PathBuf::from("cli.html")),
            no_open: true,
            ..CliOverrides::default()
        });
        assert_eq!(config.chart.output, PathBuf::from("cli.html"));
        assert!(!config.chart.auto_open);
    }
}
