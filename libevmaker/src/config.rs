use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::Duration;

use super::error::ConfigError;

/// One multifrequency export entry: the variable to export, the thresholds
/// to apply to it, and the suffix its output files carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfVariable {
    pub name: String,
    pub minimum_threshold: Option<f64>,
    pub maximum_threshold: Option<f64>,
    pub suffix: String,
}

/// Export section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub fileset: String,
    /// Overrides the data set's export variable when set.
    pub variable: Option<String>,
    /// Point the EV files at the configured raw directory before exporting.
    pub reset_raw_dir: bool,
    /// When non-empty, run a multifrequency export over these variables
    /// instead of the single data set variable.
    pub multifrequency: Vec<MfVariable>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("None"),
            output_dir: PathBuf::from("None"),
            fileset: String::from("Fileset1"),
            variable: None,
            reset_raw_dir: false,
            multifrequency: Vec::new(),
        }
    }
}

/// Structure representing the application configuration. Contains pathing,
/// transect, and matching information for the maker and the exporter.
/// Configs are serializable and deserializable to YAML using serde and
/// serde_yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub survey_path: PathBuf,
    pub raw_path: PathBuf,
    pub dest_path: PathBuf,
    pub template_file: PathBuf,
    pub ecs_file: PathBuf,
    pub line_region_path: Option<PathBuf>,
    /// Transects to work on; empty means every completed transect.
    pub transects: Vec<String>,
    pub overwrite: bool,
    /// Window after the start time of a file in which it still counts as the
    /// start of a transect segment. At 10 knots 0.5 nmi is 3 minutes.
    pub just_missed_secs: i64,
    pub indexing_poll_secs: u64,
    pub indexing_timeout_secs: u64,
    pub journal_path: PathBuf,
    pub export: ExportConfig,
}

impl Default for Config {
    /// Generate a new Config object. All paths will be empty/invalid
    fn default() -> Self {
        Self {
            survey_path: PathBuf::from("None"),
            raw_path: PathBuf::from("None"),
            dest_path: PathBuf::from("None"),
            template_file: PathBuf::from("None"),
            ecs_file: PathBuf::from("None"),
            line_region_path: None,
            transects: Vec::new(),
            overwrite: false,
            just_missed_secs: 5 * 60,
            indexing_poll_secs: 3,
            indexing_timeout_secs: 60,
            journal_path: PathBuf::from("./evmaker_journal.txt"),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// The raw file directory, checked for existence
    pub fn raw_directory(&self) -> Result<&Path, ConfigError> {
        if self.raw_path.exists() {
            Ok(&self.raw_path)
        } else {
            Err(ConfigError::BadFilePath(self.raw_path.clone()))
        }
    }

    /// The EV file destination directory, checked for existence
    pub fn dest_directory(&self) -> Result<&Path, ConfigError> {
        if self.dest_path.exists() {
            Ok(&self.dest_path)
        } else {
            Err(ConfigError::BadFilePath(self.dest_path.clone()))
        }
    }

    /// The template EV file, checked for existence
    pub fn template(&self) -> Result<&Path, ConfigError> {
        if self.template_file.exists() {
            Ok(&self.template_file)
        } else {
            Err(ConfigError::BadFilePath(self.template_file.clone()))
        }
    }

    /// The ECS calibration file, checked for existence
    pub fn ecs(&self) -> Result<&Path, ConfigError> {
        if self.ecs_file.exists() {
            Ok(&self.ecs_file)
        } else {
            Err(ConfigError::BadFilePath(self.ecs_file.clone()))
        }
    }

    /// The saved line/region directory, if one is configured
    pub fn line_region_directory(&self) -> Result<Option<&Path>, ConfigError> {
        match &self.line_region_path {
            Some(path) if path.exists() => Ok(Some(path)),
            Some(path) => Err(ConfigError::BadFilePath(path.clone())),
            None => Ok(None),
        }
    }

    /// The just-missed window as a duration
    pub fn slack(&self) -> Duration {
        Duration::seconds(self.just_missed_secs)
    }
}
