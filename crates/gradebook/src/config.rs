//! Configuration management for gradebook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::format::DELIMITER;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "gradebook";

/// Default data file name.
const DATA_FILE_NAME: &str = "students_data.txt";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GRADEBOOK_`, `__` between sections)
/// 2. TOML config file at `~/.config/gradebook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Grading configuration.
    pub grading: GradingConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the student data file.
    /// Defaults to `~/.local/share/gradebook/students_data.txt`
    pub data_file: Option<PathBuf>,
}

/// Grading-related configuration shared by every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Ordered subject names. Marks are stored in this order.
    pub subjects: Vec<String>,
    /// Maximum marks obtainable in a single subject.
    pub max_marks: u32,
    /// Grade bands, highest threshold first.
    pub bands: Vec<GradeBand>,
    /// Grade given when the average is below every band.
    pub fallback_grade: char,
}

/// A grade awarded when the average reaches `min_average`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    /// Lowest average (inclusive) that earns this grade.
    pub min_average: f64,
    /// The grade letter.
    pub grade: char,
}

impl GradeBand {
    /// Create a new grade band.
    #[must_use]
    pub const fn new(min_average: f64, grade: char) -> Self {
        Self { min_average, grade }
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            subjects: default_subjects(),
            max_marks: 100,
            bands: default_bands(),
            fallback_grade: 'F',
        }
    }
}

/// Default subjects, in storage order.
fn default_subjects() -> Vec<String> {
    vec![
        "Math".to_string(),
        "Physics".to_string(),
        "Python".to_string(),
    ]
}

/// Default grade bands.
fn default_bands() -> Vec<GradeBand> {
    vec![
        GradeBand::new(80.0, 'A'),
        GradeBand::new(60.0, 'B'),
        GradeBand::new(40.0, 'C'),
    ]
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("GRADEBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Get the data file path, resolving defaults if not set.
    #[must_use]
    pub fn data_file(&self) -> PathBuf {
        self.storage
            .data_file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATA_FILE_NAME))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let grading = &self.grading;

        if grading.subjects.is_empty() {
            return Err(invalid("at least one subject must be configured"));
        }

        let mut seen = HashSet::new();
        for subject in &grading.subjects {
            if subject.trim().is_empty() {
                return Err(invalid("subject names cannot be empty"));
            }
            if subject.contains(DELIMITER) {
                return Err(invalid(format!(
                    "subject name '{subject}' cannot contain '{DELIMITER}'"
                )));
            }
            // Subjects are looked up case-insensitively
            if !seen.insert(subject.trim().to_ascii_lowercase()) {
                return Err(invalid(format!("duplicate subject '{subject}'")));
            }
        }

        if grading.max_marks == 0 {
            return Err(invalid("max_marks must be greater than 0"));
        }
        let fits = u32::try_from(grading.subjects.len())
            .ok()
            .and_then(|count| count.checked_mul(grading.max_marks))
            .is_some();
        if !fits {
            return Err(invalid(format!(
                "max_marks {} is too large for {} subjects",
                grading.max_marks,
                grading.subjects.len()
            )));
        }

        let max = f64::from(grading.max_marks);
        for band in &grading.bands {
            if !(0.0..=max).contains(&band.min_average) {
                return Err(invalid(format!(
                    "grade '{}' threshold {} must be between 0 and max_marks ({max})",
                    band.grade, band.min_average
                )));
            }
            check_grade_letter(band.grade)?;
        }
        check_grade_letter(grading.fallback_grade)?;

        if grading
            .bands
            .windows(2)
            .any(|pair| pair[0].min_average <= pair[1].min_average)
        {
            return Err(invalid(
                "grade bands must be listed in strictly descending threshold order",
            ));
        }

        Ok(())
    }
}

fn check_grade_letter(grade: char) -> Result<()> {
    if grade == DELIMITER || grade.is_whitespace() || grade.is_control() {
        return Err(invalid(format!("'{grade}' cannot be used as a grade")));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.data_file.is_none());
        assert_eq!(config.grading.subjects, vec!["Math", "Physics", "Python"]);
        assert_eq!(config.grading.max_marks, 100);
        assert_eq!(config.grading.fallback_grade, 'F');
    }

    #[test]
    fn test_default_bands() {
        let bands = default_bands();
        let letters: Vec<char> = bands.iter().map(|b| b.grade).collect();
        assert_eq!(letters, vec!['A', 'B', 'C']);
        assert!((bands[0].min_average - 80.0).abs() < f64::EPSILON);
        assert!((bands[2].min_average - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_no_subjects() {
        let mut config = Config::default();
        config.grading.subjects.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("at least one subject"));
    }

    #[test]
    fn test_validate_duplicate_subject() {
        let mut config = Config::default();
        config.grading.subjects.push("Math".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate subject 'Math'"));
    }

    #[test]
    fn test_validate_duplicate_subject_ignores_case() {
        let mut config = Config::default();
        config.grading.subjects = vec!["Math".to_string(), " math".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate subject ' math'"));
    }

    #[test]
    fn test_validate_subject_with_delimiter() {
        let mut config = Config::default();
        config.grading.subjects = vec!["Art|Craft".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("cannot contain '|'"));
    }

    #[test]
    fn test_validate_zero_max_marks() {
        let mut config = Config::default();
        config.grading.max_marks = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_marks"));
    }

    #[test]
    fn test_validate_max_total_overflow() {
        let mut config = Config::default();
        config.grading.max_marks = u32::MAX;
        config.grading.bands.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("too large for 3 subjects"));

        config.grading.max_marks = u32::MAX / 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unordered_bands() {
        let mut config = Config::default();
        config.grading.bands = vec![GradeBand::new(40.0, 'C'), GradeBand::new(80.0, 'A')];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("descending"));
    }

    #[test]
    fn test_validate_threshold_above_max() {
        let mut config = Config::default();
        config.grading.max_marks = 50;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("threshold 80"));
    }

    #[test]
    fn test_validate_bad_grade_letter() {
        let mut config = Config::default();
        config.grading.fallback_grade = '|';
        assert!(config.validate().is_err());

        config.grading.fallback_grade = ' ';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_data_file_default() {
        let config = Config::default();
        let path = config.data_file();

        assert!(path.to_string_lossy().contains("gradebook"));
        assert!(path.to_string_lossy().ends_with("students_data.txt"));
    }

    #[test]
    fn test_data_file_custom() {
        let mut config = Config::default();
        config.storage.data_file = Some(PathBuf::from("/custom/students.txt"));

        assert_eq!(config.data_file(), PathBuf::from("/custom/students.txt"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("gradebook"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
data_file = "/srv/gradebook/records.txt"

[grading]
subjects = ["Chemistry", "Biology"]
max_marks = 50
fallback_grade = "E"

[[grading.bands]]
min_average = 45.0
grade = "A"

[[grading.bands]]
min_average = 25.0
grade = "B"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(
            config.data_file(),
            PathBuf::from("/srv/gradebook/records.txt")
        );
        assert_eq!(config.grading.subjects, vec!["Chemistry", "Biology"]);
        assert_eq!(config.grading.max_marks, 50);
        assert_eq!(config.grading.fallback_grade, 'E');
        assert_eq!(config.grading.bands.len(), 2);
        assert_eq!(config.grading.bands[1].grade, 'B');
    }

    #[test]
    fn test_load_invalid_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[grading]\nmax_marks = 0\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_grading_config_serialize() {
        let grading = GradingConfig::default();
        let json = serde_json::to_string(&grading).unwrap();
        assert!(json.contains("max_marks"));
        assert!(json.contains("Physics"));
    }

    #[test]
    fn test_grading_config_deserialize() {
        let json = r#"{"subjects": ["Art"], "max_marks": 10}"#;
        let grading: GradingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(grading.subjects, vec!["Art"]);
        assert_eq!(grading.max_marks, 10);
        assert_eq!(grading.bands, default_bands());
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
