//! # Kernel configuration
//!
//! Launch geometry, solve policy and logging settings. Defaults match the
//! fixed geometry of the kernels (128 lanes for the row-oriented substitution,
//! 256 lanes for the transposed one); everything can be overridden from a TOML
//! document:
//!
//! ```toml
//! [launch]
//! row_window = 128
//! trans_window = 256
//! num_threads = 4
//!
//! [solve]
//! validate_triangular = true
//!
//! [logging]
//! level = "debug"
//! console = true
//! file = "kernels.log"
//! ```
//! Missing sections or keys keep their default values, unknown keys are ignored with a warning.
use crate::backend::error::{KernelError, KernelResult};
use log::warn;
use simplelog::LevelFilter;
use std::path::Path;
use toml::{Table, Value};

pub const DEFAULT_ROW_WINDOW: usize = 128;
pub const DEFAULT_TRANS_WINDOW: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct KernelConfig {
    /// lanes per block (= staged nonzeros per window) of the non-transposed substitution
    pub row_window: usize,
    /// lanes per block of the transposed substitution
    pub trans_window: usize,
    /// worker threads of the pool, `None` lets rayon decide
    pub num_threads: Option<usize>,
    /// check dimensions and triangular structure before launching a solve
    pub validate_triangular: bool,
    pub log_level: LevelFilter,
    pub log_to_console: bool,
    pub log_file: Option<String>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            row_window: DEFAULT_ROW_WINDOW,
            trans_window: DEFAULT_TRANS_WINDOW,
            num_threads: None,
            validate_triangular: false,
            log_level: LevelFilter::Info,
            log_to_console: true,
            log_file: None,
        }
    }
}

impl KernelConfig {
    pub fn with_windows(mut self, row_window: usize, trans_window: usize) -> Self {
        self.row_window = row_window;
        self.trans_window = trans_window;
        self
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_triangular = validate;
        self
    }

    /// Parse a TOML document; values not present keep their defaults.
    pub fn from_toml_str(document: &str) -> KernelResult<Self> {
        let table: Table = document
            .parse::<Table>()
            .map_err(|e| KernelError::Config(e.to_string()))?;
        let mut config = KernelConfig::default();

        for (section_name, section) in table.iter() {
            let section = section.as_table().ok_or_else(|| {
                KernelError::Config(format!("[{}] must be a table", section_name))
            })?;
            match section_name.as_str() {
                "launch" => config.read_launch(section)?,
                "solve" => config.read_solve(section)?,
                "logging" => config.read_logging(section)?,
                other => warn!("unknown configuration section [{}] ignored", other),
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> KernelResult<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            KernelError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&document)
    }

    /// Window sizes must be nonzero powers of two, thread count must be nonzero.
    pub fn validate(&self) -> KernelResult<()> {
        for window in [self.row_window, self.trans_window] {
            if window == 0 || !window.is_power_of_two() {
                return Err(KernelError::InvalidBlockDim(window));
            }
        }
        if self.num_threads == Some(0) {
            return Err(KernelError::Config("num_threads must be positive".to_string()));
        }
        Ok(())
    }

    fn read_launch(&mut self, section: &Table) -> KernelResult<()> {
        for (key, value) in section.iter() {
            match key.as_str() {
                "row_window" => self.row_window = as_count(key, value)?,
                "trans_window" => self.trans_window = as_count(key, value)?,
                "num_threads" => self.num_threads = Some(as_count(key, value)?),
                other => warn!("unknown key launch.{} ignored", other),
            }
        }
        Ok(())
    }

    fn read_solve(&mut self, section: &Table) -> KernelResult<()> {
        for (key, value) in section.iter() {
            match key.as_str() {
                "validate_triangular" => self.validate_triangular = as_flag(key, value)?,
                other => warn!("unknown key solve.{} ignored", other),
            }
        }
        Ok(())
    }

    fn read_logging(&mut self, section: &Table) -> KernelResult<()> {
        for (key, value) in section.iter() {
            match key.as_str() {
                "level" => {
                    let level = value.as_str().ok_or_else(|| {
                        KernelError::Config("logging.level must be a string".to_string())
                    })?;
                    self.log_level = level.parse::<LevelFilter>().map_err(|_| {
                        KernelError::Config(format!("unknown log level '{}'", level))
                    })?;
                }
                "console" => self.log_to_console = as_flag(key, value)?,
                "file" => {
                    let file = value.as_str().ok_or_else(|| {
                        KernelError::Config("logging.file must be a string".to_string())
                    })?;
                    self.log_file = Some(file.to_string());
                }
                other => warn!("unknown key logging.{} ignored", other),
            }
        }
        Ok(())
    }
}

fn as_count(key: &str, value: &Value) -> KernelResult<usize> {
    match value.as_integer() {
        Some(v) if v >= 0 => Ok(v as usize),
        _ => Err(KernelError::Config(format!(
            "{} must be a non-negative integer, got {}",
            key, value
        ))),
    }
}

fn as_flag(key: &str, value: &Value) -> KernelResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| KernelError::Config(format!("{} must be a boolean, got {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = KernelConfig::default();
        assert_eq!(config.row_window, 128);
        assert_eq!(config.trans_window, 256);
        assert_eq!(config.num_threads, None);
        assert!(!config.validate_triangular);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let document = r#"
            [launch]
            row_window = 64
            trans_window = 512
            num_threads = 2

            [solve]
            validate_triangular = true

            [logging]
            level = "debug"
            console = false
            file = "solve.log"
        "#;
        let config = KernelConfig::from_toml_str(document).unwrap();
        assert_eq!(config.row_window, 64);
        assert_eq!(config.trans_window, 512);
        assert_eq!(config.num_threads, Some(2));
        assert!(config.validate_triangular);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(!config.log_to_console);
        assert_eq!(config.log_file, Some("solve.log".to_string()));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = KernelConfig::from_toml_str("[solve]\nvalidate_triangular = true\n").unwrap();
        assert_eq!(config.row_window, DEFAULT_ROW_WINDOW);
        assert_eq!(config.trans_window, DEFAULT_TRANS_WINDOW);
        assert!(config.validate_triangular);
    }

    #[test]
    fn test_window_not_power_of_two_rejected() {
        let res = KernelConfig::from_toml_str("[launch]\nrow_window = 100\n");
        assert_eq!(res, Err(KernelError::InvalidBlockDim(100)));
        let res = KernelConfig::default().with_windows(128, 0).validate();
        assert_eq!(res, Err(KernelError::InvalidBlockDim(0)));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(KernelConfig::from_toml_str("[launch]\nrow_window = -4\n").is_err());
        assert!(KernelConfig::from_toml_str("[solve]\nvalidate_triangular = 1\n").is_err());
        assert!(KernelConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").is_err());
        assert!(KernelConfig::from_toml_str("[launch]\nnum_threads = 0\n").is_err());
        assert!(KernelConfig::from_toml_str("launch = 5\n").is_err());
        assert!(KernelConfig::from_toml_str("[launch\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[launch]\ntrans_window = 128").unwrap();
        let config = KernelConfig::from_file(file.path()).unwrap();
        assert_eq!(config.trans_window, 128);

        let missing = KernelConfig::from_file("/definitely/not/here.toml");
        assert!(matches!(missing, Err(KernelError::Config(_))));
    }
}
