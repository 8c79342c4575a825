use crate::backend::config::KernelConfig;
use crate::backend::error::{KernelError, KernelResult};
use simplelog::*;
use std::fs::File;

/// Initialize the global logger from the logging section of the configuration:
/// console output through `TermLogger`, optional file output through `WriteLogger`.
/// A logger that is already installed (e.g. by the embedding application) is kept.
pub fn init_logger(config: &KernelConfig) -> KernelResult<()> {
    let level = config.log_level;
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if config.log_to_console {
        loggers.push(TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    if let Some(ref filename) = config.log_file {
        let file = File::create(filename)
            .map_err(|e| KernelError::Config(format!("cannot create log file {}: {}", filename, e)))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice_is_harmless() {
        let config = KernelConfig::default();
        assert!(init_logger(&config).is_ok());
        assert!(init_logger(&config).is_ok());
    }

    #[test]
    fn test_init_logger_bad_file() {
        let mut config = KernelConfig::default();
        config.log_to_console = false;
        config.log_file = Some("/nonexistent_dir/for/sure/kernels.log".to_string());
        assert!(matches!(init_logger(&config), Err(KernelError::Config(_))));
    }
}
