use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// The size (in bytes) of a page, both on disk and in a buffer pool frame.
pub const PAGE_SIZE: usize = 4096;

/// The number of frames used when nothing else is configured.
/// More frames keep more pages resident at the cost of memory.
pub const DEFAULT_POOL_FRAMES: usize = 64;

pub const DEFAULT_DB_PATH: &str = "minibuf.db";

pub const FRAMES_ENV: &str = "MINIBUF_FRAMES";
pub const DB_PATH_ENV: &str = "MINIBUF_DB_PATH";

static_assert!(PAGE_SIZE.is_power_of_two());

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid frame count {0:?}")]
    InvalidFrames(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub num_frames: usize,
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_frames: DEFAULT_POOL_FRAMES,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::var(FRAMES_ENV).ok(), env::var(DB_PATH_ENV).ok())
    }

    fn from_vars(frames: Option<String>, db_path: Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(frames) = frames {
            config.num_frames = match frames.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidFrames(frames)),
            };
        }
        if let Some(path) = db_path {
            config.db_path = PathBuf::from(path);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_vars(None, None).unwrap();
        assert_eq!(Config::default(), config);
    }

    #[test]
    fn overrides() {
        let config = Config::from_vars(Some("8".into()), Some("/tmp/x.db".into())).unwrap();
        assert_eq!(8, config.num_frames);
        assert_eq!(PathBuf::from("/tmp/x.db"), config.db_path);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(Config::from_vars(Some("0".into()), None).is_err());
        assert!(Config::from_vars(Some("many".into()), None).is_err());
    }
}
