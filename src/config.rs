use crate::router::Origin;
use crate::storage::resolve_data_path;
use std::{env, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value: {0}")]
    Port(String),
    #[error("invalid APP_ORIGIN value {0:?}, expected \"network\" or \"file\"")]
    Origin(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub template_dir: PathBuf,
    pub origin: Origin,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| ConfigError::Port(value))?,
            Err(_) => 8080,
        };
        let template_dir = env::var("APP_TEMPLATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("templates"));
        let origin = match env::var("APP_ORIGIN") {
            Ok(value) => parse_origin(&value)?,
            Err(_) => Origin::Network,
        };

        Ok(Self {
            port,
            data_path: resolve_data_path()?,
            template_dir,
            origin,
        })
    }
}

pub fn parse_origin(value: &str) -> Result<Origin, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "network" | "http" | "https" => Ok(Origin::Network),
        "file" => Ok(Origin::LocalFile),
        _ => Err(ConfigError::Origin(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_accepts_known_names() {
        assert_eq!(parse_origin("network").unwrap(), Origin::Network);
        assert_eq!(parse_origin(" FILE ").unwrap(), Origin::LocalFile);
        assert!(matches!(parse_origin("ftp"), Err(ConfigError::Origin(_))));
    }
}
