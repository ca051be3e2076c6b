//! Errors raised while loading the sf-api configuration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid sf-api configuration: {0}")]
    Config(String),

    #[error("failed to read sf-api configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("sf-api configuration is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
