use thiserror::Error;

use project::ProjectPathError;

pub mod build;
pub mod capability;
pub mod dependency;
pub mod project;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading build file: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Missing TOML key `{0}` while parsing")]
    MissingKey(String),
    #[error("Unknown TOML key `{0}`")]
    UnknownKey(String),
    #[error("Invalid value for `{0}`")]
    InvalidValue(String),
    #[error("Invalid dependency declaration `{0}`")]
    InvalidDependency(String),
    #[error("Invalid project path: {0}")]
    ProjectPath(#[from] ProjectPathError),
}
