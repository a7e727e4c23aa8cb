//! Common error types

use crate::controller::ControllerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("802.11 error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
