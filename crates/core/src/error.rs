use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid alert: {0}")]
    InvalidAlert(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
