use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested operation needs live particles (or some other state
    /// precondition) that the model part does not satisfy.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// An element template did not resolve to the expected spheric particle
    /// kind. Points at a misconfigured scene file.
    #[error("element template `{0}` is not a spheric particle type")]
    TypeMismatch(String),

    #[error("unknown element template `{0}`")]
    UnknownElement(String),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
