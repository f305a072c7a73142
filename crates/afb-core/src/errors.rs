/// Core error type for the bot.
///
/// Adapter crates map their platform-specific errors into this type so the
/// dispatcher can render every failure the same way (bounded error reply).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not ready: {0}")]
    NotReady(&'static str),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
