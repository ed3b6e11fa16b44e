/// Result alias used across the crate.
pub type SplitResult<T> = Result<T, SplitError>;

/// Everything that can fail while binding a session or composing a frame.
///
/// A frame either completes or fails as a whole; no variant is retried internally.
#[derive(thiserror::Error, Debug)]
pub enum SplitError {
    /// A session cannot be bound: remote camera or remote scene missing.
    #[error("init error: {0}")]
    Init(String),

    /// The compositor pass was invoked with targets it cannot compose.
    #[error("compositor error: {0}")]
    Compositor(String),

    /// The host renderer failed.
    #[error("render error: {0}")]
    Render(String),

    /// A configuration document failed to load or validate.
    #[error("config error: {0}")]
    Config(String),

    /// Anything else, with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SplitError {
    /// [`SplitError::Init`] from a message.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// [`SplitError::Compositor`] from a message.
    pub fn compositor(msg: impl Into<String>) -> Self {
        Self::Compositor(msg.into())
    }

    /// [`SplitError::Render`] from a message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// [`SplitError::Config`] from a message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
