use cardstack_core::StackError;
use cardstack_runtime::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("stack error: {0}")]
    Stack(#[from] StackError),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("logging already initialised")]
    LoggingInit,
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => 2,
            Self::Config(_) => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DemoError;

    #[test]
    fn invalid_argument_exits_with_usage_code() {
        let error = DemoError::invalid("frames must be > 0");
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "invalid argument: frames must be > 0");
    }

    #[test]
    fn stack_errors_exit_with_one() {
        let error = DemoError::from(cardstack_core::StackError::InvalidPosition {
            position: 9.0,
            len: 4,
        });
        assert_eq!(error.exit_code(), 1);
    }
}
