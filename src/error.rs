use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Market data error: {0}")]
    Market(#[from] MarketError),

    #[error("Core error: {0}")]
    Core(#[from] multiminer_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("System error: {0}")]
    System(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error: {error}")]
    ParseError { error: String },

    #[error("Validation error: {field}, reason: {reason}")]
    ValidationError { field: String, reason: String },
}

/// 行情数据源错误
#[derive(Error, Debug)]
pub enum MarketError {
    /// 数据源明确返回失败
    #[error("Market feed reported failure: {message}")]
    FeedFailure { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid feed URL: {url}, error: {error}")]
    InvalidUrl { url: String, error: String },

    #[error("Failed to parse feed response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl MarketError {
    pub fn feed_failure<S: Into<String>>(message: S) -> Self {
        Self::FeedFailure {
            message: message.into(),
        }
    }

    /// 是否值得在下一个周期重试
    pub fn is_transient(&self) -> bool {
        match self {
            MarketError::Http(e) => e.is_timeout() || e.is_connect(),
            MarketError::FeedFailure { .. } => true,
            MarketError::InvalidUrl { .. } | MarketError::Parse(_) => false,
        }
    }
}
