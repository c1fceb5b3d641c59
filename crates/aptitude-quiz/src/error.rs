use aptitude_core::error::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] ConfigError),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("job profile not found: {0}")]
    NotFound(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
