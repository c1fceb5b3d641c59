use std::path::Path;

use aptitude_core::labels::LineLimit;

use crate::error::AppError;
use crate::parser::BuiltinCatalog;

const DEFAULT_LABEL_MAX_LENGTH: usize = 20;
const DEFAULT_COMPACT_LABEL_MAX_LENGTH: usize = 10;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog JSON file. `None` uses the built-in catalog.
    pub catalog_path: Option<String>,
    /// Built-in catalog used when no path is given.
    pub builtin_catalog: BuiltinCatalog,
    /// Chart label line length on regular viewports.
    pub label_limit: LineLimit,
    /// Chart label line length on narrow viewports.
    pub compact_label_limit: LineLimit,
    /// Serve MCP over TCP on this address instead of stdio.
    pub tcp_listen_addr: Option<String>,
}

impl Config {
    /// Optional:
    /// - `APTITUDE_CATALOG_PATH`: catalog JSON file, overrides the built-in catalog
    /// - `APTITUDE_BUILTIN_CATALOG`: "five-category" or "six-category" (default)
    /// - `APTITUDE_LABEL_MAX_LENGTH`: default 20
    /// - `APTITUDE_COMPACT_LABEL_MAX_LENGTH`: default 10
    /// - `MCP_TCP_LISTEN_ADDR`: e.g. "127.0.0.1:8931"
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let catalog_path = lookup("APTITUDE_CATALOG_PATH").filter(|p| !p.trim().is_empty());
        if let Some(path) = &catalog_path {
            if !Path::new(path).exists() {
                return Err(AppError::Config(format!("catalog file not found: {path}")));
            }
        }

        let builtin_catalog = match lookup("APTITUDE_BUILTIN_CATALOG") {
            Some(name) => name.parse()?,
            None => BuiltinCatalog::default(),
        };

        let label_limit = line_limit(
            &lookup,
            "APTITUDE_LABEL_MAX_LENGTH",
            DEFAULT_LABEL_MAX_LENGTH,
        )?;
        let compact_label_limit = line_limit(
            &lookup,
            "APTITUDE_COMPACT_LABEL_MAX_LENGTH",
            DEFAULT_COMPACT_LABEL_MAX_LENGTH,
        )?;

        Ok(Self {
            catalog_path,
            builtin_catalog,
            label_limit,
            compact_label_limit,
            tcp_listen_addr: lookup("MCP_TCP_LISTEN_ADDR"),
        })
    }

    pub fn label_limit(&self, compact: bool) -> LineLimit {
        if compact {
            self.compact_label_limit
        } else {
            self.label_limit
        }
    }
}

fn line_limit(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<LineLimit, AppError> {
    let value = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| AppError::Config(format!("{key} must be a positive integer, got '{raw}'")))?,
        None => default,
    };
    LineLimit::new(value).map_err(|e| AppError::Config(format!("{key}: {e}")))
}
