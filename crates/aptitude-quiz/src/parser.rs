/// Catalog loading.
///
/// Catalogs are JSON documents. Two are compiled into the binary; a file on disk can
/// replace them. Either way the document goes through `Catalog::new`, so a malformed
/// profile table stops startup instead of surfacing during matching.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use aptitude_core::catalog::{Catalog, CatalogDocument};

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuiltinCatalog {
    /// Categories A through E.
    FiveCategory,
    /// Category A split into A1 (reasoning) and A2 (analysis).
    #[default]
    SixCategory,
}

impl BuiltinCatalog {
    pub const ALL: [BuiltinCatalog; 2] = [Self::FiveCategory, Self::SixCategory];

    pub fn name(self) -> &'static str {
        match self {
            Self::FiveCategory => "five-category",
            Self::SixCategory => "six-category",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::FiveCategory => include_str!("../data/catalog-five-category.json"),
            Self::SixCategory => include_str!("../data/catalog-six-category.json"),
        }
    }
}

impl fmt::Display for BuiltinCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinCatalog {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let available: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
                AppError::Config(format!(
                    "unknown built-in catalog: '{s}'. Available catalogs: {}",
                    available.join(", ")
                ))
            })
    }
}

/// Loads the catalog named by the configuration: the file if one is set, else the built-in.
pub fn load_catalog(config: &Config) -> Result<Catalog, AppError> {
    match &config.catalog_path {
        Some(path) => parse_catalog_file(Path::new(path)),
        None => parse_builtin(config.builtin_catalog),
    }
}

pub fn parse_builtin(builtin: BuiltinCatalog) -> Result<Catalog, AppError> {
    parse_catalog(builtin.source())
}

pub fn parse_catalog_file(path: &Path) -> Result<Catalog, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("failed to read {}: {e}", path.display())))?;
    parse_catalog(&content)
}

pub fn parse_catalog(content: &str) -> Result<Catalog, AppError> {
    let doc: CatalogDocument = serde_json::from_str(content).map_err(|e| AppError::Parse {
        line: e.line(),
        message: e.to_string(),
    })?;
    Ok(Catalog::new(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aptitude_core::error::ConfigError;
    use aptitude_core::model::Question;

    #[test]
    fn builtin_catalogs_load() {
        for builtin in BuiltinCatalog::ALL {
            let catalog = parse_builtin(builtin)
                .unwrap_or_else(|e| panic!("{builtin} catalog should load: {e}"));
            assert!(!catalog.profiles().is_empty());
            assert!(catalog
                .categories()
                .iter()
                .all(|c| c.question_count() == 4));
        }
    }

    #[test]
    fn six_category_splits_a() {
        let five = parse_builtin(BuiltinCatalog::FiveCategory).unwrap();
        let six = parse_builtin(BuiltinCatalog::SixCategory).unwrap();

        let five_keys: Vec<&str> = five.categories().iter().map(|c| c.key.as_str()).collect();
        let six_keys: Vec<&str> = six.categories().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(five_keys, ["A", "B", "C", "D", "E"]);
        assert_eq!(six_keys, ["A1", "A2", "B", "C", "D", "E"]);
        assert_ne!(five.digest(), six.digest());
    }

    #[test]
    fn annotated_questions_resolve_footnotes() {
        let catalog = parse_builtin(BuiltinCatalog::SixCategory).unwrap();
        let e = catalog.category("E").unwrap();
        assert!(matches!(e.questions[0], Question::Annotated { .. }));
        assert!(matches!(e.questions[1], Question::Plain { .. }));
        for mark in e.questions[0].footnotes() {
            assert!(catalog.footnote(mark).is_some());
        }
    }

    #[test]
    fn builtin_name_parsing() {
        assert_eq!(
            "Five-Category".parse::<BuiltinCatalog>().unwrap(),
            BuiltinCatalog::FiveCategory
        );
        assert_eq!(BuiltinCatalog::default(), BuiltinCatalog::SixCategory);
        let err = "seven".parse::<BuiltinCatalog>().unwrap_err();
        assert!(err.to_string().contains("five-category, six-category"));
    }

    #[test]
    fn malformed_json_reports_line() {
        let err = parse_catalog("{\n  \"version\": \"x\",\n  \"categories\": [\n}").unwrap_err();
        match err {
            AppError::Parse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn inconsistent_profile_table_is_rejected_at_load() {
        let content = r#"{
            "version": "broken",
            "categories": [
                {"key": "A", "label": "論理", "questions": ["q1", "q2"]},
                {"key": "B", "label": "協調", "questions": ["q1"]}
            ],
            "profiles": [{"name": "営業職", "scores": [1, 1, 1]}]
        }"#;
        match parse_catalog(content).unwrap_err() {
            AppError::Catalog(ConfigError::DimensionMismatch { expected, found, .. }) => {
                assert_eq!((expected, found), (2, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = parse_catalog_file(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
