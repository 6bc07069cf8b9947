use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Languages a question may be answered in. Anything else is coerced to
/// [`Language::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Fr,
}

impl Language {
    pub const DEFAULT: Language = Language::En;

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }

    /// Resolves a caller-supplied code, falling back to English for unknown
    /// or missing values.
    pub fn coerce(code: Option<&str>) -> Self {
        match code {
            None => Self::DEFAULT,
            Some(raw) => Self::parse(raw).unwrap_or_else(|| {
                tracing::warn!(
                    requested = raw,
                    fallback = Self::DEFAULT.code(),
                    "unsupported language, coercing"
                );
                Self::DEFAULT
            }),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Spanish",
            Self::Fr => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Cv,
    Faq,
}

impl DocType {
    pub const ALL: [DocType; 2] = [DocType::Cv, DocType::Faq];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "cv" => Some(Self::Cv),
            "faq" => Some(Self::Faq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cv => "cv",
            Self::Faq => "faq",
        }
    }
}

/// Canonical collection name for a (doc type, language) pair.
pub fn collection_name(doc_type: DocType, language: &str) -> String {
    format!("{}_{}_embeddings", doc_type.as_str(), language.to_ascii_lowercase())
}

/// A knowledge collection backed by one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub doc_type: DocType,
    pub language: String,
    pub source: PathBuf,
    pub seeded: bool,
}

impl Collection {
    pub fn new(doc_type: DocType, language: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        let language = language.into().to_ascii_lowercase();
        Self {
            name: collection_name(doc_type, &language),
            doc_type,
            language,
            source: source.into(),
            seeded: false,
        }
    }

    /// Parses a source filename of the form `{cv|faq}_{xx}.txt`
    /// (case-insensitive) into its doc type and two-letter language.
    pub fn parse_source_name(file_name: &str) -> Option<(DocType, String)> {
        let lower = file_name.to_ascii_lowercase();
        let stem = lower.strip_suffix(".txt")?;
        let (doc_type, language) = stem.split_once('_')?;
        let doc_type = DocType::parse(doc_type)?;

        let valid_lang = language.len() == 2 && language.chars().all(|c| c.is_ascii_lowercase());
        valid_lang.then(|| (doc_type, language.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_name_convention() {
        assert_eq!(collection_name(DocType::Cv, "en"), "cv_en_embeddings");
        assert_eq!(collection_name(DocType::Faq, "FR"), "faq_fr_embeddings");
    }

    #[test]
    fn test_parse_source_name() {
        assert_eq!(
            Collection::parse_source_name("cv_en.txt"),
            Some((DocType::Cv, "en".to_string()))
        );
        assert_eq!(
            Collection::parse_source_name("FAQ_ES.TXT"),
            Some((DocType::Faq, "es".to_string()))
        );
        assert_eq!(Collection::parse_source_name("cv_eng.txt"), None);
        assert_eq!(Collection::parse_source_name("resume_en.txt"), None);
        assert_eq!(Collection::parse_source_name("cv_e1.txt"), None);
        assert_eq!(Collection::parse_source_name("cv_en.md"), None);
        assert_eq!(Collection::parse_source_name("cv_en.txt.bak"), None);
    }

    #[test]
    fn test_language_coercion() {
        assert_eq!(Language::coerce(Some("de")), Language::En);
        assert_eq!(Language::coerce(Some(" ES ")), Language::Es);
        assert_eq!(Language::coerce(None), Language::En);
        assert_eq!(Language::coerce(Some("fr")), Language::Fr);
    }
}
