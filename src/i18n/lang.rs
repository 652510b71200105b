// SPDX-License-Identifier: PMPL-1.0-or-later

//! The closed set of catalog languages.
//!
//! Every locale directory, consolidated-table column and glossary
//! translation is keyed by one of these codes. Ordering follows the ISO
//! 639-1 code, which is also the column order of the review spreadsheet.

use serde::{Deserialize, Serialize};

/// Supported catalog languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Da,
    De,
    En,
    Es,
    Fr,
    It,
    No,
    Pt,
    Sv,
}

impl Lang {
    /// ISO 639-1 two-letter code for this language.
    pub fn code(&self) -> &'static str {
        match self {
            Lang::Da => "da",
            Lang::De => "de",
            Lang::En => "en",
            Lang::Es => "es",
            Lang::Fr => "fr",
            Lang::It => "it",
            Lang::No => "no",
            Lang::Pt => "pt",
            Lang::Sv => "sv",
        }
    }

    /// Column header used in the consolidated review spreadsheet.
    pub fn display_name(&self) -> &'static str {
        match self {
            Lang::Da => "Danés",
            Lang::De => "Alemán",
            Lang::En => "Inglés",
            Lang::Es => "Español",
            Lang::Fr => "Francés",
            Lang::It => "Italiano",
            Lang::No => "Noruego",
            Lang::Pt => "Portugués",
            Lang::Sv => "Sueco",
        }
    }

    pub fn english_name(&self) -> &'static str {
        match self {
            Lang::Da => "Danish",
            Lang::De => "German",
            Lang::En => "English",
            Lang::Es => "Spanish",
            Lang::Fr => "French",
            Lang::It => "Italian",
            Lang::No => "Norwegian",
            Lang::Pt => "Portuguese",
            Lang::Sv => "Swedish",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Lang::Da => "Dansk",
            Lang::De => "Deutsch",
            Lang::En => "English",
            Lang::Es => "Español",
            Lang::Fr => "Français",
            Lang::It => "Italiano",
            Lang::No => "Norsk",
            Lang::Pt => "Português",
            Lang::Sv => "Svenska",
        }
    }

    /// Parse a lowercase ISO 639-1 code.
    pub fn from_code(code: &str) -> Option<Lang> {
        match code {
            "da" => Some(Lang::Da),
            "de" => Some(Lang::De),
            "en" => Some(Lang::En),
            "es" => Some(Lang::Es),
            "fr" => Some(Lang::Fr),
            "it" => Some(Lang::It),
            "no" => Some(Lang::No),
            "pt" => Some(Lang::Pt),
            "sv" => Some(Lang::Sv),
            _ => None,
        }
    }

    /// Lenient parse used for CLI flags and spreadsheet headers: accepts the
    /// code, the display name or the English name, ignoring case.
    pub fn parse(value: &str) -> Option<Lang> {
        let needle = value.trim().to_lowercase();
        if let Some(lang) = Lang::from_code(&needle) {
            return Some(lang);
        }
        Lang::all().iter().copied().find(|lang| {
            lang.display_name().to_lowercase() == needle
                || lang.english_name().to_lowercase() == needle
                || lang.native_name().to_lowercase() == needle
        })
    }

    /// All supported languages, in column order.
    pub fn all() -> &'static [Lang] {
        &[
            Lang::Da,
            Lang::De,
            Lang::En,
            Lang::Es,
            Lang::Fr,
            Lang::It,
            Lang::No,
            Lang::Pt,
            Lang::Sv,
        ]
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang::Es
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Lang {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Lang::parse(value).ok_or_else(|| {
            format!(
                "unsupported language '{}' (expected one of: {})",
                value,
                Lang::all()
                    .iter()
                    .map(Lang::code)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for lang in Lang::all() {
            assert_eq!(Lang::from_code(lang.code()), Some(*lang));
        }
    }

    #[test]
    fn test_parse_accepts_display_and_english_names() {
        assert_eq!(Lang::parse("Inglés"), Some(Lang::En));
        assert_eq!(Lang::parse("  noruego "), Some(Lang::No));
        assert_eq!(Lang::parse("German"), Some(Lang::De));
        assert_eq!(Lang::parse("SV"), Some(Lang::Sv));
        assert_eq!(Lang::parse("xx"), None);
    }

    #[test]
    fn test_default_is_spanish() {
        assert_eq!(Lang::default(), Lang::Es);
    }

    #[test]
    fn test_column_order_is_sorted_by_code() {
        let codes: Vec<_> = Lang::all().iter().map(Lang::code).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_serde_uses_lowercase_codes() {
        let json = serde_json::to_string(&Lang::Pt).unwrap();
        assert_eq!(json, "\"pt\"");
        let back: Lang = serde_json::from_str("\"no\"").unwrap();
        assert_eq!(back, Lang::No);
    }
}
