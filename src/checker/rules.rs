// SPDX-License-Identifier: PMPL-1.0-or-later

//! Matching rules used by the checker: whole-word term matching,
//! interpolation placeholders and the length ratio.

use crate::config::Delimiters;
use crate::glossary::GlossaryTerm;
use crate::i18n::Lang;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Characters that mark a placeholder token as not interpolatable.
const NESTED_MARKERS: &[char] = &['{', '}', '[', ']'];

/// Case-insensitive whole-word pattern for `word`, optionally followed by one
/// of `suffixes`. Letters and digits are word characters; everything else,
/// including `.`, `_` and `-`, is a boundary.
pub fn word_pattern(word: &str, suffixes: &[String]) -> Result<Regex, regex::Error> {
    let suffix = if suffixes.is_empty() {
        String::new()
    } else {
        let alternatives: Vec<String> = suffixes.iter().map(|s| regex::escape(s)).collect();
        format!("(?:{})?", alternatives.join("|"))
    };
    Regex::new(&format!(
        r"(?i)(?:^|[^\p{{L}}\p{{N}}]){}{}(?:$|[^\p{{L}}\p{{N}}])",
        regex::escape(word),
        suffix
    ))
}

/// Compiled scope and conformance patterns for one glossary term.
pub struct TermMatcher<'g> {
    term: &'g GlossaryTerm,
    key_patterns: Vec<Regex>,
    standard_patterns: BTreeMap<Lang, Regex>,
}

impl<'g> TermMatcher<'g> {
    pub fn new(term: &'g GlossaryTerm, suffixes: &[String]) -> Result<Self, regex::Error> {
        let mut words = BTreeSet::new();
        words.insert(term.id.to_lowercase());
        for form in term.translations.values() {
            let form = form.trim();
            if !form.is_empty() {
                words.insert(form.to_lowercase());
            }
        }
        let key_patterns = words
            .iter()
            .map(|word| word_pattern(word, suffixes))
            .collect::<Result<Vec<_>, _>>()?;

        let mut standard_patterns = BTreeMap::new();
        for (lang, form) in &term.translations {
            let form = form.trim();
            if !form.is_empty() {
                standard_patterns.insert(*lang, word_pattern(form, suffixes)?);
            }
        }

        Ok(Self {
            term,
            key_patterns,
            standard_patterns,
        })
    }

    pub fn term(&self) -> &'g GlossaryTerm {
        self.term
    }

    /// The key names the term (identifier or any standard form) as a whole word.
    pub fn key_in_scope(&self, key: &str) -> bool {
        self.key_patterns.iter().any(|pattern| pattern.is_match(key))
    }

    /// An entry is in scope when its key names the term, or its base-language
    /// value uses the base-language standard form.
    pub fn in_scope(&self, key: &str, base: Lang, base_value: Option<&str>) -> bool {
        self.key_in_scope(key)
            || base_value
                .and_then(|value| self.conforms(base, value))
                .unwrap_or(false)
    }

    /// Whether `value` contains the standard form for `lang`. `None` when the
    /// term has no usable standard form for that language.
    pub fn conforms(&self, lang: Lang, value: &str) -> Option<bool> {
        self.standard_patterns
            .get(&lang)
            .map(|pattern| pattern.is_match(value))
    }

    /// Trimmed, non-empty standard form for `lang`.
    pub fn standard_form(&self, lang: Lang) -> Option<&'g str> {
        self.term
            .standard_form(lang)
            .map(str::trim)
            .filter(|form| !form.is_empty())
    }
}

/// Finds interpolation tokens such as `{{clientName}}`.
pub struct PlaceholderScanner {
    patterns: Vec<Regex>,
}

impl PlaceholderScanner {
    pub fn new(delimiters: &[Delimiters]) -> Result<Self, regex::Error> {
        let patterns = delimiters
            .iter()
            .map(|pair| {
                Regex::new(&format!(
                    "{}(.*?){}",
                    regex::escape(&pair.open),
                    regex::escape(&pair.close)
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Inner text of every token, in order of appearance per delimiter pair.
    pub fn tokens<'v>(&self, value: &'v str) -> Vec<&'v str> {
        self.patterns
            .iter()
            .flat_map(|pattern| {
                pattern
                    .captures_iter(value)
                    .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            })
            .collect()
    }

    /// First token that still carries bracket markers inside it
    /// (`{{ {{name}} }}`, `{{[nombre]}}`).
    pub fn unresolved_token<'v>(&self, value: &'v str) -> Option<&'v str> {
        self.tokens(value)
            .into_iter()
            .find(|inner| inner.contains(NESTED_MARKERS))
    }

    /// Names of well-formed tokens.
    pub fn names(&self, value: &str) -> BTreeSet<String> {
        self.tokens(value)
            .into_iter()
            .filter(|inner| !inner.contains(NESTED_MARKERS))
            .map(|inner| inner.trim().to_string())
            .collect()
    }
}

/// `len(value) / len(base)` over Unicode scalar values; `None` for an empty base.
pub fn length_ratio(base: &str, value: &str) -> Option<f64> {
    let base_len = base.chars().count();
    if base_len == 0 {
        return None;
    }
    Some(value.chars().count() as f64 / base_len as f64)
}
