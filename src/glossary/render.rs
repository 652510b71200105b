// SPDX-License-Identifier: PMPL-1.0-or-later

//! Markdown rendering of the master glossary for translators.

use super::Glossary;
use crate::i18n::Lang;
use std::collections::BTreeMap;

/// Render the glossary grouped by category, one table of standard forms per
/// term. Languages without a standard form show `N/A`.
pub fn render_markdown(glossary: &Glossary) -> String {
    let mut out = Vec::new();
    out.push("# Master Glossary".to_string());
    out.push(String::new());
    out.push(
        "Standard translations for key terms. Use it as the reference for terminology in every catalog."
            .to_string(),
    );
    out.push(String::new());

    let mut categories: BTreeMap<&str, Vec<_>> = BTreeMap::new();
    for term in glossary.terms() {
        categories.entry(term.category.as_str()).or_default().push(term);
    }

    for (category, terms) in categories {
        out.push(format!("## {}", category));
        out.push(String::new());
        for term in terms {
            out.push(format!("### `{}`", term.id));
            out.push(String::new());
            if !term.context.is_empty() {
                out.push(format!("**Context:** {}", term.context));
                out.push(String::new());
            }
            out.push("| Language | Translation |".to_string());
            out.push("|---|---|".to_string());
            for lang in Lang::all() {
                let form = term
                    .standard_form(*lang)
                    .map(|form| format!("`{}`", form))
                    .unwrap_or_else(|| "N/A".to_string());
                out.push(format!("| {} | {} |", lang.display_name(), form));
            }
            out.push(String::new());
            if !term.notes.is_empty() {
                out.push(format!("**Notes:** {}", term.notes));
                out.push(String::new());
            }
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_groups_terms_by_category() {
        let doc = r#"{
            "payment": {"category": "Billing", "translations": {"en": "payment"}},
            "invoice": {"category": "Billing", "translations": {"en": "invoice"}, "notes": "Legal term."},
            "piano": {"category": "Instruments", "translations": {"en": "piano"}}
        }"#;
        let glossary = Glossary::from_json(doc, Path::new("g.json")).unwrap();
        let markdown = render_markdown(&glossary);

        let billing = markdown.find("## Billing").unwrap();
        let instruments = markdown.find("## Instruments").unwrap();
        let invoice = markdown.find("### `invoice`").unwrap();
        let payment = markdown.find("### `payment`").unwrap();
        assert!(billing < invoice && invoice < payment && payment < instruments);
        assert!(markdown.contains("| Inglés | `invoice` |"));
        assert!(markdown.contains("| Alemán | N/A |"));
        assert!(markdown.contains("**Notes:** Legal term."));
    }
}
