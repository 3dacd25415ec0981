use serde::{Deserialize, Serialize};

use crate::models::{ClassifiedRecord, Record};

/// A category label and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Keyword classifier.
///
/// The policy is deliberately plain: rules are checked in the order they were
/// configured, a rule matches when any of its keywords is a case-insensitive
/// substring of the description, and the first matching rule wins. Descriptions
/// that match nothing get the default label. Keywords are used as written,
/// surrounding spaces included; whitespace-only keywords never match.
pub struct Categorizer {
    rules: Vec<(String, Vec<String>)>,
    default_label: String,
}

pub struct CategorizeResult {
    pub records: Vec<ClassifiedRecord>,
    pub matched: usize,
    pub defaulted: usize,
}

impl Categorizer {
    pub fn new(rules: &[CategoryRule], default_label: &str) -> Self {
        let rules = rules
            .iter()
            .map(|r| {
                let keywords = r
                    .keywords
                    .iter()
                    .filter(|k| !k.trim().is_empty())
                    .map(|k| k.to_lowercase())
                    .collect();
                (r.label.clone(), keywords)
            })
            .collect();
        Self {
            rules,
            default_label: default_label.to_string(),
        }
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    /// Configured labels in rule order (the default label is not included).
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(label, _)| label.as_str())
    }

    /// Return the rule label for `description`, or `None` when nothing matches.
    pub fn find_match(&self, description: &str) -> Option<&str> {
        let desc = description.to_lowercase();
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| desc.contains(k.as_str())))
            .map(|(label, _)| label.as_str())
    }

    pub fn classify(&self, description: &str) -> &str {
        self.find_match(description).unwrap_or(&self.default_label)
    }

    pub fn categorize(&self, records: Vec<Record>) -> CategorizeResult {
        let mut matched = 0usize;
        let mut defaulted = 0usize;
        let records = records
            .into_iter()
            .map(|record| {
                let category = match self.find_match(&record.description) {
                    Some(label) => {
                        matched += 1;
                        label.to_string()
                    }
                    None => {
                        defaulted += 1;
                        self.default_label.clone()
                    }
                };
                ClassifiedRecord { record, category }
            })
            .collect();
        tracing::debug!(matched, defaulted, "classified records");
        CategorizeResult {
            records,
            matched,
            defaulted,
        }
    }
}

/// Case-insensitive "contains any" check used for exclusion words.
pub fn contains_any(description: &str, words: &[String]) -> bool {
    let desc = description.to_lowercase();
    words
        .iter()
        .filter(|w| !w.trim().is_empty())
        .any(|w| desc.contains(&w.to_lowercase()))
}
