//! Word filter for inventory queries

/// Whitespace-separated filter words. An item matches when every word occurs
/// in at least one of its searchable fields. No words matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    words: Vec<String>,
}

impl Filter {
    pub fn new(filter: &str) -> Self {
        Self {
            words: filter.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matches_any(&[text])
    }

    pub fn matches_any(&self, fields: &[&str]) -> bool {
        self.words
            .iter()
            .all(|word| fields.iter().any(|field| field.contains(word.as_str())))
    }
}
