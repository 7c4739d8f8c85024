//! Client-side search over a fetched associate list

use super::model::Associate;

impl Associate {
    /// Case-insensitive substring match on names, document number and email
    ///
    /// `needle` must already be lowercase.
    fn matches_lowercase(&self, needle: &str) -> bool {
        [
            &self.first_names,
            &self.last_names,
            &self.document_number,
            &self.email,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Records matching `term`, in list order
///
/// A blank term returns every record.
pub fn filter_associates<'a>(items: &'a [Associate], term: &str) -> Vec<&'a Associate> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|a| a.matches_lowercase(&needle))
        .collect()
}
