//! Vendor Matrix
//!
//! Search filtering, the edit-dialog draft and bulk JSON import for the
//! vendor comparison table.

use std::collections::BTreeMap;

use crate::domain::{CategoryRating, DomainError, DomainResult, Vendor};

/// Comma-separated search terms, trimmed and lowercased
pub fn search_terms(search: &str) -> Vec<String> {
    search
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// True when any term is a substring of any searchable field
pub fn matches_search(vendor: &Vendor, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }

    let mut haystack = vec![vendor.name.to_lowercase(), vendor.vendor_type.to_lowercase()];
    for (label, rating) in &vendor.categories {
        haystack.push(label.to_lowercase());
        haystack.push(rating.note.to_lowercase());
        haystack.push(rating.status.as_str().to_string());
    }

    terms
        .iter()
        .any(|term| haystack.iter().any(|field| field.contains(term.as_str())))
}

pub fn filter_vendors<'a>(vendors: &'a [Vendor], search: &str) -> Vec<&'a Vendor> {
    let terms = search_terms(search);
    vendors.iter().filter(|v| matches_search(v, &terms)).collect()
}

/// Editable copy of a vendor's name, type and category labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorDraft {
    pub name: String,
    pub vendor_type: String,
    pub categories: Vec<String>,
}

impl VendorDraft {
    pub fn from_vendor(vendor: &Vendor) -> Self {
        Self {
            name: vendor.name.clone(),
            vendor_type: vendor.vendor_type.clone(),
            categories: vendor.categories.keys().cloned().collect(),
        }
    }

    /// Add a label; blanks and duplicates are ignored
    pub fn add_category(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.categories.iter().any(|c| c == label) {
            return false;
        }
        self.categories.push(label.to_string());
        true
    }

    pub fn remove_category(&mut self, label: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c != label);
        self.categories.len() != before
    }

    /// Backspace in an empty tag input drops the last label
    pub fn pop_category(&mut self) -> Option<String> {
        self.categories.pop()
    }

    /// Vendor with the draft's fields; existing ratings survive, new labels start green
    pub fn apply(&self, base: &Vendor) -> Vendor {
        let categories: BTreeMap<String, CategoryRating> = self
            .categories
            .iter()
            .map(|label| {
                let rating = base.categories.get(label).cloned().unwrap_or_default();
                (label.clone(), rating)
            })
            .collect();

        Vendor {
            id: base.id.clone(),
            name: self.name.trim().to_string(),
            vendor_type: self.vendor_type.trim().to_string(),
            categories,
            created_at: base.created_at,
        }
    }
}

/// Parse a pasted JSON array of vendors
pub fn parse_vendor_import(json: &str) -> DomainResult<Vec<Vendor>> {
    let vendors: Vec<Vendor> =
        serde_json::from_str(json).map_err(|e| DomainError::InvalidInput(e.to_string()))?;

    if let Some(position) = vendors.iter().position(|v| v.name.trim().is_empty()) {
        return Err(DomainError::InvalidInput(format!(
            "vendor at index {} has no name",
            position
        )));
    }

    Ok(vendors
        .into_iter()
        .map(|mut v| {
            v.id = None;
            v.created_at = None;
            v
        })
        .collect())
}
