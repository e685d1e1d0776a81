//! Vendor Entity
//!
//! A row of the vendor comparison matrix.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Traffic-light rating of a vendor within one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    #[default]
    Green,
    Yellow,
    Red,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorStatus::Green => "green",
            VendorStatus::Yellow => "yellow",
            VendorStatus::Red => "red",
        }
    }
}

/// Rating and remark for one category label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategoryRating {
    pub status: VendorStatus,
    #[serde(default)]
    pub note: String,
}

/// A vendor under evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// Absent until persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Free-form tag such as "CRM"
    #[serde(rename = "type", default)]
    pub vendor_type: String,
    /// Category label -> rating
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryRating>,
    /// Epoch milliseconds, stamped on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl Vendor {
    pub fn new(name: impl Into<String>, vendor_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor_type: vendor_type.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, label: impl Into<String>, status: VendorStatus, note: impl Into<String>) -> Self {
        self.categories.insert(
            label.into(),
            CategoryRating {
                status,
                note: note.into(),
            },
        );
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl Entity for Vendor {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Partial vendor update; `None` fields are not written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VendorUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub vendor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, CategoryRating>>,
}

impl VendorUpdate {
    /// Full replacement of the editable fields of `vendor`
    pub fn from_vendor(vendor: &Vendor) -> Self {
        Self {
            name: Some(vendor.name.clone()),
            vendor_type: Some(vendor.vendor_type.clone()),
            categories: Some(vendor.categories.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.vendor_type.is_none() && self.categories.is_none()
    }

    pub fn apply(&self, vendor: &mut Vendor) {
        if let Some(name) = &self.name {
            vendor.name = name.clone();
        }
        if let Some(vendor_type) = &self.vendor_type {
            vendor.vendor_type = vendor_type.clone();
        }
        if let Some(categories) = &self.categories {
            vendor.categories = categories.clone();
        }
    }
}
