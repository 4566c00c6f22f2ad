//! Expense records as exported by the expense store.
//!
//! The image manager never sees these; they exist so callers can derive the
//! complete set of referenced image paths before an orphan cleanup.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ExpenseId, UserId};

/// GPS position attached to an expense.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single recorded expense.
///
/// Missing fields fall back to their defaults so partially filled documents
/// from older app versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub id: ExpenseId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    /// Day of the expense as entered by the user (`dd/MM/yyyy`).
    #[serde(default)]
    pub date: String,
    /// Time of the expense as entered by the user (`HH:mm`).
    #[serde(default)]
    pub time: String,
    /// Absolute path of the attached photo, if any.
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// The attached image path, treating an empty string as no image.
    pub fn image(&self) -> Option<&str> {
        self.image_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// Collect every image path referenced by `expenses`.
///
/// The result is only a valid cleanup snapshot when `expenses` covers every
/// record that may reference the storage directory.
pub fn valid_image_paths<'a, I>(expenses: I) -> HashSet<PathBuf>
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses
        .into_iter()
        .filter_map(Expense::image)
        .map(PathBuf::from)
        .collect()
}
