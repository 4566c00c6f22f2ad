//! Moneytracker-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across moneytracker:
//!
//! - **Typed IDs**: Type-safe UUID wrappers for users and expenses
//! - **Core Types**: The expense record and its optional location
//! - **Path Utilities**: The `IMG_<millis>.jpg` naming convention of managed images
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use moneytracker_common::{ExpenseId, Error, Result};
//! use moneytracker_common::paths::{image_file_name, is_managed_image};
//! use std::path::Path;
//!
//! let _expense_id = ExpenseId::new();
//!
//! let name = image_file_name(1_700_000_000_000);
//! assert!(is_managed_image(Path::new(&name)));
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("IMG_1.jpg"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
