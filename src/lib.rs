//! Moneytracker - expense photo storage
//!
//! This library crate exposes the image manager and configuration for the
//! binary and for integration tests.

pub mod config;
pub mod images;
