//! Utility functions shared across the application.
//!
//! - [`species_name`] - Display-name derivation and hybrid detection

pub mod species_name;
