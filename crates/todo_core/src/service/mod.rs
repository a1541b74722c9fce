//! Core use-case services.
//!
//! # Responsibility
//! - Execute one structured CLI request against one store session.
//! - Keep the CLI layer free of staging and filtering details.

pub mod todo_service;
