//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into journal use-cases.
//! - Keep CLI/UI callers decoupled from storage details.

pub mod journal_service;
