//! Core library for petbook.
//!
//! Everything the TUI needs that is not terminal rendering: domain
//! models for pets and their care events, the HTTP API client, the
//! read-through resource cache, care-date rules, and form validation.

pub mod api;
pub mod cache;
pub mod forms;
pub mod models;
pub mod rules;
