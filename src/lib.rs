//! `TicketWarden` - A Discord bot for gated support-ticket workflows
//!
//! This crate provides a complete ticket-desk system accessible via Discord:
//! panel-button ticket creation with per-user cooldowns, sequential FAQ
//! acknowledgment before chat unlocks, optional region capture and screenshot
//! verification, inactivity auto-closure, and transcript delivery on close.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,       // Will add gradually
    clippy::missing_panics_doc,       // Will add gradually
)]

/// Discord bot interface - commands, event handlers, and bot context
pub mod bot;
/// Configuration management - environment settings and onboarding content
pub mod config;
/// Core business logic - framework-agnostic ticket, cooldown, and transcript operations
pub mod core;
/// Unified error types and result handling
pub mod errors;
/// Flat-file persistence for ticket activity and cooldown timestamps
pub mod store;

#[cfg(test)]
pub mod test_utils;
