//! Core functionality for gitfacts.
//!
//! This module contains the main components:
//! - [`facts`]: Fact collection and rendering
//! - [`git`]: Git command invocation
//! - [`error`]: Error types and result handling

pub mod error;
pub mod facts;
pub mod git;
