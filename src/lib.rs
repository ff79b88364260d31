//! Image-to-text inference server.
//!
//! A single inference worker drains a shared task queue; a result broker
//! routes each result back to whichever caller submitted the task.

pub mod api;
pub mod config;
pub mod core;
