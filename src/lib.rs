//! story-chat - a terminal chat with a children's storyteller.
//!
//! This library exposes the core modules for testing and reuse.

pub mod app;
pub mod catalog;
pub mod config;
pub mod input;
pub mod logging;
pub mod message;
pub mod sidebar;
pub mod transport;
pub mod ui;
