//! UI module for story-chat.
//!
//! This module contains all UI rendering logic including:
//! - Main layout: sidebar, transcript, input row
//! - Gradient borders
//! - Text wrapping
//! - Toast notifications

mod gradient;
mod render;
pub mod text;
mod toast;

pub use render::ui;
pub use toast::{render_toasts, Toast, ToastLevel, ToastState};
