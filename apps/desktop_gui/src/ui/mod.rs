//! UI layer for desktop GUI: the verification window.

pub mod app;

pub use app::LivenessApp;
