//! Page acquisition and disclosure extraction.
//!
//! - Renderer trait and WebDriver-backed implementation (`render`)
//! - Rendered HTML to visible text (`text`)
//! - Retail-loss percentage extraction (`extract`)

pub mod extract;
pub mod render;
pub mod text;
