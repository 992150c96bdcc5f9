//! HTML templates rendered with `markup`.

pub mod alerts;
pub mod components;
pub mod dashboard;
pub mod history;
pub mod layout;
pub mod settings;

pub use layout::{Layout, LayoutContext};

/// Wraps an already rendered view in the page shell.
pub fn render_page(ctx: &LayoutContext, body: impl std::fmt::Display) -> String {
    let body = body.to_string();
    Layout { ctx, body: &body }.to_string()
}
