// Render engine: template population, layout normalization, and cosmetic
// customizations, plus the HTTP surface that drives render and export.

pub mod css;
pub mod customize;
pub mod engine;
pub mod handlers;
pub mod helpers;
pub mod normalize;
pub mod pipeline;

pub use engine::TemplateEngine;
