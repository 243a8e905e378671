//! Chart rendering.
//!
//! Projects one year out of the store, reconciles the circle marks with
//! the previous render, and serializes the result as SVG.

pub mod renderer;
pub mod scene;
pub mod svg;
pub mod tooltip;

pub use renderer::Renderer;
pub use scene::Patch;
pub use svg::render_svg;
pub use tooltip::Tooltip;
