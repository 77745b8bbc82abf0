pub mod canvas;
pub mod config;
pub mod palette;
pub mod plan;
pub mod templates;
pub mod typeface;

// Curated re-exports
pub use config::PlaceholderConfig;
pub use plan::{run, GenerationPlan, RunReport};
pub use templates::Size;
pub use typeface::Typeface;
