pub mod analyzer;
pub mod config;
pub mod constants;
pub mod error;
pub mod intensity;
pub mod render_loop;
pub mod scene;
pub mod shaders;
pub mod spectrum;
pub mod state;
pub mod viewport;

pub use analyzer::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use intensity::{reduce, IntensityVector};
pub use render_loop::*;
pub use scene::*;
pub use shaders::*;
pub use spectrum::*;
pub use state::*;
pub use viewport::*;
