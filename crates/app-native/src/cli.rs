//! Command-line argument parsing.

use app_core::{SceneConfig, ShaderKind, VisualizerConfig, DEFAULT_PARTICLE_COUNT};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "app-native")]
#[command(about = "Audio-reactive shader visualizer fed by the default input", long_about = None)]
pub struct Args {
    /// Shader to start with (see --list-shaders)
    #[arg(long, value_name = "NAME", default_value = "ripple")]
    pub shader: String,

    /// Particle count for the particles scene
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_PARTICLE_COUNT)]
    pub particles: usize,

    /// Fixed RNG seed for particle placement
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Print the selectable shader names and exit
    #[arg(long)]
    pub list_shaders: bool,
}

impl Args {
    pub fn visualizer_config(&self) -> anyhow::Result<VisualizerConfig> {
        let initial_shader: ShaderKind = self.shader.parse()?;
        Ok(VisualizerConfig {
            scene: SceneConfig {
                particle_count: self.particles,
                seed: self.seed,
            },
            initial_shader,
            ..Default::default()
        })
    }
}
