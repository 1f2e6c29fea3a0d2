use thiserror::Error;

/// Failures surfaced by the visualizer core.
///
/// `NotReady` is the only recoverable per-frame case; the render loop turns it
/// into a skipped frame. Everything else either returns to the caller (setup,
/// selection) or faults the active scene.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum VizError {
    #[error("no audio source is bound to the analyzer")]
    NotReady,
    #[error("an audio source is already bound to the analyzer")]
    AlreadyBound,
    #[error("unknown shader `{0}`")]
    UnknownShader(String),
    #[error("shader `{shader}` breaks its uniform contract: {detail}")]
    ContractViolation { shader: &'static str, detail: String },
    #[error("invalid analyzer configuration: {0}")]
    InvalidConfig(String),
    #[error("renderer failed: {0}")]
    Render(String),
}

impl VizError {
    pub(crate) fn contract(shader: &'static str, detail: impl Into<String>) -> Self {
        VizError::ContractViolation {
            shader,
            detail: detail.into(),
        }
    }
}
