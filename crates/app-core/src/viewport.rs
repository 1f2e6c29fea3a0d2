use crate::error::VizError;
use crate::scene::Scene;
use crate::state::ViewportSize;

/// Tracks the drawable surface size. Resize notifications are coalesced and
/// applied once at the start of the next frame.
#[derive(Clone, Debug, Default)]
pub struct ViewportManager {
    current: ViewportSize,
    pending: Option<ViewportSize>,
}

impl ViewportManager {
    pub fn new(initial: ViewportSize) -> Self {
        Self {
            current: initial,
            pending: None,
        }
    }

    #[inline]
    pub fn current(&self) -> ViewportSize {
        self.current
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue a new size. Zero-area sizes (minimized windows, hidden canvases)
    /// are ignored, as is a repeat of the size already in effect.
    pub fn request_resize(&mut self, width: u32, height: u32) -> bool {
        let size = ViewportSize::new(width, height);
        if size.is_empty() {
            return false;
        }
        if self.pending.is_none() && size == self.current {
            return false;
        }
        self.pending = Some(size);
        true
    }

    /// Promote the queued size to current and return it.
    pub fn take_pending(&mut self) -> Option<ViewportSize> {
        let size = self.pending.take()?;
        self.current = size;
        Some(size)
    }

    /// Push the current size into a scene's resolution and camera aspect.
    pub fn apply_to(&self, scene: &mut Scene) -> Result<(), VizError> {
        scene.apply_viewport(self.current)
    }
}
