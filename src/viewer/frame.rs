//! Redraw coalescing: at most one paint per display refresh.

/// Schedule-if-not-already-scheduled bookkeeping. The platform callback
/// (an animation frame in the browser) is only requested when `request`
/// returns true.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pending: bool,
    requested: u64,
}

impl FrameRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a repaint as wanted. Returns true when the caller must ask the
    /// platform for a frame; false when one is already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        self.requested += 1;
        true
    }

    /// The frame fired. Returns whether a repaint was pending.
    pub fn begin_frame(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Forget a pending request (teardown).
    pub fn cancel(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Number of platform frames asked for so far.
    pub fn frames_requested(&self) -> u64 {
        self.requested
    }
}

/// Handle of a requested browser animation frame. The frame is cancelled
/// when the handle is dropped.
#[cfg(target_arch = "wasm32")]
pub(crate) struct AnimationFrame {
    id: i32,
    _closure: wasm_bindgen::closure::Closure<dyn FnMut(f64)>,
}

#[cfg(target_arch = "wasm32")]
impl AnimationFrame {
    pub(crate) fn request(
        callback: impl FnMut(f64) + 'static,
    ) -> crate::error::Result<Self> {
        use wasm_bindgen::JsCast;

        let closure = wasm_bindgen::closure::Closure::wrap(
            Box::new(callback) as Box<dyn FnMut(f64)>
        );
        let window =
            web_sys::window().ok_or_else(|| crate::error::SheetError::Js("no window".into()))?;
        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| crate::error::SheetError::Js(format!("{e:?}")))?;
        Ok(Self {
            id,
            _closure: closure,
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for AnimationFrame {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(self.id);
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce_until_frame() {
        let mut frame = FrameRequest::new();
        assert!(frame.request());
        assert!(!frame.request());
        assert!(!frame.request());
        assert!(frame.begin_frame());
        assert!(!frame.begin_frame());
        assert!(frame.request());
        assert_eq!(frame.frames_requested(), 2);
    }

    #[test]
    fn cancel_clears_pending() {
        let mut frame = FrameRequest::new();
        frame.request();
        assert!(frame.cancel());
        assert!(!frame.is_pending());
        assert!(!frame.begin_frame());
    }
}
