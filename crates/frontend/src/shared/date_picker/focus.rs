use leptos::prelude::*;

/// Runs one action after the next render pass.
///
/// Scheduling again, or calling `cancel`, drops the action that is still
/// waiting for its frame.
#[derive(Clone, Copy)]
pub struct FocusScheduler {
    pending: StoredValue<Option<AnimationFrameRequestHandle>>,
}

impl FocusScheduler {
    pub fn new() -> Self {
        Self {
            pending: StoredValue::new(None),
        }
    }

    pub fn schedule(&self, action: impl FnOnce() + 'static) {
        self.cancel();

        let pending = self.pending;
        let frame = request_animation_frame_with_handle(move || {
            let _ = pending.try_set_value(None);
            action();
        });

        match frame {
            Ok(handle) => {
                let _ = self.pending.try_set_value(Some(handle));
            }
            Err(err) => log::warn!("failed to schedule refocus: {:?}", err),
        }
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.pending.try_update_value(|p| p.take()).flatten() {
            handle.cancel();
        }
    }
}

impl Default for FocusScheduler {
    fn default() -> Self {
        Self::new()
    }
}
