use contracts::shared::date_picker::{OverlayHandle, OverlayRegistry, OverlayStack};
use leptos::prelude::*;

/// z-index of the lowest popup; each popup above it gets two more (backdrop + surface).
pub const BASE_Z_INDEX: i32 = 1000;

/// Centralized registry of open date picker popups.
///
/// - The last pushed popup is the active one
/// - Escape closes only the topmost popup (each `DatePicker` checks `is_topmost`)
#[derive(Clone, Copy)]
pub struct OverlayStackService {
    stack: RwSignal<OverlayStack>,
}

impl OverlayStackService {
    pub fn new() -> Self {
        Self {
            stack: RwSignal::new(OverlayStack::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.stack.with(|s| s.len())
    }

    pub fn is_topmost(&self, handle: OverlayHandle) -> bool {
        self.stack.with_untracked(|s| s.is_topmost(handle))
    }

    /// Stacking order of a popup's backdrop, reactive.
    pub fn z_index(&self, handle: OverlayHandle) -> i32 {
        z_index_for(self.stack.with(|s| s.position(handle)))
    }
}

impl Default for OverlayStackService {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayRegistry for OverlayStackService {
    fn push_active(&self, handle: OverlayHandle) {
        self.stack.update(|s| s.push(handle));
    }

    fn remove_active(&self, handle: OverlayHandle) {
        self.stack.update(|s| s.remove(handle));
    }
}

/// Popups that are not registered (no service in context) sit at the base.
pub fn z_index_for(position: Option<usize>) -> i32 {
    let position = position.unwrap_or(0) as i32;
    BASE_Z_INDEX + position * 2
}
