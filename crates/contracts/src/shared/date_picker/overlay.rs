use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one popup overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayHandle(pub Uuid);

impl OverlayHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OverlayHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverlayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracks which popup is active when several date fields live on one page.
///
/// Implementors are services shared through context, so both methods take
/// `&self`.
pub trait OverlayRegistry {
    /// Make `handle` the topmost overlay.
    fn push_active(&self, handle: OverlayHandle);
    /// Forget `handle`; unknown handles are ignored.
    fn remove_active(&self, handle: OverlayHandle);
}

/// Ordered set of open overlays, bottom first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayStack {
    entries: Vec<OverlayHandle>,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `handle` on top. A handle already in the stack moves to the top.
    pub fn push(&mut self, handle: OverlayHandle) {
        self.entries.retain(|h| *h != handle);
        self.entries.push(handle);
    }

    pub fn remove(&mut self, handle: OverlayHandle) {
        self.entries.retain(|h| *h != handle);
    }

    pub fn topmost(&self) -> Option<OverlayHandle> {
        self.entries.last().copied()
    }

    pub fn is_topmost(&self, handle: OverlayHandle) -> bool {
        self.topmost() == Some(handle)
    }

    /// Position from the bottom, `None` when not open.
    pub fn position(&self, handle: OverlayHandle) -> Option<usize> {
        self.entries.iter().position(|h| *h == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
