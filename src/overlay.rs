//! Outside-click interceptor.
//!
//! The host owns one [`OverlayLayer`]; pickers hold the [`Overlay`] guard it
//! hands out. Installing displaces whatever overlay was active, and dropping
//! a guard removes its overlay if it is still the active one, so the layer
//! never carries more than one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
struct LayerState {
    active: Option<u64>,
    next_id: u64,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayLayer {
    state: Rc<RefCell<LayerState>>,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the overlay is removed as soon as the guard is dropped"]
    pub fn install(&self) -> Overlay {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        if let Some(stale) = state.active.replace(id) {
            tracing::debug!(stale, id, "replaced stale overlay");
        } else {
            tracing::debug!(id, "installed overlay");
        }
        Overlay {
            layer: Rc::downgrade(&self.state),
            id,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().active.is_some()
    }

    pub fn active_count(&self) -> usize {
        usize::from(self.is_active())
    }
}

#[derive(Debug)]
pub struct Overlay {
    layer: Weak<RefCell<LayerState>>,
    id: u64,
}

impl Overlay {
    /// False once another install has displaced this overlay.
    pub fn is_current(&self) -> bool {
        match self.layer.upgrade() {
            Some(state) => {
                let active = state.borrow().active;
                active == Some(self.id)
            }
            None => false,
        }
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        if let Some(state) = self.layer.upgrade() {
            let mut state = state.borrow_mut();
            if state.active == Some(self.id) {
                state.active = None;
                tracing::debug!(id = self.id, "removed overlay");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_removes_overlay() {
        let layer = OverlayLayer::new();
        let overlay = layer.install();
        assert!(overlay.is_current());
        assert_eq!(layer.active_count(), 1);
        drop(overlay);
        assert!(!layer.is_active());
    }

    #[test]
    fn install_displaces_previous() {
        let layer = OverlayLayer::new();
        let first = layer.install();
        let second = layer.install();
        assert_eq!(layer.active_count(), 1);
        assert!(!first.is_current());
        assert!(second.is_current());

        // A stale guard must not take the live overlay down with it.
        drop(first);
        assert!(second.is_current());
        drop(second);
        assert_eq!(layer.active_count(), 0);
    }

    #[test]
    fn guard_outliving_layer_is_inert() {
        let layer = OverlayLayer::new();
        let overlay = layer.install();
        drop(layer);
        assert!(!overlay.is_current());
    }
}
