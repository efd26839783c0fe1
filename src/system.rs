//! Boundary to the windowing system.
//!
//! Implementations either succeed or return an empty/neutral value; nothing
//! here reports errors back into the switcher core.

use crossterm::event::{KeyCode, KeyModifiers};

use crate::geometry::{Point, Rect, WindowId};

/// Window properties the switcher tells apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    /// `_NET_CLIENT_LIST_STACKING`: the managed window list changed order or
    /// membership.
    ClientListStacking,
    /// `_NET_ACTIVE_WINDOW`
    ActiveWindow,
    WmName,
    NetWmName,
    Other(String),
}

/// Property-change notification delivered by the event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub window: WindowId,
    pub atom: Atom,
}

impl Notification {
    pub fn new(window: WindowId, atom: Atom) -> Self {
        Self { window, atom }
    }

    pub fn stacking_changed(root: WindowId) -> Self {
        Self::new(root, Atom::ClientListStacking)
    }
}

pub trait WindowSystem {
    /// Window everything else is a child of.
    fn root(&self) -> WindowId;

    /// Currently open, eligible windows in stacking order, without
    /// duplicates.
    fn stacking_order(&self) -> Vec<WindowId>;

    fn query_pointer(&self) -> Option<Point>;

    /// Bounds of the screen containing `point`.
    fn current_screen(&self, point: Point) -> Option<Rect>;

    fn grab_keyboard(&mut self);

    fn ungrab_keyboard(&mut self);

    /// Passive grab so the activating chord reaches the switcher while it is
    /// idle.
    fn grab_key(&mut self, _modifiers: KeyModifiers, _code: KeyCode) {}

    /// Makes `window` the active window.
    fn activate(&mut self, window: WindowId);
}

impl<T: WindowSystem + ?Sized> WindowSystem for &mut T {
    fn root(&self) -> WindowId {
        (**self).root()
    }

    fn stacking_order(&self) -> Vec<WindowId> {
        (**self).stacking_order()
    }

    fn query_pointer(&self) -> Option<Point> {
        (**self).query_pointer()
    }

    fn current_screen(&self, point: Point) -> Option<Rect> {
        (**self).current_screen(point)
    }

    fn grab_keyboard(&mut self) {
        (**self).grab_keyboard()
    }

    fn ungrab_keyboard(&mut self) {
        (**self).ungrab_keyboard()
    }

    fn grab_key(&mut self, modifiers: KeyModifiers, code: KeyCode) {
        (**self).grab_key(modifiers, code)
    }

    fn activate(&mut self, window: WindowId) {
        (**self).activate(window)
    }
}
