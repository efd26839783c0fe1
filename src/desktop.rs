//! In-process window system.
//!
//! `Desktop` keeps a bottom-to-top stacking list, an active window, a pointer,
//! a set of screens and the keyboard grab state. Every change to the
//! stacking list queues a `_NET_CLIENT_LIST_STACKING` notification on the
//! root window; the event loop drains the queue with `take_notifications`
//! and feeds it to the switcher one event at a time.
//!
//! The handle is cheap to clone and all clones share the same state, so the
//! registry and the thumbnails it creates can talk to the same desktop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyModifiers};

use crate::geometry::{Point, Rect, WindowId};
use crate::system::{Atom, Notification, WindowSystem};

const ROOT: WindowId = WindowId(0x0000_0001);
const FIRST_CLIENT: u32 = 0x0040_0001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopWindow {
    pub id: WindowId,
    pub title: String,
}

#[derive(Debug)]
struct DesktopState {
    stacking: Vec<DesktopWindow>,
    next_id: u32,
    active: Option<WindowId>,
    pointer: Option<Point>,
    screens: Vec<Rect>,
    keyboard_grabbed: bool,
    passive_grabs: Vec<(KeyModifiers, KeyCode)>,
    pending: VecDeque<Notification>,
    activations: Vec<WindowId>,
}

impl DesktopState {
    fn notify(&mut self, atom: Atom) {
        self.pending.push_back(Notification::new(ROOT, atom));
    }

    fn position(&self, id: WindowId) -> Option<usize> {
        self.stacking.iter().position(|w| w.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct Desktop {
    state: Rc<RefCell<DesktopState>>,
}

impl Desktop {
    /// Single-screen desktop with the pointer at the screen's origin.
    pub fn new(screen: Rect) -> Self {
        Self {
            state: Rc::new(RefCell::new(DesktopState {
                stacking: Vec::new(),
                next_id: FIRST_CLIENT,
                active: None,
                pointer: Some(Point::new(screen.x, screen.y)),
                screens: vec![screen],
                keyboard_grabbed: false,
                passive_grabs: Vec::new(),
                pending: VecDeque::new(),
                activations: Vec::new(),
            })),
        }
    }

    /// Maps a new window on top of the stack.
    pub fn open(&self, title: impl Into<String>) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = WindowId(state.next_id);
        state.next_id = state.next_id.wrapping_add(1);
        state.stacking.push(DesktopWindow {
            id,
            title: title.into(),
        });
        state.notify(Atom::ClientListStacking);
        tracing::debug!(window_id = %id, "desktop mapped window");
        id
    }

    /// Unmaps `id`. Returns false for unknown windows.
    pub fn close(&self, id: WindowId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(pos) = state.position(id) else {
            return false;
        };
        state.stacking.remove(pos);
        if state.active == Some(id) {
            state.active = state.stacking.last().map(|w| w.id);
            state.notify(Atom::ActiveWindow);
        }
        state.notify(Atom::ClientListStacking);
        tracing::debug!(window_id = %id, "desktop unmapped window");
        true
    }

    /// Closes the top-most window, if any.
    pub fn close_top(&self) -> Option<WindowId> {
        let top = self.state.borrow().stacking.last().map(|w| w.id);
        top.filter(|id| self.close(*id))
    }

    /// Moves `id` to the top of the stack.
    pub fn raise(&self, id: WindowId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(pos) = state.position(id) else {
            return false;
        };
        if pos + 1 != state.stacking.len() {
            let window = state.stacking.remove(pos);
            state.stacking.push(window);
            state.notify(Atom::ClientListStacking);
        }
        true
    }

    pub fn rename(&self, id: WindowId, title: impl Into<String>) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(pos) = state.position(id) else {
            return false;
        };
        state.stacking[pos].title = title.into();
        state.pending.push_back(Notification::new(id, Atom::NetWmName));
        true
    }

    pub fn title(&self, id: WindowId) -> Option<String> {
        let state = self.state.borrow();
        state.position(id).map(|pos| state.stacking[pos].title.clone())
    }

    pub fn windows(&self) -> Vec<DesktopWindow> {
        self.state.borrow().stacking.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().stacking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().stacking.is_empty()
    }

    pub fn active(&self) -> Option<WindowId> {
        self.state.borrow().active
    }

    /// Every window `activate` was called with, oldest first.
    pub fn activations(&self) -> Vec<WindowId> {
        self.state.borrow().activations.clone()
    }

    pub fn set_pointer(&self, pointer: Option<Point>) {
        self.state.borrow_mut().pointer = pointer;
    }

    pub fn set_screens(&self, screens: Vec<Rect>) {
        self.state.borrow_mut().screens = screens;
    }

    pub fn keyboard_grabbed(&self) -> bool {
        self.state.borrow().keyboard_grabbed
    }

    pub fn passive_grabs(&self) -> Vec<(KeyModifiers, KeyCode)> {
        self.state.borrow().passive_grabs.clone()
    }

    /// Drains queued notifications in the order they were raised.
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.state.borrow_mut().pending.drain(..).collect()
    }
}

impl WindowSystem for Desktop {
    fn root(&self) -> WindowId {
        ROOT
    }

    fn stacking_order(&self) -> Vec<WindowId> {
        self.state.borrow().stacking.iter().map(|w| w.id).collect()
    }

    fn query_pointer(&self) -> Option<Point> {
        self.state.borrow().pointer
    }

    fn current_screen(&self, point: Point) -> Option<Rect> {
        self.state
            .borrow()
            .screens
            .iter()
            .copied()
            .find(|screen| screen.contains(point))
    }

    fn grab_keyboard(&mut self) {
        self.state.borrow_mut().keyboard_grabbed = true;
    }

    fn ungrab_keyboard(&mut self) {
        self.state.borrow_mut().keyboard_grabbed = false;
    }

    fn grab_key(&mut self, modifiers: KeyModifiers, code: KeyCode) {
        let mut state = self.state.borrow_mut();
        if !state.passive_grabs.contains(&(modifiers, code)) {
            state.passive_grabs.push((modifiers, code));
        }
    }

    fn activate(&mut self, window: WindowId) {
        if !self.raise(window) {
            tracing::trace!(window_id = %window, "activate on unknown window");
            return;
        }
        let mut state = self.state.borrow_mut();
        state.activations.push(window);
        if state.active != Some(window) {
            state.active = Some(window);
            state.notify(Atom::ActiveWindow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> Desktop {
        Desktop::new(Rect::new(0, 0, 800, 600))
    }

    #[test]
    fn open_and_close_queue_stacking_notifications() {
        let d = desktop();
        let a = d.open("a");
        let b = d.open("b");
        assert_eq!(d.stacking_order(), vec![a, b]);
        assert!(d.close(a));
        assert!(!d.close(a));
        let notes = d.take_notifications();
        assert_eq!(notes.len(), 3);
        assert!(notes.iter().all(|n| n.window == d.root()));
        assert!(d.take_notifications().is_empty());
        assert_eq!(d.stacking_order(), vec![b]);
    }

    #[test]
    fn activate_raises_and_records() {
        let mut d = desktop();
        let a = d.open("a");
        let b = d.open("b");
        d.activate(a);
        assert_eq!(d.stacking_order(), vec![b, a]);
        assert_eq!(d.active(), Some(a));
        assert_eq!(d.activations(), vec![a]);
        d.activate(WindowId(0xdead));
        assert_eq!(d.activations(), vec![a]);
    }

    #[test]
    fn pointer_outside_every_screen_has_no_screen() {
        let d = desktop();
        assert_eq!(
            d.current_screen(Point::new(10, 10)),
            Some(Rect::new(0, 0, 800, 600))
        );
        assert_eq!(d.current_screen(Point::new(900, 10)), None);
    }

    #[test]
    fn clones_share_state() {
        let d = desktop();
        let other = d.clone();
        let id = other.open("shared");
        assert_eq!(d.title(id).as_deref(), Some("shared"));
        assert!(d.rename(id, "renamed"));
        assert_eq!(other.title(id).as_deref(), Some("renamed"));
    }
}
