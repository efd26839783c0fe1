//! Input state machine driving the registry.
//!
//! ```text
//!   Idle --(modifier + action key)--> Active   grab keyboard, show
//!   Active --(action key)-----------> Active   next / prev with Shift
//!   Active --(direction key)--------> Active   directional move
//!   Active --(pointer enters)-------> Active   highlight
//!   Active --(click, Preview)-------> Active   highlight + select
//!   Active --(click, Commit)--------> Idle     select, hide, ungrab
//!   Active --(cancel key)-----------> Idle     hide, ungrab
//!   Active --(modifier released)----> Idle     select cursor, hide, ungrab
//! ```
//!
//! Transitions are edge-triggered by single events; there are no timers.

use crossterm::event::{KeyCode, KeyModifiers};

use crate::geometry::WindowId;
use crate::keybindings::{Action, Bindings};
use crate::system::WindowSystem;
use crate::window::{Registry, ThumbnailFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    KeyRelease {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    /// Pointer button pressed on a thumbnail.
    Click(WindowId),
    /// Pointer moved onto a thumbnail.
    PointerEnter(WindowId),
}

impl InputEvent {
    pub fn press(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::KeyPress { code, modifiers }
    }

    pub fn release(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::KeyRelease { code, modifiers }
    }
}

/// What a click on a thumbnail does while the switcher is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickPolicy {
    /// Select the window and keep the switcher open until the modifier is
    /// released.
    #[default]
    Preview,
    /// Select the window and close the switcher at once.
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Active,
}

#[derive(Debug, Clone)]
pub struct Controller {
    bindings: Bindings,
    click: ClickPolicy,
    state: ControllerState,
}

impl Controller {
    pub fn new(bindings: Bindings, click: ClickPolicy) -> Self {
        Self {
            bindings,
            click,
            state: ControllerState::Idle,
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn click_policy(&self) -> ClickPolicy {
        self.click
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ControllerState::Active
    }

    /// Registers the activation chord with the window system.
    pub fn install<S: WindowSystem, F: ThumbnailFactory>(&self, registry: &mut Registry<S, F>) {
        registry
            .system_mut()
            .grab_key(self.bindings.modifier(), self.bindings.action_key());
    }

    /// Returns whether the event was consumed.
    pub fn handle<S: WindowSystem, F: ThumbnailFactory>(
        &mut self,
        registry: &mut Registry<S, F>,
        event: &InputEvent,
    ) -> bool {
        match self.state {
            ControllerState::Idle => self.handle_idle(registry, event),
            ControllerState::Active => self.handle_active(registry, event),
        }
    }

    fn handle_idle<S: WindowSystem, F: ThumbnailFactory>(
        &mut self,
        registry: &mut Registry<S, F>,
        event: &InputEvent,
    ) -> bool {
        let InputEvent::KeyPress { code, modifiers } = *event else {
            return false;
        };
        if !self.bindings.holds_modifier(modifiers) {
            return false;
        }
        let backwards = match self.bindings.action_for(code, modifiers) {
            Some(Action::CycleNext) => false,
            Some(Action::CyclePrev) => true,
            _ => return false,
        };

        self.state = ControllerState::Active;
        registry.system_mut().grab_keyboard();
        registry.show();
        if backwards {
            registry.prev();
        }
        tracing::debug!(windows = registry.len(), current = ?registry.current(), "switcher activated");
        true
    }

    fn handle_active<S: WindowSystem, F: ThumbnailFactory>(
        &mut self,
        registry: &mut Registry<S, F>,
        event: &InputEvent,
    ) -> bool {
        match *event {
            InputEvent::KeyPress { code, modifiers } => {
                match self.bindings.action_for(code, modifiers) {
                    Some(Action::CycleNext) if self.bindings.holds_modifier(modifiers) => {
                        registry.next();
                    }
                    Some(Action::CyclePrev) if self.bindings.holds_modifier(modifiers) => {
                        registry.prev();
                    }
                    Some(Action::Move(direction)) => {
                        registry.move_selection(direction);
                    }
                    Some(Action::Cancel) => {
                        tracing::debug!("switcher cancelled");
                        self.deactivate(registry);
                    }
                    _ => return self.bindings.is_modifier_key(code),
                }
                true
            }
            InputEvent::KeyRelease { code, .. } => {
                if !self.bindings.is_modifier_key(code) {
                    return false;
                }
                let committed = registry.select(None);
                tracing::debug!(window_id = ?committed, "modifier released");
                self.deactivate(registry);
                true
            }
            InputEvent::Click(window) => {
                match self.click {
                    ClickPolicy::Preview => {
                        if registry.highlight(window) {
                            registry.select(Some(window));
                        }
                    }
                    ClickPolicy::Commit => {
                        if registry.select(Some(window)).is_some() {
                            self.deactivate(registry);
                        }
                    }
                }
                true
            }
            InputEvent::PointerEnter(window) => {
                registry.highlight(window);
                true
            }
        }
    }

    fn deactivate<S: WindowSystem, F: ThumbnailFactory>(&mut self, registry: &mut Registry<S, F>) {
        registry.hide();
        registry.system_mut().ungrab_keyboard();
        self.state = ControllerState::Idle;
        tracing::debug!("switcher deactivated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::Desktop;
    use crate::geometry::Rect;
    use crate::layout::Grid;
    use crate::window::Thumbnail;
    use crossterm::event::ModifierKeyCode;

    struct Plain {
        id: WindowId,
        rect: Rect,
        desktop: Desktop,
    }

    impl Thumbnail for Plain {
        fn id(&self) -> WindowId {
            self.id
        }
        fn rect(&self) -> Rect {
            self.rect
        }
        fn show(&mut self) {}
        fn hide(&mut self) {}
        fn highlight(&mut self, _on: bool) {}
        fn select(&mut self) {
            self.desktop.activate(self.id);
        }
        fn update(&mut self, rect: Rect) {
            self.rect = rect;
        }
    }

    struct PlainFactory(Desktop);

    impl ThumbnailFactory for PlainFactory {
        type Thumbnail = Plain;

        fn make(&mut self, id: WindowId, rect: Rect) -> Plain {
            Plain {
                id,
                rect,
                desktop: self.0.clone(),
            }
        }
    }

    const ALT: KeyModifiers = KeyModifiers::ALT;
    const ALT_KEY: KeyCode = KeyCode::Modifier(ModifierKeyCode::LeftAlt);

    fn setup(n: usize, click: ClickPolicy) -> (Controller, Registry<Desktop, PlainFactory>, Desktop, Vec<WindowId>) {
        let desktop = Desktop::new(Rect::new(0, 0, 800, 600));
        let ids = (0..n).map(|i| desktop.open(format!("w{i}"))).collect();
        let registry = Registry::new(
            desktop.clone(),
            PlainFactory(desktop.clone()),
            Box::new(Grid::default()),
        );
        let controller = Controller::new(Bindings::with_defaults(ALT, KeyCode::Tab), click);
        (controller, registry, desktop, ids)
    }

    #[test]
    fn install_registers_passive_grab() {
        let (ctl, mut reg, desk, _) = setup(0, ClickPolicy::Preview);
        ctl.install(&mut reg);
        assert_eq!(desk.passive_grabs(), vec![(ALT, KeyCode::Tab)]);
    }

    #[test]
    fn action_without_modifier_stays_idle() {
        let (mut ctl, mut reg, desk, _) = setup(2, ClickPolicy::Preview);
        assert!(!ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, KeyModifiers::NONE)));
        assert_eq!(ctl.state(), ControllerState::Idle);
        assert!(!desk.keyboard_grabbed());
        assert!(!reg.is_visible());
    }

    #[test]
    fn full_cycle_commits_window_under_cursor() {
        let (mut ctl, mut reg, desk, ids) = setup(3, ClickPolicy::Preview);
        assert!(ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT)));
        assert!(ctl.is_active());
        assert!(desk.keyboard_grabbed());
        assert_eq!(reg.current(), Some(ids[0]));

        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT));
        assert_eq!(reg.current(), Some(ids[1]));

        assert!(ctl.handle(&mut reg, &InputEvent::release(ALT_KEY, ALT)));
        assert_eq!(ctl.state(), ControllerState::Idle);
        assert!(!desk.keyboard_grabbed());
        assert!(!reg.is_visible());
        assert_eq!(desk.activations(), vec![ids[1]]);
    }

    #[test]
    fn shift_tab_starts_from_the_back() {
        let (mut ctl, mut reg, _desk, ids) = setup(3, ClickPolicy::Preview);
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::BackTab, ALT | KeyModifiers::SHIFT));
        assert_eq!(reg.current(), Some(ids[2]));
    }

    #[test]
    fn releasing_other_keys_keeps_active() {
        let (mut ctl, mut reg, _desk, _) = setup(2, ClickPolicy::Preview);
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT));
        assert!(!ctl.handle(&mut reg, &InputEvent::release(KeyCode::Tab, ALT)));
        let shift = KeyCode::Modifier(ModifierKeyCode::LeftShift);
        assert!(!ctl.handle(&mut reg, &InputEvent::release(shift, ALT)));
        assert!(ctl.is_active());
    }

    #[test]
    fn cancel_closes_without_commit() {
        let (mut ctl, mut reg, desk, _) = setup(2, ClickPolicy::Preview);
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT));
        assert!(ctl.handle(&mut reg, &InputEvent::press(KeyCode::Esc, ALT)));
        assert!(!ctl.is_active());
        assert!(!desk.keyboard_grabbed());
        assert!(desk.activations().is_empty());
        // the release that follows is not ours anymore
        assert!(!ctl.handle(&mut reg, &InputEvent::release(ALT_KEY, ALT)));
        assert!(desk.activations().is_empty());
    }

    #[test]
    fn directional_keys_move_selection() {
        let (mut ctl, mut reg, _desk, ids) = setup(4, ClickPolicy::Preview);
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT));
        // 2x2 grid: ids[0] top-left, ids[1] top-right, ids[2] bottom-left
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Char('l'), ALT));
        assert_eq!(reg.current(), Some(ids[1]));
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Left, ALT));
        assert_eq!(reg.current(), Some(ids[0]));
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Char('j'), ALT));
        assert_eq!(reg.current(), Some(ids[2]));
        // nothing further south
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Down, ALT));
        assert_eq!(reg.current(), Some(ids[2]));
    }

    #[test]
    fn preview_click_stays_active() {
        let (mut ctl, mut reg, desk, ids) = setup(3, ClickPolicy::Preview);
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT));
        assert!(ctl.handle(&mut reg, &InputEvent::Click(ids[2])));
        assert!(ctl.is_active());
        assert_eq!(reg.current(), Some(ids[2]));
        assert_eq!(desk.activations(), vec![ids[2]]);
    }

    #[test]
    fn commit_click_returns_to_idle() {
        let (mut ctl, mut reg, desk, ids) = setup(3, ClickPolicy::Commit);
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT));
        assert!(ctl.handle(&mut reg, &InputEvent::Click(ids[1])));
        assert!(!ctl.is_active());
        assert!(!reg.is_visible());
        assert_eq!(desk.activations(), vec![ids[1]]);
    }

    #[test]
    fn commit_click_on_vanished_window_is_a_noop() {
        let (mut ctl, mut reg, desk, ids) = setup(2, ClickPolicy::Commit);
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT));
        desk.close(ids[1]);
        reg.resync();
        assert!(ctl.handle(&mut reg, &InputEvent::Click(ids[1])));
        assert!(ctl.is_active());
        assert!(desk.activations().is_empty());
    }

    #[test]
    fn pointer_enter_highlights() {
        let (mut ctl, mut reg, _desk, ids) = setup(3, ClickPolicy::Preview);
        assert!(!ctl.handle(&mut reg, &InputEvent::PointerEnter(ids[1])));
        ctl.handle(&mut reg, &InputEvent::press(KeyCode::Tab, ALT));
        assert!(ctl.handle(&mut reg, &InputEvent::PointerEnter(ids[1])));
        assert_eq!(reg.current(), Some(ids[1]));
    }
}
