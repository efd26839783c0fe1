use crate::controller::{ClickPolicy, Controller, ControllerState, InputEvent};
use crate::keybindings::Bindings;
use crate::layout::Arrange;
use crate::system::{Notification, WindowSystem};
use crate::window::{Registry, ThumbnailFactory};

/// Everything the switcher reacts to, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchEvent {
    Notification(Notification),
    Input(InputEvent),
}

impl From<Notification> for SwitchEvent {
    fn from(notification: Notification) -> Self {
        Self::Notification(notification)
    }
}

impl From<InputEvent> for SwitchEvent {
    fn from(input: InputEvent) -> Self {
        Self::Input(input)
    }
}

/// Registry plus controller behind a single dispatch point.
///
/// Events are handled one at a time to completion, so a stacking change that
/// arrives between two key presses is fully reconciled before the second key
/// is looked at.
pub struct Switcher<S: WindowSystem, F: ThumbnailFactory> {
    registry: Registry<S, F>,
    controller: Controller,
}

impl<S: WindowSystem, F: ThumbnailFactory> Switcher<S, F> {
    /// Builds the registry and installs the activation grab.
    pub fn new(
        system: S,
        factory: F,
        arrange: Box<dyn Arrange>,
        bindings: Bindings,
        click: ClickPolicy,
    ) -> Self {
        let mut registry = Registry::new(system, factory, arrange);
        let controller = Controller::new(bindings, click);
        controller.install(&mut registry);
        Self {
            registry,
            controller,
        }
    }

    pub fn registry(&self) -> &Registry<S, F> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry<S, F> {
        &mut self.registry
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    /// Returns whether the event was consumed.
    pub fn dispatch(&mut self, event: &SwitchEvent) -> bool {
        match event {
            SwitchEvent::Notification(notification) => {
                self.registry.handle_notification(notification)
            }
            SwitchEvent::Input(input) => self.controller.handle(&mut self.registry, input),
        }
    }

    /// Dispatches every event in order and returns how many were consumed.
    pub fn dispatch_all<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = SwitchEvent>,
    {
        events
            .into_iter()
            .filter(|event| self.dispatch(event))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::Desktop;
    use crate::geometry::{Rect, WindowId};
    use crate::layout::Grid;
    use crate::window::Thumbnail;
    use crossterm::event::{KeyCode, KeyModifiers, ModifierKeyCode};

    struct Tile(WindowId, Rect, Desktop);

    impl Thumbnail for Tile {
        fn id(&self) -> WindowId {
            self.0
        }
        fn rect(&self) -> Rect {
            self.1
        }
        fn show(&mut self) {}
        fn hide(&mut self) {}
        fn highlight(&mut self, _on: bool) {}
        fn select(&mut self) {
            self.2.activate(self.0);
        }
        fn update(&mut self, rect: Rect) {
            self.1 = rect;
        }
    }

    struct Tiles(Desktop);

    impl ThumbnailFactory for Tiles {
        type Thumbnail = Tile;

        fn make(&mut self, id: WindowId, rect: Rect) -> Tile {
            Tile(id, rect, self.0.clone())
        }
    }

    fn switcher(desktop: &Desktop) -> Switcher<Desktop, Tiles> {
        Switcher::new(
            desktop.clone(),
            Tiles(desktop.clone()),
            Box::new(Grid::default()),
            Bindings::default(),
            ClickPolicy::Preview,
        )
    }

    fn press(code: KeyCode) -> SwitchEvent {
        InputEvent::press(code, KeyModifiers::SUPER).into()
    }

    #[test]
    fn new_installs_activation_grab() {
        let desktop = Desktop::new(Rect::new(0, 0, 800, 600));
        let sw = switcher(&desktop);
        assert_eq!(desktop.passive_grabs(), vec![(KeyModifiers::SUPER, KeyCode::Tab)]);
        assert_eq!(sw.state(), ControllerState::Idle);
    }

    #[test]
    fn notification_between_key_presses_is_reconciled_first() {
        let desktop = Desktop::new(Rect::new(0, 0, 800, 600));
        let a = desktop.open("a");
        let b = desktop.open("b");
        let c = desktop.open("c");
        let mut sw = switcher(&desktop);
        desktop.take_notifications();

        sw.dispatch(&press(KeyCode::Tab));
        sw.dispatch(&press(KeyCode::Tab));
        assert_eq!(sw.registry().current(), Some(b));

        desktop.close(b);
        let mut events: Vec<SwitchEvent> = desktop
            .take_notifications()
            .into_iter()
            .map(SwitchEvent::from)
            .collect();
        events.push(
            InputEvent::release(
                KeyCode::Modifier(ModifierKeyCode::LeftSuper),
                KeyModifiers::SUPER,
            )
            .into(),
        );
        assert_eq!(sw.dispatch_all(events), 2);

        assert_eq!(desktop.activations(), vec![c]);
        assert!(!sw.is_active());
        assert_eq!(sw.registry().windows(), &[a, c]);
    }
}
