use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::controller::InputEvent;
use crate::geometry::{Point, WindowId};
use crate::system::WindowSystem;
use crate::window::{Registry, ThumbnailFactory};

/// Hit-tests pointer events against the visible thumbnails.
///
/// Terminal cells are used as window-system coordinates, so a thumbnail at
/// `Rect { x: 4, y: 2, .. }` starts at column 4, row 2.
#[derive(Debug, Default)]
pub struct PointerTracker {
    hovered: Option<WindowId>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<WindowId> {
        self.hovered
    }

    /// Left clicks become `Click`, moving onto a different thumbnail becomes
    /// `PointerEnter`. Everything else is dropped.
    pub fn translate<S: WindowSystem, F: ThumbnailFactory>(
        &mut self,
        registry: &Registry<S, F>,
        mouse: MouseEvent,
    ) -> Option<InputEvent> {
        let point = Point::new(i32::from(mouse.column), i32::from(mouse.row));
        let under = registry.window_at(point);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.hovered = under;
                under.map(InputEvent::Click)
            }
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if under == self.hovered {
                    return None;
                }
                self.hovered = under;
                under.map(InputEvent::PointerEnter)
            }
            _ => None,
        }
    }
}
