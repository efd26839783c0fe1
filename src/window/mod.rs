pub mod cursor;
pub mod registry;

pub use cursor::CyclicCursor;
pub use registry::{Registry, RegistryEvent};

use crate::geometry::{Rect, WindowId};

/// On-screen proxy for one window.
///
/// The registry owns every thumbnail exclusively and drives it only through
/// this trait, so rendering backends and test doubles are interchangeable.
pub trait Thumbnail {
    fn id(&self) -> WindowId;
    fn rect(&self) -> Rect;
    fn show(&mut self);
    fn hide(&mut self);
    fn highlight(&mut self, on: bool);
    /// Commit: make the proxied window the active one.
    fn select(&mut self);
    /// Move/resize to a new slot.
    fn update(&mut self, rect: Rect);
}

impl<T: Thumbnail + ?Sized> Thumbnail for Box<T> {
    fn id(&self) -> WindowId {
        (**self).id()
    }

    fn rect(&self) -> Rect {
        (**self).rect()
    }

    fn show(&mut self) {
        (**self).show()
    }

    fn hide(&mut self) {
        (**self).hide()
    }

    fn highlight(&mut self, on: bool) {
        (**self).highlight(on)
    }

    fn select(&mut self) {
        (**self).select()
    }

    fn update(&mut self, rect: Rect) {
        (**self).update(rect)
    }
}

pub trait ThumbnailFactory {
    type Thumbnail: Thumbnail;

    fn make(&mut self, id: WindowId, rect: Rect) -> Self::Thumbnail;
}
