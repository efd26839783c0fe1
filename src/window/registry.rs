//! Thumbnail registry: keeps one thumbnail per managed window and a stable
//! selection while windows come and go.
//!
//! After every resync the thumbnail keys equal the window system's stacking
//! order, the order holds no duplicates, and the cursor points into it
//! whenever it is non-empty. While visible exactly one thumbnail, the one
//! under the cursor, is highlighted.

use std::collections::{BTreeMap, BTreeSet};

use super::{CyclicCursor, Thumbnail, ThumbnailFactory};
use crate::error::NavMiss;
use crate::geometry::{Point, Rect, WindowId};
use crate::layout::{Arrange, Direction, nearest};
use crate::notify::{SubscriptionId, Subscribers};
use crate::system::{Atom, Notification, WindowSystem};

/// Used when the pointer or its screen cannot be determined.
pub const FALLBACK_SCREEN: Rect = Rect::new(0, 0, 800, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    Shown,
    Hidden,
    Resynced {
        windows: usize,
        created: usize,
        removed: usize,
    },
    Highlighted(WindowId),
    Selected(WindowId),
}

pub struct Registry<S: WindowSystem, F: ThumbnailFactory> {
    system: S,
    factory: F,
    arrange: Box<dyn Arrange>,
    windows: Vec<WindowId>,
    thumbnails: BTreeMap<WindowId, F::Thumbnail>,
    cursor: CyclicCursor,
    current: Option<WindowId>,
    lookahead: Option<WindowId>,
    visible: bool,
    events: Subscribers<RegistryEvent>,
}

impl<S: WindowSystem, F: ThumbnailFactory> Registry<S, F> {
    pub fn new(system: S, factory: F, arrange: Box<dyn Arrange>) -> Self {
        Self {
            system,
            factory,
            arrange,
            windows: Vec::new(),
            thumbnails: BTreeMap::new(),
            cursor: CyclicCursor::new(),
            current: None,
            lookahead: None,
            visible: false,
            events: Subscribers::new(),
        }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut S {
        &mut self.system
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Window under the cursor.
    pub fn current(&self) -> Option<WindowId> {
        self.current
    }

    /// Window one step ahead of the cursor; the repair target if the current
    /// window disappears.
    pub fn lookahead(&self) -> Option<WindowId> {
        self.lookahead
    }

    /// Tracked windows in stacking order.
    pub fn windows(&self) -> &[WindowId] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn thumbnail(&self, id: WindowId) -> Option<&F::Thumbnail> {
        self.thumbnails.get(&id)
    }

    pub fn thumbnails(&self) -> impl Iterator<Item = &F::Thumbnail> {
        self.windows.iter().filter_map(|id| self.thumbnails.get(id))
    }

    pub fn subscribe<H>(&mut self, handler: H) -> SubscriptionId
    where
        H: FnMut(&RegistryEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.resync();

        if let Some(previous) = self.current {
            self.paint(previous, false);
        }
        self.cursor.reset();
        self.refresh_targets();
        if let Some(first) = self.current {
            self.paint(first, true);
        }
        tracing::debug!(windows = self.windows.len(), current = ?self.current, "switcher shown");
        self.events.emit(&RegistryEvent::Shown);
    }

    /// Hides and un-highlights every thumbnail. Thumbnails stay alive until
    /// the next resync.
    pub fn hide(&mut self) {
        self.visible = false;
        for thumbnail in self.thumbnails.values_mut() {
            thumbnail.hide();
            thumbnail.highlight(false);
        }
        tracing::debug!("switcher hidden");
        self.events.emit(&RegistryEvent::Hidden);
    }

    /// Re-reads the stacking order, creates, moves and drops thumbnails to
    /// match it, then repairs the selection.
    pub fn resync(&mut self) {
        let mut seen = BTreeSet::new();
        let order: Vec<WindowId> = self
            .system
            .stacking_order()
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        let rects = self.arrange.arrange(self.current_screen(), order.len());

        let before = self.thumbnails.len();
        self.thumbnails.retain(|id, _| seen.contains(id));
        let removed = before - self.thumbnails.len();

        let mut created = 0;
        for (slot, id) in order.iter().enumerate() {
            let rect = rects.get(slot).copied().unwrap_or_default();
            match self.thumbnails.get_mut(id) {
                Some(thumbnail) => thumbnail.update(rect),
                None => {
                    let thumbnail = self.factory.make(*id, rect);
                    self.thumbnails.insert(*id, thumbnail);
                    created += 1;
                }
            }
        }

        self.windows = order;
        self.repair();

        tracing::debug!(
            windows = self.windows.len(),
            created,
            removed,
            current = ?self.current,
            "resynced thumbnails"
        );
        self.events.emit(&RegistryEvent::Resynced {
            windows: self.windows.len(),
            created,
            removed,
        });
    }

    /// Keeps the cursor on the previous window if it survived, else on the
    /// predicted next one, else on the first window.
    fn repair(&mut self) {
        let kept = self
            .current
            .is_some_and(|id| self.cursor.seek(&self.windows, id));
        let predicted = !kept
            && self
                .lookahead
                .is_some_and(|id| self.cursor.seek(&self.windows, id));
        if !kept && !predicted {
            self.cursor.reset();
        }
        self.refresh_targets();

        if self.visible {
            for thumbnail in self.thumbnails.values_mut() {
                thumbnail.show();
                thumbnail.highlight(false);
            }
            if let Some(current) = self.current {
                self.paint(current, true);
            }
        }
    }

    pub fn next(&mut self) -> Option<WindowId> {
        self.step(true)
    }

    pub fn prev(&mut self) -> Option<WindowId> {
        self.step(false)
    }

    fn step(&mut self, forward: bool) -> Option<WindowId> {
        let Some(from) = self.current else {
            tracing::trace!(miss = %NavMiss::EmptyRegistry, "cycle ignored");
            return None;
        };
        self.paint(from, false);
        if forward {
            self.cursor.next(&self.windows);
        } else {
            self.cursor.prev(&self.windows);
        }
        self.refresh_targets();
        let to = self.current?;
        self.paint(to, true);
        self.events.emit(&RegistryEvent::Highlighted(to));
        Some(to)
    }

    /// Commits `window`, or the window under the cursor for `None`.
    ///
    /// Returns the committed window; an id that is no longer tracked makes
    /// this a no-op.
    pub fn select(&mut self, window: Option<WindowId>) -> Option<WindowId> {
        let target = match window {
            Some(id) => id,
            None => match self.cursor.current(&self.windows) {
                Some(id) => id,
                None => {
                    tracing::trace!(miss = %NavMiss::EmptyRegistry, "select ignored");
                    return None;
                }
            },
        };
        match self.thumbnails.get_mut(&target) {
            Some(thumbnail) => {
                thumbnail.select();
                tracing::debug!(window_id = %target, "selected window");
                self.events.emit(&RegistryEvent::Selected(target));
                Some(target)
            }
            None => {
                tracing::trace!(miss = %NavMiss::StaleReference(target), "select ignored");
                None
            }
        }
    }

    /// Moves the cursor onto `window`, e.g. for pointer interaction.
    pub fn highlight(&mut self, window: WindowId) -> bool {
        if !self.thumbnails.contains_key(&window) {
            tracing::trace!(miss = %NavMiss::StaleReference(window), "highlight ignored");
            return false;
        }
        if let Some(previous) = self.current {
            self.paint(previous, false);
        }
        self.cursor.seek(&self.windows, window);
        self.refresh_targets();
        if let Some(current) = self.current {
            self.paint(current, true);
            self.events.emit(&RegistryEvent::Highlighted(current));
        }
        true
    }

    /// Highlights the nearest thumbnail in `direction` from the current one.
    pub fn move_selection(&mut self, direction: Direction) -> Option<WindowId> {
        let target = match self.directional_target(direction) {
            Ok(target) => target,
            Err(miss) => {
                tracing::trace!(%miss, "directional move ignored");
                return None;
            }
        };
        self.highlight(target).then_some(target)
    }

    fn directional_target(&self, direction: Direction) -> Result<WindowId, NavMiss> {
        let current = self.current.ok_or(NavMiss::EmptyRegistry)?;
        let origin = self
            .thumbnails
            .get(&current)
            .map(|thumbnail| thumbnail.rect())
            .ok_or(NavMiss::StaleReference(current))?;
        let candidates = self
            .windows
            .iter()
            .filter(|id| **id != current)
            .filter_map(|id| self.thumbnails.get(id).map(|t| (*id, t.rect())));
        nearest(&origin, candidates, direction)
            .ok_or(NavMiss::NoDirectionalCandidate(direction))
    }

    /// Every property change is consumed. Only a stacking change on the root
    /// window resyncs, and only while visible; `show` resyncs anyway.
    pub fn handle_notification(&mut self, notification: &Notification) -> bool {
        if notification.window == self.system.root()
            && notification.atom == Atom::ClientListStacking
        {
            if self.visible {
                self.resync();
            } else {
                tracing::trace!("stacking change while hidden");
            }
        }
        true
    }

    /// Top-most thumbnail under `point` while visible.
    pub fn window_at(&self, point: Point) -> Option<WindowId> {
        if !self.visible {
            return None;
        }
        self.windows.iter().rev().copied().find(|id| {
            self.thumbnails
                .get(id)
                .is_some_and(|thumbnail| thumbnail.rect().contains(point))
        })
    }

    fn current_screen(&self) -> Rect {
        self.system
            .query_pointer()
            .and_then(|pointer| self.system.current_screen(pointer))
            .unwrap_or(FALLBACK_SCREEN)
    }

    fn refresh_targets(&mut self) {
        self.current = self.cursor.current(&self.windows);
        self.lookahead = self.cursor.peek(&self.windows, 1);
    }

    /// Turning a highlight on only happens while visible.
    fn paint(&mut self, id: WindowId, on: bool) {
        if on && !self.visible {
            return;
        }
        match self.thumbnails.get_mut(&id) {
            Some(thumbnail) => thumbnail.highlight(on),
            None => tracing::trace!(miss = %NavMiss::StaleReference(id), "paint ignored"),
        }
    }
}
