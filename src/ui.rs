//! Terminal rendering of the switcher.
//!
//! Thumbnails do not draw themselves. Each `TuiThumbnail` records its slot,
//! visibility and highlight in a shared `Scene`, and `render_scene` paints the
//! scene once per frame. Window-system coordinates are terminal cells.
//!
//! Everything is drawn through `UiFrame`, a thin wrapper around
//! `ratatui::Frame` that clips every draw call to the visible area, so a slot
//! that drifts outside the terminal after a resize never writes out of
//! bounds.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Widget};

use crate::desktop::Desktop;
use crate::geometry::{Rect, WindowId};
use crate::system::WindowSystem;
use crate::window::{Thumbnail, ThumbnailFactory};

/// Wrapper around `ratatui::Frame` that clamps drawing to the visible area.
pub struct UiFrame<'a> {
    area: CellRect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer.
    pub fn from_parts(area: CellRect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> CellRect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: CellRect) -> Option<CellRect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: CellRect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: CellRect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    if available == 0 {
        return;
    }
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

/// Converts a window-system rectangle into terminal cells, dropping the part
/// left of or above the origin.
pub fn to_cells(rect: Rect) -> CellRect {
    let clamp = |v: i64| v.clamp(0, i64::from(u16::MAX)) as u16;
    let x0 = i64::from(rect.x);
    let y0 = i64::from(rect.y);
    let x1 = x0 + i64::from(rect.width);
    let y1 = y0 + i64::from(rect.height);
    let x = clamp(x0);
    let y = clamp(y0);
    CellRect {
        x,
        y,
        width: clamp(x1).saturating_sub(x),
        height: clamp(y1).saturating_sub(y),
    }
}

/// Per-window drawing state shared between thumbnails and the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    pub rect: Rect,
    pub visible: bool,
    pub highlighted: bool,
}

/// Shared handle; clones see the same tiles.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    tiles: Rc<RefCell<BTreeMap<WindowId, Tile>>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile(&self, id: WindowId) -> Option<Tile> {
        self.tiles.borrow().get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.borrow().is_empty()
    }

    pub fn highlighted(&self) -> Vec<WindowId> {
        self.tiles
            .borrow()
            .iter()
            .filter(|(_, tile)| tile.highlighted)
            .map(|(id, _)| *id)
            .collect()
    }

    fn insert(&self, id: WindowId, tile: Tile) {
        self.tiles.borrow_mut().insert(id, tile);
    }

    fn remove(&self, id: WindowId) {
        self.tiles.borrow_mut().remove(&id);
    }

    fn with(&self, id: WindowId, f: impl FnOnce(&mut Tile)) {
        if let Some(tile) = self.tiles.borrow_mut().get_mut(&id) {
            f(tile);
        }
    }
}

pub struct TuiThumbnail {
    id: WindowId,
    scene: Scene,
    desktop: Desktop,
}

impl Thumbnail for TuiThumbnail {
    fn id(&self) -> WindowId {
        self.id
    }

    fn rect(&self) -> Rect {
        self.scene.tile(self.id).map(|tile| tile.rect).unwrap_or_default()
    }

    fn show(&mut self) {
        self.scene.with(self.id, |tile| tile.visible = true);
    }

    fn hide(&mut self) {
        self.scene.with(self.id, |tile| tile.visible = false);
    }

    fn highlight(&mut self, on: bool) {
        self.scene.with(self.id, |tile| tile.highlighted = on);
    }

    fn select(&mut self) {
        self.desktop.activate(self.id);
    }

    fn update(&mut self, rect: Rect) {
        self.scene.with(self.id, |tile| tile.rect = rect);
    }
}

impl Drop for TuiThumbnail {
    fn drop(&mut self) {
        self.scene.remove(self.id);
    }
}

pub struct TuiThumbnailFactory {
    scene: Scene,
    desktop: Desktop,
}

impl TuiThumbnailFactory {
    pub fn new(scene: Scene, desktop: Desktop) -> Self {
        Self { scene, desktop }
    }
}

impl ThumbnailFactory for TuiThumbnailFactory {
    type Thumbnail = TuiThumbnail;

    fn make(&mut self, id: WindowId, rect: Rect) -> TuiThumbnail {
        self.scene.insert(
            id,
            Tile {
                rect,
                ..Tile::default()
            },
        );
        TuiThumbnail {
            id,
            scene: self.scene.clone(),
            desktop: self.desktop.clone(),
        }
    }
}

/// Paints the visible tiles of `order` as bordered blocks titled with the
/// window name. The highlighted tile gets a thick yellow border.
pub fn render_scene(frame: &mut UiFrame<'_>, scene: &Scene, desktop: &Desktop, order: &[WindowId]) {
    let active = desktop.active();
    for id in order {
        let Some(tile) = scene.tile(*id) else {
            continue;
        };
        if !tile.visible {
            continue;
        }
        let area = to_cells(tile.rect);
        let title = desktop.title(*id).unwrap_or_default();
        let (border, border_style) = if tile.highlighted {
            (
                BorderType::Thick,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (BorderType::Plain, Style::default().fg(Color::DarkGray))
        };
        let block = Block::bordered()
            .border_type(border)
            .border_style(border_style)
            .title(Line::from(format!(" {title} ")));
        let mut lines = vec![Line::from(id.to_string())];
        if active == Some(*id) {
            lines.push(Line::from("active"));
        }
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Idle view: the stacking order, top-most first.
pub fn render_desktop(frame: &mut UiFrame<'_>, area: CellRect, desktop: &Desktop) {
    let active = desktop.active();
    let lines: Vec<Line> = desktop
        .windows()
        .iter()
        .rev()
        .map(|window| {
            let marker = if active == Some(window.id) { '*' } else { ' ' };
            Line::from(format!("{marker} {} {}", window.id, window.title))
        })
        .collect();
    let block = Block::bordered().title(Line::from(format!(" desktop ({}) ", lines.len())));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// One-line bar with text pinned left and right.
#[derive(Debug, Default)]
pub struct StatusBar {
    left: String,
    right: String,
    style: Style,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_left<T: Into<String>>(&mut self, value: T) {
        self.left = value.into();
    }

    pub fn set_right<T: Into<String>>(&mut self, value: T) {
        self.right = value.into();
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, area: CellRect) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let y = area.y;
        let x = area.x;
        let width = area.width as usize;
        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }

        let left = truncate_to_width(&self.left, width);
        safe_set_string(buffer, bounds, x, y, &left, self.style);

        if !self.right.is_empty() {
            let right = truncate_to_width(&self.right, width);
            let right_width = right.chars().count();
            if right_width < width {
                let start_x = x.saturating_add((width - right_width) as u16);
                safe_set_string(buffer, bounds, start_x, y, &right, self.style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Grid;
    use crate::window::Registry;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn truncate_to_width_short_and_long() {
        assert_eq!(truncate_to_width("abc", 5), "abc");
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
    }

    #[test]
    fn safe_set_string_writes_within_bounds() {
        let bounds = CellRect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(bounds);
        safe_set_string(&mut buf, bounds, 1, 0, "hello", Style::default());
        assert_eq!(buf[(1, 0)].symbol(), "h");

        // outside bounds should be ignored (no panic)
        safe_set_string(&mut buf, bounds, 100, 0, "x", Style::default());
    }

    #[test]
    fn render_widget_clips_to_frame_area() {
        let area = CellRect::new(0, 0, 5, 3);
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);

        struct FillWidget;
        impl Widget for FillWidget {
            fn render(self, area: CellRect, buf: &mut Buffer) {
                for y in area.y..area.y.saturating_add(area.height) {
                    for x in area.x..area.x.saturating_add(area.width) {
                        if let Some(cell) = buf.cell_mut((x, y)) {
                            cell.set_symbol("A");
                        }
                    }
                }
            }
        }

        // partially past the right edge
        ui.render_widget(FillWidget, CellRect::new(3, 1, 5, 2));
        assert_eq!(buf[(3, 1)].symbol(), "A");
        assert_eq!(buf[(2, 1)].symbol(), " ");
    }

    #[test]
    fn to_cells_clamps_negative_origin() {
        assert_eq!(to_cells(Rect::new(-2, 1, 5, 3)), CellRect::new(0, 1, 3, 3));
        assert_eq!(to_cells(Rect::new(-10, -10, 5, 5)).area(), 0);
    }

    #[test]
    fn thumbnails_write_through_to_scene() {
        let desktop = Desktop::new(Rect::new(0, 0, 40, 12));
        let a = desktop.open("alpha");
        let b = desktop.open("beta");
        let scene = Scene::new();
        let mut reg = Registry::new(
            desktop.clone(),
            TuiThumbnailFactory::new(scene.clone(), desktop.clone()),
            Box::new(Grid::new(0)),
        );
        reg.show();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.highlighted(), vec![a]);
        assert_eq!(scene.tile(b).map(|t| t.rect), Some(Rect::new(20, 0, 20, 12)));

        reg.select(Some(b));
        assert_eq!(desktop.active(), Some(b));

        desktop.close(a);
        reg.resync();
        assert!(scene.tile(a).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn render_scene_draws_highlighted_tile() {
        let desktop = Desktop::new(Rect::new(0, 0, 40, 12));
        desktop.open("alpha");
        desktop.open("beta");
        let scene = Scene::new();
        let mut reg = Registry::new(
            desktop.clone(),
            TuiThumbnailFactory::new(scene.clone(), desktop.clone()),
            Box::new(Grid::new(0)),
        );
        reg.show();

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|frame| {
                let mut ui = UiFrame::new(frame);
                render_scene(&mut ui, &scene, &desktop, reg.windows());
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let top = row(buffer, 0);
        assert!(top.contains("alpha"));
        assert!(top.contains("beta"));
        // thick border marks the highlighted tile
        assert_eq!(buffer[(0, 0)].symbol(), "┏");
        assert_eq!(buffer[(20, 0)].symbol(), "┌");
    }

    #[test]
    fn hidden_tiles_are_not_drawn() {
        let desktop = Desktop::new(Rect::new(0, 0, 20, 6));
        desktop.open("alpha");
        let scene = Scene::new();
        let mut reg = Registry::new(
            desktop.clone(),
            TuiThumbnailFactory::new(scene.clone(), desktop.clone()),
            Box::new(Grid::new(0)),
        );
        reg.show();
        reg.hide();

        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        terminal
            .draw(|frame| {
                let mut ui = UiFrame::new(frame);
                render_scene(&mut ui, &scene, &desktop, reg.windows());
            })
            .unwrap();
        assert!(row(terminal.backend().buffer(), 0).trim().is_empty());
    }

    #[test]
    fn status_bar_pins_right_text() {
        let area = CellRect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        let mut bar = StatusBar::new();
        bar.set_left("idle");
        bar.set_right("3 windows");
        bar.render(&mut ui, area);
        let line = row(&buf, 0);
        assert!(line.starts_with("idle"));
        assert!(line.ends_with("3 windows"));
    }
}
