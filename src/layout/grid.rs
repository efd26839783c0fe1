use crate::geometry::Rect;

/// Produces one rectangle per slot, index-aligned with the stacking order.
pub trait Arrange {
    fn arrange(&self, screen: Rect, count: usize) -> Vec<Rect>;
}

/// Row-major grid that fills the screen with near-square cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Space left around every thumbnail inside its cell.
    pub gap: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Self { gap: 8 }
    }
}

impl Grid {
    pub fn new(gap: u32) -> Self {
        Self { gap }
    }

    /// Columns and rows for `count` slots. The grid grows columns first.
    pub fn dimensions(count: usize) -> (usize, usize) {
        if count == 0 {
            return (0, 0);
        }
        let mut columns = 1;
        while columns * columns < count {
            columns += 1;
        }
        let rows = count.div_ceil(columns);
        (columns, rows)
    }
}

impl Arrange for Grid {
    fn arrange(&self, screen: Rect, count: usize) -> Vec<Rect> {
        let (columns, rows) = Self::dimensions(count);
        if count == 0 {
            return Vec::new();
        }
        let cell_w = screen.width / columns as u32;
        let cell_h = screen.height / rows as u32;
        let inset_w = cell_w.saturating_sub(self.gap.saturating_mul(2));
        let inset_h = cell_h.saturating_sub(self.gap.saturating_mul(2));
        // keep the gap only when the cell is large enough to hold it
        let (pad, width, height) = if inset_w == 0 || inset_h == 0 {
            (0, cell_w, cell_h)
        } else {
            (self.gap as i32, inset_w, inset_h)
        };

        (0..count)
            .map(|slot| {
                let col = (slot % columns) as i32;
                let row = (slot / columns) as i32;
                Rect {
                    x: screen.x + col * cell_w as i32 + pad,
                    y: screen.y + row * cell_h as i32 + pad,
                    width,
                    height,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_grow_columns_first() {
        assert_eq!(Grid::dimensions(0), (0, 0));
        assert_eq!(Grid::dimensions(1), (1, 1));
        assert_eq!(Grid::dimensions(2), (2, 1));
        assert_eq!(Grid::dimensions(3), (2, 2));
        assert_eq!(Grid::dimensions(5), (3, 2));
        assert_eq!(Grid::dimensions(9), (3, 3));
        assert_eq!(Grid::dimensions(10), (4, 3));
    }

    #[test]
    fn arrange_returns_one_rect_per_slot() {
        let screen = Rect::new(100, 50, 800, 600);
        let rects = Grid::new(10).arrange(screen, 3);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0], Rect::new(110, 60, 380, 280));
        assert_eq!(rects[1], Rect::new(510, 60, 380, 280));
        assert_eq!(rects[2], Rect::new(110, 360, 380, 280));
    }

    #[test]
    fn tiny_screen_drops_the_gap() {
        let rects = Grid::new(8).arrange(Rect::new(0, 0, 12, 6), 4);
        assert_eq!(rects[3], Rect::new(6, 3, 6, 3));
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(Grid::default().arrange(Rect::new(0, 0, 10, 10), 0).is_empty());
    }
}
