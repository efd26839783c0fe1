//! Nearest-neighbor choice in a cardinal direction.
//!
//! Centers are taken in a frame where Y grows upward, so "north" means a
//! smaller screen Y. Each direction accepts a closed sector of 3π/4 around its
//! axis; neighbouring sectors overlap by π/4, so a diagonal candidate can
//! qualify for two directions. Among accepted candidates the closest center
//! wins, first one on equal distance.

use std::f64::consts::{FRAC_PI_8, TAU};
use std::fmt;

use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    North,
    West,
    South,
}

impl Direction {
    /// Whether `angle` (radians in `[0, 2π)`) lies in this direction's sector.
    pub fn accepts(self, angle: f64) -> bool {
        match self {
            // 0°..=67.5° or >= 292.5°
            Direction::East => {
                (0.0..=3.0 * FRAC_PI_8).contains(&angle) || angle >= 13.0 * FRAC_PI_8
            }
            // 22.5°..=157.5°
            Direction::North => (FRAC_PI_8..=7.0 * FRAC_PI_8).contains(&angle),
            // 112.5°..=247.5°
            Direction::West => (5.0 * FRAC_PI_8..=11.0 * FRAC_PI_8).contains(&angle),
            // 202.5°..=337.5°
            Direction::South => (9.0 * FRAC_PI_8..=15.0 * FRAC_PI_8).contains(&angle),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::East => "east",
            Direction::North => "north",
            Direction::West => "west",
            Direction::South => "south",
        };
        write!(f, "{}", s)
    }
}

/// Center of `rect` with the Y axis flipped to grow upward.
fn upward_center(rect: &Rect) -> (f64, f64) {
    let (x, y) = rect.center();
    (x, -y)
}

/// Angle in `[0, 2π)` of the vector from `from`'s center to `to`'s center.
pub fn angle_between(from: &Rect, to: &Rect) -> f64 {
    let (x1, y1) = upward_center(from);
    let (x2, y2) = upward_center(to);
    let angle = (y2 - y1).atan2(x2 - x1);
    if angle < 0.0 {
        // a tiny negative angle rounds up to exactly 2π
        (angle + TAU).rem_euclid(TAU)
    } else {
        angle
    }
}

pub fn distance_between(from: &Rect, to: &Rect) -> f64 {
    let (x1, y1) = upward_center(from);
    let (x2, y2) = upward_center(to);
    (x2 - x1).hypot(y2 - y1)
}

/// Closest candidate whose center lies in `direction` from `origin`.
///
/// The caller leaves the origin itself out of `candidates`.
pub fn nearest<T, I>(origin: &Rect, candidates: I, direction: Direction) -> Option<T>
where
    I: IntoIterator<Item = (T, Rect)>,
{
    let mut best: Option<(T, f64)> = None;
    for (id, rect) in candidates {
        if !direction.accepts(angle_between(origin, &rect)) {
            continue;
        }
        let distance = distance_between(origin, &rect);
        match &best {
            Some((_, min)) if distance >= *min => {}
            _ => best = Some((id, distance)),
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// 100x100 rect centered on (cx, cy) in screen coordinates.
    fn at(cx: i32, cy: i32) -> Rect {
        Rect::new(cx - 50, cy - 50, 100, 100)
    }

    #[test]
    fn screen_up_is_north() {
        let origin = at(0, 0);
        let candidates = [(1, at(100, 0)), (2, at(0, -100))];
        assert_eq!(nearest(&origin, candidates, Direction::East), Some(1));
        assert_eq!(nearest(&origin, candidates, Direction::North), Some(2));
        assert_eq!(nearest(&origin, candidates, Direction::West), None);
        assert_eq!(nearest(&origin, candidates, Direction::South), None);
    }

    #[test]
    fn closest_accepted_candidate_wins() {
        let origin = at(0, 0);
        let candidates = [(1, at(300, 0)), (2, at(120, 40)), (3, at(-50, 0))];
        assert_eq!(nearest(&origin, candidates, Direction::East), Some(2));
        assert_eq!(nearest(&origin, candidates, Direction::West), Some(3));
    }

    #[test]
    fn diagonal_qualifies_for_two_directions() {
        let origin = at(0, 0);
        // 45° up and to the right
        let candidates = [(7, at(100, -100))];
        assert_eq!(nearest(&origin, candidates, Direction::East), Some(7));
        assert_eq!(nearest(&origin, candidates, Direction::North), Some(7));
        assert_eq!(nearest(&origin, candidates, Direction::South), None);
    }

    #[test]
    fn equal_distance_keeps_first() {
        let origin = at(0, 0);
        let candidates = [(1, at(100, 10)), (2, at(100, -10))];
        assert_eq!(nearest(&origin, candidates, Direction::East), Some(1));
    }

    #[test]
    fn sector_bounds_are_closed() {
        assert!(Direction::East.accepts(0.0));
        assert!(Direction::East.accepts(3.0 * FRAC_PI_8));
        assert!(Direction::East.accepts(13.0 * FRAC_PI_8));
        assert!(!Direction::East.accepts(PI / 2.0));
        assert!(Direction::North.accepts(FRAC_PI_8));
        assert!(Direction::North.accepts(7.0 * FRAC_PI_8));
        assert!(Direction::West.accepts(PI));
        assert!(Direction::South.accepts(3.0 * PI / 2.0));
        assert!(!Direction::South.accepts(PI));
    }

    #[test]
    fn angle_is_normalized() {
        let origin = at(0, 0);
        let below = angle_between(&origin, &at(0, 100));
        assert!((below - 3.0 * PI / 2.0).abs() < 1e-9);
        assert!((0.0..TAU).contains(&angle_between(&origin, &at(100, 1))));
    }
}
