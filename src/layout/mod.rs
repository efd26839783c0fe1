pub mod direction;
pub mod grid;

pub use direction::{Direction, angle_between, distance_between, nearest};
pub use grid::{Arrange, Grid};
