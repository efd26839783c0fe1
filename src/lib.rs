//! Navigation and synchronization core of a keyboard-driven window switcher.
//!
//! The [`window::Registry`] mirrors the window system's stacking order as a
//! set of thumbnails and keeps a stable selection while windows come and go.
//! The [`controller::Controller`] turns key and pointer input into registry
//! calls, and [`switcher::Switcher`] routes both input and window-system
//! notifications through a single dispatch point.

pub mod controller;
pub mod desktop;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod keybindings;
pub mod layout;
pub mod notify;
pub mod switcher;
pub mod system;
pub mod tracing_sub;
pub mod ui;
pub mod window;
