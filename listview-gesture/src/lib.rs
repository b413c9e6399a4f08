//! Gesture-driven data loading for the `listview` crate.
//!
//! [`DataLoader`] implements two strategies that share one touch-tracking state machine:
//!
//! - Pull-to-refresh: pull past the leading edge by at least the indicator's extent, release, and
//!   the refresh callback runs while the indicator stays revealed.
//! - Loading more items, either with the same gesture at the trailing edge
//!   ([`listview::LoadingMode::Incremental`]) or from a debounced scroll-position check
//!   ([`listview::LoadingMode::Infinite`]).
//!
//! Like the engine, the loader is framework-neutral: it drives a [`Viewport`] implemented by the
//! adapter and is advanced with `tick(now_ms)` each frame.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod error;
mod loader;
mod options;
mod state;
mod tween;
mod viewport;

#[cfg(test)]
mod tests;

pub use error::LoadError;
pub use loader::DataLoader;
pub use options::{LoadCallback, LoaderOptions};
pub use state::{GestureKind, TouchState};
pub use tween::{Easing, Tween};
pub use viewport::{Point, ScrollMetrics, Viewport};
