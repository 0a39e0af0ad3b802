//! Banner carousel: one slide at a time, auto-advancing on a timer.
//!
//! `Carousel` is the pure index state; `AutoplayHandle` drives it from a
//! tokio task and broadcasts every transition.

pub mod autoplay;
pub mod model;

pub use autoplay::{AutoplayHandle, spawn_autoplay};
pub use model::{Carousel, CarouselSnapshot, Indicator, Slide, default_slides};
