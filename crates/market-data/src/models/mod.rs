//! Data model shared across providers and the acquisition engine.

mod bar;
mod interval;

pub use bar::Bar;
pub use interval::Interval;
