//! Temporal accumulation of the volumetric buffer.
//!
//! Blends the current frame with a reprojected history buffer to suppress
//! ray-marching noise. This is the engine's only stateful, order-dependent
//! step: a frame may only ever read the previous *completed* frame's
//! history, and the accumulator owns that buffer exclusively, swapping it
//! in whole after each resolve.

mod accumulate;
mod history;

pub use accumulate::{TemporalAccumulator, TemporalSettings};
pub use history::HistoryBuffer;
