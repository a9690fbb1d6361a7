//! pinch-gesture - pinch and two-hand pull gestures from hand landmarks.
//!
//! Consumes per-frame hand landmark lists from an external detector and
//! produces a debounced single-hand grab signal with a smoothed anchor,
//! plus a two-hand "pull apart" signal.

pub mod gesture;
pub mod replay;
