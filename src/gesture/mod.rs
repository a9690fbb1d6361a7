//! Gesture estimation core: pinch filtering and two-hand pull detection.
//!
//! Provides:
//! - `landmarks`: 21-point hand skeleton, handedness, point types
//! - `smoothing`: exponential smoothing and geometry helpers
//! - `config`: tunable thresholds and their validation
//! - `pinch`: per-slot smoothed, hysteresis + debounce grab filter
//! - `two_hand`: left/right role assignment and the pull gate
//! - `tracker`: frame pipeline owning the per-slot state

pub mod config;
pub mod landmarks;
pub mod pinch;
pub mod smoothing;
pub mod tracker;
pub mod two_hand;

pub use config::{ConfigError, GestureConfig};
pub use landmarks::{Hand, HandFrame, HandJoint, Point2, Point3, LANDMARK_COUNT};
pub use pinch::{GestureState, PinchState};
pub use tracker::{FrameGestures, GestureTracker, MAX_HANDS};
pub use two_hand::{aggregate, HandObservation, TwoHandGestureState};
