//! Per-hand pinch filter.
//!
//! Turns one hand's raw landmarks into a smoothed anchor position, a
//! smoothed thumb-to-index distance, and a debounced grab state.  The
//! grab decision uses two thresholds (close/open) so a hand hovering
//! near one of them does not chatter, and a change only commits after
//! the configured number of consecutive agreeing frames.

use serde::Serialize;
use tracing::debug;

use super::config::GestureConfig;
use super::landmarks::{joint, HandJoint, Point3};
use super::smoothing::{distance3, midpoint3, smooth, smooth_point, to_centered};

// ── Snapshot ───────────────────────────────────────────────

/// Per-hand gesture snapshot emitted each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GestureState {
    /// Committed (debounced) grab state.
    pub is_grabbing: bool,
    /// Smoothed pinch anchor in centered coordinates.
    pub hand_position: Option<Point3>,
    /// Smoothed thumb-to-index distance.
    pub pinch_distance: f32,
    /// 1 when a hand contributed this frame, 0 otherwise.
    pub confidence: u8,
}

impl GestureState {
    /// Snapshot for "no hand this frame".
    pub fn absent() -> Self {
        Self {
            is_grabbing: false,
            hand_position: None,
            pinch_distance: 1.0,
            confidence: 0,
        }
    }

    pub fn is_present(&self) -> bool {
        self.confidence > 0
    }
}

impl Default for GestureState {
    fn default() -> Self {
        Self::absent()
    }
}

// ── Per-slot state ─────────────────────────────────────────

/// Smoothing and debounce memory for one detector slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PinchState {
    /// Smoothed anchor (centered coordinates), `None` until first update.
    pub smoothed_position: Option<Point3>,
    /// Smoothed pinch distance; starts fully open.
    pub smoothed_pinch_distance: f32,
    /// Committed grab state.
    pub is_grabbing: bool,
    /// Candidate grab state awaiting debounce.
    pub pending_target: Option<bool>,
    /// Consecutive frames the candidate has held.
    pub pending_count: u32,
}

impl Default for PinchState {
    fn default() -> Self {
        Self::new()
    }
}

impl PinchState {
    pub fn new() -> Self {
        Self {
            smoothed_position: None,
            smoothed_pinch_distance: 1.0,
            is_grabbing: false,
            pending_target: None,
            pending_count: 0,
        }
    }

    /// Reset to initial values.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one frame of landmarks for this slot.
    ///
    /// Returns `None` when the hand is malformed (short landmark list);
    /// the accumulated state is left untouched in that case so a single
    /// dropped frame does not discard smoothing history.
    ///
    /// Coordinates are not validated: a NaN landmark makes the smoothed
    /// distance NaN, which freezes the grab state until the slot is reset.
    pub fn update(&mut self, landmarks: &[Point3], config: &GestureConfig) -> Option<GestureState> {
        let (thumb, index) = match (
            joint(landmarks, HandJoint::ThumbTip),
            joint(landmarks, HandJoint::IndexTip),
        ) {
            (Some(t), Some(i)) => (t, i),
            _ => {
                debug!(
                    "Pinch filter: {} landmarks, missing {}/{}; skipping frame",
                    landmarks.len(),
                    HandJoint::ThumbTip.as_str(),
                    HandJoint::IndexTip.as_str(),
                );
                return None;
            }
        };

        let raw_distance = distance3(&thumb, &index);
        let raw_anchor = to_centered(&midpoint3(&thumb, &index));

        self.smoothed_position = Some(smooth_point(
            self.smoothed_position,
            raw_anchor,
            config.position_smoothing,
        ));
        self.smoothed_pinch_distance = smooth(
            self.smoothed_pinch_distance,
            raw_distance,
            config.distance_smoothing,
        );

        let target = self.hysteresis_target(config);
        self.debounce(target, config.debounce_frames);

        Some(self.snapshot())
    }

    /// Grab target implied by the smoothed distance, before debounce.
    fn hysteresis_target(&self, config: &GestureConfig) -> bool {
        let d = self.smoothed_pinch_distance;
        if !self.is_grabbing && d < config.close_threshold {
            true
        } else if self.is_grabbing && d > config.open_threshold {
            false
        } else {
            self.is_grabbing
        }
    }

    fn debounce(&mut self, target: bool, frames: u32) {
        if target == self.is_grabbing {
            // Signal returned to the committed state before debounce completed.
            self.pending_target = None;
            self.pending_count = 0;
            return;
        }

        if self.pending_target == Some(target) {
            self.pending_count += 1;
        } else {
            self.pending_target = Some(target);
            self.pending_count = 1;
        }

        if self.pending_count >= frames {
            self.is_grabbing = target;
            self.pending_target = None;
            self.pending_count = 0;
            debug!(
                "Pinch committed: {} at distance {:.3}",
                if target { "grab" } else { "release" },
                self.smoothed_pinch_distance,
            );
        }
    }

    /// Current state as an emitted snapshot.
    pub fn snapshot(&self) -> GestureState {
        GestureState {
            is_grabbing: self.is_grabbing,
            hand_position: self.smoothed_position,
            pinch_distance: self.smoothed_pinch_distance,
            confidence: 1,
        }
    }
}

// ── Test helpers ───────────────────────────────────────────

/// Build a 21-point hand with the thumb and index tips at the given raw
/// image coordinates; every other landmark sits at the wrist origin.
#[cfg(test)]
pub(crate) fn test_hand(thumb: Point3, index: Point3) -> Vec<Point3> {
    use super::landmarks::LANDMARK_COUNT;

    let mut landmarks = vec![Point3::default(); LANDMARK_COUNT];
    landmarks[HandJoint::ThumbTip.index()] = thumb;
    landmarks[HandJoint::IndexTip.index()] = index;
    landmarks
}

/// Hand centred on `(x, y)` in raw image coordinates whose tips are
/// `distance` apart along x.
#[cfg(test)]
pub(crate) fn test_pinch_hand(x: f32, y: f32, distance: f32) -> Vec<Point3> {
    test_hand(
        Point3::new(x - distance / 2.0, y, 0.0),
        Point3::new(x + distance / 2.0, y, 0.0),
    )
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(state: &mut PinchState, config: &GestureConfig, distance: f32) -> GestureState {
        state
            .update(&test_pinch_hand(0.5, 0.5, distance), config)
            .expect("well-formed hand")
    }

    #[test]
    fn test_new_state() {
        let state = PinchState::new();
        assert!(!state.is_grabbing);
        assert!(state.smoothed_position.is_none());
        assert!((state.smoothed_pinch_distance - 1.0).abs() < f32::EPSILON);
        assert!(state.pending_target.is_none());
        assert_eq!(state.pending_count, 0);
    }

    #[test]
    fn test_first_frame_seeds_position() {
        let config = GestureConfig::default();
        let mut state = PinchState::new();
        let hand = test_hand(Point3::new(0.2, 0.4, -0.1), Point3::new(0.4, 0.4, -0.3));
        let out = state.update(&hand, &config).unwrap();

        // Midpoint (0.3, 0.4, -0.2) -> centered (0.4, 0.2, -0.2), unsmoothed.
        let pos = out.hand_position.unwrap();
        assert!((pos.x - 0.4).abs() < 1e-5, "x = {}", pos.x);
        assert!((pos.y - 0.2).abs() < 1e-5, "y = {}", pos.y);
        assert!((pos.z + 0.2).abs() < 1e-5, "z = {}", pos.z);
        assert_eq!(out.confidence, 1);
    }

    #[test]
    fn test_pinch_distance_is_3d() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        let hand = test_hand(Point3::new(0.5, 0.5, 0.0), Point3::new(0.5, 0.5, 0.3));
        let out = state.update(&hand, &config).unwrap();
        assert!((out.pinch_distance - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_position_smoothing_step() {
        let config = GestureConfig::default();
        let mut state = PinchState::new();
        state.update(&test_pinch_hand(0.5, 0.5, 0.1), &config);
        // Raw x 0.25 -> centered 0.5; smoothed 0 + 0.4 * 0.5 = 0.2.
        let out = state.update(&test_pinch_hand(0.25, 0.5, 0.1), &config).unwrap();
        let pos = out.hand_position.unwrap();
        assert!((pos.x - 0.2).abs() < 1e-5, "Expected 0.2, got {}", pos.x);
    }

    #[test]
    fn test_smoothing_convergence() {
        let config = GestureConfig::default();
        let mut state = PinchState::new();
        // Seed far from the target, then hold one constant input.
        state.update(&test_pinch_hand(0.9, 0.1, 0.02), &config);
        let mut last = GestureState::absent();
        for _ in 0..20 {
            last = state.update(&test_pinch_hand(0.2, 0.7, 0.3), &config).unwrap();
        }
        let pos = last.hand_position.unwrap();
        // Raw centered target: (0.6, -0.4).
        assert!((pos.x - 0.6).abs() < 0.006, "x = {}", pos.x);
        assert!((pos.y + 0.4).abs() < 0.004, "y = {}", pos.y);
        assert!((last.pinch_distance - 0.3).abs() < 0.003, "d = {}", last.pinch_distance);
    }

    #[test]
    fn test_raw_sequence_never_commits() {
        let config = GestureConfig::default();
        let mut state = PinchState::new();
        let expected = [0.6, 0.4, 0.225, 0.1375, 0.16875];
        for (raw, want) in [0.2, 0.2, 0.05, 0.05, 0.2].iter().zip(expected) {
            let out = feed(&mut state, &config, *raw);
            assert!(
                (out.pinch_distance - want).abs() < 1e-5,
                "Expected smoothed {}, got {}",
                want,
                out.pinch_distance
            );
            assert!(!out.is_grabbing, "Smoothed distance never drops below close");
        }
        assert!(state.pending_target.is_none());
    }

    #[test]
    fn test_commit_frame_after_debounce() {
        let config = GestureConfig::default();
        let mut state = PinchState::new();
        // Smoothed: 0.6, 0.4, 0.21, 0.115, 0.0675, 0.04375, 0.031875
        let raws = [0.2, 0.2, 0.02, 0.02, 0.02, 0.02, 0.02];
        let grabbing: Vec<bool> = raws
            .iter()
            .map(|d| feed(&mut state, &config, *d).is_grabbing)
            .collect();

        // Frame 6 (index 5) is the first below 0.055; frame 7 commits.
        assert_eq!(
            grabbing,
            vec![false, false, false, false, false, false, true]
        );
    }

    #[test]
    fn test_pending_visible_before_commit() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        let out = feed(&mut state, &config, 0.01);
        assert!(!out.is_grabbing);
        assert_eq!(state.pending_target, Some(true));
        assert_eq!(state.pending_count, 1);

        let out = feed(&mut state, &config, 0.01);
        assert!(out.is_grabbing);
        assert!(state.pending_target.is_none());
        assert_eq!(state.pending_count, 0);
    }

    #[test]
    fn test_single_frame_spike_ignored() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        assert!(!feed(&mut state, &config, 0.3).is_grabbing);
        assert!(!feed(&mut state, &config, 0.01).is_grabbing); // spike
        assert!(!feed(&mut state, &config, 0.3).is_grabbing); // revert
        assert!(state.pending_target.is_none());
        assert!(!feed(&mut state, &config, 0.3).is_grabbing);

        // Same for a release spike while grabbing.
        feed(&mut state, &config, 0.01);
        assert!(feed(&mut state, &config, 0.01).is_grabbing);
        assert!(feed(&mut state, &config, 0.5).is_grabbing); // spike
        assert!(feed(&mut state, &config, 0.01).is_grabbing); // revert
        assert!(feed(&mut state, &config, 0.01).is_grabbing);
    }

    #[test]
    fn test_hysteresis_gap_holds_grab() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        feed(&mut state, &config, 0.01);
        assert!(feed(&mut state, &config, 0.01).is_grabbing);

        for i in 0..40 {
            let d = if i % 2 == 0 { 0.056 } else { 0.159 };
            assert!(
                feed(&mut state, &config, d).is_grabbing,
                "Released inside gap at frame {} (d = {})",
                i,
                d
            );
        }

        feed(&mut state, &config, 0.2);
        assert!(!feed(&mut state, &config, 0.2).is_grabbing);
    }

    #[test]
    fn test_hysteresis_gap_holds_open() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        for i in 0..40 {
            let d = if i % 2 == 0 { 0.056 } else { 0.159 };
            assert!(!feed(&mut state, &config, d).is_grabbing);
        }
        feed(&mut state, &config, 0.054);
        assert!(feed(&mut state, &config, 0.054).is_grabbing);
    }

    #[test]
    fn test_candidate_change_restarts_count() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            debounce_frames: 3,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        feed(&mut state, &config, 0.01);
        feed(&mut state, &config, 0.01);
        assert_eq!(state.pending_count, 2);
        feed(&mut state, &config, 0.1); // back to committed state
        assert_eq!(state.pending_count, 0);
        feed(&mut state, &config, 0.01);
        assert_eq!(state.pending_count, 1);
        assert!(!state.is_grabbing);
    }

    #[test]
    fn test_single_frame_debounce_commits_immediately() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            debounce_frames: 1,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        assert!(feed(&mut state, &config, 0.01).is_grabbing);
    }

    #[test]
    fn test_malformed_hand_leaves_state() {
        let config = GestureConfig::default();
        let mut state = PinchState::new();
        feed(&mut state, &config, 0.1);
        let before = state.clone();

        assert!(state.update(&[Point3::default(); 5], &config).is_none());
        assert!(state.update(&[], &config).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_nan_landmark_freezes_grab_until_reset() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        feed(&mut state, &config, 0.01);
        assert!(feed(&mut state, &config, 0.01).is_grabbing);

        let nan_hand = test_hand(Point3::new(f32::NAN, 0.5, 0.0), Point3::new(0.5, 0.5, 0.0));
        let out = state.update(&nan_hand, &config).unwrap();
        assert!(out.pinch_distance.is_nan());
        assert!(out.is_grabbing);

        // Smoothing from NaN stays NaN, so an open hand cannot release.
        let config = GestureConfig {
            distance_smoothing: 0.5,
            ..config
        };
        for _ in 0..5 {
            assert!(feed(&mut state, &config, 0.5).is_grabbing);
        }

        state.reset();
        assert!(!feed(&mut state, &config, 0.5).is_grabbing);
        assert!(!state.smoothed_pinch_distance.is_nan());
    }

    #[test]
    fn test_reset() {
        let config = GestureConfig {
            distance_smoothing: 1.0,
            ..GestureConfig::default()
        };
        let mut state = PinchState::new();
        feed(&mut state, &config, 0.01);
        feed(&mut state, &config, 0.01);
        assert!(state.is_grabbing);

        state.reset();
        assert_eq!(state, PinchState::new());
    }

    #[test]
    fn test_absent_snapshot() {
        let absent = GestureState::absent();
        assert!(!absent.is_grabbing);
        assert!(absent.hand_position.is_none());
        assert!((absent.pinch_distance - 1.0).abs() < f32::EPSILON);
        assert_eq!(absent.confidence, 0);
        assert!(!absent.is_present());
    }
}
