//! Two-hand aggregation: left/right role assignment and the pull gesture.
//!
//! Roles are resolved fresh every frame from the detector's handedness
//! labels, falling back to horizontal ordering when labels are missing.
//! No identity is persisted, so unlabelled hands that cross may swap
//! roles between frames.

use serde::Serialize;

use super::config::GestureConfig;
use super::landmarks::{Hand, Point2};
use super::pinch::GestureState;
use super::smoothing::{distance2, midpoint2};

/// One hand's filter output plus its detector label for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandObservation {
    pub gesture: GestureState,
    pub handedness: Option<Hand>,
}

/// Two-hand snapshot emitted each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoHandGestureState {
    /// Both hands present and committed to grabbing.
    pub both_pinching: bool,
    /// 2D distance between the smoothed anchors, 0 without two positions.
    pub pull_distance: f32,
    /// 2D midpoint of the anchors.
    pub center_position: Option<Point2>,
    pub left_hand: Option<GestureState>,
    pub right_hand: Option<GestureState>,
    /// Both pinching and separated beyond the minimum pull distance.
    pub is_pulling: bool,
}

impl TwoHandGestureState {
    /// Snapshot with no hands.
    pub fn empty() -> Self {
        Self {
            both_pinching: false,
            pull_distance: 0.0,
            center_position: None,
            left_hand: None,
            right_hand: None,
            is_pulling: false,
        }
    }
}

impl Default for TwoHandGestureState {
    fn default() -> Self {
        Self::empty()
    }
}

/// Assign roles and derive the two-hand gesture. Only the first two
/// observations are considered.
pub fn aggregate(hands: &[HandObservation], config: &GestureConfig) -> TwoHandGestureState {
    let (left, right) = assign_roles(hands);

    let both_pinching = matches!(
        (&left, &right),
        (Some(l), Some(r)) if l.is_grabbing && r.is_grabbing
    );

    let positions = left
        .and_then(|l| l.hand_position)
        .zip(right.and_then(|r| r.hand_position))
        .map(|(l, r)| (l.xy(), r.xy()));

    let (pull_distance, center_position) = match positions {
        Some((l, r)) => (distance2(&l, &r), Some(midpoint2(&l, &r))),
        None => (0.0, None),
    };

    TwoHandGestureState {
        both_pinching,
        pull_distance,
        center_position,
        left_hand: left,
        right_hand: right,
        is_pulling: both_pinching && pull_distance > config.min_pull_distance,
    }
}

/// Resolve which observation is the left hand and which the right.
///
/// Labels win, first-seen first. Two unlabelled hands with positions are
/// ordered by centered x (smaller is left, ties go to the first-seen).
/// Anything else fills left first, then right.
fn assign_roles(hands: &[HandObservation]) -> (Option<GestureState>, Option<GestureState>) {
    let mut left: Option<GestureState> = None;
    let mut right: Option<GestureState> = None;
    let mut unassigned: Vec<&HandObservation> = Vec::with_capacity(2);

    for obs in hands.iter().take(2) {
        match obs.handedness {
            Some(Hand::Left) if left.is_none() => left = Some(obs.gesture),
            Some(Hand::Right) if right.is_none() => right = Some(obs.gesture),
            _ => unassigned.push(obs),
        }
    }

    if let [a, b] = unassigned.as_slice() {
        if let (Some(pa), Some(pb)) = (a.gesture.hand_position, b.gesture.hand_position) {
            let (l, r) = if pb.x < pa.x { (b, a) } else { (a, b) };
            return (Some(l.gesture), Some(r.gesture));
        }
    }

    for obs in unassigned {
        if left.is_none() {
            left = Some(obs.gesture);
        } else if right.is_none() {
            right = Some(obs.gesture);
        }
    }

    (left, right)
}

// ── Tests ──────────────────────────────────────────────────
