//! Frame-level pipeline: per-slot pinch filters feeding the two-hand
//! aggregator.
//!
//! Filter state is keyed by the detector's reporting slot, which is only
//! a best-effort proxy for hand identity: if one hand leaves and another
//! takes its slot, smoothing history carries over.

use serde::Serialize;
use tracing::debug;

use super::config::{ConfigError, GestureConfig};
use super::landmarks::HandFrame;
use super::pinch::{GestureState, PinchState};
use super::two_hand::{aggregate, HandObservation, TwoHandGestureState};

/// Maximum number of hands read from a frame.
pub const MAX_HANDS: usize = 2;

/// Snapshot pair emitted for each processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameGestures {
    /// Slot 0, for single-hand consumers.
    pub primary: GestureState,
    pub two_hand: TwoHandGestureState,
}

impl FrameGestures {
    /// Snapshot for a frame without hands.
    pub fn empty() -> Self {
        Self {
            primary: GestureState::absent(),
            two_hand: TwoHandGestureState::empty(),
        }
    }

    /// Generate s-expression for one frame's output.
    pub fn to_sexp(&self) -> String {
        format!(
            "(:primary {} :two-hand (:both-pinching {} :pulling {} :pull-distance {:.3} :center {} :left {} :right {}))",
            gesture_sexp(&self.primary),
            sexp_bool(self.two_hand.both_pinching),
            sexp_bool(self.two_hand.is_pulling),
            self.two_hand.pull_distance,
            self.two_hand
                .center_position
                .map(|c| format!("({:.3} {:.3})", c.x, c.y))
                .unwrap_or_else(|| "nil".to_string()),
            self.two_hand
                .left_hand
                .as_ref()
                .map(gesture_sexp)
                .unwrap_or_else(|| "nil".to_string()),
            self.two_hand
                .right_hand
                .as_ref()
                .map(gesture_sexp)
                .unwrap_or_else(|| "nil".to_string()),
        )
    }
}

/// Owns the per-slot filters and runs one frame at a time.
pub struct GestureTracker {
    config: GestureConfig,
    /// Per-slot filter state, created on the first well-formed frame.
    slots: [Option<PinchState>; MAX_HANDS],
    /// Frames processed since construction or the last reset.
    frames: u64,
}

impl GestureTracker {
    /// Create a tracker, rejecting an invalid configuration.
    pub fn new(config: GestureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            slots: [None, None],
            frames: 0,
        })
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Filter state for a slot, if that slot is live.
    pub fn slot(&self, index: usize) -> Option<&PinchState> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Process one frame of detector output.
    ///
    /// Only the first `MAX_HANDS` hands are read. A frame with no hands
    /// resets every slot; a slot missing from an otherwise non-empty
    /// frame is reset on its own. Malformed hands leave their slot
    /// untouched and count as absent for this frame.
    pub fn process_frame(&mut self, hands: &[HandFrame]) -> FrameGestures {
        self.frames += 1;

        if hands.is_empty() {
            if self.slots.iter().any(Option::is_some) {
                debug!("No hands reported; resetting all slots");
            }
            self.slots = [None, None];
            return FrameGestures::empty();
        }

        let mut outputs: [Option<GestureState>; MAX_HANDS] = [None, None];
        let mut observations = Vec::with_capacity(MAX_HANDS);

        for (index, output) in outputs.iter_mut().enumerate() {
            let Some(hand) = hands.get(index) else {
                if self.slots[index].take().is_some() {
                    debug!("Slot {} no longer reported; reset", index);
                }
                continue;
            };

            *output = self.update_slot(index, hand);
            if let Some(gesture) = *output {
                observations.push(HandObservation {
                    gesture,
                    handedness: hand.handedness,
                });
            }
        }

        FrameGestures {
            primary: outputs[0].unwrap_or_else(GestureState::absent),
            two_hand: aggregate(&observations, &self.config),
        }
    }

    fn update_slot(&mut self, index: usize, hand: &HandFrame) -> Option<GestureState> {
        if let Some(state) = self.slots[index].as_mut() {
            return state.update(&hand.landmarks, &self.config);
        }

        let mut state = PinchState::new();
        let output = state.update(&hand.landmarks, &self.config)?;
        debug!(
            "Slot {} started tracking ({})",
            index,
            hand.handedness.map(|h| h.as_str()).unwrap_or("unlabelled"),
        );
        self.slots[index] = Some(state);
        Some(output)
    }

    /// Discard all slot state. Used when a tracking session ends.
    pub fn reset(&mut self) {
        self.slots = [None, None];
        self.frames = 0;
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let slots: Vec<String> = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(s) => format!(
                    "(:slot {} :grabbing {} :pinch-distance {:.3} :pending {} :pending-count {})",
                    i,
                    sexp_bool(s.is_grabbing),
                    s.smoothed_pinch_distance,
                    s.pending_target.map(sexp_bool).unwrap_or("nil"),
                    s.pending_count,
                ),
                None => format!("(:slot {} :tracking nil)", i),
            })
            .collect();
        format!("(:frames {} :slots ({}))", self.frames, slots.join(" "))
    }
}

fn sexp_bool(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}

fn gesture_sexp(g: &GestureState) -> String {
    let position = g
        .hand_position
        .map(|p| format!("({:.3} {:.3} {:.3})", p.x, p.y, p.z))
        .unwrap_or_else(|| "nil".to_string());
    format!(
        "(:grabbing {} :position {} :pinch-distance {:.3} :confidence {})",
        sexp_bool(g.is_grabbing),
        position,
        g.pinch_distance,
        g.confidence,
    )
}

// ── Tests ──────────────────────────────────────────────────
