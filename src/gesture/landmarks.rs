//! Hand landmark data structures.
//!
//! Models the 21-point hand skeleton reported by the landmark detector,
//! the optional handedness label, and the point types shared by the
//! filter and aggregator stages.

use serde::{Deserialize, Serialize};

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandJoint {
    /// Convert joint enum to landmark index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

// ── Hand enum ──────────────────────────────────────────────

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse a detector handedness label. Only the exact labels
    /// `"Left"` and `"Right"` are recognized.
    pub fn from_label(label: &str) -> Option<Hand> {
        match label {
            "Left" => Some(Hand::Left),
            "Right" => Some(Hand::Right),
            _ => None,
        }
    }
}

// ── Points ─────────────────────────────────────────────────

/// A 3D point. Raw landmarks use image coordinates (`x`, `y` in 0..1);
/// smoothed anchors use the centered convention (`x`, `y` in -1..1).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Drop the depth component.
    pub fn xy(&self) -> Point2 {
        Point2 {
            x: self.x,
            y: self.y,
        }
    }
}

/// A point in the centered image plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

// ── Hand frame ─────────────────────────────────────────────

/// One detected hand as delivered by the landmark source for a frame.
#[derive(Debug, Clone, Default)]
pub struct HandFrame {
    /// Landmarks in detector order. A well-formed hand has exactly
    /// `LANDMARK_COUNT` entries.
    pub landmarks: Vec<Point3>,
    /// Detector handedness label, if any.
    pub handedness: Option<Hand>,
}

impl HandFrame {
    pub fn new(landmarks: Vec<Point3>, handedness: Option<Hand>) -> Self {
        Self {
            landmarks,
            handedness,
        }
    }
}

/// Look up a joint in a landmark list. Returns `None` for lists that are
/// not a full 21-point hand.
pub fn joint(landmarks: &[Point3], joint: HandJoint) -> Option<Point3> {
    if landmarks.len() < LANDMARK_COUNT {
        return None;
    }
    landmarks.get(joint.index()).copied()
}

// ── Tests ──────────────────────────────────────────────────
