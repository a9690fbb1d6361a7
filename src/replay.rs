//! Landmark replay: JSON-lines frame source and gesture sinks.
//!
//! Each input line is one detector frame:
//! `{"hands":[{"landmarks":[[x,y,z], ...],"handedness":"Left"}]}`.
//! Frames are fed through a `GestureTracker` and every snapshot pair is
//! handed to the configured sinks, which do their own diffing.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::gesture::{FrameGestures, GestureTracker, Hand, HandFrame, Point3, MAX_HANDS};

// ── Frame source ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    hands: Vec<RawHand>,
}

#[derive(Debug, Deserialize)]
struct RawHand {
    landmarks: Vec<[f32; 3]>,
    #[serde(default)]
    handedness: Option<String>,
}

impl From<RawHand> for HandFrame {
    fn from(raw: RawHand) -> Self {
        HandFrame {
            landmarks: raw
                .landmarks
                .into_iter()
                .map(|[x, y, z]| Point3 { x, y, z })
                .collect(),
            handedness: raw.handedness.as_deref().and_then(Hand::from_label),
        }
    }
}

/// Parse one JSON-lines frame, truncating to `MAX_HANDS` hands.
pub fn parse_frame(line: &str) -> Result<Vec<HandFrame>> {
    let raw: RawFrame = serde_json::from_str(line)?;
    let count = raw.hands.len();
    if count > MAX_HANDS {
        warn!("Frame reports {} hands; keeping the first {}", count, MAX_HANDS);
    }
    Ok(raw
        .hands
        .into_iter()
        .take(MAX_HANDS)
        .map(HandFrame::from)
        .collect())
}

/// Iterator over frames read from a JSON-lines stream. Blank lines are
/// skipped; a malformed line ends the replay with its line number.
pub struct FrameSource<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> FrameSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for FrameSource<R> {
    type Item = Result<Vec<HandFrame>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            self.line_no += 1;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(
                        Err(e).with_context(|| format!("failed to read line {}", self.line_no)),
                    )
                }
            }
            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            return Some(
                parse_frame(line).with_context(|| format!("invalid frame on line {}", self.line_no)),
            );
        }
    }
}

// ── Events ─────────────────────────────────────────────────

/// Which gesture changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Single-hand grab on the primary slot.
    Pinch,
    /// Two-hand pull.
    Pull,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pinch => "pinch",
            Self::Pull => "pull",
        }
    }
}

/// Transitions between consecutive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Started(GestureKind),
    Released(GestureKind),
}

/// Compare two consecutive snapshots. A missing previous snapshot is
/// treated as "nothing active".
pub fn diff(prev: Option<&FrameGestures>, next: &FrameGestures) -> Vec<GestureEvent> {
    let empty = FrameGestures::empty();
    let prev = prev.unwrap_or(&empty);
    let mut events = Vec::new();

    let pairs = [
        (GestureKind::Pinch, prev.primary.is_grabbing, next.primary.is_grabbing),
        (GestureKind::Pull, prev.two_hand.is_pulling, next.two_hand.is_pulling),
    ];
    for (kind, was, is) in pairs {
        match (was, is) {
            (false, true) => events.push(GestureEvent::Started(kind)),
            (true, false) => events.push(GestureEvent::Released(kind)),
            _ => {}
        }
    }
    events
}

// ── Sinks ──────────────────────────────────────────────────

/// Consumer of per-frame gesture snapshots.
pub trait GestureSink {
    fn emit(&mut self, frame_index: u64, frame: &FrameGestures) -> Result<()>;
}

/// Output encoding for `WriterSink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Sexp,
    Json,
}

/// Writes one line per frame (or per changed frame) to `out`.
pub struct WriterSink<W> {
    out: W,
    format: OutputFormat,
    transitions_only: bool,
    last: Option<FrameGestures>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W, format: OutputFormat, transitions_only: bool) -> Self {
        Self {
            out,
            format,
            transitions_only,
            last: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> GestureSink for WriterSink<W> {
    fn emit(&mut self, frame_index: u64, frame: &FrameGestures) -> Result<()> {
        let changed = !diff(self.last.as_ref(), frame).is_empty();
        self.last = Some(*frame);
        if self.transitions_only && !changed {
            return Ok(());
        }

        match self.format {
            OutputFormat::Sexp => writeln!(self.out, "(:frame {} {})", frame_index, frame.to_sexp())?,
            OutputFormat::Json => {
                let line = serde_json::json!({ "frame": frame_index, "gestures": frame });
                writeln!(self.out, "{}", line)?;
            }
        }
        Ok(())
    }
}

/// Logs pinch/pull transitions and counts them.
#[derive(Debug, Default)]
pub struct TransitionLog {
    last: Option<FrameGestures>,
    pub pinch_starts: u64,
    pub pull_starts: u64,
}

impl GestureSink for TransitionLog {
    fn emit(&mut self, frame_index: u64, frame: &FrameGestures) -> Result<()> {
        for event in diff(self.last.as_ref(), frame) {
            match event {
                GestureEvent::Started(kind) => {
                    match kind {
                        GestureKind::Pinch => self.pinch_starts += 1,
                        GestureKind::Pull => self.pull_starts += 1,
                    }
                    info!("{}", started_message(kind, frame_index, frame));
                }
                GestureEvent::Released(kind) => {
                    info!("Frame {}: {} released", frame_index, kind.as_str());
                }
            }
        }
        self.last = Some(*frame);
        Ok(())
    }
}

/// Log line for a started gesture; only pulls carry the hand separation.
fn started_message(kind: GestureKind, frame_index: u64, frame: &FrameGestures) -> String {
    match kind {
        GestureKind::Pinch => format!("Frame {}: pinch started", frame_index),
        GestureKind::Pull => format!(
            "Frame {}: pull started (pull distance {:.3})",
            frame_index, frame.two_hand.pull_distance,
        ),
    }
}

// ── Driver ─────────────────────────────────────────────────

/// Counters reported at the end of a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: u64,
    /// Frames where slot 0 reported a well-formed hand.
    pub tracked_frames: u64,
    pub grabbing_frames: u64,
    pub pulling_frames: u64,
}

/// Feed every frame from `source` through `tracker`, emitting to `sinks`.
pub fn run<I>(
    source: I,
    tracker: &mut GestureTracker,
    sinks: &mut [&mut dyn GestureSink],
) -> Result<ReplaySummary>
where
    I: IntoIterator<Item = Result<Vec<HandFrame>>>,
{
    let mut summary = ReplaySummary::default();
    for frame in source {
        let hands = frame?;
        let gestures = tracker.process_frame(&hands);
        for sink in sinks.iter_mut() {
            sink.emit(summary.frames, &gestures)?;
        }
        summary.frames += 1;
        if gestures.primary.is_present() {
            summary.tracked_frames += 1;
        }
        if gestures.primary.is_grabbing {
            summary.grabbing_frames += 1;
        }
        if gestures.two_hand.is_pulling {
            summary.pulling_frames += 1;
        }
    }
    info!(
        "Replay finished: {} frames, {} tracked, {} grabbing, {} pulling",
        summary.frames, summary.tracked_frames, summary.grabbing_frames, summary.pulling_frames,
    );
    Ok(summary)
}

// ── Test helpers ───────────────────────────────────────────

/// JSON line for a frame of hands given as `(x, y, tip distance, label)`.
#[cfg(test)]
fn json_frame(hands: &[(f32, f32, f32, Option<&str>)]) -> String {
    use crate::gesture::{HandJoint, LANDMARK_COUNT};

    let hands: Vec<serde_json::Value> = hands
        .iter()
        .map(|(x, y, d, label)| {
            let mut landmarks = vec![[0.0f32; 3]; LANDMARK_COUNT];
            landmarks[HandJoint::ThumbTip.index()] = [x - d / 2.0, *y, 0.0];
            landmarks[HandJoint::IndexTip.index()] = [x + d / 2.0, *y, 0.0];
            serde_json::json!({ "landmarks": landmarks, "handedness": label })
        })
        .collect();
    serde_json::json!({ "hands": hands }).to_string()
}

// ── Tests ──────────────────────────────────────────────────
