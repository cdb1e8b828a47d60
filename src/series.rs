use serde::Serialize;

use crate::telemetry::TelemetryRecord;
use crate::Error;

/// Capture rate used to derive frame timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Rate at which Tesla dashcams emit one telemetry SEI per video frame.
    pub const TESLA_DASHCAM: FrameRate = FrameRate(36.0);

    /// Rates so small that `1 / fps` overflows are rejected along with non-positive ones.
    pub fn new(fps: f64) -> Result<Self, Error> {
        if fps.is_finite() && fps > 0.0 && (1.0 / fps).is_finite() {
            Ok(FrameRate(fps))
        } else {
            Err(Error::InvalidFrameRate { fps })
        }
    }

    pub fn fps(self) -> f64 {
        self.0
    }

    /// Timestamp in seconds of the frame at `index`. The first frame sits at `1 / fps`.
    pub fn timestamp(self, index: usize) -> f64 {
        (index as f64 + 1.0) / self.0
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::TESLA_DASHCAM
    }
}

/// A decoded telemetry record placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    index: usize,
    timestamp: f64,
    #[serde(flatten)]
    record: TelemetryRecord,
}

impl Frame {
    /// 0-based position in the series (discovery order in the stream).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Seconds from the start of the clip.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn record(&self) -> &TelemetryRecord {
        &self.record
    }
}

/// All telemetry frames of one clip, in timestamp order.
///
/// Indices are contiguous from 0 and timestamps strictly increase.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSeries {
    frame_rate: FrameRate,
    frames: Vec<Frame>,
}

impl FrameSeries {
    pub fn empty(frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            frames: Vec::new(),
        }
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Duration covered by the series (timestamp of the last frame).
    pub fn duration(&self) -> f64 {
        self.frames.last().map_or(0.0, Frame::timestamp)
    }

    /// Telemetry at `t` seconds; see [`crate::interpolate`].
    pub fn at(&self, t: f64) -> Option<TelemetryRecord> {
        crate::interpolate::interpolate(self, t)
    }
}

impl<'a> IntoIterator for &'a FrameSeries {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Places decoded records on the timeline.
///
/// Timestamps come from the frame index alone, so units skipped upstream leave no gap.
#[derive(Debug)]
pub struct FrameSequencer {
    frame_rate: FrameRate,
    next_index: usize,
}

impl FrameSequencer {
    pub fn new(frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            next_index: 0,
        }
    }

    /// Turn `record` into the next frame. Records without a version are rejected.
    pub fn sequence(&mut self, record: TelemetryRecord) -> Option<Frame> {
        if !record.is_valid() {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        Some(Frame {
            index,
            timestamp: self.frame_rate.timestamp(index),
            record,
        })
    }

    /// Sequence every record of `records` into a series.
    pub fn collect(
        mut self,
        records: impl IntoIterator<Item = TelemetryRecord>,
    ) -> FrameSeries {
        let frames = records
            .into_iter()
            .filter_map(|r| self.sequence(r))
            .collect();
        FrameSeries {
            frame_rate: self.frame_rate,
            frames,
        }
    }
}
