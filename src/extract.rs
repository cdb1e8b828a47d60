use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::mp4::find_media_data;
use crate::sei::{remove_emulation_prevention, MarkerFraming, PayloadFraming, SeiNalUnits};
use crate::series::{Frame, FrameRate, FrameSequencer, FrameSeries};
use crate::telemetry::{decode_record, TelemetryRecord};
use crate::Error;

/// Recorder-specific settings for extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractConfig {
    /// Rate used to turn frame indices into timestamps.
    pub frame_rate: FrameRate,
    /// Vendor prefix in front of the protobuf message.
    pub framing: MarkerFraming,
}

impl ExtractConfig {
    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_framing(mut self, framing: MarkerFraming) -> Self {
        self.framing = framing;
        self
    }
}

/// Streaming decoder yielding every valid telemetry record of an MP4 buffer, in stream
/// order.
///
/// SEI units without the vendor framing, and records without a version, are skipped.
pub struct SeiRecords<'a, F: PayloadFraming = MarkerFraming> {
    units: SeiNalUnits<'a>,
    framing: F,
    seen: usize,
    kept: usize,
}

impl<'a> SeiRecords<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_framing(buf, MarkerFraming::default())
    }
}

impl<'a, F: PayloadFraming> SeiRecords<'a, F> {
    /// Decode with a custom payload framing. A buffer without `mdat` yields nothing.
    pub fn with_framing(buf: &'a [u8], framing: F) -> Self {
        let units = match find_media_data(buf) {
            Some(region) => SeiNalUnits::in_region(buf, region),
            None => SeiNalUnits::new(buf, 0, 0),
        };
        Self {
            units,
            framing,
            seen: 0,
            kept: 0,
        }
    }

    /// Number of SEI user-data units inspected so far.
    pub fn units_seen(&self) -> usize {
        self.seen
    }

    /// Number of records yielded so far.
    pub fn records_kept(&self) -> usize {
        self.kept
    }
}

impl<F: PayloadFraming> Iterator for SeiRecords<'_, F> {
    type Item = TelemetryRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for unit in self.units.by_ref() {
            self.seen += 1;
            let unit = remove_emulation_prevention(unit);
            let Some(payload) = self.framing.locate(&unit) else {
                log::trace!("extract: SEI unit {} has no telemetry framing", self.seen);
                continue;
            };
            let record = decode_record(payload);
            if !record.is_valid() {
                log::trace!("extract: SEI unit {} decoded without version", self.seen);
                continue;
            }
            self.kept += 1;
            return Some(record);
        }
        None
    }
}

/// Iterator of sequenced frames over an MP4 buffer.
pub struct Frames<'a, F: PayloadFraming = MarkerFraming> {
    records: SeiRecords<'a, F>,
    sequencer: FrameSequencer,
}

impl<'a> Frames<'a> {
    pub fn new(buf: &'a [u8], config: &ExtractConfig) -> Self {
        Self {
            records: SeiRecords::with_framing(buf, config.framing),
            sequencer: FrameSequencer::new(config.frame_rate),
        }
    }
}

impl<F: PayloadFraming> Iterator for Frames<'_, F> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        // SeiRecords only yields valid records, so sequencing never rejects one.
        self.records
            .by_ref()
            .find_map(|record| self.sequencer.sequence(record))
    }
}

/// Extract the telemetry series of one MP4 file held in memory.
///
/// Never fails: a buffer without telemetry yields an empty series.
pub fn extract_series(buf: &[u8], config: &ExtractConfig) -> FrameSeries {
    let mut records = SeiRecords::with_framing(buf, config.framing);
    let series = FrameSequencer::new(config.frame_rate).collect(records.by_ref());
    log::debug!(
        "extract: {} SEI units, {} frames, {} discarded",
        records.units_seen(),
        series.len(),
        records.units_seen() - records.records_kept()
    );
    series
}

/// Read `reader` to the end and extract its telemetry series.
pub fn extract_series_from_reader<R: Read>(
    mut reader: R,
    config: &ExtractConfig,
) -> Result<FrameSeries, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(extract_series(&buf, config))
}

/// Read an MP4 file from disk and extract its telemetry series.
pub fn extract_series_from_path(
    path: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<FrameSeries, Error> {
    let path = path.as_ref();
    log::debug!("extract: reading {}", path.display());
    let file = File::open(path)?;
    extract_series_from_reader(BufReader::new(file), config)
}

/// Convenience helper that walks all frames of a buffer and invokes a callback.
pub fn for_each_frame(
    buf: &[u8],
    config: &ExtractConfig,
    mut f: impl FnMut(Frame) -> Result<(), Error>,
) -> Result<(), Error> {
    for frame in Frames::new(buf, config) {
        f(frame)?;
    }
    Ok(())
}
