//! `sei-telemetry` extracts the per-frame vehicle telemetry that Tesla dashcams embed in
//! the H.264 SEI NAL units of their MP4 recordings.
//!
//! This crate provides:
//! - Synchronous extraction of a whole clip into an immutable [`FrameSeries`].
//! - Interpolated telemetry for any playback time ([`interpolate()`] / [`FrameSeries::at`]).
//! - CSV and JSON export of a series.
//! - A Tokio-based async `Stream` wrapper (enabled by default).
//!
//! Malformed input never fails extraction: corrupt units are skipped and a file without
//! telemetry gives an empty series. Only I/O can fail.
//!
//! ## Quick start (sync)
//! - Read a clip with [`extract_series_from_path`], or hand an in-memory buffer to
//!   [`extract_series`].
//! - Query [`FrameSeries::at`] with the video's current time.
//!
//! ## Quick start (async)
//! - Use [`stream_from_path`] to get a Tokio `Stream` of frames.
//!
//! ## Features
//! - `async` (default): enables Tokio stream helpers.

pub mod error;

pub mod mp4;
pub mod sei;
pub mod telemetry;

pub mod export;
pub mod extract;
pub mod interpolate;
pub mod series;

#[cfg(feature = "async")]
pub mod async_extract;

pub use extract::{
    extract_series, extract_series_from_path, extract_series_from_reader, for_each_frame,
    ExtractConfig, Frames, SeiRecords,
};
pub use interpolate::interpolate;
pub use sei::{MarkerFraming, PayloadFraming};
pub use series::{Frame, FrameRate, FrameSequencer, FrameSeries};
pub use telemetry::{decode_record, AutopilotState, Gear, TelemetryRecord};

pub use error::Error;

#[cfg(feature = "async")]
pub use async_extract::{series_from_path, stream_from_bytes, stream_from_path};
