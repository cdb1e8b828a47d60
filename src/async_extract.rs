#![cfg(feature = "async")]

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::extract::{extract_series, ExtractConfig, Frames};
use crate::series::{Frame, FrameSeries};
use crate::Error;

/// Create a Tokio `Stream` of telemetry frames from an MP4 file on disk.
///
/// This API is enabled by default (crate feature `async`).
///
/// Implementation detail: the file is read and decoded on a blocking thread
/// (`tokio::task::spawn_blocking`) and frames are forwarded over a bounded channel. A
/// read failure is delivered as the single `Err` item of the stream.
///
/// `buffer` controls the channel capacity.
pub fn stream_from_path(
    path: impl Into<PathBuf>,
    config: ExtractConfig,
    buffer: usize,
) -> ReceiverStream<Result<Frame, Error>> {
    let path = path.into();
    let (tx, rx) = mpsc::channel(buffer.max(1));

    tokio::task::spawn_blocking(move || {
        let buf = match std::fs::read(&path) {
            Ok(b) => b,
            Err(err) => {
                let _ = tx.blocking_send(Err(err.into()));
                return;
            }
        };

        for frame in Frames::new(&buf, &config) {
            if tx.blocking_send(Ok(frame)).is_err() {
                break;
            }
        }
    });

    ReceiverStream::new(rx)
}

/// Create a Tokio `Stream` of telemetry frames from a buffer already in memory.
pub fn stream_from_bytes(
    buf: Vec<u8>,
    config: ExtractConfig,
    buffer: usize,
) -> ReceiverStream<Frame> {
    let (tx, rx) = mpsc::channel(buffer.max(1));

    tokio::task::spawn_blocking(move || {
        for frame in Frames::new(&buf, &config) {
            if tx.blocking_send(frame).is_err() {
                break;
            }
        }
    });

    ReceiverStream::new(rx)
}

/// Read and decode a whole file on a blocking thread.
///
/// Handy for extracting several clips in parallel from async code.
pub async fn series_from_path(
    path: impl Into<PathBuf>,
    config: ExtractConfig,
) -> Result<FrameSeries, Error> {
    let path = path.into();
    tokio::task::spawn_blocking(move || -> Result<FrameSeries, Error> {
        let buf = std::fs::read(&path)?;
        Ok(extract_series(&buf, &config))
    })
    .await?
}
