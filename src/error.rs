use std::io;

use thiserror::Error;

/// Errors surfaced by the extraction engine.
///
/// Malformed MP4/H.264/protobuf content is never an error: corrupt units are skipped and
/// a file without telemetry yields an empty series.
#[derive(Debug, Error)]
pub enum Error {
    /// Passthrough for IO errors (open/read).
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Frame rate must be a finite, positive number of frames per second.
    #[error("invalid frame rate {fps}: must be finite and greater than zero")]
    InvalidFrameRate { fps: f64 },

    /// The blocking extraction task panicked or was cancelled.
    #[cfg(feature = "async")]
    #[error("extraction task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
