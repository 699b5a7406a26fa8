/*!
 * Error types for the narrasrt application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when requesting speech from a synthesis backend
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Error when making a synthesis request fails
    #[error("Synthesis request failed: {0}")]
    RequestFailed(String),

    /// The external synthesis tool exited unsuccessfully
    #[error("Synthesis tool failed with status {status}: {stderr}")]
    ToolFailed {
        /// Exit status reported by the process
        status: String,
        /// Filtered stderr output
        stderr: String,
    },

    /// The synthesis backend did not answer in time
    #[error("Synthesis timed out after {0} seconds")]
    Timeout(u64),

    /// The backend answered but the payload was unusable
    #[error("Invalid synthesis response: {0}")]
    InvalidResponse(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error returned by a remote API
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },
}

/// Errors raised by the audio collaborator
#[derive(Error, Debug)]
pub enum AudioError {
    /// ffmpeg or ffprobe exited unsuccessfully or could not be started
    #[error("Audio tool '{tool}' failed: {message}")]
    ToolFailed {
        /// Name of the tool
        tool: String,
        /// What went wrong
        message: String,
    },

    /// Temporary file handling failed
    #[error("Audio I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The reported duration could not be parsed
    #[error("Invalid audio duration: {0}")]
    InvalidDuration(String),
}

/// Errors that can occur while producing a narration
#[derive(Error, Debug)]
pub enum NarrationError {
    /// The input text is blank after trimming
    #[error("Input text is empty")]
    EmptyInput,

    /// A single segment could not be synthesized; recovered by skipping it
    #[error("Segment {index} synthesis failed: {source}")]
    SegmentSynthesis {
        /// Zero-based segment index
        index: usize,
        /// Underlying backend error
        #[source]
        source: SynthesisError,
    },

    /// A single segment's audio could not be decoded; recovered by skipping it
    #[error("Segment {index} audio could not be loaded: {source}")]
    SegmentAudio {
        /// Zero-based segment index
        index: usize,
        /// Underlying audio error
        #[source]
        source: AudioError,
    },

    /// The audio collaborator failed; terminates the request
    #[error("Audio processing failed: {0}")]
    Audio(#[from] AudioError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a synthesis backend
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Error from narration
    #[error("Narration error: {0}")]
    Narration(#[from] NarrationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<AudioError> for AppError {
    fn from(error: AudioError) -> Self {
        Self::Narration(NarrationError::Audio(error))
    }
}
