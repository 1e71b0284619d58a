//! The in-memory data model for decoded spectra.
//!
//! Containers are produced once by a decoder from an immutable byte buffer
//! and never mutated afterwards; they own all of their data.

pub mod calibration;
pub mod channel;
pub mod frames;

pub use crate::spectrum::calibration::{CalibrationError, WavelengthCalibration};
pub use crate::spectrum::channel::{ChannelRecord, MultichannelFile};
pub use crate::spectrum::frames::MultiframeFile;
