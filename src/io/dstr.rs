//! Decoding of Store-to-RAM (`STR`) files.
//!
//! A Store-to-RAM file holds a kinetic series: many frames captured in
//! sequence by a single channel during one acquisition session. The channel
//! metadata and calibration are stored once and shared by every frame, so
//! the wavelength axis is evaluated a single time no matter how many
//! thousands of frames follow. Each frame record is a delay value followed
//! by the frame's signal samples.

use log::{debug, warn};

use crate::io::avs::read_signal;
use crate::io::cursor::BinaryCursor;
use crate::io::descriptor::ChannelDescriptor;
use crate::io::error::AvaReadError;
use crate::io::infer_format::{AvantesFormat, FormatVariant};
use crate::spectrum::MultiframeFile;

pub(crate) const MAGIC: &[u8; 3] = b"STR";

/// Delays are stored in ticks of 10 microseconds.
const DELAY_TICKS_PER_MS: f64 = 100.0;

struct StrHeader {
    variant: FormatVariant,
    frame_count: u16,
    pixel_count: u32,
}

/// Decoder for Store-to-RAM `STR` buffers.
///
/// Like [`AvsReader`](crate::io::avs::AvsReader), a pure function of the
/// input buffer; any failure aborts the decode without yielding a partial
/// series.
pub struct StrReader<'a> {
    cursor: BinaryCursor<'a>,
}

impl<'a> StrReader<'a> {
    /// Decode a complete Store-to-RAM file from `buffer`.
    pub fn decode(buffer: &'a [u8]) -> Result<MultiframeFile, AvaReadError> {
        Self {
            cursor: BinaryCursor::new(buffer),
        }
        .run()
    }

    /// Like [`StrReader::decode`], cross-checking the family the caller's
    /// format detector assigned to the file. The in-file tag is
    /// authoritative; a mismatch is only worth a warning.
    pub fn decode_declared_as(
        buffer: &'a [u8],
        declared: AvantesFormat,
    ) -> Result<MultiframeFile, AvaReadError> {
        if !matches!(declared, AvantesFormat::StoreToRam | AvantesFormat::Unknown) {
            warn!(
                "file declared as {declared} but carries a Store-to-RAM (STR) tag; trusting the tag"
            );
        }
        Self::decode(buffer)
    }

    fn run(mut self) -> Result<MultiframeFile, AvaReadError> {
        let header = self.read_header()?;
        let descriptor = ChannelDescriptor::read(&mut self.cursor)?;
        if descriptor.pixel_count() != header.pixel_count as usize {
            return Err(AvaReadError::malformed(
                "pixel count",
                format!(
                    "header declares {} pixels but the channel block covers {}",
                    header.pixel_count,
                    descriptor.pixel_count()
                ),
            ));
        }
        let pixel_count = descriptor.pixel_count();
        let wavelength = descriptor
            .calibration
            .evaluate(pixel_count)
            .map_err(|source| AvaReadError::Calibration {
                channel: usize::from(descriptor.identity.channel_index),
                source,
            })?;

        let frame_count = usize::from(header.frame_count);
        let mut delays = Vec::with_capacity(frame_count);
        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            let ticks = self.cursor.read_u32("frame delay")?;
            delays.push(f64::from(ticks) / DELAY_TICKS_PER_MS);
            frames.push(read_signal(&mut self.cursor, header.variant, pixel_count)?);
        }

        Ok(MultiframeFile::new(
            header.variant,
            descriptor,
            wavelength,
            delays,
            frames,
        ))
    }

    fn read_header(&mut self) -> Result<StrHeader, AvaReadError> {
        let magic = self.cursor.read_byte_array::<3>("magic bytes")?;
        if &magic != MAGIC {
            return Err(AvaReadError::UnrecognizedFormat { magic });
        }
        let version = self.cursor.read_byte_array::<2>("format version")?;
        let variant = FormatVariant::from_version_bytes(version)?;
        let frame_count = self.cursor.read_u16("frame count")?;
        if frame_count == 0 {
            return Err(AvaReadError::malformed(
                "frame count",
                "a Store-to-RAM file must hold at least one frame",
            ));
        }
        let pixel_count = self.cursor.read_u32("pixel count")?;
        if pixel_count == 0 {
            return Err(AvaReadError::malformed(
                "pixel count",
                "a frame cannot cover zero pixels",
            ));
        }
        debug!("STR {variant}: {frame_count} frames of {pixel_count} pixels");
        Ok(StrHeader {
            variant,
            frame_count,
            pixel_count,
        })
    }
}
