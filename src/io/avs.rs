//! Decoding of multichannel (`AVS`) files.
//!
//! An `AVS` file holds one spectrum per connected spectrometer channel.
//! Channels are stored strictly sequentially with no table of contents:
//! channel N+1's metadata block begins immediately after channel N's signal
//! payload ends, so decoding is depth-first per channel.

use log::{debug, warn};

use crate::io::cursor::BinaryCursor;
use crate::io::descriptor::ChannelDescriptor;
use crate::io::error::AvaReadError;
use crate::io::infer_format::{AvantesFormat, FormatVariant};
use crate::spectrum::{ChannelRecord, MultichannelFile};

pub(crate) const MAGIC: &[u8; 3] = b"AVS";

/// Decoder for multichannel `AVS` buffers.
///
/// The decoder is a pure function of the input buffer: it owns its cursor,
/// retains nothing, and either returns a complete [`MultichannelFile`] or
/// fails without producing a partial container.
pub struct AvsReader<'a> {
    cursor: BinaryCursor<'a>,
}

impl<'a> AvsReader<'a> {
    /// Decode a complete multichannel file from `buffer`.
    pub fn decode(buffer: &'a [u8]) -> Result<MultichannelFile, AvaReadError> {
        Self {
            cursor: BinaryCursor::new(buffer),
        }
        .run()
    }

    /// Like [`AvsReader::decode`], cross-checking the family the caller's
    /// format detector assigned to the file. The in-file tag is
    /// authoritative; a mismatch is only worth a warning.
    pub fn decode_declared_as(
        buffer: &'a [u8],
        declared: AvantesFormat,
    ) -> Result<MultichannelFile, AvaReadError> {
        if !matches!(
            declared,
            AvantesFormat::Multichannel | AvantesFormat::Unknown
        ) {
            warn!("file declared as {declared} but carries a multichannel (AVS) tag; trusting the tag");
        }
        Self::decode(buffer)
    }

    fn run(mut self) -> Result<MultichannelFile, AvaReadError> {
        let (variant, channel_count) = self.read_header()?;
        let mut channels = Vec::with_capacity(usize::from(channel_count));
        for index in 0..usize::from(channel_count) {
            channels.push(self.read_channel(variant, index)?);
        }
        MultichannelFile::from_channels(variant, channels)
    }

    fn read_header(&mut self) -> Result<(FormatVariant, u8), AvaReadError> {
        let magic = self.cursor.read_byte_array::<3>("magic bytes")?;
        if &magic != MAGIC {
            return Err(AvaReadError::UnrecognizedFormat { magic });
        }
        let version = self.cursor.read_byte_array::<2>("format version")?;
        let variant = FormatVariant::from_version_bytes(version)?;
        let channel_count = self.cursor.read_u8("channel count")?;
        if channel_count == 0 {
            return Err(AvaReadError::malformed(
                "channel count",
                "a multichannel file must hold at least one channel",
            ));
        }
        debug!("AVS {variant}: {channel_count} channels");
        Ok((variant, channel_count))
    }

    fn read_channel(
        &mut self,
        variant: FormatVariant,
        index: usize,
    ) -> Result<ChannelRecord, AvaReadError> {
        let descriptor = ChannelDescriptor::read(&mut self.cursor)?;
        let pixel_count = descriptor.pixel_count();
        let signal = read_signal(&mut self.cursor, variant, pixel_count)?;
        let wavelength = descriptor
            .calibration
            .evaluate(pixel_count)
            .map_err(|source| AvaReadError::Calibration {
                channel: index,
                source,
            })?;
        Ok(ChannelRecord::new(descriptor, wavelength, signal))
    }
}

/// Read one signal payload at the variant's sample width, normalized to
/// `f64`.
pub(crate) fn read_signal(
    cursor: &mut BinaryCursor<'_>,
    variant: FormatVariant,
    pixel_count: usize,
) -> Result<Vec<f64>, AvaReadError> {
    match variant {
        FormatVariant::V8_0 => Ok(cursor
            .read_f32_array("signal", pixel_count)?
            .into_iter()
            .map(f64::from)
            .collect()),
        FormatVariant::V8_1 => cursor.read_f64_array("signal", pixel_count),
    }
}
