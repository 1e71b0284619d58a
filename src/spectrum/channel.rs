use std::ops::Index;

use indexmap::IndexMap;

use crate::io::descriptor::ChannelDescriptor;
use crate::io::{AvaReadError, FormatVariant};
use crate::meta::{AcquisitionSettings, ChannelIdentity};
use crate::spectrum::calibration::WavelengthCalibration;

/// One channel's decoded spectrum together with its metadata.
///
/// Built once during decode, immutable afterwards, and owned by its parent
/// [`MultichannelFile`]. The wavelength array is derived from the channel's
/// calibration and always has the same length as the signal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelRecord {
    identity: ChannelIdentity,
    settings: AcquisitionSettings,
    calibration: WavelengthCalibration,
    wavelength: Vec<f64>,
    signal: Vec<f64>,
    dark: Option<Vec<f32>>,
    reference: Option<Vec<f32>>,
}

impl ChannelRecord {
    pub(crate) fn new(
        descriptor: ChannelDescriptor,
        wavelength: Vec<f64>,
        signal: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(wavelength.len(), signal.len());
        let ChannelDescriptor {
            identity,
            settings,
            calibration,
            dark,
            reference,
        } = descriptor;
        Self {
            identity,
            settings,
            calibration,
            wavelength,
            signal,
            dark,
            reference,
        }
    }

    pub fn identity(&self) -> &ChannelIdentity {
        &self.identity
    }

    /// The serial number of the spectrometer this channel came from.
    pub fn serial_number(&self) -> &str {
        &self.identity.serial_number
    }

    pub fn settings(&self) -> &AcquisitionSettings {
        &self.settings
    }

    pub fn calibration(&self) -> &WavelengthCalibration {
        &self.calibration
    }

    /// The number of detector pixels in this channel.
    pub fn pixel_count(&self) -> usize {
        self.signal.len()
    }

    /// The wavelength axis, one entry per pixel.
    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    /// The raw signal as stored in the file, one entry per pixel.
    pub fn signal(&self) -> &[f64] {
        &self.signal
    }

    /// The dark (background) spectrum stored with the channel, if any.
    pub fn dark(&self) -> Option<&[f32]> {
        self.dark.as_deref()
    }

    /// The reference spectrum stored with the channel, if any.
    pub fn reference(&self) -> Option<&[f32]> {
        self.reference.as_deref()
    }
}

/// The decoded contents of a multichannel (`AVS`) file.
///
/// A read-only ordered sequence of [`ChannelRecord`]s, in on-disk order.
/// Channels may differ in pixel count. The sequence is never empty for a
/// successfully decoded file. Channels can also be looked up by the serial
/// number of the device that produced them.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultichannelFile {
    variant: FormatVariant,
    channels: Vec<ChannelRecord>,
    by_serial: IndexMap<Box<str>, usize>,
}

impl MultichannelFile {
    pub(crate) fn from_channels(
        variant: FormatVariant,
        channels: Vec<ChannelRecord>,
    ) -> Result<Self, AvaReadError> {
        let mut by_serial = IndexMap::with_capacity(channels.len());
        for (index, channel) in channels.iter().enumerate() {
            if by_serial
                .insert(Box::from(channel.serial_number()), index)
                .is_some()
            {
                return Err(AvaReadError::malformed(
                    "serial number",
                    format!(
                        "serial {} appears on more than one channel",
                        channel.serial_number()
                    ),
                ));
            }
        }
        Ok(Self {
            variant,
            channels,
            by_serial,
        })
    }

    /// The layout variant the file was stored with.
    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// The number of channels in the file.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// The channels in on-disk order.
    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    pub fn get(&self, index: usize) -> Option<&ChannelRecord> {
        self.channels.get(index)
    }

    /// Look up a channel by the serial number of its spectrometer.
    pub fn get_by_serial(&self, serial: &str) -> Option<&ChannelRecord> {
        self.by_serial
            .get(serial)
            .and_then(|index| self.channels.get(*index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChannelRecord> {
        self.channels.iter()
    }
}

impl Index<usize> for MultichannelFile {
    type Output = ChannelRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.channels[index]
    }
}

impl<'a> IntoIterator for &'a MultichannelFile {
    type Item = &'a ChannelRecord;
    type IntoIter = std::slice::Iter<'a, ChannelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

impl IntoIterator for MultichannelFile {
    type Item = ChannelRecord;
    type IntoIter = std::vec::IntoIter<ChannelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.into_iter()
    }
}
