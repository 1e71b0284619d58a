use bitflags::bitflags;
use log::debug;

use crate::io::cursor::BinaryCursor;
use crate::io::error::AvaReadError;
use crate::meta::{AcquisitionSettings, ChannelIdentity, SERIAL_LEN, USER_ID_LEN};
use crate::spectrum::calibration::WavelengthCalibration;

bitflags! {
    /// Presence flags for the optional per-channel arrays.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ArrayFlags: u8 {
        /// A dark (background) spectrum follows the calibration block.
        const DARK = 1;
        /// A reference spectrum follows the dark spectrum.
        const REFERENCE = 1 << 1;
        /// A per-pixel non-linearity table follows the polynomial
        /// coefficients.
        const NONLINEARITY = 1 << 2;
    }
}

/// The decoded metadata block that precedes a channel's signal payload.
///
/// Both file families store the same block layout; what follows it differs.
/// In a multichannel file every channel carries its own block, while a
/// Store-to-RAM file stores a single block shared by all frames. The signal
/// payload itself is read by the caller, since its shape depends on the
/// file family.
#[derive(Debug, Clone)]
pub struct ChannelDescriptor {
    pub identity: ChannelIdentity,
    pub settings: AcquisitionSettings,
    pub calibration: WavelengthCalibration,
    /// Dark (background) spectrum stored with the channel, if any.
    pub dark: Option<Vec<f32>>,
    /// Reference spectrum stored with the channel, if any.
    pub reference: Option<Vec<f32>>,
}

impl ChannelDescriptor {
    /// The number of pixels in this channel's signal and wavelength arrays.
    pub fn pixel_count(&self) -> usize {
        self.settings.pixel_count()
    }

    /// Decode one metadata block, leaving `cursor` at the first byte after
    /// it.
    ///
    /// Field order is fixed: channel index, serial number, alias, pixel
    /// range, acquisition settings, calibration coefficient count and
    /// coefficients, array presence flags, then any flagged arrays.
    pub fn read(cursor: &mut BinaryCursor<'_>) -> Result<Self, AvaReadError> {
        let channel_index = cursor.read_u8("channel index")?;
        let serial_number = cursor.read_fixed_str("serial number", SERIAL_LEN)?;
        let user_alias = cursor.read_fixed_str("user alias", USER_ID_LEN)?;

        let start_pixel = cursor.read_u16("start pixel")?;
        let stop_pixel = cursor.read_u16("stop pixel")?;
        if stop_pixel < start_pixel {
            return Err(AvaReadError::malformed(
                "stop pixel",
                format!("stop pixel {stop_pixel} precedes start pixel {start_pixel}"),
            ));
        }
        let integration_time_ms = cursor.read_f32("integration time")?;
        let averages = cursor.read_u32("averages")?;
        let timestamp = cursor.read_u32("timestamp")?;

        let settings = AcquisitionSettings {
            start_pixel,
            stop_pixel,
            integration_time_ms,
            averages,
            timestamp,
        };
        let pixel_count = settings.pixel_count();

        let coefficient_count = usize::from(cursor.read_u8("coefficient count")?);
        if coefficient_count == 0 {
            return Err(AvaReadError::malformed(
                "coefficient count",
                "a calibration polynomial needs at least one coefficient",
            ));
        }
        // A declared count the buffer cannot possibly satisfy is an
        // inconsistent header, not a short read.
        if coefficient_count * std::mem::size_of::<f64>() > cursor.remaining() {
            return Err(AvaReadError::malformed(
                "coefficient count",
                format!(
                    "{coefficient_count} coefficients declared with only {} bytes remaining",
                    cursor.remaining()
                ),
            ));
        }
        let coefficients = cursor.read_f64_array("calibration coefficients", coefficient_count)?;

        let raw_flags = cursor.read_u8("array flags")?;
        let flags = ArrayFlags::from_bits(raw_flags).ok_or_else(|| {
            AvaReadError::malformed(
                "array flags",
                format!("undefined flag bits in {raw_flags:#04x}"),
            )
        })?;

        let correction = if flags.contains(ArrayFlags::NONLINEARITY) {
            Some(cursor.read_f64_array("non-linearity table", pixel_count)?)
        } else {
            None
        };
        let dark = if flags.contains(ArrayFlags::DARK) {
            Some(cursor.read_f32_array("dark spectrum", pixel_count)?)
        } else {
            None
        };
        let reference = if flags.contains(ArrayFlags::REFERENCE) {
            Some(cursor.read_f32_array("reference spectrum", pixel_count)?)
        } else {
            None
        };

        let calibration = WavelengthCalibration::new(coefficients, correction).map_err(
            |source| AvaReadError::Calibration {
                channel: usize::from(channel_index),
                source,
            },
        )?;

        debug!("decoded channel {channel_index} ({serial_number}): {pixel_count} pixels");

        Ok(Self {
            identity: ChannelIdentity {
                serial_number,
                user_alias,
                channel_index,
            },
            settings,
            calibration,
            dark,
            reference,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::error::ErrorKind;
    use crate::io::test_util::DescriptorSpec;

    #[test]
    fn reads_a_complete_block() {
        let spec = DescriptorSpec {
            index: 3,
            serial: "1911250U2".into(),
            alias: "Slave 1".into(),
            start_pixel: 2,
            stop_pixel: 5,
            integration_time_ms: 2.4,
            averages: 10,
            coefficients: vec![500.0, 0.25],
            dark: Some(vec![1.0, 2.0, 3.0, 4.0]),
            ..Default::default()
        };
        let mut buf = Vec::new();
        spec.encode(&mut buf);

        let mut cursor = BinaryCursor::new(&buf);
        let descriptor = ChannelDescriptor::read(&mut cursor).unwrap();
        assert_eq!(descriptor.identity.channel_index, 3);
        assert_eq!(descriptor.identity.serial_number, "1911250U2");
        assert_eq!(descriptor.identity.user_alias, "Slave 1");
        assert_eq!(descriptor.settings.integration_time_ms, 2.4);
        assert_eq!(descriptor.settings.averages, 10);
        assert_eq!(descriptor.pixel_count(), 4);
        assert_eq!(descriptor.calibration.coefficients(), &[500.0, 0.25]);
        assert_eq!(descriptor.dark.as_deref(), Some(&[1.0f32, 2.0, 3.0, 4.0][..]));
        assert!(descriptor.reference.is_none());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn cursor_lands_exactly_after_the_block() {
        let spec = DescriptorSpec::with_pixels(3);
        let mut buf = Vec::new();
        spec.encode(&mut buf);
        buf.extend_from_slice(&7.5f32.to_le_bytes());

        let mut cursor = BinaryCursor::new(&buf);
        ChannelDescriptor::read(&mut cursor).unwrap();
        assert_eq!(cursor.read_f32("payload").unwrap(), 7.5);
    }

    #[test]
    fn inverted_pixel_range_is_malformed() {
        let spec = DescriptorSpec {
            start_pixel: 5,
            stop_pixel: 2,
            ..Default::default()
        };
        let mut buf = Vec::new();
        spec.encode(&mut buf);
        let err = ChannelDescriptor::read(&mut BinaryCursor::new(&buf)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn zero_coefficient_count_is_malformed() {
        let spec = DescriptorSpec {
            coefficients: Vec::new(),
            ..Default::default()
        };
        let mut buf = Vec::new();
        spec.encode(&mut buf);
        let err = ChannelDescriptor::read(&mut BinaryCursor::new(&buf)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn overdeclared_coefficient_count_is_malformed_not_truncated() {
        let spec = DescriptorSpec::with_pixels(1);
        let mut buf = Vec::new();
        spec.encode(&mut buf);
        // rewrite the coefficient count to something the remaining bytes
        // cannot hold: it sits right after the fixed-width prefix
        let count_offset = 1 + SERIAL_LEN + USER_ID_LEN + 2 + 2 + 4 + 4 + 4;
        buf[count_offset] = 200;
        let err = ChannelDescriptor::read(&mut BinaryCursor::new(&buf)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn undefined_flag_bits_are_malformed() {
        let spec = DescriptorSpec::with_pixels(1);
        let mut buf = Vec::new();
        spec.encode(&mut buf);
        let flags_offset = buf.len() - 1;
        buf[flags_offset] = 0b1000_0000;
        let err = ChannelDescriptor::read(&mut BinaryCursor::new(&buf)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn truncated_optional_array_is_detected() {
        let spec = DescriptorSpec {
            reference: Some(vec![1.0; 8]),
            start_pixel: 0,
            stop_pixel: 7,
            ..Default::default()
        };
        let mut buf = Vec::new();
        spec.encode(&mut buf);
        buf.truncate(buf.len() - 6);
        let err = ChannelDescriptor::read(&mut BinaryCursor::new(&buf)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedData);
    }
}
