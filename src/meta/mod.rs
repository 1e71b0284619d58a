//! Metadata recorded alongside the spectra in both AvaSoft file families.

use chrono::{NaiveDate, NaiveDateTime};

/// Byte width of the serial number field, per the vendor SDK.
pub const SERIAL_LEN: usize = 10;
/// Byte width of the user-assigned alias field, per the vendor SDK.
pub const USER_ID_LEN: usize = 64;

/// Identifies the physical spectrometer a spectrum came from.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelIdentity {
    /// The device serial number, e.g. `"2011175U1"`.
    pub serial_number: String,
    /// The user-assigned alias for the device, as configured in AvaSoft.
    pub user_alias: String,
    /// The index of the channel within a multi-channel device.
    pub channel_index: u8,
}

/// Acquisition parameters recorded with each stored spectrum.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcquisitionSettings {
    /// First active detector pixel.
    pub start_pixel: u16,
    /// Last active detector pixel, inclusive. Never less than
    /// [`start_pixel`](AcquisitionSettings::start_pixel) for a decoded file.
    pub stop_pixel: u16,
    /// Integration (exposure) time in milliseconds.
    pub integration_time_ms: f32,
    /// Number of hardware averages per stored spectrum.
    pub averages: u32,
    /// Packed acquisition date and time; see
    /// [`datetime`](AcquisitionSettings::datetime).
    pub timestamp: u32,
}

impl AcquisitionSettings {
    /// The number of detector pixels covered by this acquisition.
    pub fn pixel_count(&self) -> usize {
        usize::from(self.stop_pixel).saturating_sub(usize::from(self.start_pixel)) + 1
    }

    /// Unpack the acquisition timestamp into a calendar date and time.
    ///
    /// Returns `None` when the packed fields do not form a real date, which
    /// happens for files whose clock was never set.
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        extract_datetime(self.timestamp)
    }
}

/// AvaSoft packs the acquisition date into a `u32`: the year in the top 12
/// bits, then 4 bits of month, 5 of day, 5 of hour, and 6 of minute.
/// Seconds are not stored.
pub(crate) fn extract_datetime(timestamp: u32) -> Option<NaiveDateTime> {
    let year = (timestamp >> 20) as i32;
    let month = (timestamp >> 16) & 0xF;
    let day = (timestamp >> 11) & 0x1F;
    let hour = (timestamp >> 6) & 0x1F;
    let minute = timestamp & 0x3F;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}
