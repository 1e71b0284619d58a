//! Synthetic buffer builders shared by the decoder tests.

use crate::meta::{SERIAL_LEN, USER_ID_LEN};

use super::descriptor::ArrayFlags;

pub(crate) fn push_fixed_str(buf: &mut Vec<u8>, text: &str, width: usize) {
    let bytes = text.as_bytes();
    assert!(bytes.len() <= width, "field {text:?} wider than {width}");
    buf.extend_from_slice(bytes);
    buf.resize(buf.len() + (width - bytes.len()), 0);
}

pub(crate) fn push_f32s(buf: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}

pub(crate) fn push_f64s(buf: &mut Vec<u8>, values: &[f64]) {
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}

pub(crate) fn avs_header(buf: &mut Vec<u8>, version: &[u8; 2], channel_count: u8) {
    buf.extend_from_slice(b"AVS");
    buf.extend_from_slice(version);
    buf.push(channel_count);
}

pub(crate) fn str_header(buf: &mut Vec<u8>, version: &[u8; 2], frame_count: u16, pixel_count: u32) {
    buf.extend_from_slice(b"STR");
    buf.extend_from_slice(version);
    buf.extend_from_slice(&frame_count.to_le_bytes());
    buf.extend_from_slice(&pixel_count.to_le_bytes());
}

/// A channel metadata block to encode into a synthetic buffer.
pub(crate) struct DescriptorSpec {
    pub index: u8,
    pub serial: String,
    pub alias: String,
    pub start_pixel: u16,
    pub stop_pixel: u16,
    pub integration_time_ms: f32,
    pub averages: u32,
    pub timestamp: u32,
    pub coefficients: Vec<f64>,
    pub correction: Option<Vec<f64>>,
    pub dark: Option<Vec<f32>>,
    pub reference: Option<Vec<f32>>,
}

impl Default for DescriptorSpec {
    fn default() -> Self {
        Self {
            index: 0,
            serial: "2011175U1".into(),
            alias: "Master".into(),
            start_pixel: 0,
            stop_pixel: 0,
            integration_time_ms: 1.05,
            averages: 1,
            timestamp: (2024 << 20) | (3 << 16) | (9 << 11) | (11 << 6) | 30,
            coefficients: vec![0.0, 1.0],
            correction: None,
            dark: None,
            reference: None,
        }
    }
}

impl DescriptorSpec {
    /// A default block covering pixels `0..pixel_count`.
    pub fn with_pixels(pixel_count: u16) -> Self {
        assert!(pixel_count > 0);
        Self {
            stop_pixel: pixel_count - 1,
            ..Default::default()
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.index);
        push_fixed_str(buf, &self.serial, SERIAL_LEN);
        push_fixed_str(buf, &self.alias, USER_ID_LEN);
        buf.extend_from_slice(&self.start_pixel.to_le_bytes());
        buf.extend_from_slice(&self.stop_pixel.to_le_bytes());
        buf.extend_from_slice(&self.integration_time_ms.to_le_bytes());
        buf.extend_from_slice(&self.averages.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());

        buf.push(self.coefficients.len() as u8);
        push_f64s(buf, &self.coefficients);

        let mut flags = ArrayFlags::empty();
        if self.dark.is_some() {
            flags |= ArrayFlags::DARK;
        }
        if self.reference.is_some() {
            flags |= ArrayFlags::REFERENCE;
        }
        if self.correction.is_some() {
            flags |= ArrayFlags::NONLINEARITY;
        }
        buf.push(flags.bits());

        if let Some(correction) = &self.correction {
            push_f64s(buf, correction);
        }
        if let Some(dark) = &self.dark {
            push_f32s(buf, dark);
        }
        if let Some(reference) = &self.reference {
            push_f32s(buf, reference);
        }
    }
}
