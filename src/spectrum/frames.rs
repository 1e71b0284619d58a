use std::ops::Index;

use crate::io::descriptor::ChannelDescriptor;
use crate::io::FormatVariant;
use crate::meta::{AcquisitionSettings, ChannelIdentity};
use crate::spectrum::calibration::WavelengthCalibration;

/// The decoded contents of a Store-to-RAM (`STR`) file.
///
/// A kinetic series: many frames captured in sequence by one channel. All
/// frames share one wavelength axis, evaluated once from the file's single
/// calibration. Delays and frames are parallel sequences; for every decoded
/// file `delays().len() == frame_count()` and every frame has
/// [`pixel_count`](MultiframeFile::pixel_count) samples.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiframeFile {
    variant: FormatVariant,
    identity: ChannelIdentity,
    settings: AcquisitionSettings,
    calibration: WavelengthCalibration,
    wavelength: Vec<f64>,
    delays: Vec<f64>,
    frames: Vec<Vec<f64>>,
    dark: Option<Vec<f32>>,
    reference: Option<Vec<f32>>,
}

impl MultiframeFile {
    pub(crate) fn new(
        variant: FormatVariant,
        descriptor: ChannelDescriptor,
        wavelength: Vec<f64>,
        delays: Vec<f64>,
        frames: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(delays.len(), frames.len());
        let ChannelDescriptor {
            identity,
            settings,
            calibration,
            dark,
            reference,
        } = descriptor;
        Self {
            variant,
            identity,
            settings,
            calibration,
            wavelength,
            delays,
            frames,
            dark,
            reference,
        }
    }

    /// The layout variant the file was stored with.
    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// The spectrometer all frames were captured by.
    pub fn identity(&self) -> &ChannelIdentity {
        &self.identity
    }

    pub fn settings(&self) -> &AcquisitionSettings {
        &self.settings
    }

    pub fn calibration(&self) -> &WavelengthCalibration {
        &self.calibration
    }

    /// The number of detector pixels per frame.
    pub fn pixel_count(&self) -> usize {
        self.wavelength.len()
    }

    /// The number of frames in the series.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The shared wavelength axis, one entry per pixel.
    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    /// Per-frame delays in milliseconds, one per frame, in capture order.
    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    /// The delay of frame `index` in milliseconds.
    pub fn delay(&self, index: usize) -> Option<f64> {
        self.delays.get(index).copied()
    }

    /// The signal array of frame `index`.
    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// Iterate over the frame signal arrays in capture order.
    pub fn iter_frames(&self) -> impl Iterator<Item = &[f64]> {
        self.frames.iter().map(Vec::as_slice)
    }

    /// The dark (background) spectrum shared by all frames, if stored.
    pub fn dark(&self) -> Option<&[f32]> {
        self.dark.as_deref()
    }

    /// The reference spectrum shared by all frames, if stored.
    pub fn reference(&self) -> Option<&[f32]> {
        self.reference.as_deref()
    }
}

impl Index<usize> for MultiframeFile {
    type Output = [f64];

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}

impl<'a> IntoIterator for &'a MultiframeFile {
    type Item = &'a [f64];
    type IntoIter = std::iter::Map<std::slice::Iter<'a, Vec<f64>>, fn(&Vec<f64>) -> &[f64]>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter().map(Vec::as_slice)
    }
}
