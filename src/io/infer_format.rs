use std::{fmt::Display, fs, path::Path};

use log::warn;

use crate::io::avs::AvsReader;
use crate::io::dstr::StrReader;
use crate::io::error::AvaReadError;
use crate::spectrum::{MultichannelFile, MultiframeFile};

/// The AvaSoft file families that [`avaread`](crate) supports.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AvantesFormat {
    /// A multichannel file, one spectrum per connected spectrometer
    /// (`AVS` tag).
    Multichannel,
    /// A Store-to-RAM file, a kinetic series captured by a single channel
    /// (`STR` tag).
    StoreToRam,
    Unknown,
}

impl Display for AvantesFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The supported sub-variants of the on-disk layout, keyed by the two ASCII
/// version digits that follow the magic bytes.
///
/// The variant fixes the numeric width of the stored signal samples, so it
/// is dispatched once per file rather than re-inspected per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatVariant {
    /// AvaSoft 8.0: 32-bit float signal samples.
    V8_0,
    /// AvaSoft 8.1: 64-bit float signal samples.
    V8_1,
}

impl FormatVariant {
    pub(crate) fn from_version_bytes(raw: [u8; 2]) -> Result<Self, AvaReadError> {
        match &raw {
            b"80" => Ok(Self::V8_0),
            b"81" => Ok(Self::V8_1),
            _ => Err(AvaReadError::UnsupportedVariant {
                version: String::from_utf8_lossy(&raw).into_owned(),
            }),
        }
    }

    /// The stored width of one signal sample in bytes.
    pub fn sample_width(&self) -> usize {
        match self {
            Self::V8_0 => 4,
            Self::V8_1 => 8,
        }
    }
}

impl Display for FormatVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V8_0 => write!(f, "8.0"),
            Self::V8_1 => write!(f, "8.1"),
        }
    }
}

/// Infer the file family from a file name alone.
///
/// AvaSoft saves multichannel spectra under a family of extensions, one per
/// measurement mode, and Store-to-RAM series as `.str`.
pub fn infer_from_path<P: AsRef<Path>>(path: P) -> AvantesFormat {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("raw8" | "dark8" | "ref8" | "abs8" | "trm8" | "irr8") => AvantesFormat::Multichannel,
        Some("str") => AvantesFormat::StoreToRam,
        _ => AvantesFormat::Unknown,
    }
}

/// Infer the file family from the leading magic bytes of a buffer.
pub fn infer_from_buffer(buffer: &[u8]) -> AvantesFormat {
    match buffer.get(..3) {
        Some(b"AVS") => AvantesFormat::Multichannel,
        Some(b"STR") => AvantesFormat::StoreToRam,
        _ => AvantesFormat::Unknown,
    }
}

/// Either kind of decoded AvaSoft file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AvantesFile {
    Multichannel(MultichannelFile),
    StoreToRam(MultiframeFile),
}

/// Decode a buffer holding either file family, dispatching on the in-file
/// magic bytes.
pub fn read_bytes(buffer: &[u8]) -> Result<AvantesFile, AvaReadError> {
    match infer_from_buffer(buffer) {
        AvantesFormat::Multichannel => AvsReader::decode(buffer).map(AvantesFile::Multichannel),
        AvantesFormat::StoreToRam => StrReader::decode(buffer).map(AvantesFile::StoreToRam),
        _ => {
            let mut magic = [0u8; 3];
            for (dst, src) in magic.iter_mut().zip(buffer) {
                *dst = *src;
            }
            Err(AvaReadError::UnrecognizedFormat { magic })
        }
    }
}

/// Read and decode the file at `path`.
///
/// The extension is only consulted to warn when it disagrees with the
/// in-file tag; the tag is authoritative.
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<AvantesFile, AvaReadError> {
    let path = path.as_ref();
    let declared = infer_from_path(path);
    let buffer = fs::read(path)?;
    let detected = infer_from_buffer(&buffer);
    if declared != AvantesFormat::Unknown && declared != detected {
        warn!(
            "{} has a {declared} extension but carries a {detected} tag; trusting the tag",
            path.display()
        );
    }
    read_bytes(&buffer)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;
    use crate::io::error::ErrorKind;
    use crate::io::test_util::{avs_header, push_f32s, str_header, DescriptorSpec};

    fn tiny_avs() -> Vec<u8> {
        let mut buf = Vec::new();
        avs_header(&mut buf, b"80", 1);
        DescriptorSpec::with_pixels(2).encode(&mut buf);
        push_f32s(&mut buf, &[4.0, 5.0]);
        buf
    }

    fn tiny_str() -> Vec<u8> {
        let mut buf = Vec::new();
        str_header(&mut buf, b"80", 1, 2);
        DescriptorSpec::with_pixels(2).encode(&mut buf);
        buf.extend_from_slice(&100u32.to_le_bytes());
        push_f32s(&mut buf, &[4.0, 5.0]);
        buf
    }

    #[test]
    fn extension_table() {
        assert_eq!(
            infer_from_path("spectrum.RAW8"),
            AvantesFormat::Multichannel
        );
        assert_eq!(infer_from_path("series.str"), AvantesFormat::StoreToRam);
        assert_eq!(infer_from_path("dark.dark8"), AvantesFormat::Multichannel);
        assert_eq!(infer_from_path("notes.txt"), AvantesFormat::Unknown);
        assert_eq!(infer_from_path("no_extension"), AvantesFormat::Unknown);
    }

    #[test]
    fn magic_bytes_identify_the_family() {
        assert_eq!(infer_from_buffer(&tiny_avs()), AvantesFormat::Multichannel);
        assert_eq!(infer_from_buffer(&tiny_str()), AvantesFormat::StoreToRam);
        assert_eq!(infer_from_buffer(b"\x89PNG"), AvantesFormat::Unknown);
        assert_eq!(infer_from_buffer(b"AV"), AvantesFormat::Unknown);
    }

    #[test]
    fn read_bytes_dispatches_on_the_tag() {
        assert!(matches!(
            read_bytes(&tiny_avs()).unwrap(),
            AvantesFile::Multichannel(_)
        ));
        assert!(matches!(
            read_bytes(&tiny_str()).unwrap(),
            AvantesFile::StoreToRam(_)
        ));
    }

    #[test]
    fn unknown_magic_is_not_a_variant_error() {
        let err = read_bytes(b"XYZ rest of file").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedFormat);
    }

    #[test_log::test]
    fn extension_mismatch_is_tolerated() {
        // an AVS payload saved under a .str name decodes per its tag
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabeled.str");
        let mut handle = std::fs::File::create(&path).unwrap();
        handle.write_all(&tiny_avs()).unwrap();
        drop(handle);

        assert!(matches!(
            read_path(&path).unwrap(),
            AvantesFile::Multichannel(_)
        ));
    }

    #[test]
    fn missing_file_surfaces_io_kind() {
        let err = read_path("/nonexistent/spectrum.raw8").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
