use crate::io::error::AvaReadError;

/// A sequential little-endian reader over a fixed byte buffer.
///
/// The vendor formats mix 8/16/32-bit integers, IEEE floats, and fixed-width
/// character fields, all little-endian. Every multi-byte read in this crate
/// goes through this type so byte order and width decisions live in one
/// place. Reads that would run past the end of the buffer fail with a
/// [`TruncatedData`](AvaReadError::TruncatedData) error and leave the offset
/// untouched; there is no partial consumption.
#[derive(Debug, Clone)]
pub struct BinaryCursor<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> BinaryCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// The current read offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    fn take(&mut self, field: &'static str, n: usize) -> Result<&'a [u8], AvaReadError> {
        if n > self.remaining() {
            return Err(AvaReadError::TruncatedData {
                field,
                offset: self.position,
                needed: n,
                available: self.remaining(),
            });
        }
        let chunk = &self.buf[self.position..self.position + n];
        self.position += n;
        Ok(chunk)
    }

    /// Take the next `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, field: &'static str, n: usize) -> Result<&'a [u8], AvaReadError> {
        self.take(field, n)
    }

    /// Take the next `N` bytes as a fixed-size array.
    pub fn read_byte_array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], AvaReadError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(field, N)?);
        Ok(out)
    }

    /// Look at the next `n` bytes without advancing.
    pub fn peek_bytes(&self, field: &'static str, n: usize) -> Result<&'a [u8], AvaReadError> {
        if n > self.remaining() {
            return Err(AvaReadError::TruncatedData {
                field,
                offset: self.position,
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(&self.buf[self.position..self.position + n])
    }

    /// Advance the cursor over `n` bytes without decoding them.
    pub fn skip(&mut self, field: &'static str, n: usize) -> Result<(), AvaReadError> {
        self.take(field, n).map(|_| ())
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, AvaReadError> {
        Ok(self.read_byte_array::<1>(field)?[0])
    }

    pub fn read_i8(&mut self, field: &'static str) -> Result<i8, AvaReadError> {
        Ok(self.read_byte_array::<1>(field)?[0] as i8)
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, AvaReadError> {
        Ok(u16::from_le_bytes(self.read_byte_array(field)?))
    }

    pub fn read_i16(&mut self, field: &'static str) -> Result<i16, AvaReadError> {
        Ok(i16::from_le_bytes(self.read_byte_array(field)?))
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, AvaReadError> {
        Ok(u32::from_le_bytes(self.read_byte_array(field)?))
    }

    pub fn read_i32(&mut self, field: &'static str) -> Result<i32, AvaReadError> {
        Ok(i32::from_le_bytes(self.read_byte_array(field)?))
    }

    pub fn read_u64(&mut self, field: &'static str) -> Result<u64, AvaReadError> {
        Ok(u64::from_le_bytes(self.read_byte_array(field)?))
    }

    pub fn read_i64(&mut self, field: &'static str) -> Result<i64, AvaReadError> {
        Ok(i64::from_le_bytes(self.read_byte_array(field)?))
    }

    pub fn read_f32(&mut self, field: &'static str) -> Result<f32, AvaReadError> {
        Ok(f32::from_le_bytes(self.read_byte_array(field)?))
    }

    pub fn read_f64(&mut self, field: &'static str) -> Result<f64, AvaReadError> {
        Ok(f64::from_le_bytes(self.read_byte_array(field)?))
    }

    /// Read a fixed-width character field of `n` bytes.
    ///
    /// The vendor pads these fields with NUL bytes; anything after the first
    /// NUL is ignored and trailing whitespace is stripped.
    pub fn read_fixed_str(
        &mut self,
        field: &'static str,
        n: usize,
    ) -> Result<String, AvaReadError> {
        let raw = self.take(field, n)?;
        let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        let text = String::from_utf8_lossy(&raw[..end]);
        Ok(text.trim_end().to_string())
    }

    /// Read `count` little-endian `f32` values.
    pub fn read_f32_array(
        &mut self,
        field: &'static str,
        count: usize,
    ) -> Result<Vec<f32>, AvaReadError> {
        let raw = self.take(field, count * std::mem::size_of::<f32>())?;
        Ok(bytemuck::cast_slice::<_, [u8; 4]>(raw)
            .iter()
            .copied()
            .map(f32::from_le_bytes)
            .collect())
    }

    /// Read `count` little-endian `f64` values.
    pub fn read_f64_array(
        &mut self,
        field: &'static str,
        count: usize,
    ) -> Result<Vec<f64>, AvaReadError> {
        let raw = self.take(field, count * std::mem::size_of::<f64>())?;
        Ok(bytemuck::cast_slice::<_, [u8; 8]>(raw)
            .iter()
            .copied()
            .map(f64::from_le_bytes)
            .collect())
    }
}
