use crate::error::{EsvmError, Result};

/// Cursor over a little-endian payload that reports failures by byte offset.
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(EsvmError::parse_at_byte(
                self.pos,
                format!(
                    "truncated {what}: needed {n} bytes, {} left",
                    self.remaining()
                ),
            ));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    pub(crate) fn expect_magic(&mut self, magic: &[u8]) -> Result<()> {
        let at = self.pos;
        let found = self.take(magic.len(), "header")?;
        if found != magic {
            return Err(EsvmError::parse_at_byte(
                at,
                format!(
                    "bad magic: expected {:?}, found {:?}",
                    String::from_utf8_lossy(magic),
                    String::from_utf8_lossy(found)
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    pub(crate) fn i32(&mut self, what: &str) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array(what)?))
    }

    pub(crate) fn u64(&mut self, what: &str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array(what)?))
    }

    /// A `u64` length that must also fit the remaining payload at
    /// `elem_size` bytes per element.
    pub(crate) fn length(&mut self, elem_size: usize, what: &str) -> Result<usize> {
        let at = self.pos;
        let raw = self.u64(what)?;
        let len = usize::try_from(raw)
            .ok()
            .filter(|l| l.checked_mul(elem_size).is_some_and(|b| b <= self.remaining()))
            .ok_or_else(|| {
                EsvmError::parse_at_byte(at, format!("{what} {raw} exceeds the remaining payload"))
            })?;
        Ok(len)
    }

    pub(crate) fn f64(&mut self, what: &str) -> Result<f64> {
        Ok(f64::from_le_bytes(self.array(what)?))
    }

    pub(crate) fn f64_vec(&mut self, n: usize, what: &str) -> Result<Vec<f64>> {
        let bytes = self.take(n * 8, what)?;
        Ok(bytes
            .chunks_exact(8)
            .map(|c| {
                let mut a = [0u8; 8];
                a.copy_from_slice(c);
                f64::from_le_bytes(a)
            })
            .collect())
    }

    pub(crate) fn finish(&self) -> Result<()> {
        if self.remaining() > 0 {
            return Err(EsvmError::parse_at_byte(
                self.pos,
                format!("{} trailing bytes", self.remaining()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;

    #[test]
    fn reads_little_endian_fields_in_order() {
        let mut buf = Vec::new();
        buf.push(7u8);
        buf.extend_from_slice(&(-3i32).to_le_bytes());
        buf.extend_from_slice(&42u64.to_le_bytes());
        buf.extend_from_slice(&1.5f64.to_le_bytes());

        let mut r = ByteReader::new(&buf);
        assert_eq!(r.u8("a").unwrap(), 7);
        assert_eq!(r.i32("b").unwrap(), -3);
        assert_eq!(r.u64("c").unwrap(), 42);
        assert_eq!(r.f64("d").unwrap(), 1.5);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn truncation_reports_offset() {
        let buf = [1u8, 2, 3];
        let mut r = ByteReader::new(&buf);
        r.u8("x").unwrap();
        match r.u64("count") {
            Err(EsvmError::Parse {
                location: Location::Byte(1),
                ..
            }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn oversized_length_is_rejected_before_allocating() {
        let buf = u64::MAX.to_le_bytes();
        let mut r = ByteReader::new(&buf);
        assert!(matches!(
            r.length(8, "record length"),
            Err(EsvmError::Parse {
                location: Location::Byte(0),
                ..
            })
        ));
    }

    #[test]
    fn magic_mismatch() {
        let mut r = ByteReader::new(b"NOPE");
        assert!(r.expect_magic(b"ESVM").is_err());
    }
}
