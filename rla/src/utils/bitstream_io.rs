//! Bitstream I/O utilities for the RLA container.
//!
//! Wraps [`bitstream_io`] readers and writers with big-endian bit order,
//! explicit end-of-stream errors, and bit-position accounting. Every field
//! of the container goes through these types: values are written
//! most-significant bit first, and the final partial byte of a stream is
//! zero-padded on finalize.

use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter, UnsignedInteger};

#[derive(Debug)]
pub struct BitstreamIoReader<R: io::Read + io::Seek> {
    bs: BitReader<R, BigEndian>,
    len: u64,
}

pub type BsIoSliceReader<'a> = BitstreamIoReader<io::Cursor<&'a [u8]>>;

impl<R> BitstreamIoReader<R>
where
    R: io::Read + io::Seek,
{
    pub fn new(read: R, len_bytes: u64) -> Self {
        Self {
            bs: BitReader::new(read),
            len: len_bytes << 3,
        }
    }

    #[inline(always)]
    pub fn get(&mut self) -> io::Result<bool> {
        self.bs.read_bit()
    }

    #[inline(always)]
    pub fn get_n<I: UnsignedInteger>(&mut self, n: u32) -> io::Result<I> {
        match self.bs.read_unsigned_var(n) {
            Ok(val) => Ok(val),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                // Only call position() on the error path to avoid overhead
                Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "get_n({}): out of bounds bits at {}",
                        n,
                        self.bs.position_in_bits().unwrap_or(0)
                    ),
                ))
            }
            Err(e) => Err(e),
        }
    }

    #[inline(always)]
    pub fn available(&mut self) -> io::Result<u64> {
        self.bs.position_in_bits().map(|pos| self.len - pos)
    }

    #[inline(always)]
    pub fn position(&mut self) -> io::Result<u64> {
        self.bs.position_in_bits()
    }
}

impl<'a> BsIoSliceReader<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        let len = buf.len() as u64;
        let read = io::Cursor::new(buf);

        Self::new(read, len)
    }
}

impl Default for BsIoSliceReader<'_> {
    fn default() -> Self {
        Self::from_slice(&[])
    }
}

pub struct BitstreamIoWriter<W: io::Write> {
    bs: BitWriter<W, BigEndian>,
    bits_written: u64,
}

impl<W: io::Write> std::fmt::Debug for BitstreamIoWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitstreamIoWriter")
            .field("bits_written", &self.bits_written)
            .finish_non_exhaustive()
    }
}

impl<W: io::Write> BitstreamIoWriter<W> {
    pub fn new(write: W) -> Self {
        Self {
            bs: BitWriter::new(write),
            bits_written: 0,
        }
    }

    #[inline(always)]
    pub fn put(&mut self, bit: bool) -> io::Result<()> {
        self.bs.write_bit(bit)?;
        self.bits_written += 1;
        Ok(())
    }

    #[inline(always)]
    pub fn put_n<I: UnsignedInteger>(&mut self, value: I, n: u32) -> io::Result<()> {
        self.bs.write_unsigned_var(n, value)?;
        self.bits_written += u64::from(n);
        Ok(())
    }

    /// Bits handed to the writer so far, excluding alignment padding.
    #[inline(always)]
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Zero-pads the pending partial byte, flushes, and returns the sink.
    pub fn finalize(mut self) -> io::Result<W> {
        self.bs.byte_align()?;
        let mut write = self.bs.into_writer();
        write.flush()?;
        Ok(write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_byte_is_zero_padded() -> io::Result<()> {
        let mut writer = BitstreamIoWriter::new(Vec::new());
        writer.put(true)?;
        writer.put_n(0b101u8, 3)?;
        assert_eq!(writer.bits_written(), 4);

        let bytes = writer.finalize()?;
        assert_eq!(bytes, vec![0b1101_0000]);
        Ok(())
    }

    #[test]
    fn bits_round_trip() -> io::Result<()> {
        let mut writer = BitstreamIoWriter::new(Vec::new());
        writer.put_n(0xA5u8, 8)?;
        writer.put_n(0x1234u16, 16)?;
        writer.put(false)?;
        writer.put_n(0x7FFF_FFFFu32, 31)?;
        let bytes = writer.finalize()?;

        let mut reader = BsIoSliceReader::from_slice(&bytes);
        assert_eq!(reader.get_n::<u8>(8)?, 0xA5);
        assert_eq!(reader.get_n::<u16>(16)?, 0x1234);
        assert!(!reader.get()?);
        assert_eq!(reader.get_n::<u32>(31)?, 0x7FFF_FFFF);
        Ok(())
    }

    #[test]
    fn read_past_end_is_unexpected_eof() {
        let mut reader = BsIoSliceReader::from_slice(&[0xFF]);
        assert_eq!(reader.get_n::<u8>(8).unwrap(), 0xFF);

        let err = reader.get_n::<u8>(1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn position_tracks_consumed_bits() -> io::Result<()> {
        let mut reader = BsIoSliceReader::from_slice(&[0x00, 0x00]);
        assert_eq!(reader.available()?, 16);
        reader.get()?;
        reader.get_n::<u8>(5)?;
        assert_eq!(reader.position()?, 6);
        assert_eq!(reader.available()?, 10);
        Ok(())
    }
}
