use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use std::io;
use std::io::Cursor;

/// Primitive bit-level reads, most significant bit first.
pub trait BitStreamRead {
    /// Reads the next `bits` bits (1 to 64) as an unsigned integer.
    fn read_unsigned(&mut self, bits: u32) -> io::Result<u64>;

    fn read_bool(&mut self) -> io::Result<bool>;

    /// Number of bits consumed so far.
    fn position(&self) -> u64;

    /// Total number of bits in the stream.
    fn len(&self) -> u64;
}

/// Primitive bit-level writes, most significant bit first.
pub trait BitStreamWrite {
    /// Writes the low `bits` bits (1 to 64) of `value`.
    fn write_unsigned(&mut self, value: u64, bits: u32);

    fn write_bool(&mut self, value: bool);

    /// Number of bits written so far.
    fn position(&self) -> u64;
}

pub struct BitStreamReader<'a> {
    bit_reader: BitReader<&'a [u8], BigEndian>,
    position: u64,
    len: u64,
}

impl<'a> BitStreamReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bit_reader: BitReader::endian(bytes, BigEndian),
            position: 0,
            len: bytes.len() as u64 * 8,
        }
    }
}

impl BitStreamRead for BitStreamReader<'_> {
    fn read_unsigned(&mut self, bits: u32) -> io::Result<u64> {
        debug_assert!((1..=64).contains(&bits));

        // the cursor must not move on a failed read, so check bounds before touching the reader
        if self.position + u64::from(bits) > self.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{bits} bits requested at offset {}, {} available",
                    self.position,
                    self.len() - self.position
                ),
            ));
        }

        let value = self.bit_reader.read_unsigned_var::<u64>(bits)?;
        self.position += u64::from(bits);
        Ok(value)
    }

    fn read_bool(&mut self) -> io::Result<bool> {
        Ok(self.read_unsigned(1)? == 1)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn len(&self) -> u64 {
        self.len
    }
}

/// A writer over a buffer whose size is fixed at creation.
///
/// Callers compute the exact payload length beforehand. Writing past the end of the buffer
/// is a bug in that computation and panics.
pub struct BitStreamWriter {
    bit_writer: BitWriter<Cursor<Box<[u8]>>, BigEndian>,
    position: u64,
}

impl BitStreamWriter {
    pub fn with_bit_len(bits: u64) -> Self {
        let bytes = bits.div_ceil(8) as usize;
        Self {
            bit_writer: BitWriter::endian(
                Cursor::new(vec![0; bytes].into_boxed_slice()),
                BigEndian,
            ),
            position: 0,
        }
    }

    /// Pads the last partial byte with zeroes and returns the buffer.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.bit_writer
            .byte_align()
            .expect("payload length must be computed before writing");
        self.bit_writer.into_writer().into_inner().into_vec()
    }
}

impl BitStreamWrite for BitStreamWriter {
    fn write_unsigned(&mut self, value: u64, bits: u32) {
        debug_assert!((1..=64).contains(&bits));

        // out of range values are truncated to the field width
        let value = if bits < 64 {
            value & ((1 << bits) - 1)
        } else {
            value
        };

        self.bit_writer
            .write_unsigned_var(bits, value)
            .expect("payload length must be computed before writing");
        self.position += u64::from(bits);
    }

    fn write_bool(&mut self, value: bool) {
        self.write_unsigned(u64::from(value), 1);
    }

    fn position(&self) -> u64 {
        self.position
    }
}
