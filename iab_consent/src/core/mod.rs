use crate::v1::{IdSet, RangeEntry, Timestamp};
use base64::alphabet::URL_SAFE;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{DecodeError, Engine};
use std::io;
use std::iter::{repeat, repeat_with};

pub(crate) mod stream;

pub(crate) use stream::{BitStreamRead, BitStreamReader, BitStreamWrite, BitStreamWriter};

/// URL-safe alphabet, never padded. Trailing bits of the last character are ignored on decode.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

pub trait DecodeExt {
    fn decode_base64_url(&self) -> Result<Vec<u8>, DecodeError>;
}

impl DecodeExt for str {
    /// Line breaks are skipped.
    fn decode_base64_url(&self) -> Result<Vec<u8>, DecodeError> {
        if self.contains(['\r', '\n']) {
            let s = self.replace(['\r', '\n'], "");
            URL_SAFE_LENIENT.decode(s)
        } else {
            URL_SAFE_LENIENT.decode(self)
        }
    }
}

pub trait EncodeExt {
    fn encode_base64_url(&self) -> String;
}

impl EncodeExt for [u8] {
    fn encode_base64_url(&self) -> String {
        URL_SAFE_LENIENT.encode(self)
    }
}

pub trait DataRead {
    fn read_datetime(&mut self) -> io::Result<Timestamp>;

    fn read_string(&mut self, chars: usize) -> io::Result<String>;

    fn read_fixed_bitfield(&mut self, bits: usize) -> io::Result<IdSet>;

    fn read_range_entries(&mut self, n: usize) -> io::Result<Vec<RangeEntry>>;
}

impl<T> DataRead for T
where
    T: BitStreamRead + ?Sized,
{
    fn read_datetime(&mut self) -> io::Result<Timestamp> {
        self.read_unsigned(36).map(Timestamp::from_deciseconds)
    }

    fn read_string(&mut self, chars: usize) -> io::Result<String> {
        repeat_with(|| self.read_unsigned(6))
            .take(chars)
            .map(|r| r.map(|n| (n as u8 + b'A') as char))
            .collect::<Result<String, _>>()
    }

    fn read_fixed_bitfield(&mut self, bits: usize) -> io::Result<IdSet> {
        let mut result = IdSet::new();
        for i in 1..=bits {
            if self.read_bool()? {
                result.insert(i as u16);
            }
        }

        Ok(result)
    }

    fn read_range_entries(&mut self, n: usize) -> io::Result<Vec<RangeEntry>> {
        repeat_with(|| {
            let is_range = self.read_bool()?;
            let start = self.read_unsigned(16)? as u16;
            let end = if is_range {
                self.read_unsigned(16)? as u16
            } else {
                start
            };

            Ok(RangeEntry { start, end })
        })
        .take(n)
        .collect()
    }
}

pub trait DataWrite {
    fn write_datetime(&mut self, t: Timestamp);

    /// Writes exactly `chars` characters, padding `s` with `A` or cutting it if needed.
    fn write_string(&mut self, s: &str, chars: usize);

    fn write_fixed_bitfield(&mut self, ids: &IdSet, bits: usize);

    fn write_range_entries(&mut self, entries: &[RangeEntry]);
}

impl<T> DataWrite for T
where
    T: BitStreamWrite + ?Sized,
{
    fn write_datetime(&mut self, t: Timestamp) {
        self.write_unsigned(t.as_deciseconds(), 36);
    }

    fn write_string(&mut self, s: &str, chars: usize) {
        for c in s.chars().chain(repeat('A')).take(chars) {
            self.write_unsigned(u64::from(c).wrapping_sub(u64::from('A')), 6);
        }
    }

    fn write_fixed_bitfield(&mut self, ids: &IdSet, bits: usize) {
        for i in 1..=bits {
            self.write_bool(ids.contains(&(i as u16)));
        }
    }

    fn write_range_entries(&mut self, entries: &[RangeEntry]) {
        for entry in entries {
            self.write_bool(entry.is_range());
            self.write_unsigned(u64::from(entry.start), 16);
            if entry.is_range() {
                self.write_unsigned(u64::from(entry.end), 16);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    /// Transform a string of literal binary digits into a vector of bytes.
    /// Zeroes will be appended to fill missing bits.
    fn b(s: &str) -> Vec<u8> {
        let chars = s
            .chars()
            .filter(|&c| c == '1' || c == '0')
            .collect::<Vec<_>>();
        chars
            .chunks(8)
            .map(|c| (8 - c.len(), String::from_iter(c)))
            .map(|(l, s)| u8::from_str_radix(&s, 2).map(|n| n << l))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or(vec![])
    }

    /// Runs a write closure into an exactly sized buffer and returns the bytes.
    fn w(bits: u64, f: impl FnOnce(&mut BitStreamWriter)) -> Vec<u8> {
        let mut w = BitStreamWriter::with_bit_len(bits);
        f(&mut w);
        assert_eq!(w.position(), bits);
        w.into_bytes()
    }

    #[test_case("00000001 00000010 00000011" => vec![1, 2, 3])]
    #[test_case("000000 010000 001000 000011" => vec![1, 2, 3])]
    #[test_case("000000 010000 001000 000011 1000" => vec![1, 2, 3, 128])]
    #[test_case("000000 010000 001000 000011 100" => vec![1, 2, 3, 128])]
    #[test_case("000000 010000 001000 000011 1001" => vec![1, 2, 3, 144])]
    fn bytes(s: &str) -> Vec<u8> {
        b(s)
    }

    #[test_case("DBABMA" => vec![12, 16, 1, 48] ; "simple header")]
    #[test_case("BN5lERiOMYEdiA" => vec![4, 222, 101, 17, 24, 142, 49, 129, 29, 136] ; "two chars remainder")]
    #[test_case("" => is empty ; "empty string")]
    #[test_case("DBA\r\nBMA\n" => vec![12, 16, 1, 48] ; "line breaks")]
    #[test_case("\n" => is empty ; "line break only")]
    fn decode_base64(s: &str) -> Vec<u8> {
        s.decode_base64_url().unwrap()
    }

    #[test]
    fn decode_base64_ignores_trailing_bits() {
        assert_eq!("DBABMB".decode_base64_url().unwrap(), vec![12, 16, 1, 48]);
    }

    #[test_case("a  b" => matches DecodeError::InvalidByte(1, b' ') ; "whitespaces")]
    #[test_case("AB+/" => matches DecodeError::InvalidByte(2, b'+') ; "standard alphabet")]
    #[test_case("ABCDE" => matches DecodeError::InvalidLength(_) ; "dangling character")]
    #[test_case("BN5lERiOMYEdiAO=" => matches DecodeError::InvalidPadding ; "padding")]
    fn decode_base64_error(s: &str) -> DecodeError {
        s.decode_base64_url().unwrap_err()
    }

    #[test_case(&[12, 16, 1, 48] => "DBABMA" ; "no padding")]
    #[test_case(&[0xfb, 0xff] => "-_8" ; "url safe alphabet")]
    #[test_case(&[] => "" ; "empty")]
    fn encode_base64(bytes: &[u8]) -> String {
        bytes.encode_base64_url()
    }

    #[test_case("101010", 1 => "k")]
    #[test_case("101010 101011", 2 => "kl")]
    #[test_case("000101 010001", 2 => "FR")]
    #[test_case("", 0 => "" ; "empty")]
    fn read_string(s: &str, chars: usize) -> String {
        BitStreamReader::new(&b(s)).read_string(chars).unwrap()
    }

    #[test]
    fn read_string_truncated() {
        // only one full character available
        let buf = b("000101 01");
        let mut r = BitStreamReader::new(&buf);

        assert!(r.read_string(2).is_err());
    }

    #[test_case("001111101100100110001110010001011101" => 16854344797 ; "value")]
    #[test_case("000000000000000000000000000000000000" => 0 ; "epoch")]
    fn read_datetime(s: &str) -> u64 {
        BitStreamReader::new(&b(s))
            .read_datetime()
            .unwrap()
            .as_deciseconds()
    }

    #[test_case("10101", 5 => IdSet::from_iter([1, 3, 5]))]
    #[test_case("101010", 6 => IdSet::from_iter([1, 3, 5]))]
    #[test_case("101010", 0 => IdSet::from_iter([]))]
    fn read_fixed_bitfield(s: &str, bits: usize) -> IdSet {
        BitStreamReader::new(&b(s)).read_fixed_bitfield(bits).unwrap()
    }

    #[test_case("0 0000000000000011 1 0000000000000101 0000000000001000", 2 => vec![
        RangeEntry::single(3),
        RangeEntry::new(5, 8),
    ] ; "single then range")]
    #[test_case("1 0000000000001000 0000000000000101 0 0000000000000011", 2 => vec![
        RangeEntry::new(8, 5),
        RangeEntry::single(3),
    ] ; "order is preserved")]
    #[test_case("0 0000000000000011 0 0000000000000011", 2 => vec![
        RangeEntry::single(3),
        RangeEntry::single(3),
    ] ; "duplicates are preserved")]
    #[test_case("", 0 => Vec::<RangeEntry>::new() ; "empty")]
    fn read_range_entries(s: &str, n: usize) -> Vec<RangeEntry> {
        BitStreamReader::new(&b(s)).read_range_entries(n).unwrap()
    }

    #[test]
    fn read_range_entries_truncated() {
        let buf = b("1 0000000000000101 00000000");
        let mut r = BitStreamReader::new(&buf);

        assert!(r.read_range_entries(1).is_err());
    }

    #[test_case("FR" => b("000101 010001") ; "upper case")]
    #[test_case("kl" => b("101010 101011") ; "lower case")]
    #[test_case("F" => b("000101 000000") ; "padded")]
    #[test_case("FRA" => b("000101 010001") ; "cut")]
    #[test_case("\u{80}A" => b("111111 000000") ; "last character")]
    fn write_string(s: &str) -> Vec<u8> {
        w(12, |w| w.write_string(s, 2))
    }

    #[test]
    fn write_datetime() {
        assert_eq!(
            w(36, |w| w.write_datetime(Timestamp::from_deciseconds(16854344797))),
            b("001111101100100110001110010001011101")
        );
    }

    #[test]
    fn write_fixed_bitfield() {
        let ids = IdSet::from_iter([1, 3, 5, 9]);

        // ids beyond the field size are not written
        assert_eq!(w(6, |w| w.write_fixed_bitfield(&ids, 6)), b("101010"));
    }

    #[test]
    fn write_range_entries() {
        let entries = [RangeEntry::single(3), RangeEntry::new(5, 8)];

        assert_eq!(
            w(17 + 33, |w| w.write_range_entries(&entries)),
            b("0 0000000000000011 1 0000000000000101 0000000000001000")
        );
    }

    #[test]
    fn write_inverted_range_as_single() {
        let entries = [RangeEntry::new(8, 5)];

        assert_eq!(
            w(17, |w| w.write_range_entries(&entries)),
            b("0 0000000000001000")
        );
    }
}
