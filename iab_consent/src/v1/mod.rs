//! Version 1.1 of the IAB TCF Vendor Consent String.
//!
//! A consent string is a base64 encoded, bit-packed record describing which purposes and
//! which vendors a user consented to, along with information about the CMP which collected
//! that consent.
//!
//! A typical consent string looks like this:
//!
//! ```text
//! BOEFEAyOEFEAyAHABDENAI4AAAB9vABAASA
//! ```
//!
//! Vendor consent is stored in one of two ways, represented by the [`VendorConsents`] enum:
//! either a bitfield with one bit per vendor, or a default value and a list of vendor id
//! ranges for which the default is inverted.
//!
//! # Examples
//!
//! Use [`ConsentString::parse_str`], [`FromStr`] or [`str::parse`] to decode a string:
//!
//! ```
//! use iab_consent::v1::{ConsentDecodeError, ConsentString};
//!
//! fn main() -> Result<(), ConsentDecodeError> {
//!     let c: ConsentString = "BOEFEAyOEFEAyAHABDENAI4AAAB9vABAASA".parse()?;
//!
//!     assert_eq!(c.cmp_id, 7);
//!     assert!(c.purpose_allowed(1));
//!     assert!(!c.vendor_allowed(9));
//!     assert!(c.vendor_allowed(10));
//!
//!     Ok(())
//! }
//! ```
//!
//! Encoding is done with [`format`] or through the [`Display`](std::fmt::Display)
//! implementation:
//!
//! ```
//! use iab_consent::v1::{ConsentString, RangeEntry, Timestamp, VendorConsents, VendorRange};
//!
//! let c = ConsentString {
//!     version: 1,
//!     created: Timestamp::from_deciseconds(15_257_231_285),
//!     last_updated: Timestamp::from_deciseconds(15_257_231_285),
//!     cmp_id: 7,
//!     cmp_version: 1,
//!     consent_screen: 1,
//!     consent_language: "EN".to_string(),
//!     vendor_list_version: 14,
//!     purposes_allowed: [1, 2, 3, 4, 5].into(),
//!     max_vendor_id: 112,
//!     vendor_consents: VendorConsents::Range(VendorRange::new(
//!         false,
//!         vec![
//!             RangeEntry::single(9),
//!             RangeEntry::single(25),
//!             RangeEntry::new(27, 28),
//!             RangeEntry::single(30),
//!         ],
//!     )),
//! };
//!
//! assert_eq!(c.to_string(), "BONZt-1ONZt-1AHABBENAO-AAAAHCAEAASABmADYAOAAeA");
//! ```
//!
use crate::core::{
    BitStreamRead, BitStreamReader, BitStreamWrite, BitStreamWriter, DataRead, DataWrite,
    DecodeExt, EncodeExt,
};
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

mod purpose;
mod timestamp;
mod vendor;

pub use purpose::Purpose;
pub use timestamp::Timestamp;
pub use vendor::{RangeEntry, VendorConsents, VendorRange};

/// Set of purpose or vendor ids, in ascending order.
pub type IdSet = BTreeSet<u16>;

/// Version written by CMPs implementing v1.1 of the framework.
pub const CONSENT_STRING_VERSION: u8 = 1;

/// Number of purpose slots in a consent string.
pub const PURPOSES_COUNT: usize = 24;

const LANGUAGE_CHARS: usize = 2;

/// Bits from the version field up to and including the encoding type flag.
const HEADER_BIT_LEN: u64 = 173;
/// Header, default consent flag and number of entries.
const RANGE_HEADER_BIT_LEN: u64 = HEADER_BIT_LEN + 1 + 12;

/// The error type for consent string decoding operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConsentDecodeError {
    /// The string is not valid URL-safe base64.
    #[error("unable to decode base64 string: {0}")]
    DecodeBase64(#[from] base64::DecodeError),
    /// An I/O error occurred while reading the decoded payload.
    ///
    /// This usually occurs if the input string is truncated. The fields decoded before the
    /// failure are available through [`ConsentDecodeError::partial`].
    #[error("unable to read string at bit {position}: {source}")]
    Read {
        source: io::Error,
        position: u64,
        partial: Box<ConsentString>,
    },
}

impl ConsentDecodeError {
    /// Returns the partially decoded consent string, if any.
    ///
    /// Fields which could not be read are left to their default value.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_consent::v1::ConsentString;
    ///
    /// let err = ConsentString::parse_str("BOEFEAyOEFEAyAHA").unwrap_err();
    /// let partial = err.partial().unwrap();
    ///
    /// assert_eq!(partial.cmp_id, 7);
    /// assert_eq!(partial.cmp_version, 0);
    /// ```
    pub fn partial(&self) -> Option<&ConsentString> {
        match self {
            Self::DecodeBase64(_) => None,
            Self::Read { partial, .. } => Some(partial.as_ref()),
        }
    }

    pub fn into_partial(self) -> Option<ConsentString> {
        match self {
            Self::DecodeBase64(_) => None,
            Self::Read { partial, .. } => Some(*partial),
        }
    }
}

// See https://github.com/InteractiveAdvertisingBureau/GDPR-Transparency-and-Consent-Framework/blob/master/Consent%20string%20and%20vendor%20list%20formats%20v1.1%20Final.md
/// A decoded vendor consent string.
///
/// Values are not validated when encoding: a field too large for its width is truncated, and
/// the consent language must be two characters between `A` and `A + 63`. A shorter language
/// is padded with `A`, a longer one is cut.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsentString {
    pub version: u8,
    pub created: Timestamp,
    pub last_updated: Timestamp,
    pub cmp_id: u16,
    pub cmp_version: u16,
    pub consent_screen: u8,
    pub consent_language: String,
    pub vendor_list_version: u16,
    pub purposes_allowed: IdSet,
    pub max_vendor_id: u16,
    pub vendor_consents: VendorConsents,
}

impl ConsentString {
    /// Parses a string and returns a [`ConsentString`] if successful.
    ///
    /// # Errors
    ///
    /// Returns a [`ConsentDecodeError`] if unable to parse the string.
    pub fn parse_str(s: &str) -> Result<Self, ConsentDecodeError> {
        parse(s)
    }

    /// Encodes this value into a consent string.
    pub fn to_consent_string(&self) -> String {
        format(self)
    }

    /// Returns whether the purpose with the given id is allowed.
    pub fn purpose_allowed(&self, id: u16) -> bool {
        self.purposes_allowed.contains(&id)
    }

    /// Returns whether all the given purposes are allowed.
    ///
    /// An empty list of purposes is always allowed.
    pub fn every_purpose_allowed(&self, ids: &[u16]) -> bool {
        ids.iter().all(|id| self.purpose_allowed(*id))
    }

    /// Returns the allowed purposes which have a name in the current vendor list.
    pub fn allowed_purposes(&self) -> impl Iterator<Item = Purpose> + '_ {
        self.purposes_allowed
            .iter()
            .filter_map(|&id| Purpose::from_u16(id))
    }

    /// Returns whether the vendor with the given id is allowed.
    ///
    /// See [`VendorConsents::allows`].
    pub fn vendor_allowed(&self, id: u16) -> bool {
        self.vendor_consents.allows(id)
    }

    /// Returns whether vendor consent is stored as a list of ranges.
    pub fn is_range_encoding(&self) -> bool {
        self.vendor_consents.is_range()
    }

    /// Number of bits needed to encode this value, before padding to a whole byte.
    pub fn bit_len(&self) -> u64 {
        match &self.vendor_consents {
            VendorConsents::Bitfield(_) => HEADER_BIT_LEN + u64::from(self.max_vendor_id),
            VendorConsents::Range(range) => {
                RANGE_HEADER_BIT_LEN + range.entries.iter().map(RangeEntry::bit_len).sum::<u64>()
            }
        }
    }

    /// Reads all fields in order, storing each one as soon as it is complete.
    fn read_fields<R: BitStreamRead>(&mut self, r: &mut R) -> io::Result<()> {
        self.version = r.read_unsigned(6)? as u8;
        self.created = r.read_datetime()?;
        self.last_updated = r.read_datetime()?;
        self.cmp_id = r.read_unsigned(12)? as u16;
        self.cmp_version = r.read_unsigned(12)? as u16;
        self.consent_screen = r.read_unsigned(6)? as u8;
        self.consent_language = r.read_string(LANGUAGE_CHARS)?;
        self.vendor_list_version = r.read_unsigned(12)? as u16;
        self.purposes_allowed = r.read_fixed_bitfield(PURPOSES_COUNT)?;
        self.max_vendor_id = r.read_unsigned(16)? as u16;

        if r.read_bool()? {
            let mut range = VendorRange::default();
            let read = read_range(r, &mut range);
            self.vendor_consents = VendorConsents::Range(range);
            read
        } else {
            self.vendor_consents =
                VendorConsents::Bitfield(r.read_fixed_bitfield(self.max_vendor_id as usize)?);
            Ok(())
        }
    }

    fn write_fields<W: BitStreamWrite>(&self, w: &mut W) {
        w.write_unsigned(u64::from(self.version), 6);
        w.write_datetime(self.created);
        w.write_datetime(self.last_updated);
        w.write_unsigned(u64::from(self.cmp_id), 12);
        w.write_unsigned(u64::from(self.cmp_version), 12);
        w.write_unsigned(u64::from(self.consent_screen), 6);
        w.write_string(&self.consent_language, LANGUAGE_CHARS);
        w.write_unsigned(u64::from(self.vendor_list_version), 12);
        w.write_fixed_bitfield(&self.purposes_allowed, PURPOSES_COUNT);
        w.write_unsigned(u64::from(self.max_vendor_id), 16);

        match &self.vendor_consents {
            VendorConsents::Bitfield(ids) => {
                w.write_bool(false);
                w.write_fixed_bitfield(ids, self.max_vendor_id as usize);
            }
            VendorConsents::Range(range) => {
                w.write_bool(true);
                w.write_bool(range.default_consent);
                w.write_unsigned(range.entries.len() as u64, 12);
                w.write_range_entries(&range.entries);
            }
        }
    }
}

/// Reads the range section into `range`, keeping the fields read before a failure.
fn read_range<R: BitStreamRead>(r: &mut R, range: &mut VendorRange) -> io::Result<()> {
    range.default_consent = r.read_bool()?;
    range.num_entries = r.read_unsigned(12)? as u16;
    range.entries = r.read_range_entries(range.num_entries as usize)?;
    Ok(())
}

impl FromStr for ConsentString {
    type Err = ConsentDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for ConsentString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self))
    }
}

/// Decodes a consent string.
///
/// # Errors
///
/// Returns [`ConsentDecodeError::DecodeBase64`] if the string is not valid base64, and
/// [`ConsentDecodeError::Read`] if the payload ends before all fields could be read.
/// In the latter case, the error holds the fields decoded up to that point.
pub fn parse(s: &str) -> Result<ConsentString, ConsentDecodeError> {
    let bytes = s.decode_base64_url()?;
    let mut r = BitStreamReader::new(&bytes);
    let mut consent = ConsentString::default();

    match consent.read_fields(&mut r) {
        Ok(()) => Ok(consent),
        Err(source) => Err(ConsentDecodeError::Read {
            source,
            position: r.position(),
            partial: Box::new(consent),
        }),
    }
}

/// Encodes a consent string.
///
/// The output is unspecified if a field holds a value which does not fit in its bit width.
pub fn format(consent: &ConsentString) -> String {
    let mut w = BitStreamWriter::with_bit_len(consent.bit_len());
    consent.write_fields(&mut w);
    debug_assert_eq!(w.position(), consent.bit_len());

    w.into_bytes().encode_base64_url()
}
