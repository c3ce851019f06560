use crate::v1::IdSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Vendor consent, in either of the two encodings allowed by the format.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VendorConsents {
    /// One bit per vendor, from 1 to the maximum vendor id. Only consenting vendors are listed.
    Bitfield(IdSet),
    /// A default consent value, inverted for every vendor covered by a range entry.
    Range(VendorRange),
}

impl Default for VendorConsents {
    fn default() -> Self {
        Self::Bitfield(IdSet::new())
    }
}

impl VendorConsents {
    /// Returns whether the vendor is allowed by this section.
    ///
    /// In range mode, vendors covered by at least one entry get the opposite of the default
    /// consent, all others get the default.
    pub fn allows(&self, vendor_id: u16) -> bool {
        match self {
            Self::Bitfield(ids) => ids.contains(&vendor_id),
            Self::Range(range) => range.default_consent ^ range.covers(vendor_id),
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range(_))
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VendorRange {
    pub default_consent: bool,
    /// Number of entries as stored in the string. When encoding, the length of
    /// `entries` is written instead.
    pub num_entries: u16,
    /// Entries in encoding order. They are neither sorted nor merged, and may overlap.
    pub entries: Vec<RangeEntry>,
}

impl VendorRange {
    pub fn new(default_consent: bool, entries: Vec<RangeEntry>) -> Self {
        Self {
            default_consent,
            num_entries: entries.len() as u16,
            entries,
        }
    }

    pub fn covers(&self, vendor_id: u16) -> bool {
        self.entries.iter().any(|e| e.contains(vendor_id))
    }
}

/// An inclusive interval of vendor ids.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeEntry {
    pub start: u16,
    pub end: u16,
}

impl RangeEntry {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn single(id: u16) -> Self {
        Self { start: id, end: id }
    }

    pub fn contains(&self, id: u16) -> bool {
        (self.start..=self.end).contains(&id)
    }

    /// Whether this entry is stored with both bounds (33 bits) instead of a single id (17 bits).
    pub fn is_range(&self) -> bool {
        self.end > self.start
    }

    pub(crate) fn bit_len(&self) -> u64 {
        if self.is_range() { 33 } else { 17 }
    }
}
