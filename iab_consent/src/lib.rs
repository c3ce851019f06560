//! This crate is an implementation of the IAB Transparency and Consent Framework (TCF)
//! [Vendor Consent String v1.1](https://github.com/InteractiveAdvertisingBureau/GDPR-Transparency-and-Consent-Framework/blob/master/Consent%20string%20and%20vendor%20list%20formats%20v1.1%20Final.md).
//!
//! It can both decode consent strings and encode them back.
//!
//! NOTE: This is not an official IAB library.
//!
//! # Parsing consent strings
//!
//! The [`ConsentString`](v1/struct.ConsentString.html) type holds every field of a
//! consent string, and offers methods to query purpose and vendor consent.
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use iab_consent::v1::ConsentString;
//!
//! let s = "BN5lERiOMYEdiAKAWXEND1HoSBE6CAFAApAMgBkIDIgM0AgOJxAnQA";
//! let consent = ConsentString::parse_str(s)?;
//!
//! // does the user allow measurement (purpose 5) by vendor 300?
//! let allowed = consent.purpose_allowed(5) && consent.vendor_allowed(300);
//!
//! assert!(allowed);
//! # Ok(())
//! # }
//! ```
//!
//! # Encoding consent strings
//!
//! ```
//! use iab_consent::v1::{ConsentString, Timestamp, VendorConsents};
//!
//! let consent = ConsentString {
//!     version: 1,
//!     created: Timestamp::from_deciseconds(14_924_661_858),
//!     last_updated: Timestamp::from_deciseconds(15_240_021_858),
//!     cmp_id: 14,
//!     cmp_version: 22,
//!     consent_screen: 30,
//!     consent_language: "FR".to_string(),
//!     vendor_list_version: 0,
//!     purposes_allowed: [2, 3, 20, 21, 23].into(),
//!     max_vendor_id: 10,
//!     vendor_consents: VendorConsents::Bitfield([1, 2, 4, 5, 7, 9].into()),
//! };
//!
//! assert_eq!(consent.to_consent_string(), "BN5lERiOMYEdiAOAWeFRAAYAAaAAptQ");
//! ```
//!
//! # Error handling
//!
//! A string which is not valid base64 cannot be decoded at all. A valid base64 string which
//! is too short to contain all the fields results in an error which still holds the fields
//! that could be read, so that callers may decide whether that information is usable.
//!
//! ```
//! use iab_consent::v1::{ConsentDecodeError, ConsentString};
//!
//! let r = ConsentString::parse_str("BOEFEAyOEFEAyAHABDENAI4");
//!
//! match r {
//!     Err(ConsentDecodeError::Read { partial, .. }) => {
//!         assert_eq!(partial.consent_language, "EN");
//!         assert!(partial.purposes_allowed.is_empty());
//!     }
//!     _ => unreachable!(),
//! }
//! ```
//!
//! Encoding never fails, but it does not validate its input either: values which do not fit
//! in their field are truncated.
//!
pub(crate) mod core;
pub mod v1;
