use num_derive::{FromPrimitive, ToPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Purposes defined by version 1.1 of the global vendor list.
///
/// The purposes field of a consent string has room for 24 ids; those not listed here are
/// still decoded, they just don't have a name.
///
/// # Example
///
/// ```
/// use iab_consent::v1::Purpose;
/// use num_traits::FromPrimitive;
///
/// assert_eq!(Purpose::from_u16(3), Some(Purpose::AdSelection));
/// assert_eq!(Purpose::from_u16(6), None);
/// ```
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum Purpose {
    StorageAndAccess = 1,
    Personalisation = 2,
    AdSelection = 3,
    ContentSelection = 4,
    Measurement = 5,
}
