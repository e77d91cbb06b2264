//! 128-bit interface and class identifiers.

use std::fmt;
use uuid::Uuid;

/// A 128-bit unique identifier in the native field layout.
///
/// Ordering compares `data1`, `data2`, `data3` and `data4` in that order,
/// which is the order the interface index is sorted in.
///
/// # Examples
///
/// ```
/// use native_model::Guid;
///
/// const IID: Guid = Guid::from_values(
///     0x00000035, 0x0000, 0x0000, [0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46],
/// );
/// assert_eq!(IID.to_string(), "00000035-0000-0000-c000-000000000046");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Guid {
    /// First 32 bits
    pub data1: u32,
    /// Next 16 bits
    pub data2: u16,
    /// Next 16 bits
    pub data3: u16,
    /// Final 64 bits, as bytes
    pub data4: [u8; 8],
}

impl Guid {
    /// The all-zero identifier.
    pub const ZERO: Guid = Guid::from_values(0, 0, 0, [0; 8]);

    /// Builds an identifier from its fields.
    pub const fn from_values(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Builds an identifier from its big-endian 128-bit value.
    pub const fn from_u128(value: u128) -> Self {
        let bytes = value.to_be_bytes();
        Self {
            data1: ((value >> 96) & 0xFFFF_FFFF) as u32,
            data2: ((value >> 80) & 0xFFFF) as u16,
            data3: ((value >> 64) & 0xFFFF) as u16,
            data4: [
                bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14],
                bytes[15],
            ],
        }
    }

    /// The big-endian 128-bit value.
    pub fn to_u128(&self) -> u128 {
        self.to_uuid().as_u128()
    }

    /// Converts to a [`Uuid`].
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_fields(self.data1, self.data2, self.data3, &self.data4)
    }

    /// Converts from a [`Uuid`].
    pub fn from_uuid(uuid: &Uuid) -> Self {
        let (data1, data2, data3, data4) = uuid.as_fields();
        Self::from_values(data1, data2, data3, *data4)
    }
}

/// Hyphenated lowercase form without braces.
impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid().hyphenated())
    }
}
