//! Types shared by every Intset width

use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised by Intset construction, updates, queries and I/O.
///
/// The first group reports caller misuse; the second group reports
/// recoverable I/O and format failures.
#[derive(Debug, Error)]
pub enum IntsetError {
    /// An Intset must be able to hold at least one element
    #[error("an intset needs room for at least one element")]
    ZeroCapacity,
    /// Every slot declared at construction is already used
    #[error("intset is full: all {capacity} slots are used")]
    CapacityExhausted { capacity: usize },
    /// The value is larger than the declared maximum
    #[error("value {value} exceeds the maximum element {maxelement}")]
    ExceedsMaximum { value: u64, maxelement: u64 },
    /// Values must be added in strictly increasing order
    #[error("value {value} is not larger than the previously added {previous}")]
    NotIncreasing { value: u64, previous: u64 },
    /// Index past the number of inserted elements
    #[error("index {idx} out of range for intset of size {size}")]
    IndexOutOfRange { idx: usize, size: usize },
    /// Memory for the element array or section table could not be reserved
    #[error("cannot allocate intset with {num_of_elems} elements and {numofsections} sections")]
    Allocation {
        num_of_elems: usize,
        numofsections: usize,
    },

    /// The stored type tag names another element width
    #[error("trying to read a {expected}-bit intset, but the file holds type {found}")]
    TypeMismatch { expected: u64, found: u64 },
    /// The first section must start at offset 0
    #[error("unexpected value in sectionstart[0]: {0}, expected 0")]
    BadSectionStart(u64),
    /// Scalars or tables contradict each other
    #[error("corrupt intset: {0}")]
    CorruptHeader(String),
    /// Reading or writing failed, including short reads
    #[error("intset i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage type for the low-order bits of each element
pub trait IntsetElement: Copy + Ord + Default + fmt::Debug + Send + Sync + 'static {
    /// Bits stored per element; also the log2 of the section size
    const BITS: u32;
    /// Tag written at the start of the persisted form
    const TYPE_TAG: u64 = Self::BITS as u64;
    /// Bytes per element on disk
    const BYTES: usize = (Self::BITS / 8) as usize;

    /// Keep only the low `BITS` bits of `value`
    fn from_low_bits(value: u64) -> Self;

    fn to_word(self) -> u64;

    fn push_le_bytes(self, buf: &mut Vec<u8>);

    /// Decode from exactly `BYTES` little-endian bytes
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_intset_element {
    ($($ty:ty),*) => {
        $(
            impl IntsetElement for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline]
                fn from_low_bits(value: u64) -> Self {
                    value as $ty
                }

                #[inline]
                fn to_word(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn push_le_bytes(self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_intset_element!(u8, u16, u32);

/// Section number holding `elem`
#[inline]
pub fn elem_to_section(elem: u64, logsectionsize: u32) -> usize {
    (elem >> logsectionsize) as usize
}

/// Number of sections needed for values up to `maxelement`
#[inline]
pub fn numofsections(maxelement: u64, logsectionsize: u32) -> usize {
    elem_to_section(maxelement, logsectionsize) + 1
}

/// Element widths an Intset can be built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntsetWidth {
    W8,
    W16,
    W32,
}

impl IntsetWidth {
    pub fn type_tag(self) -> u64 {
        match self {
            IntsetWidth::W8 => u8::TYPE_TAG,
            IntsetWidth::W16 => u16::TYPE_TAG,
            IntsetWidth::W32 => u32::TYPE_TAG,
        }
    }

    pub fn from_type_tag(tag: u64) -> Option<Self> {
        class_for_tag(tag).map(|class| class.width)
    }
}

impl fmt::Display for IntsetWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.type_tag())
    }
}

/// Descriptor of one Intset width
#[derive(Debug)]
pub struct IntsetClass {
    pub width: IntsetWidth,
    pub name: &'static str,
    /// Bytes needed for `num_of_elems` elements up to `maxelement`
    pub size_of_rep: fn(u64, usize) -> usize,
}

/// Bytes of the element array plus the section table for width `E`
pub fn size_of_rep<E: IntsetElement>(maxelement: u64, num_of_elems: usize) -> usize {
    E::BYTES * num_of_elems + std::mem::size_of::<u64>() * numofsections(maxelement, E::BITS)
}

/// All Intset widths, smallest first; built once and shared
pub fn intset_classes() -> &'static [IntsetClass] {
    static CLASSES: OnceLock<Vec<IntsetClass>> = OnceLock::new();
    CLASSES.get_or_init(|| {
        vec![
            IntsetClass {
                width: IntsetWidth::W8,
                name: "intset8",
                size_of_rep: size_of_rep::<u8>,
            },
            IntsetClass {
                width: IntsetWidth::W16,
                name: "intset16",
                size_of_rep: size_of_rep::<u16>,
            },
            IntsetClass {
                width: IntsetWidth::W32,
                name: "intset32",
                size_of_rep: size_of_rep::<u32>,
            },
        ]
    })
}

/// Look up the class whose persisted type tag is `tag`
pub fn class_for_tag(tag: u64) -> Option<&'static IntsetClass> {
    intset_classes()
        .iter()
        .find(|class| class.width.type_tag() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_bits() {
        assert_eq!(u8::from_low_bits(300), 44);
        assert_eq!(u16::from_low_bits(0x1_0005), 5);
        assert_eq!(u32::from_low_bits(0x7_0000_0009), 9);
    }

    #[test]
    fn test_numofsections() {
        assert_eq!(numofsections(0, 8), 1);
        assert_eq!(numofsections(255, 8), 1);
        assert_eq!(numofsections(256, 8), 2);
        assert_eq!(numofsections(300, 8), 2);
        assert_eq!(numofsections(300, 16), 1);
    }

    #[test]
    fn test_registry() {
        let tags: Vec<u64> = intset_classes().iter().map(|c| c.width.type_tag()).collect();
        assert_eq!(tags, vec![8, 16, 32]);
        assert_eq!(IntsetWidth::from_type_tag(16), Some(IntsetWidth::W16));
        assert_eq!(IntsetWidth::from_type_tag(64), None);
        assert!(std::ptr::eq(intset_classes(), intset_classes()));
    }

    #[test]
    fn test_size_of_rep() {
        // 6 bytes of elements + 2 sections * 8 bytes
        assert_eq!(size_of_rep::<u8>(300, 6), 22);
        assert_eq!(size_of_rep::<u16>(300, 6), 20);
    }

    #[test]
    fn test_le_roundtrip() {
        let mut buf = Vec::new();
        0xBEEFu16.push_le_bytes(&mut buf);
        assert_eq!(buf, vec![0xEF, 0xBE]);
        assert_eq!(u16::from_le_slice(&buf), 0xBEEF);
    }
}
