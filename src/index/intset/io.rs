//! Binary layout of an Intset.
//!
//! Every scalar is a 64-bit little-endian word:
//!
//! ```text
//! type tag | currentsectionnum | maxelement | nextfree | num_of_elems | previouselem
//! sectionstart[0..=numofsections]
//! elements[0..num_of_elems]            (BITS / 8 bytes each)
//! ```
//!
//! `numofsections` is not stored; it is recomputed from `maxelement`.
//! `previouselem` is all ones while the set is empty.

use super::set::Intset;
use super::types::{numofsections, IntsetElement, IntsetError};
use crate::utils::{read_bytes, read_word, read_words, write_word, write_words};
use std::io::{Read, Write};

const NO_PREVIOUS: u64 = u64::MAX;

impl<E: IntsetElement> Intset<E> {
    /// Write the set in its persisted layout
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), IntsetError> {
        write_word(writer, E::TYPE_TAG)?;
        write_words(
            writer,
            &[
                self.currentsectionnum as u64,
                self.maxelement,
                self.nextfree as u64,
                self.num_of_elems as u64,
                self.previouselem.unwrap_or(NO_PREVIOUS),
            ],
        )?;

        let table: Vec<u64> = self.sectionstart.iter().map(|&start| start as u64).collect();
        write_words(writer, &table)?;

        let mut buffer = Vec::with_capacity(self.elements.len() * E::BYTES);
        for &element in &self.elements {
            element.push_le_bytes(&mut buffer);
        }
        writer.write_all(&buffer)?;
        Ok(())
    }

    /// Read a set written by [`Intset::write`], starting with its type tag
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, IntsetError> {
        let tag = read_word(reader)?;
        if tag != E::TYPE_TAG {
            return Err(IntsetError::TypeMismatch {
                expected: E::TYPE_TAG,
                found: tag,
            });
        }
        Self::read_untagged(reader)
    }

    /// Read everything after the type tag
    pub(super) fn read_untagged<R: Read>(reader: &mut R) -> Result<Self, IntsetError> {
        let currentsectionnum = read_word(reader)?;
        let maxelement = read_word(reader)?;
        let nextfree = read_word(reader)?;
        let num_of_elems = read_word(reader)?;
        let previouselem = read_word(reader)?;

        if num_of_elems == 0 {
            return Err(IntsetError::CorruptHeader(
                "num_of_elems is 0".to_string(),
            ));
        }
        if nextfree > num_of_elems {
            return Err(IntsetError::CorruptHeader(format!(
                "nextfree {} exceeds num_of_elems {}",
                nextfree, num_of_elems
            )));
        }
        let num_of_elems = to_usize(num_of_elems, "num_of_elems")?;
        let nextfree = to_usize(nextfree, "nextfree")?;
        let currentsectionnum = to_usize(currentsectionnum, "currentsectionnum")?;
        let numofsections = numofsections(maxelement, E::BITS);
        if currentsectionnum >= numofsections {
            return Err(IntsetError::CorruptHeader(format!(
                "currentsectionnum {} but only {} sections",
                currentsectionnum, numofsections
            )));
        }

        let table_len = numofsections.checked_add(1).ok_or_else(|| {
            IntsetError::CorruptHeader(format!("{} sections overflow", numofsections))
        })?;
        let table = read_words(reader, table_len)?;
        if table[0] != 0 {
            return Err(IntsetError::BadSectionStart(table[0]));
        }
        let sectionstart = table
            .into_iter()
            .map(|start| {
                if start > num_of_elems as u64 {
                    Err(IntsetError::CorruptHeader(format!(
                        "section start {} exceeds num_of_elems {}",
                        start, num_of_elems
                    )))
                } else {
                    Ok(start as usize)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let element_bytes = num_of_elems.checked_mul(E::BYTES).ok_or_else(|| {
            IntsetError::CorruptHeader(format!("{} elements overflow", num_of_elems))
        })?;
        let bytes = read_bytes(reader, element_bytes)?;
        let elements: Vec<E> = bytes.chunks_exact(E::BYTES).map(E::from_le_slice).collect();

        let set = Intset {
            maxelement,
            numofsections,
            sectionstart,
            elements,
            nextfree,
            previouselem: (nextfree > 0).then_some(previouselem),
            currentsectionnum,
            num_of_elems,
        };
        set.validate()?;
        Ok(set)
    }
}

fn to_usize(value: u64, what: &str) -> Result<usize, IntsetError> {
    usize::try_from(value)
        .map_err(|_| IntsetError::CorruptHeader(format!("{} {} does not fit in memory", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Byte offsets of header words and of sectionstart[0]
    const CURRENTSECTION_OFFSET: usize = 8;
    const NEXTFREE_OFFSET: usize = 3 * 8;
    const PREVIOUSELEM_OFFSET: usize = 5 * 8;
    const TABLE_OFFSET: usize = 6 * 8;

    fn patch_word(buf: &mut [u8], offset: usize, value: u64) {
        buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
    }

    fn scenario() -> Intset<u8> {
        let mut set = Intset::<u8>::new(300, 6).unwrap();
        for value in [3, 4, 10, 11, 12, 300] {
            set.add(value).unwrap();
        }
        set
    }

    fn encoded<E: IntsetElement>(set: &Intset<E>) -> Vec<u8> {
        let mut buf = Vec::new();
        set.write(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_layout() {
        let buf = encoded(&scenario());
        // 6 header words, 3 section starts, 6 one-byte elements
        assert_eq!(buf.len(), 6 * 8 + 3 * 8 + 6);
        assert_eq!(&buf[..8], &8u64.to_le_bytes());
        assert_eq!(&buf[TABLE_OFFSET + 8..TABLE_OFFSET + 16], &5u64.to_le_bytes());
        assert_eq!(&buf[buf.len() - 6..], &[3, 4, 10, 11, 12, 44]);
    }

    #[test]
    fn test_roundtrip() {
        let set = scenario();
        let buf = encoded(&set);
        let decoded = Intset::<u8>::read(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, set);
        assert_eq!(decoded.size(), 6);
        for idx in 0..decoded.size() {
            assert_eq!(decoded.get(idx).unwrap(), set.get(idx).unwrap());
        }
    }

    #[test]
    fn test_roundtrip_wider_and_partial() {
        let mut set = Intset::<u32>::new(1 << 40, 8).unwrap();
        for value in [1u64, 1 << 33, (1 << 33) + 7, 1 << 39] {
            set.add(value).unwrap();
        }
        let decoded = Intset::<u32>::read(&mut encoded(&set).as_slice()).unwrap();
        assert_eq!(decoded, set);
        assert!(decoded.iter().eq([1u64, 1 << 33, (1 << 33) + 7, 1 << 39]));
        assert_eq!(decoded.get_idx_smallest_geq((1 << 39) + 1), 8);
    }

    #[test]
    fn test_roundtrip_empty() {
        let set = Intset::<u16>::new(70_000, 3).unwrap();
        let buf = encoded(&set);
        assert_eq!(&buf[5 * 8..6 * 8], &u64::MAX.to_le_bytes());
        let decoded = Intset::<u16>::read(&mut buf.as_slice()).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.last(), None);
    }

    #[test]
    fn test_wrong_type_tag() {
        let buf = encoded(&scenario());
        let err = Intset::<u16>::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            IntsetError::TypeMismatch {
                expected: 16,
                found: 8
            }
        ));
    }

    #[test]
    fn test_bad_section_start() {
        let mut buf = encoded(&scenario());
        buf[TABLE_OFFSET] = 1;
        let err = Intset::<u8>::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, IntsetError::BadSectionStart(1)));
    }

    #[test]
    fn test_short_read() {
        let buf = encoded(&scenario());
        for len in [4, 30, TABLE_OFFSET + 10, buf.len() - 1] {
            let err = Intset::<u8>::read(&mut &buf[..len]).unwrap_err();
            match err {
                IntsetError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
                other => panic!("expected short read at {}, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn test_inconsistent_header() {
        let mut buf = encoded(&scenario());
        patch_word(&mut buf, NEXTFREE_OFFSET, 7);
        let err = Intset::<u8>::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, IntsetError::CorruptHeader(_)));
    }

    #[test]
    fn test_unordered_elements() {
        let mut buf = encoded(&scenario());
        let len = buf.len();
        // Swap 11 and 12 within section 0
        buf.swap(len - 3, len - 2);
        let err = Intset::<u8>::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, IntsetError::CorruptHeader(_)));
    }

    #[test]
    fn test_huge_count_fails_cleanly() {
        let mut buf = encoded(&scenario());
        // num_of_elems and nextfree far beyond the data that follows
        buf[4 * 8..5 * 8].copy_from_slice(&(1u64 << 40).to_le_bytes());
        let err = Intset::<u8>::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, IntsetError::CorruptHeader(_) | IntsetError::Io(_)));
    }

    #[test]
    fn test_previouselem_contradicts_elements() {
        let base = encoded(&scenario());
        // Beyond maxelement, then in range but not the last stored value
        for previous in [100_000, 12, 299] {
            let mut buf = base.clone();
            patch_word(&mut buf, PREVIOUSELEM_OFFSET, previous);
            let err = Intset::<u8>::read(&mut buf.as_slice()).unwrap_err();
            assert!(
                matches!(err, IntsetError::CorruptHeader(_)),
                "previouselem {} accepted: {:?}",
                previous,
                err
            );
        }
    }

    #[test]
    fn test_currentsectionnum_contradicts_table() {
        let mut set = Intset::<u8>::new(1000, 3).unwrap();
        for value in [3, 300, 700] {
            set.add(value).unwrap();
        }
        let base = encoded(&set);
        assert!(Intset::<u8>::read(&mut base.as_slice()).is_ok());

        for current in [0, 1, 3] {
            let mut buf = base.clone();
            patch_word(&mut buf, CURRENTSECTION_OFFSET, current);
            let err = Intset::<u8>::read(&mut buf.as_slice()).unwrap_err();
            assert!(
                matches!(err, IntsetError::CorruptHeader(_)),
                "currentsectionnum {} accepted: {:?}",
                current,
                err
            );
        }
    }

    #[test]
    fn test_section_table_tail_must_be_untouched() {
        let mut buf = encoded(&scenario());
        // Scenario ends in section 1, so sectionstart[2] must stay at capacity
        patch_word(&mut buf, TABLE_OFFSET + 2 * 8, 5);
        let err = Intset::<u8>::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, IntsetError::CorruptHeader(_)));
    }

    #[test]
    fn test_empty_set_with_advanced_section() {
        let set = Intset::<u8>::new(1000, 4).unwrap();
        let mut buf = encoded(&set);
        patch_word(&mut buf, CURRENTSECTION_OFFSET, 2);
        let err = Intset::<u8>::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, IntsetError::CorruptHeader(_)));
    }
}
