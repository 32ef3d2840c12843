use super::search::{
    binarysearch_idx_smallest_geq, binarysearch_is_member, linear_idx_smallest_geq,
    linear_is_member,
};
use super::types::{elem_to_section, numofsections, size_of_rep, IntsetElement, IntsetError};
use std::ops::Range;

/// Append-only set of strictly increasing integers up to `maxelement`.
///
/// Values are split into sections of `2^E::BITS` consecutive integers. Only
/// the low `E::BITS` bits of each value are stored; the section a stored slot
/// belongs to is recovered from `sectionstart`, which holds the index of the
/// first element of every section.
///
/// `add` needs `&mut self` and every query takes `&self`, so a set is filled
/// first and then shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intset<E: IntsetElement> {
    pub(super) maxelement: u64,
    pub(super) numofsections: usize,
    pub(super) sectionstart: Vec<usize>,
    pub(super) elements: Vec<E>,
    pub(super) nextfree: usize,
    pub(super) previouselem: Option<u64>,
    pub(super) currentsectionnum: usize,
    pub(super) num_of_elems: usize,
}

impl<E: IntsetElement> Intset<E> {
    /// Create an empty set with room for `num_of_elems` values `<= maxelement`
    pub fn new(maxelement: u64, num_of_elems: usize) -> Result<Self, IntsetError> {
        if num_of_elems == 0 {
            return Err(IntsetError::ZeroCapacity);
        }
        let numofsections = numofsections(maxelement, E::BITS);
        let allocation_failed = || IntsetError::Allocation {
            num_of_elems,
            numofsections,
        };

        let mut elements = Vec::new();
        elements
            .try_reserve_exact(num_of_elems)
            .map_err(|_| allocation_failed())?;
        elements.resize(num_of_elems, E::default());

        let mut sectionstart = Vec::new();
        sectionstart
            .try_reserve_exact(numofsections + 1)
            .map_err(|_| allocation_failed())?;
        sectionstart.resize(numofsections + 1, num_of_elems);
        sectionstart[0] = 0;

        Ok(Self {
            maxelement,
            numofsections,
            sectionstart,
            elements,
            nextfree: 0,
            previouselem: None,
            currentsectionnum: 0,
            num_of_elems,
        })
    }

    /// Append `value`, which must exceed every value added before
    pub fn add(&mut self, value: u64) -> Result<(), IntsetError> {
        if self.nextfree >= self.num_of_elems {
            return Err(IntsetError::CapacityExhausted {
                capacity: self.num_of_elems,
            });
        }
        if value > self.maxelement {
            return Err(IntsetError::ExceedsMaximum {
                value,
                maxelement: self.maxelement,
            });
        }
        if let Some(previous) = self.previouselem {
            if value <= previous {
                return Err(IntsetError::NotIncreasing { value, previous });
            }
        }

        let section = elem_to_section(value, E::BITS);
        while section > self.currentsectionnum {
            self.sectionstart[self.currentsectionnum + 1] = self.nextfree;
            self.currentsectionnum += 1;
        }
        self.elements[self.nextfree] = E::from_low_bits(value);
        self.nextfree += 1;
        self.previouselem = Some(value);
        Ok(())
    }

    /// Value stored at `idx`; the section is found by binary search
    pub fn get(&self, idx: usize) -> Result<u64, IntsetError> {
        self.check_idx(idx)?;
        // Sections past the current one all start at num_of_elems
        let filled = &self.sectionstart[..=self.currentsectionnum + 1];
        let section = filled.partition_point(|&start| start <= idx) - 1;
        Ok(self.value_at(section, idx))
    }

    /// Same as [`Intset::get`] but walks the section table linearly
    pub fn get_by_scan(&self, idx: usize) -> Result<u64, IntsetError> {
        self.check_idx(idx)?;
        let section = (0..=self.currentsectionnum)
            .find(|&section| idx < self.sectionstart[section + 1])
            .unwrap_or(self.currentsectionnum);
        Ok(self.value_at(section, idx))
    }

    pub fn is_member(&self, elem: u64) -> bool {
        if elem > self.maxelement {
            return false;
        }
        let range = self.section_range(elem_to_section(elem, E::BITS));
        if range.is_empty() {
            return false;
        }
        binarysearch_is_member(&self.elements[range], E::from_low_bits(elem))
    }

    /// Linear-scan counterpart of [`Intset::is_member`]
    pub fn is_member_by_scan(&self, elem: u64) -> bool {
        if elem > self.maxelement {
            return false;
        }
        let range = self.section_range(elem_to_section(elem, E::BITS));
        linear_is_member(&self.elements[range], E::from_low_bits(elem))
    }

    /// Index of the smallest stored value `>= value`.
    ///
    /// Returns `capacity()` when nothing was added yet or `value` is larger
    /// than the last added value.
    pub fn get_idx_smallest_geq(&self, value: u64) -> usize {
        self.smallest_geq_with(value, binarysearch_idx_smallest_geq)
    }

    /// Linear-scan counterpart of [`Intset::get_idx_smallest_geq`]
    pub fn get_idx_smallest_geq_by_scan(&self, value: u64) -> usize {
        self.smallest_geq_with(value, linear_idx_smallest_geq)
    }

    fn smallest_geq_with(&self, value: u64, search: fn(&[E], E) -> usize) -> usize {
        let Some(previous) = self.previouselem else {
            return self.num_of_elems;
        };
        if value > previous {
            return self.num_of_elems;
        }
        let range = self.section_range(elem_to_section(value, E::BITS));
        if range.is_empty() {
            // First element of a later section
            return range.start;
        }
        range.start + search(&self.elements[range.clone()], E::from_low_bits(value))
    }

    /// Number of values added so far
    pub fn size(&self) -> usize {
        self.nextfree
    }

    /// Number of values the set was created for
    pub fn capacity(&self) -> usize {
        self.num_of_elems
    }

    pub fn is_empty(&self) -> bool {
        self.nextfree == 0
    }

    pub fn maxelement(&self) -> u64 {
        self.maxelement
    }

    pub fn numofsections(&self) -> usize {
        self.numofsections
    }

    /// Last value added, if any
    pub fn last(&self) -> Option<u64> {
        self.previouselem
    }

    /// Bytes of element storage and section table for a set of this width
    pub fn size_of_rep(maxelement: u64, num_of_elems: usize) -> usize {
        size_of_rep::<E>(maxelement, num_of_elems)
    }

    /// Bytes used by this set, heap tables included
    pub fn size_of_struct(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.elements.capacity() * E::BYTES
            + self.sectionstart.capacity() * std::mem::size_of::<usize>()
    }

    /// Check the section table, the order of the stored elements and the
    /// recorded last value
    pub fn validate(&self) -> Result<(), IntsetError> {
        if self.sectionstart.first() != Some(&0) {
            let found = self.sectionstart.first().copied().unwrap_or(usize::MAX);
            return Err(IntsetError::BadSectionStart(found as u64));
        }
        if self.sectionstart.len() != self.numofsections + 1 {
            return Err(IntsetError::CorruptHeader(format!(
                "section table has {} entries, expected {}",
                self.sectionstart.len(),
                self.numofsections + 1
            )));
        }
        if self.nextfree > self.num_of_elems || self.elements.len() != self.num_of_elems {
            return Err(IntsetError::CorruptHeader(format!(
                "{} of {} slots used, {} stored",
                self.nextfree,
                self.num_of_elems,
                self.elements.len()
            )));
        }
        if self.currentsectionnum >= self.numofsections {
            return Err(IntsetError::CorruptHeader(format!(
                "current section {} of {}",
                self.currentsectionnum, self.numofsections
            )));
        }
        if let Some(pair) = self
            .sectionstart
            .windows(2)
            .position(|pair| pair[0] > pair[1] || pair[1] > self.num_of_elems)
        {
            return Err(IntsetError::CorruptHeader(format!(
                "sectionstart[{}] = {} decreases or exceeds {}",
                pair + 1,
                self.sectionstart[pair + 1],
                self.num_of_elems
            )));
        }
        for section in 0..self.numofsections {
            let run = &self.elements[self.section_range(section)];
            if run.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(IntsetError::CorruptHeader(format!(
                    "elements of section {} are not strictly increasing",
                    section
                )));
            }
        }
        self.validate_last()
    }

    /// The last added value, the current section and the untouched tail of
    /// the section table must describe the same fill state
    fn validate_last(&self) -> Result<(), IntsetError> {
        let untouched = &self.sectionstart[self.currentsectionnum + 1..];
        if let Some(offset) = untouched.iter().position(|&start| start != self.num_of_elems) {
            return Err(IntsetError::CorruptHeader(format!(
                "sectionstart[{}] = {} after current section {}, expected {}",
                self.currentsectionnum + 1 + offset,
                untouched[offset],
                self.currentsectionnum,
                self.num_of_elems
            )));
        }
        let Some(previous) = self.previouselem else {
            if self.nextfree > 0 || self.currentsectionnum != 0 {
                return Err(IntsetError::CorruptHeader(format!(
                    "no last value but {} elements in section {}",
                    self.nextfree, self.currentsectionnum
                )));
            }
            return Ok(());
        };
        if previous > self.maxelement || self.nextfree == 0 {
            return Err(IntsetError::CorruptHeader(format!(
                "last value {} with {} elements and maximum {}",
                previous, self.nextfree, self.maxelement
            )));
        }
        let section = elem_to_section(previous, E::BITS);
        if section != self.currentsectionnum {
            return Err(IntsetError::CorruptHeader(format!(
                "last value {} lies in section {}, header says {}",
                previous, section, self.currentsectionnum
            )));
        }
        let stored = self.get(self.nextfree - 1)?;
        if stored != previous {
            return Err(IntsetError::CorruptHeader(format!(
                "last value {} but last stored element is {}",
                previous, stored
            )));
        }
        Ok(())
    }

    /// Every stored value in increasing order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..=self.currentsectionnum).flat_map(move |section| {
            let base = (section as u64) << E::BITS;
            self.elements[self.section_range(section)]
                .iter()
                .map(move |&low| base + low.to_word())
        })
    }

    /// Slots of `section`, clamped to the filled prefix
    fn section_range(&self, section: usize) -> Range<usize> {
        let start = self.sectionstart[section].min(self.nextfree);
        let end = self.sectionstart[section + 1].min(self.nextfree);
        start..end.max(start)
    }

    fn check_idx(&self, idx: usize) -> Result<(), IntsetError> {
        if idx >= self.nextfree {
            return Err(IntsetError::IndexOutOfRange {
                idx,
                size: self.nextfree,
            });
        }
        Ok(())
    }

    fn value_at(&self, section: usize, idx: usize) -> u64 {
        ((section as u64) << E::BITS) + self.elements[idx].to_word()
    }
}
