use super::set::Intset;
use super::types::{class_for_tag, intset_classes, IntsetError, IntsetWidth};
use crate::utils::read_word;
use std::io::{Read, Write};

/// Intset whose element width is chosen at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyIntset {
    Intset8(Intset<u8>),
    Intset16(Intset<u16>),
    Intset32(Intset<u32>),
}

macro_rules! dispatch {
    ($self:expr, $set:ident => $body:expr) => {
        match $self {
            AnyIntset::Intset8($set) => $body,
            AnyIntset::Intset16($set) => $body,
            AnyIntset::Intset32($set) => $body,
        }
    };
}

impl AnyIntset {
    pub fn new(width: IntsetWidth, maxelement: u64, num_of_elems: usize) -> Result<Self, IntsetError> {
        Ok(match width {
            IntsetWidth::W8 => AnyIntset::Intset8(Intset::new(maxelement, num_of_elems)?),
            IntsetWidth::W16 => AnyIntset::Intset16(Intset::new(maxelement, num_of_elems)?),
            IntsetWidth::W32 => AnyIntset::Intset32(Intset::new(maxelement, num_of_elems)?),
        })
    }

    /// Width with the smallest representation for this shape.
    ///
    /// On ties the narrower width wins.
    pub fn best_width(maxelement: u64, num_of_elems: usize) -> IntsetWidth {
        intset_classes()
            .iter()
            .min_by_key(|class| (class.size_of_rep)(maxelement, num_of_elems))
            .map(|class| class.width)
            .unwrap_or(IntsetWidth::W32)
    }

    /// Empty set of the most compact width
    pub fn best_for(maxelement: u64, num_of_elems: usize) -> Result<Self, IntsetError> {
        Self::new(Self::best_width(maxelement, num_of_elems), maxelement, num_of_elems)
    }

    /// Build a set holding exactly `values`, which must be strictly increasing
    pub fn from_sorted(maxelement: u64, values: &[u64]) -> Result<Self, IntsetError> {
        let mut set = Self::best_for(maxelement, values.len())?;
        for &value in values {
            set.add(value)?;
        }
        Ok(set)
    }

    pub fn width(&self) -> IntsetWidth {
        match self {
            AnyIntset::Intset8(_) => IntsetWidth::W8,
            AnyIntset::Intset16(_) => IntsetWidth::W16,
            AnyIntset::Intset32(_) => IntsetWidth::W32,
        }
    }

    pub fn add(&mut self, value: u64) -> Result<(), IntsetError> {
        dispatch!(self, set => set.add(value))
    }

    pub fn get(&self, idx: usize) -> Result<u64, IntsetError> {
        dispatch!(self, set => set.get(idx))
    }

    pub fn is_member(&self, elem: u64) -> bool {
        dispatch!(self, set => set.is_member(elem))
    }

    pub fn get_idx_smallest_geq(&self, value: u64) -> usize {
        dispatch!(self, set => set.get_idx_smallest_geq(value))
    }

    pub fn size(&self) -> usize {
        dispatch!(self, set => set.size())
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, set => set.capacity())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, set => set.is_empty())
    }

    pub fn maxelement(&self) -> u64 {
        dispatch!(self, set => set.maxelement())
    }

    pub fn size_of_struct(&self) -> usize {
        dispatch!(self, set => set.size_of_struct())
    }

    pub fn validate(&self) -> Result<(), IntsetError> {
        dispatch!(self, set => set.validate())
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        dispatch!(self, set => Box::new(set.iter()) as Box<dyn Iterator<Item = u64> + '_>)
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), IntsetError> {
        dispatch!(self, set => set.write(writer))
    }

    /// Read a set of whatever width its type tag names
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, IntsetError> {
        let tag = read_word(reader)?;
        let class = class_for_tag(tag).ok_or_else(|| {
            IntsetError::CorruptHeader(format!("unknown intset type tag {}", tag))
        })?;
        Ok(match class.width {
            IntsetWidth::W8 => AnyIntset::Intset8(Intset::read_untagged(reader)?),
            IntsetWidth::W16 => AnyIntset::Intset16(Intset::read_untagged(reader)?),
            IntsetWidth::W32 => AnyIntset::Intset32(Intset::read_untagged(reader)?),
        })
    }
}
