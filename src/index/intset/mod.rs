//! Section-indexed integer sets.
//!
//! An [`Intset`] stores a strictly increasing sequence of integers bounded by
//! `maxelement`. Each value is cut into a section number (the high bits) and
//! the low `E::BITS` bits; only the low bits are stored, and a table of
//! section starts recovers the rest. Sets are filled once with `add` and then
//! queried read-only.
//!
//! [`AnyIntset`] picks the element width at run time and reads any
//! persisted width by its type tag.

mod any;
mod io;
pub mod search;
mod set;
mod types;

pub use any::AnyIntset;
pub use set::Intset;
pub use types::{
    class_for_tag, elem_to_section, intset_classes, numofsections, size_of_rep, IntsetClass,
    IntsetElement, IntsetError, IntsetWidth,
};
