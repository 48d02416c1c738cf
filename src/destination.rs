//! Destinations for multi-row loads.
//!
//! A destination allocates a fresh record per row and commits it once the row
//! has been scanned. Sequences append and never clear prior contents; keyed
//! collections insert under the record's identifier, replacing any record
//! already stored under that key.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use crate::record::Record;

/// Shape of a load destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    /// One caller-owned record (`load_one`)
    Single,
    /// A growable sequence of records
    Sequence,
    /// Records indexed by identifier
    Keyed,
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DestinationKind::Single => "single",
            DestinationKind::Sequence => "sequence",
            DestinationKind::Keyed => "keyed",
        })
    }
}

/// A record type with an identifier, usually its `id` column.
pub trait Identified {
    /// Identifier type
    type Id;

    /// The key this record is stored under in keyed destinations.
    fn id(&self) -> Self::Id;
}

/// A destination that receives one new record per loaded row.
pub trait RecordSink {
    /// Record type rows are loaded into
    type Record: Record;

    /// Shape of this destination.
    const KIND: DestinationKind;

    /// Allocates the record the next row is scanned into.
    fn new_record(&mut self) -> Self::Record {
        Self::Record::default()
    }

    /// Stores a fully scanned record.
    fn commit(&mut self, record: Self::Record);
}

impl<T: Record> RecordSink for Vec<T> {
    type Record = T;
    const KIND: DestinationKind = DestinationKind::Sequence;

    fn commit(&mut self, record: T) {
        self.push(record);
    }
}

impl<T> RecordSink for HashMap<T::Id, T>
where
    T: Record + Identified,
    T::Id: Eq + Hash,
{
    type Record = T;
    const KIND: DestinationKind = DestinationKind::Keyed;

    fn commit(&mut self, record: T) {
        self.insert(record.id(), record);
    }
}

impl<T> RecordSink for BTreeMap<T::Id, T>
where
    T: Record + Identified,
    T::Id: Ord,
{
    type Record = T;
    const KIND: DestinationKind = DestinationKind::Keyed;

    fn commit(&mut self, record: T) {
        self.insert(record.id(), record);
    }
}
