//! `serde` support: an array serializes as a plain sequence of its live
//! elements.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dynamic_array::DynamicArray;
use crate::reserve::ReserveHint;

/// Upper bound on the capacity pre-sized from an untrusted length hint.
const MAX_PRESIZED_ELEMENTS: usize = 4096;

impl<T: Serialize> Serialize for DynamicArray<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DynamicArray<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(DynamicArrayVisitor(PhantomData))
    }
}

struct DynamicArrayVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for DynamicArrayVisitor<T> {
    type Value = DynamicArray<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let presized = seq.size_hint().unwrap_or(0).min(MAX_PRESIZED_ELEMENTS);
        let mut array = DynamicArray::with_reserve(ReserveHint::new(presized));
        while let Some(value) = seq.next_element()? {
            array.push_back(value);
        }
        Ok(array)
    }
}
