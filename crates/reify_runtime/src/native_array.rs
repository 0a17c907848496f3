use crate::error::{fatal, BridgeError, MAX_LENGTH};
use reify_common::data::operation::Operation;
use reify_common::data::primitive::Primitive;
use std::fmt;
use std::sync::Arc;

/// A fixed-length native array of primitive elements.
///
/// Cloning a `NativeArray` clones the reference, not the elements: both handles see the same
/// slots, like two references to the same host array. Handles may be sent to and shared between
/// threads; element accesses are individually atomic but unordered with respect to each other.
pub struct NativeArray<K: Primitive> {
    slots: Arc<[K::Slot]>,
}

impl<K: Primitive> Clone for NativeArray<K> {
    fn clone(&self) -> Self {
        NativeArray {
            slots: self.slots.clone(),
        }
    }
}

impl<K: Primitive> NativeArray<K> {
    /// Allocates an array of `size` elements, each set to `element`, or to the kind's zero value
    /// if no element is given.
    pub fn try_new(size: i64, element: Option<K>) -> Result<Self, BridgeError> {
        if size < 0 {
            return Err(BridgeError::NegativeSize {
                kind: K::KIND,
                size,
            });
        }
        if size > MAX_LENGTH {
            return Err(BridgeError::SizeTooLarge {
                kind: K::KIND,
                size,
            });
        }

        let fill = element.unwrap_or_else(K::default_value);
        let slots = (0..size).map(|_| fill.new_slot()).collect::<Arc<[_]>>();
        Ok(NativeArray { slots })
    }

    pub fn new(size: i64, element: Option<K>) -> Self {
        Self::try_new(size, element).unwrap_or_else(|err| fatal(err))
    }

    pub fn from_slice(items: &[K]) -> Self {
        NativeArray {
            slots: items.iter().map(|&item| item.new_slot()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn check_index(&self, op: Operation, index: i64) -> Result<usize, BridgeError> {
        match usize::try_from(index) {
            Ok(actual_index) if actual_index < self.len() => Ok(actual_index),
            _ => Err(BridgeError::IndexOutOfBounds {
                op,
                kind: K::KIND,
                index,
                len: self.len(),
            }),
        }
    }

    pub fn try_get(&self, index: i64) -> Result<K, BridgeError> {
        let index = self.check_index(Operation::Get, index)?;
        Ok(K::load(&self.slots[index]))
    }

    pub fn get(&self, index: i64) -> K {
        self.try_get(index).unwrap_or_else(|err| fatal(err))
    }

    pub fn try_set(&self, index: i64, value: K) -> Result<(), BridgeError> {
        let index = self.check_index(Operation::Set, index)?;
        K::store(&self.slots[index], value);
        Ok(())
    }

    pub fn set(&self, index: i64, value: K) {
        self.try_set(index, value).unwrap_or_else(|err| fatal(err))
    }

    /// Copies `length` elements starting at `source_offset` into `destination` starting at
    /// `destination_offset`.
    ///
    /// Without an explicit length, copies as many elements as fit in both arrays past their
    /// offsets. The copy behaves as if the source range were read completely before anything is
    /// written, so overlapping ranges within one array are handled.
    pub fn try_copy_to(
        &self,
        destination: &NativeArray<K>,
        source_offset: i64,
        destination_offset: i64,
        length: Option<i64>,
    ) -> Result<(), BridgeError> {
        let range_error = || BridgeError::InvalidCopyRange {
            kind: K::KIND,
            source_offset,
            destination_offset,
            length,
            source_len: self.len(),
            destination_len: destination.len(),
        };

        let src_start = usize::try_from(source_offset)
            .ok()
            .filter(|&start| start <= self.len())
            .ok_or_else(range_error)?;
        let dst_start = usize::try_from(destination_offset)
            .ok()
            .filter(|&start| start <= destination.len())
            .ok_or_else(range_error)?;

        let src_available = self.len() - src_start;
        let dst_available = destination.len() - dst_start;
        let count = match length {
            None => src_available.min(dst_available),
            Some(length) => usize::try_from(length)
                .ok()
                .filter(|&count| count <= src_available && count <= dst_available)
                .ok_or_else(range_error)?,
        };

        let src = &self.slots[src_start..src_start + count];
        let dst = &destination.slots[dst_start..dst_start + count];

        if self.shares_storage_with(destination) && dst_start > src_start {
            for (from, to) in src.iter().zip(dst).rev() {
                K::store(to, K::load(from));
            }
        } else {
            for (from, to) in src.iter().zip(dst) {
                K::store(to, K::load(from));
            }
        }

        Ok(())
    }

    pub fn copy_to(
        &self,
        destination: &NativeArray<K>,
        source_offset: i64,
        destination_offset: i64,
        length: Option<i64>,
    ) {
        self.try_copy_to(destination, source_offset, destination_offset, length)
            .unwrap_or_else(|err| fatal(err))
    }

    /// Whether `self` and `other` are handles to the same storage.
    pub fn shares_storage_with(&self, other: &NativeArray<K>) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.iter().map(K::load)
    }

    pub fn to_vec(&self) -> Vec<K> {
        self.iter().collect()
    }
}

impl<K: Primitive> From<Vec<K>> for NativeArray<K> {
    fn from(items: Vec<K>) -> Self {
        NativeArray {
            slots: items.into_iter().map(K::new_slot).collect(),
        }
    }
}

impl<K: Primitive> fmt::Debug for NativeArray<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
