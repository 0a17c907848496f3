// Process-wide interning, after rust-analyzer's `intern` crate:
// https://github.com/rust-lang/rust-analyzer/blob/9ec04ed43de2476fc40408021d3a2ece5773e31a/crates/intern/src/lib.rs
//
// rust-analyzer is distributed under the MIT license:
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.
//
// Unlike rust-analyzer's version, entries are never removed. Interned values live for the rest of
// the process, so two handles to equal values are always the same allocation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::fmt::{self, Debug, Display};
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

type InternMap<T> = DashMap<Arc<T>, (), BuildHasherDefault<FxHasher>>;

pub struct Interned<T: Internable> {
    arc: Arc<T>,
}

impl<T: Internable> Interned<T> {
    pub fn new(obj: T) -> Self {
        Self::intern(obj).0
    }

    /// Interns `obj`, also reporting whether this call was the one that inserted it.
    pub fn intern(obj: T) -> (Self, bool) {
        let map = T::storage().get();

        if let Some(existing) = map.get(&obj) {
            return (
                Self {
                    arc: existing.key().clone(),
                },
                false,
            );
        }

        // The entry API holds the shard's write lock, so two threads racing to insert equal
        // values agree on a single allocation.
        match map.entry(Arc::new(obj)) {
            Entry::Occupied(occ) => (
                Self {
                    arc: occ.key().clone(),
                },
                false,
            ),
            Entry::Vacant(vac) => {
                let arc = vac.key().clone();
                vac.insert(());
                (Self { arc }, true)
            }
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.arc, &other.arc)
    }

    /// The number of distinct values of this type interned so far.
    pub fn count() -> usize {
        T::storage().get().len()
    }
}

/// Compares interned values using pointer equality.
impl<T: Internable> PartialEq for Interned<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: Internable> Eq for Interned<T> {}

impl<T: Internable> Hash for Interned<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(Arc::as_ptr(&self.arc) as usize)
    }
}

impl<T: Internable> AsRef<T> for Interned<T> {
    #[inline]
    fn as_ref(&self) -> &T {
        &self.arc
    }
}

impl<T: Internable> Deref for Interned<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.arc
    }
}

impl<T: Internable> Clone for Interned<T> {
    fn clone(&self) -> Self {
        Self {
            arc: self.arc.clone(),
        }
    }
}

impl<T: Debug + Internable> Debug for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (*self.arc).fmt(f)
    }
}

impl<T: Display + Internable> Display for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (*self.arc).fmt(f)
    }
}

pub struct InternStorage<T> {
    map: OnceLock<InternMap<T>>,
}

impl<T> InternStorage<T> {
    pub const fn new() -> Self {
        Self {
            map: OnceLock::new(),
        }
    }
}

impl<T: Internable> InternStorage<T> {
    fn get(&self) -> &InternMap<T> {
        self.map.get_or_init(DashMap::default)
    }
}

pub trait Internable: Sized + Hash + Eq + Send + Sync + 'static {
    fn storage() -> &'static InternStorage<Self>;
}

/// Implements `Internable` for a given list of types, making them usable with `Interned`.
macro_rules! impl_internable {
    ( $($t:path),+ $(,)? ) => { $(
        impl $crate::util::intern::Internable for $t {
            fn storage() -> &'static $crate::util::intern::InternStorage<Self> {
                static STORAGE: $crate::util::intern::InternStorage<$t> =
                    $crate::util::intern::InternStorage::new();
                &STORAGE
            }
        }
    )+ };
}

pub(crate) use impl_internable;
