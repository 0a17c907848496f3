//! Successor and predecessor for enumerable types, and the range algorithms built on them.

use std::fmt::Debug;

pub trait Ordinal: Sized + Clone + PartialEq + Debug {
    /// The next value, or `None` at the top of the domain.
    fn checked_successor(&self) -> Option<Self>;

    /// The previous value, or `None` at the bottom of the domain.
    fn checked_predecessor(&self) -> Option<Self>;

    fn successor(&self) -> Self {
        self.checked_successor()
            .unwrap_or_else(|| panic!("overflow: {:?} has no successor", self))
    }

    fn predecessor(&self) -> Self {
        self.checked_predecessor()
            .unwrap_or_else(|| panic!("overflow: {:?} has no predecessor", self))
    }
}

macro_rules! impl_ordinal_for_ints {
    ($($t:ty),*) => { $(
        impl Ordinal for $t {
            fn checked_successor(&self) -> Option<Self> {
                self.checked_add(1)
            }

            fn checked_predecessor(&self) -> Option<Self> {
                self.checked_sub(1)
            }
        }
    )* };
}

impl_ordinal_for_ints!(i8, i16, i32, i64);

const LAST_BEFORE_SURROGATES: char = '\u{D7FF}';
const FIRST_AFTER_SURROGATES: char = '\u{E000}';

/// Characters step over the surrogate range, which holds no `char` values.
impl Ordinal for char {
    fn checked_successor(&self) -> Option<Self> {
        if *self == LAST_BEFORE_SURROGATES {
            Some(FIRST_AFTER_SURROGATES)
        } else {
            char::from_u32(*self as u32 + 1)
        }
    }

    fn checked_predecessor(&self) -> Option<Self> {
        if *self == FIRST_AFTER_SURROGATES {
            Some(LAST_BEFORE_SURROGATES)
        } else {
            (*self as u32).checked_sub(1).and_then(char::from_u32)
        }
    }
}

/// The inclusive range from `first` to `last`, stepping up or down as needed.
///
/// Never computes a value past `last`, so a span ending at the edge of the domain does not
/// overflow.
pub fn span<T: Ordinal + PartialOrd>(first: T, last: T) -> Span<T> {
    let increasing = first <= last;
    Span {
        next: Some(first),
        last,
        increasing,
    }
}

#[derive(Clone, Debug)]
pub struct Span<T> {
    next: Option<T>,
    last: T,
    increasing: bool,
}

impl<T: Ordinal> Iterator for Span<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let current = self.next.take()?;
        if current != self.last {
            self.next = Some(if self.increasing {
                current.successor()
            } else {
                current.predecessor()
            });
        }
        Some(current)
    }
}

/// The `count` values starting at `first`, stepping up.
pub fn measure<T: Ordinal>(first: T, count: usize) -> Measure<T> {
    Measure {
        next: Some(first),
        remaining: count,
    }
}

#[derive(Clone, Debug)]
pub struct Measure<T> {
    next: Option<T>,
    remaining: usize,
}

impl<T: Ordinal> Iterator for Measure<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next.take()?;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.next = Some(current.successor());
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
