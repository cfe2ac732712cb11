#![no_std]
#![allow(unused_unsafe)]
extern crate maybe_std as base;

#[cfg(test)]
extern crate std;

/// A smart pointer that keeps track of how many pointers refer to the same allocation and
/// exposes this information in its API.
pub trait ReferenceCounted<T: ?Sized>: Clone {
    /// Get the number of owning pointers referring to the same allocation.
    ///
    /// Implementations must fulfill that `ReferenceCounted::reference_count(this) == 1` implies
    /// that `this` is the only pointer through which the value can be reached.
    fn reference_count(this: &Self) -> usize;
}

mod control;

mod shared;
pub use shared::*;

#[cfg(feature = "unique")]
mod unique;
#[cfg(feature = "unique")]
pub use unique::*;
