use base::borrow::{self, BorrowMut};
use base::cmp::Ordering;
use base::convert::{AsMut, From};
use base::fmt;
use base::hash::{Hash, Hasher};
use base::marker::Unpin;
use base::ops::{Deref, DerefMut};

use base::prelude::v1::*;

use crate::SharedHandle;

/// An exclusively owned value, allocated the same way a [`SharedHandle`] allocates its value.
///
/// A `UniqueHandle` always holds a value and is its only owner, so it hands out `&mut T`.
/// Turning it into a `SharedHandle` keeps both the allocation and the control state.
pub struct UniqueHandle<T: ?Sized>(SharedHandle<T>);

// No other handle can reach the value, so moving it only needs `T: Send`.
unsafe impl<T: ?Sized + Send> Send for UniqueHandle<T> {}
unsafe impl<T: ?Sized + Sync> Sync for UniqueHandle<T> {}

impl<T> UniqueHandle<T> {
    pub fn new(data: T) -> Self {
        UniqueHandle(SharedHandle::new(data))
    }

    /// Takes the value out of the handle.
    pub fn into_inner(self) -> T {
        *self.into_box()
    }
}

impl<T: ?Sized> UniqueHandle<T> {
    /// Gives up exclusive ownership. The returned handle is the only owner, with a count of
    /// `1`.
    pub fn into_shared(self) -> SharedHandle<T> {
        self.0
    }

    /// Gives up the handle, returning the value's allocation.
    pub fn into_box(self) -> Box<T> {
        match SharedHandle::try_into_box(self.0) {
            Ok(value) => value,
            Err(_) => unreachable!("a UniqueHandle is always the sole owner of its value"),
        }
    }
}

impl<T: ?Sized> SharedHandle<T> {
    /// Turns the handle into a `UniqueHandle` if it is the only handle to its value. Absent
    /// handles and shared values are returned unchanged.
    pub fn into_unique(this: Self) -> Result<UniqueHandle<T>, Self> {
        if this.use_count() == 1 {
            Ok(UniqueHandle(this))
        } else {
            Err(this)
        }
    }
}

impl<T: ?Sized> Deref for UniqueHandle<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.0.deref()
    }
}

impl<T: ?Sized> DerefMut for UniqueHandle<T> {
    fn deref_mut(&mut self) -> &mut T {
        match SharedHandle::get_mut(&mut self.0) {
            Some(value) => value,
            None => unreachable!("a UniqueHandle is always the sole owner of its value"),
        }
    }
}

impl<T: ?Sized> borrow::Borrow<T> for UniqueHandle<T> {
    fn borrow(&self) -> &T {
        &**self
    }
}

impl<T: ?Sized> BorrowMut<T> for UniqueHandle<T> {
    fn borrow_mut(&mut self) -> &mut T {
        &mut **self
    }
}

impl<T: ?Sized> AsRef<T> for UniqueHandle<T> {
    fn as_ref(&self) -> &T {
        &**self
    }
}

impl<T: ?Sized> AsMut<T> for UniqueHandle<T> {
    fn as_mut(&mut self) -> &mut T {
        &mut **self
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for UniqueHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for UniqueHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<T: ?Sized> fmt::Pointer for UniqueHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}

impl<T: Default> Default for UniqueHandle<T> {
    /// Creates a new `UniqueHandle<T>`, with the `Default` value for `T`.
    fn default() -> UniqueHandle<T> {
        UniqueHandle::new(Default::default())
    }
}

impl<T: ?Sized + PartialEq> PartialEq for UniqueHandle<T> {
    #[inline]
    fn eq(&self, other: &UniqueHandle<T>) -> bool {
        (**self).eq(&**other)
    }
}

impl<T: ?Sized + Eq> Eq for UniqueHandle<T> {}

impl<T: ?Sized + PartialOrd> PartialOrd for UniqueHandle<T> {
    fn partial_cmp(&self, other: &UniqueHandle<T>) -> Option<Ordering> {
        (**self).partial_cmp(&**other)
    }
}

impl<T: ?Sized + Ord> Ord for UniqueHandle<T> {
    fn cmp(&self, other: &UniqueHandle<T>) -> Ordering {
        (**self).cmp(&**other)
    }
}

impl<T: ?Sized + Hash> Hash for UniqueHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state)
    }
}

impl<T> From<T> for UniqueHandle<T> {
    fn from(t: T) -> Self {
        UniqueHandle::new(t)
    }
}

impl<T: ?Sized> From<Box<T>> for UniqueHandle<T> {
    fn from(value: Box<T>) -> Self {
        UniqueHandle(SharedHandle::from(value))
    }
}

impl<T: ?Sized> From<UniqueHandle<T>> for SharedHandle<T> {
    fn from(unique: UniqueHandle<T>) -> Self {
        unique.into_shared()
    }
}

impl<T: ?Sized> Unpin for UniqueHandle<T> {}
