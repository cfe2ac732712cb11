use base::borrow;
use base::cmp::Ordering;
use base::convert::From;
use base::fmt;
use base::hash::{Hash, Hasher};
use base::marker::{PhantomData, Unpin};
use base::mem;
use base::ops::Deref;
use base::ptr::{self, NonNull};

use base::prelude::v1::*;

use crate::control::ControlState;
use crate::ReferenceCounted;

/// A thread-safe shared-ownership pointer whose owner count is guarded by a lock.
///
/// A handle is either *present*, sharing a managed value with every handle cloned from it, or
/// *absent*. Present handles report the number of handles sharing their value; absent handles
/// have no owners and always report `0`. They share no control state, so cloning an absent
/// handle gives another absent handle that also reports `0`.
///
/// The lock only protects the bookkeeping. Access to the value goes through `&T`, so mutation
/// from several threads needs the value's own synchronization.
pub struct SharedHandle<T: ?Sized> {
    state: Option<NonNull<ControlState<T>>>,
    phantom: PhantomData<ControlState<T>>,
}

unsafe impl<T: ?Sized + Sync + Send> Send for SharedHandle<T> {}
unsafe impl<T: ?Sized + Sync + Send> Sync for SharedHandle<T> {}

impl<T: ?Sized> SharedHandle<T> {
    fn from_state(state: Option<NonNull<ControlState<T>>>) -> Self {
        Self { state, phantom: PhantomData }
    }

    #[inline]
    fn inner(&self) -> Option<&ControlState<T>> {
        // While this handle is alive it holds one of the counts, so the state is valid.
        self.state.map(|state| unsafe { &*state.as_ptr() })
    }

    /// Creates an absent handle, owning nothing.
    pub fn null() -> Self {
        Self::from_state(None)
    }

    /// Returns a reference to the managed value, or `None` if the handle is absent.
    pub fn get(&self) -> Option<&T> {
        self.inner().map(|state| unsafe { &*state.value().as_ptr() })
    }

    /// Returns whether the handle refers to a managed value.
    pub fn is_present(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the number of handles currently sharing the managed value.
    ///
    /// The result is a snapshot: other threads may clone or drop handles right after it is
    /// taken.
    pub fn use_count(&self) -> usize {
        self.inner().map_or(0, ControlState::count)
    }

    /// Returns whether both handles share the same managed value. Two absent handles are
    /// considered equal.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.state == other.state
    }

    /// Returns a mutable reference to the managed value if this is its only handle.
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        if this.use_count() == 1 {
            this.state.map(|state| unsafe { &mut *state.as_ref().value().as_ptr() })
        } else {
            None
        }
    }

    /// Takes the managed value out of the handle, keeping its allocation, if this is its only
    /// handle. Otherwise returns the handle unchanged.
    pub fn try_into_box(this: Self) -> Result<Box<T>, Self> {
        match this.state {
            Some(state) => match unsafe { ControlState::reclaim(state) } {
                Some(value) => {
                    mem::forget(this);
                    Ok(value)
                }
                None => Err(this),
            },
            None => Err(this),
        }
    }

    /// Takes the managed value out of the handle if this is its only handle. Otherwise
    /// returns the handle unchanged.
    pub fn try_unwrap(this: Self) -> Result<T, Self>
    where
        T: Sized,
    {
        Self::try_into_box(this).map(|value| *value)
    }
}

impl<T> SharedHandle<T> {
    /// Moves `data` to the heap and creates the first handle to it.
    pub fn new(data: T) -> Self {
        Self::from(Box::new(data))
    }
}

impl<T: ?Sized> Clone for SharedHandle<T> {
    /// Makes a clone of the `SharedHandle`.
    ///
    /// This creates another handle to the same managed value, increasing the owner count.
    /// Cloning an absent handle gives another absent handle.
    #[inline]
    fn clone(&self) -> Self {
        if let Some(state) = self.inner() {
            state.acquire();
        }
        Self::from_state(self.state)
    }

    /// Makes `self` share the managed value of `source`.
    ///
    /// The value `self` previously referred to is destroyed if `self` was its last handle.
    /// Nothing happens if both handles already share the same value.
    ///
    /// # Examples
    ///
    /// ```
    /// use locked_rc::SharedHandle;
    ///
    /// let a = SharedHandle::new(1);
    /// let mut b = SharedHandle::new(2);
    ///
    /// b.clone_from(&a); // the `2` is destroyed here
    /// assert_eq!(*b, 1);
    /// assert_eq!(a.use_count(), 2);
    /// ```
    fn clone_from(&mut self, source: &Self) {
        if Self::ptr_eq(self, source) {
            return;
        }

        if let Some(state) = self.state.take() {
            unsafe { ControlState::release(state) };
        }

        if let Some(state) = source.inner() {
            state.acquire();
        }
        self.state = source.state;
    }
}

impl<T: ?Sized> Drop for SharedHandle<T> {
    /// Drops the `SharedHandle`.
    ///
    /// This will decrement the owner count, and destroy the managed value if this was the
    /// last handle to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use locked_rc::SharedHandle;
    ///
    /// struct Foo;
    ///
    /// impl Drop for Foo {
    ///     fn drop(&mut self) {
    ///         println!("dropped!");
    ///     }
    /// }
    ///
    /// let foo  = SharedHandle::new(Foo);
    /// let foo2 = SharedHandle::clone(&foo);
    ///
    /// drop(foo);    // Doesn't print anything
    /// drop(foo2);   // Prints "dropped!"
    /// ```
    #[inline]
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            unsafe { ControlState::release(state) };
        }
    }
}

impl<T: ?Sized> Deref for SharedHandle<T> {
    type Target = T;

    /// Dereferences the managed value.
    ///
    /// # Panics
    ///
    /// Panics if the handle is absent. Use [`SharedHandle::get`] when that may be the case.
    #[inline]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced an absent SharedHandle"),
        }
    }
}

impl<T: ?Sized> borrow::Borrow<T> for SharedHandle<T> {
    fn borrow(&self) -> &T {
        &**self
    }
}

impl<T: ?Sized> AsRef<T> for SharedHandle<T> {
    fn as_ref(&self) -> &T {
        &**self
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("<absent>"),
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => fmt::Debug::fmt(value, f),
            None => f.write_str("<absent>"),
        }
    }
}

impl<T: ?Sized> fmt::Pointer for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => fmt::Pointer::fmt(&(value as *const T), f),
            None => fmt::Pointer::fmt(&ptr::null::<u8>(), f),
        }
    }
}

impl<T: ?Sized> Default for SharedHandle<T> {
    /// Creates an absent `SharedHandle`.
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized + PartialEq> PartialEq for SharedHandle<T> {
    /// Equality for two `SharedHandle`s.
    ///
    /// Two handles are equal if their managed values are equal, or if both are absent. This
    /// implementation does not check for pointer equality.
    #[inline]
    fn eq(&self, other: &SharedHandle<T>) -> bool {
        self.get() == other.get()
    }
}

impl<T: ?Sized + Eq> Eq for SharedHandle<T> {}

impl<T: ?Sized + PartialOrd> PartialOrd for SharedHandle<T> {
    /// Partial comparison for two `SharedHandle`s.
    ///
    /// The managed values are compared, an absent handle ordering before any present one.
    fn partial_cmp(&self, other: &SharedHandle<T>) -> Option<Ordering> {
        self.get().partial_cmp(&other.get())
    }
}

impl<T: ?Sized + Ord> Ord for SharedHandle<T> {
    fn cmp(&self, other: &SharedHandle<T>) -> Ordering {
        self.get().cmp(&other.get())
    }
}

impl<T: ?Sized + Hash> Hash for SharedHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(value) = self.get() {
            value.hash(state)
        }
    }
}

impl<T> From<T> for SharedHandle<T> {
    fn from(t: T) -> Self {
        SharedHandle::new(t)
    }
}

impl<T: ?Sized> From<Box<T>> for SharedHandle<T> {
    /// Adopts an existing allocation as the managed value, without moving it.
    fn from(value: Box<T>) -> Self {
        Self::from_state(Some(ControlState::allocate(value)))
    }
}

impl<T: ?Sized> From<Option<Box<T>>> for SharedHandle<T> {
    /// Adopts the allocation if there is one, and creates an absent handle otherwise.
    fn from(value: Option<Box<T>>) -> Self {
        Self::from_state(value.map(ControlState::allocate))
    }
}

impl<T: ?Sized> ReferenceCounted<T> for SharedHandle<T> {
    fn reference_count(this: &Self) -> usize {
        this.use_count()
    }
}

impl<T: ?Sized> Unpin for SharedHandle<T> {}
