use base::any::type_name;
use base::marker::PhantomData;
use base::ptr::NonNull;

use base::prelude::v1::*;

use log::trace;
use spin::Mutex;

/// The out-of-band record shared by every handle to one managed value.
///
/// `count` is only ever read or written with the lock held. The value is a separate allocation
/// so that a `Box<T>` can be adopted as is.
pub(crate) struct ControlState<T: ?Sized> {
    count: Mutex<usize>,
    value: NonNull<T>,
    phantom: PhantomData<T>,
}

impl<T: ?Sized> ControlState<T> {
    /// Allocates a control state owning `value`, with one owner.
    pub(crate) fn allocate(value: Box<T>) -> NonNull<Self> {
        trace!(target: "locked_rc", "new control state for {}", type_name::<T>());

        let state = Box::new(ControlState {
            count: Mutex::new(1),
            value: NonNull::from(Box::leak(value)),
            phantom: PhantomData,
        });
        NonNull::from(Box::leak(state))
    }

    pub(crate) fn value(&self) -> NonNull<T> {
        self.value
    }

    pub(crate) fn acquire(&self) {
        let mut count = self.count.lock();
        // A count of zero means the state is already released and must not be revived.
        if *count == 0 || *count == usize::MAX {
            panic!("owner count out of range");
        }
        *count += 1;
    }

    pub(crate) fn count(&self) -> usize {
        *self.count.lock()
    }

    /// Drops one owner. Returns `true` if this was the last one, in which case the managed
    /// value and the control state have both been freed.
    ///
    /// # Safety
    ///
    /// `this` must point to a live control state and the caller must own one of its counts,
    /// which it gives up by calling this.
    pub(crate) unsafe fn release(this: NonNull<Self>) -> bool {
        let last = {
            let mut count = unsafe { this.as_ref() }.count.lock();
            *count -= 1;
            let last = *count == 0;
            if last {
                trace!(target: "locked_rc", "releasing managed {}", type_name::<T>());
                unsafe { drop(Box::from_raw(this.as_ref().value.as_ptr())) };
            }
            last
        };

        // The guard is gone, so the lock is free to be deallocated with its state.
        if last {
            unsafe { drop(Box::from_raw(this.as_ptr())) };
        }
        last
    }

    /// Takes the value out of a state with exactly one owner and frees the state. Returns
    /// `None`, leaving the state untouched, if there is any other owner.
    ///
    /// # Safety
    ///
    /// `this` must point to a live control state and the caller must own one of its counts.
    /// On `Some`, that count is consumed.
    pub(crate) unsafe fn reclaim(this: NonNull<Self>) -> Option<Box<T>> {
        let value = {
            let mut count = unsafe { this.as_ref() }.count.lock();
            if *count != 1 {
                return None;
            }
            *count = 0;
            unsafe { Box::from_raw(this.as_ref().value.as_ptr()) }
        };

        unsafe { drop(Box::from_raw(this.as_ptr())) };
        Some(value)
    }
}
