//! The refcounted allocation record shared among image containers.
//!
//! `Image` holds this record behind an `Arc`, so the atomic reference count
//! the container reports is the `Arc` strong count. Storage is either a
//! `Vec` the record owns outright or adopted foreign memory that is never
//! freed here. The optional release hook fires exactly once, from `Drop`,
//! when the last sharer goes away.

use std::sync::Mutex;

/// Hook invoked with the buffer address when the refcount reaches zero.
pub type ReleaseHook<P> = Box<dyn FnOnce(*const P) + Send>;

pub(crate) enum Storage<P> {
    /// Allocation owned by the record; dropped with it.
    Owned(Vec<P>),
    /// Adopted caller memory; never freed by this crate.
    Foreign { ptr: *mut P, len: usize },
}

pub(crate) struct SharedBuffer<P> {
    storage: Storage<P>,
    release: Mutex<Option<ReleaseHook<P>>>,
}

// Foreign storage is only constructed through an unsafe adoption whose
// contract grants the record exclusive access for its lifetime.
unsafe impl<P: Send> Send for SharedBuffer<P> {}
unsafe impl<P: Sync> Sync for SharedBuffer<P> {}

impl<P> SharedBuffer<P> {
    pub(crate) fn owned(data: Vec<P>) -> Self {
        Self {
            storage: Storage::Owned(data),
            release: Mutex::new(None),
        }
    }

    /// Adopts caller memory without taking ownership.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `len` initialized, properly aligned `P` values
    /// that stay valid, unaliased and unmoved for the record's lifetime.
    pub(crate) unsafe fn foreign(ptr: *mut P, len: usize) -> Self {
        Self {
            storage: Storage::Foreign { ptr, len },
            release: Mutex::new(None),
        }
    }

    pub(crate) fn owns_memory(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    pub(crate) fn as_ptr(&self) -> *const P {
        match &self.storage {
            Storage::Owned(data) => data.as_ptr(),
            Storage::Foreign { ptr, .. } => *ptr,
        }
    }

    pub(crate) fn as_slice(&self) -> &[P] {
        match &self.storage {
            Storage::Owned(data) => data,
            // Safety: upheld by the `foreign` adoption contract.
            Storage::Foreign { ptr, len } => unsafe { std::slice::from_raw_parts(*ptr, *len) },
        }
    }

    /// Mutable access; callers must hold the only reference to the record.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [P] {
        match &mut self.storage {
            Storage::Owned(data) => data,
            // Safety: upheld by the `foreign` adoption contract, and `&mut
            // self` proves no other record reference exists.
            Storage::Foreign { ptr, len } => unsafe { std::slice::from_raw_parts_mut(*ptr, *len) },
        }
    }

    /// Replaces the release hook, returning the previous one.
    pub(crate) fn set_release(&self, hook: Option<ReleaseHook<P>>) -> Option<ReleaseHook<P>> {
        match self.release.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, hook),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), hook),
        }
    }
}

impl<P> Drop for SharedBuffer<P> {
    fn drop(&mut self) {
        let ptr = self.as_ptr();
        let hook = match self.release.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(hook) = hook {
            hook(ptr);
        }
    }
}
