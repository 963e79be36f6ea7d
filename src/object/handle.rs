//! Shared handles over native object instances
//!
//! An [`ObjectRef`] is the Rust-side owner of exactly one reference on a
//! native instance. Cloning takes a reference, dropping releases one; the
//! handle never frees the instance unconditionally.

use super::{obj_ref, obj_unref, RawObject, TypeCode};
use crate::error::{ConnectError, Result};
use std::fmt;

/// A shared, reference-counted handle to a native object
pub struct ObjectRef {
    ptr: *mut RawObject,
}

// The header is Send + Sync and the refcount is atomic.
unsafe impl Send for ObjectRef {}
unsafe impl Sync for ObjectRef {}

impl ObjectRef {
    /// Wrap `ptr` without touching its reference count.
    ///
    /// # Safety
    /// `ptr` must be non-null, live, and the caller must own the reference
    /// being handed over.
    pub(crate) unsafe fn adopt(ptr: *mut RawObject) -> Self {
        Self { ptr }
    }

    /// Wrap `ptr`, taking a new reference; the caller keeps its own.
    ///
    /// # Errors
    /// Returns `InvalidHandle` when `ptr` is null.
    pub fn from_raw_none(ptr: *mut RawObject) -> Result<Self> {
        if ptr.is_null() {
            return Err(ConnectError::InvalidHandle(
                "null object pointer".to_string(),
            ));
        }
        unsafe { obj_ref(ptr) };
        Ok(Self { ptr })
    }

    /// Wrap `ptr`, adopting the reference the caller already holds.
    ///
    /// # Errors
    /// Returns `InvalidHandle` when `ptr` is null.
    pub fn from_raw_full(ptr: *mut RawObject) -> Result<Self> {
        if ptr.is_null() {
            return Err(ConnectError::InvalidHandle(
                "null object pointer".to_string(),
            ));
        }
        Ok(Self { ptr })
    }

    /// Borrow the raw pointer; no reference is transferred.
    pub fn as_ptr(&self) -> *mut RawObject {
        self.ptr
    }

    /// Transfer this handle's reference to the caller.
    pub fn into_raw(self) -> *mut RawObject {
        let ptr = self.ptr;
        std::mem::forget(self);
        ptr
    }

    /// Runtime type of the underlying instance
    pub fn type_code(&self) -> TypeCode {
        self.header().type_code()
    }

    /// Current reference count of the underlying instance
    pub fn ref_count(&self) -> usize {
        self.header().ref_count()
    }

    pub(crate) fn header(&self) -> &RawObject {
        // Holding a reference keeps the instance alive.
        unsafe { &*self.ptr }
    }

    /// Whether two handles refer to the same native instance
    pub fn same_object(&self, other: &ObjectRef) -> bool {
        std::ptr::eq(self.ptr, other.ptr)
    }
}

impl Clone for ObjectRef {
    fn clone(&self) -> Self {
        unsafe { obj_ref(self.ptr) };
        Self { ptr: self.ptr }
    }
}

impl Drop for ObjectRef {
    fn drop(&mut self) {
        unsafe { obj_unref(self.ptr) };
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("ptr", &self.ptr)
            .field("type_code", &self.type_code())
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
