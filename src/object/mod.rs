//! Native object substrate: reference-counted instances with runtime type codes
//!
//! Every value exposed through the C interface is a `RawObject`: a heap
//! header carrying an atomic reference count, the `TypeCode` assigned at
//! registration time, and a type-erased payload. Typed wrappers hold
//! [`ObjectRef`] handles over these instances and never free an instance
//! directly; the last reference released does.

pub mod handle;
pub mod registry;

pub use handle::ObjectRef;

use std::sync::atomic::{AtomicUsize, Ordering};

/// Runtime type identifier assigned by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TypeCode(pub(crate) u32);

impl TypeCode {
    /// Numeric value of this type code
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Header of every native object instance
///
/// The payload is type-erased; the `TypeCode` is the only runtime witness of
/// what it holds, so payload access is keyed on a type-code check by the
/// typed wrappers.
#[repr(C)]
pub struct RawObject {
    refcount: AtomicUsize,
    type_code: TypeCode,
    payload: *mut (),
    drop_payload: unsafe fn(*mut ()),
}

// Payloads are constrained to Send + Sync at allocation time.
unsafe impl Send for RawObject {}
unsafe impl Sync for RawObject {}

unsafe fn drop_payload_as<T>(ptr: *mut ()) {
    drop(unsafe { Box::from_raw(ptr as *mut T) });
}

impl RawObject {
    /// Allocate a new instance holding `payload`, with a reference count of one.
    ///
    /// The returned handle owns that initial reference.
    pub(crate) fn alloc<T: Send + Sync + 'static>(type_code: TypeCode, payload: T) -> ObjectRef {
        let payload = Box::into_raw(Box::new(payload)) as *mut ();
        let ptr = Box::into_raw(Box::new(RawObject {
            refcount: AtomicUsize::new(1),
            type_code,
            payload,
            drop_payload: drop_payload_as::<T>,
        }));
        // Safety: freshly allocated, non-null, refcount already one.
        unsafe { ObjectRef::adopt(ptr) }
    }

    /// Runtime type of this instance
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    /// Current reference count
    pub fn ref_count(&self) -> usize {
        self.refcount.load(Ordering::Acquire)
    }

    /// Borrow the payload as `T`.
    ///
    /// # Safety
    /// `T` must be the payload type this instance was allocated with. Callers
    /// establish this by checking `type_code` first.
    pub(crate) unsafe fn payload<T>(&self) -> &T {
        unsafe { &*(self.payload as *const T) }
    }
}

/// Take one reference on `obj`.
///
/// # Safety
/// `obj` must point to a live instance allocated by this module.
pub(crate) unsafe fn obj_ref(obj: *mut RawObject) {
    unsafe { (*obj).refcount.fetch_add(1, Ordering::Relaxed) };
}

/// Release one reference on `obj`, destroying the instance when the last
/// reference goes.
///
/// # Safety
/// `obj` must point to a live instance and the caller must own the reference
/// being released.
pub(crate) unsafe fn obj_unref(obj: *mut RawObject) {
    let prev = unsafe { (*obj).refcount.fetch_sub(1, Ordering::Release) };
    if prev == 1 {
        std::sync::atomic::fence(Ordering::Acquire);
        let header = unsafe { Box::from_raw(obj) };
        unsafe { (header.drop_payload)(header.payload) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_type() -> TypeCode {
        lazy_static::lazy_static! {
            static ref CODE: TypeCode =
                registry::register_type("object-test-payload").expect("registered once");
        }
        *CODE
    }

    #[test]
    fn test_alloc_starts_at_one() {
        let obj = RawObject::alloc(test_type(), 42u32);
        assert_eq!(obj.ref_count(), 1);
        assert_eq!(obj.type_code(), test_type());
    }

    #[test]
    fn test_payload_roundtrip() {
        let obj = RawObject::alloc(test_type(), 7usize);
        let value = unsafe { *obj.header().payload::<usize>() };
        assert_eq!(value, 7);
    }

    #[test]
    fn test_payload_dropped_with_last_reference() {
        let witness = Arc::new(());
        let obj = RawObject::alloc(test_type(), Arc::clone(&witness));
        assert_eq!(Arc::strong_count(&witness), 2);

        let extra = obj.clone();
        drop(obj);
        assert_eq!(Arc::strong_count(&witness), 2, "payload freed too early");

        drop(extra);
        assert_eq!(Arc::strong_count(&witness), 1, "payload leaked");
    }
}
