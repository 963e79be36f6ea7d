//! The socket-connectable capability: dispatch table, trait, and typed wrapper
//!
//! A concrete native type gains the capability by attaching a
//! [`ConnectableIface`] to its type code at registration time. The typed
//! [`Connectable`] wrapper forwards every operation through that
//! function-pointer table; it holds no state of its own beyond the shared
//! handle.

use crate::enumerator::AddressEnumerator;
use crate::error::{ConnectError, Result};
use crate::object::{registry, ObjectRef, RawObject};
use std::fmt;

/// Slot producing a fresh enumerator object for the receiver.
/// The returned handle owns its reference.
pub type EnumerateFn = fn(&RawObject) -> Result<ObjectRef>;

/// Slot producing a human-readable endpoint description
pub type DescribeFn = fn(&RawObject) -> String;

/// Function-pointer table a concrete type attaches at registration time
///
/// `enumerate` is required; attachment fails without it. `proxy_enumerate`
/// falls back to `enumerate`, and `describe` falls back to the registered
/// type name, when absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectableIface {
    pub enumerate: Option<EnumerateFn>,
    pub proxy_enumerate: Option<EnumerateFn>,
    pub describe: Option<DescribeFn>,
}

/// Capability of naming a network endpoint
///
/// The one operation is [`enumerate`](SocketConnectable::enumerate): produce
/// a fresh, lazily-resolving enumerator over the endpoint's socket
/// addresses. Resolution failures surface when the enumerator is driven,
/// never here.
pub trait SocketConnectable {
    /// Create a fresh enumerator over this endpoint's addresses.
    fn enumerate(&self) -> Result<AddressEnumerator>;

    /// Like `enumerate`, but proxy-aware types may yield proxy hops first.
    /// Types without proxy support enumerate plainly.
    fn proxy_enumerate(&self) -> Result<AddressEnumerator> {
        self.enumerate()
    }

    /// Human-readable endpoint description, for logs and diagnostics.
    fn to_description(&self) -> String;
}

/// Typed wrapper over any native object whose type implements the capability
#[derive(Debug)]
pub struct Connectable {
    inner: ObjectRef,
}

impl Connectable {
    /// Wrap `ptr`, taking a new reference; the caller keeps its own.
    ///
    /// # Errors
    /// `InvalidHandle` on null; `TypeMismatch` when the object's type does
    /// not implement the connectable interface.
    pub fn from_raw_none(ptr: *mut RawObject) -> Result<Self> {
        Self::from_object(ObjectRef::from_raw_none(ptr)?)
    }

    /// Wrap `ptr`, adopting the reference the caller already holds.
    ///
    /// # Errors
    /// `InvalidHandle` on null; `TypeMismatch` when the object's type does
    /// not implement the connectable interface.
    pub fn from_raw_full(ptr: *mut RawObject) -> Result<Self> {
        Self::from_object(ObjectRef::from_raw_full(ptr)?)
    }

    /// Wrap an already-typed handle after verifying the capability.
    pub fn from_object(inner: ObjectRef) -> Result<Self> {
        let code = inner.type_code();
        if registry::connectable_interface(code).is_none() {
            let name = registry::type_name(code)
                .unwrap_or_else(|| format!("type code {}", code.as_u32()));
            return Err(ConnectError::TypeMismatch(format!(
                "{name} does not implement the connectable interface"
            )));
        }
        Ok(Self { inner })
    }

    /// Borrow the raw pointer; no reference is transferred.
    pub fn as_raw(&self) -> *mut RawObject {
        self.inner.as_ptr()
    }

    /// Transfer this wrapper's reference to the caller.
    pub fn into_raw(self) -> *mut RawObject {
        self.inner.into_raw()
    }

    /// Borrow the underlying shared handle.
    pub fn object(&self) -> &ObjectRef {
        &self.inner
    }

    fn dispatch(&self, slot: Option<EnumerateFn>) -> Result<AddressEnumerator> {
        let slot = slot.ok_or_else(|| {
            ConnectError::TypeMismatch(
                "connectable interface lost its enumerate slot".to_string(),
            )
        })?;
        let enumerator = slot(self.inner.header())?;
        AddressEnumerator::from_object(enumerator)
    }

    fn iface(&self) -> ConnectableIface {
        // Presence was verified on construction and the registry never
        // detaches an interface.
        registry::connectable_interface(self.inner.type_code()).unwrap_or_default()
    }
}

impl SocketConnectable for Connectable {
    fn enumerate(&self) -> Result<AddressEnumerator> {
        self.dispatch(self.iface().enumerate)
    }

    fn proxy_enumerate(&self) -> Result<AddressEnumerator> {
        let iface = self.iface();
        self.dispatch(iface.proxy_enumerate.or(iface.enumerate))
    }

    fn to_description(&self) -> String {
        let code = self.inner.type_code();
        match self.iface().describe {
            Some(slot) => slot(self.inner.header()),
            None => registry::type_name(code).unwrap_or_else(|| "endpoint".to_string()),
        }
    }
}

impl Clone for Connectable {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl fmt::Display for Connectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_description())
    }
}
