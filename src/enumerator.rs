//! Lazy socket-address enumeration
//!
//! An enumerator is itself a native object: the capability's `enumerate`
//! slot allocates one and hands back a fresh reference. All resolution
//! state lives here — endpoints stay unresolved until the enumerator is
//! driven, so resolution failures surface on `next`, never on `enumerate`.

use crate::config::ResolverConfig;
use crate::error::{ConnectError, Result};
use crate::object::{registry, ObjectRef, RawObject, TypeCode};
use crate::resolver;
use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};

lazy_static! {
    static ref ENUMERATOR_TYPE: TypeCode =
        registry::register_type("socket-address-enumerator")
            .expect("enumerator type registers once per process");
}

/// A hostname lookup the enumerator has not performed yet
pub(crate) struct PendingLookup {
    pub host: String,
    pub port: u16,
}

struct EnumeratorState {
    ready: VecDeque<SocketAddr>,
    pending: VecDeque<PendingLookup>,
}

struct EnumeratorPayload {
    state: Mutex<EnumeratorState>,
    resolver: ResolverConfig,
}

/// Allocate a native enumerator instance.
///
/// `ready` addresses are yielded first, in order; `pending` lookups resolve
/// lazily as the enumerator is driven past the ready set.
pub(crate) fn new_native(
    ready: Vec<SocketAddr>,
    pending: Vec<PendingLookup>,
    resolver: ResolverConfig,
) -> ObjectRef {
    RawObject::alloc(
        *ENUMERATOR_TYPE,
        EnumeratorPayload {
            state: Mutex::new(EnumeratorState {
                ready: ready.into(),
                pending: pending.into(),
            }),
            resolver,
        },
    )
}

/// Typed wrapper over a native address enumerator
#[derive(Debug)]
pub struct AddressEnumerator {
    inner: ObjectRef,
}

impl AddressEnumerator {
    /// Wrap an already-typed handle after verifying its runtime type.
    pub fn from_object(inner: ObjectRef) -> Result<Self> {
        if inner.type_code() != *ENUMERATOR_TYPE {
            return Err(ConnectError::TypeMismatch(
                "object is not a socket-address enumerator".to_string(),
            ));
        }
        Ok(Self { inner })
    }

    /// Wrap `ptr`, taking a new reference; the caller keeps its own.
    pub fn from_raw_none(ptr: *mut RawObject) -> Result<Self> {
        Self::from_object(ObjectRef::from_raw_none(ptr)?)
    }

    /// Wrap `ptr`, adopting the reference the caller already holds.
    pub fn from_raw_full(ptr: *mut RawObject) -> Result<Self> {
        Self::from_object(ObjectRef::from_raw_full(ptr)?)
    }

    /// Borrow the raw pointer; no reference is transferred.
    pub fn as_raw(&self) -> *mut RawObject {
        self.inner.as_ptr()
    }

    /// Transfer this wrapper's reference to the caller.
    pub fn into_raw(self) -> *mut RawObject {
        self.inner.into_raw()
    }

    fn payload(&self) -> &EnumeratorPayload {
        // Sound: the type code was checked on construction.
        unsafe { self.inner.header().payload::<EnumeratorPayload>() }
    }

    /// Yield the next resolved address, or `Ok(None)` once exhausted.
    ///
    /// Pending hostnames resolve here, on the drive that needs them.
    ///
    /// # Errors
    /// Returns `Resolution` when a pending lookup fails.
    pub fn next(&self) -> Result<Option<SocketAddr>> {
        let payload = self.payload();
        let mut state = payload.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(addr) = state.ready.pop_front() {
                return Ok(Some(addr));
            }
            let Some(lookup) = state.pending.pop_front() else {
                return Ok(None);
            };
            let addrs = resolver::resolve(&lookup.host, lookup.port, &payload.resolver)?;
            state.ready.extend(addrs);
        }
    }

    /// Async variant of [`next`](Self::next), resolving pending lookups
    /// without blocking the runtime.
    #[cfg(feature = "tokio-runtime")]
    pub async fn next_async(&self) -> Result<Option<SocketAddr>> {
        let payload = self.payload();
        loop {
            let lookup = {
                let mut state = payload.state.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(addr) = state.ready.pop_front() {
                    return Ok(Some(addr));
                }
                match state.pending.pop_front() {
                    Some(lookup) => lookup,
                    None => return Ok(None),
                }
            };
            // Resolve outside the lock; concurrent drivers interleave.
            let addrs =
                resolver::resolve_async(&lookup.host, lookup.port, &payload.resolver).await?;
            let mut state = payload.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.ready.extend(addrs);
        }
    }

    /// Iterator adaptor draining this enumerator.
    pub fn iter(&self) -> impl Iterator<Item = Result<SocketAddr>> + '_ {
        std::iter::from_fn(move || self.next().transpose())
    }
}

impl Clone for AddressEnumerator {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(addr: &str) -> SocketAddr {
        addr.parse().expect("literal address")
    }

    #[test]
    fn test_empty_enumerator_is_exhausted() {
        let obj = new_native(Vec::new(), Vec::new(), ResolverConfig::default());
        let enumerator = AddressEnumerator::from_object(obj).expect("enumerator type");
        assert_eq!(enumerator.next().expect("no lookup involved"), None);
        // Exhaustion is stable.
        assert_eq!(enumerator.next().expect("no lookup involved"), None);
    }

    #[test]
    fn test_ready_addresses_yield_in_order() {
        let addrs = vec![literal("10.0.0.1:80"), literal("[2001:db8::1]:80")];
        let obj = new_native(addrs.clone(), Vec::new(), ResolverConfig::default());
        let enumerator = AddressEnumerator::from_object(obj).expect("enumerator type");

        let drained: Vec<SocketAddr> = enumerator.iter().map(|a| a.expect("ready")).collect();
        assert_eq!(drained, addrs);
    }

    #[test]
    fn test_bad_hostname_fails_on_drive_not_before() {
        let pending = vec![PendingLookup {
            host: "bad hostname that cannot resolve.invalid".to_string(),
            port: 80,
        }];
        let obj = new_native(Vec::new(), pending, ResolverConfig::default());

        // Construction and wrapping are fine; the failure belongs to `next`.
        let enumerator = AddressEnumerator::from_object(obj).expect("enumerator type");
        let err = enumerator.next().unwrap_err();
        assert!(matches!(err, ConnectError::Resolution(_)));
    }

    #[test]
    fn test_ready_addresses_yield_before_pending_failure() {
        let pending = vec![PendingLookup {
            host: "bad hostname that cannot resolve.invalid".to_string(),
            port: 80,
        }];
        let obj = new_native(vec![literal("127.0.0.1:9000")], pending, ResolverConfig::default());
        let enumerator = AddressEnumerator::from_object(obj).expect("enumerator type");

        assert_eq!(
            enumerator.next().expect("ready address"),
            Some(literal("127.0.0.1:9000"))
        );
        assert!(enumerator.next().is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let code = registry::register_type("enumerator-test-other").expect("register");
        let obj = RawObject::alloc(code, 0u8);
        assert!(AddressEnumerator::from_object(obj).is_err());
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_next_async_drains_ready_addresses() {
        let addrs = vec![literal("10.0.0.1:443")];
        let obj = new_native(addrs, Vec::new(), ResolverConfig::default());
        let enumerator = AddressEnumerator::from_object(obj).expect("enumerator type");

        assert_eq!(
            enumerator.next_async().await.expect("ready"),
            Some(literal("10.0.0.1:443"))
        );
        assert_eq!(enumerator.next_async().await.expect("exhausted"), None);
    }
}
