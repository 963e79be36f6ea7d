//! Concrete endpoint types: hostnames and literal socket addresses
//!
//! Both types register their native type and attach the connectable
//! interface on first use. `NetworkAddress` never resolves at construction
//! time; the enumerator it produces does, lazily. `InetSocketAddress` wraps
//! an address that is already resolved.

use crate::config::ResolverConfig;
use crate::connectable::{Connectable, ConnectableIface, SocketConnectable};
use crate::enumerator::{self, AddressEnumerator, PendingLookup};
use crate::error::{ConnectError, Result};
use crate::object::{registry, ObjectRef, RawObject, TypeCode};
use lazy_static::lazy_static;
use std::fmt;
use std::net::SocketAddr;
use url::Url;

struct NetworkAddressData {
    host: String,
    port: u16,
    resolver: ResolverConfig,
}

struct InetSocketAddressData {
    addr: SocketAddr,
}

lazy_static! {
    static ref NETWORK_ADDRESS_TYPE: TypeCode = {
        let code = registry::register_type("network-address")
            .expect("network-address registers once per process");
        registry::add_connectable_interface(
            code,
            ConnectableIface {
                enumerate: Some(network_address_enumerate),
                proxy_enumerate: None,
                describe: Some(network_address_describe),
            },
        )
        .expect("network-address interface attaches once per process");
        code
    };
    static ref INET_SOCKET_ADDRESS_TYPE: TypeCode = {
        let code = registry::register_type("inet-socket-address")
            .expect("inet-socket-address registers once per process");
        registry::add_connectable_interface(
            code,
            ConnectableIface {
                enumerate: Some(inet_socket_address_enumerate),
                proxy_enumerate: None,
                describe: Some(inet_socket_address_describe),
            },
        )
        .expect("inet-socket-address interface attaches once per process");
        code
    };
}

// Interface slots. Receivers are guaranteed to carry the matching payload:
// the slots are only reachable through the type codes registered above.

fn network_address_enumerate(obj: &RawObject) -> Result<ObjectRef> {
    let data = unsafe { obj.payload::<NetworkAddressData>() };
    Ok(enumerator::new_native(
        Vec::new(),
        vec![PendingLookup {
            host: data.host.clone(),
            port: data.port,
        }],
        data.resolver.clone(),
    ))
}

fn network_address_describe(obj: &RawObject) -> String {
    let data = unsafe { obj.payload::<NetworkAddressData>() };
    if data.host.contains(':') {
        format!("[{}]:{}", data.host, data.port)
    } else {
        format!("{}:{}", data.host, data.port)
    }
}

fn inet_socket_address_enumerate(obj: &RawObject) -> Result<ObjectRef> {
    let data = unsafe { obj.payload::<InetSocketAddressData>() };
    Ok(enumerator::new_native(
        vec![data.addr],
        Vec::new(),
        ResolverConfig::default(),
    ))
}

fn inet_socket_address_describe(obj: &RawObject) -> String {
    let data = unsafe { obj.payload::<InetSocketAddressData>() };
    data.addr.to_string()
}

/// An endpoint named by hostname (or IP literal) and port
///
/// Construction performs no resolution. Driving the enumerator returned by
/// [`enumerate`](SocketConnectable::enumerate) does, so an address for an
/// unresolvable name constructs fine and fails later.
#[derive(Clone)]
pub struct NetworkAddress {
    inner: Connectable,
}

impl NetworkAddress {
    /// Create an endpoint for `host:port` with default resolver settings.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Self::with_resolver(host, port, ResolverConfig::default())
    }

    /// Create an endpoint whose enumerators resolve under `resolver`.
    pub fn with_resolver(host: &str, port: u16, resolver: ResolverConfig) -> Result<Self> {
        if host.is_empty() {
            return Err(ConnectError::Parse("hostname cannot be empty".to_string()));
        }
        let obj = RawObject::alloc(
            *NETWORK_ADDRESS_TYPE,
            NetworkAddressData {
                host: host.to_string(),
                port,
                resolver,
            },
        );
        Ok(Self {
            inner: Connectable::from_object(obj)?,
        })
    }

    /// Parse a `host:port` endpoint string.
    ///
    /// Accepts bare hostnames (using `default_port`), `host:port`,
    /// bracketed IPv6 literals like `[::1]:80`, and bare IPv6 literals.
    ///
    /// # Errors
    /// Fails when the port is malformed, or when the string carries no port
    /// and `default_port` is zero.
    pub fn parse(spec: &str, default_port: u16) -> Result<Self> {
        let (host, port) = if let Some(rest) = spec.strip_prefix('[') {
            let end = rest.find(']').ok_or_else(|| {
                ConnectError::Parse(format!("unterminated '[' in endpoint '{spec}'"))
            })?;
            let host = &rest[..end];
            let tail = &rest[end + 1..];
            if let Some(port_str) = tail.strip_prefix(':') {
                (host, parse_port(port_str)?)
            } else if tail.is_empty() {
                (host, default_port)
            } else {
                return Err(ConnectError::Parse(format!(
                    "unexpected '{tail}' after ']' in endpoint '{spec}'"
                )));
            }
        } else if let Some((host, port_str)) = spec.rsplit_once(':') {
            if host.contains(':') {
                // More than one colon: a bare IPv6 literal, not host:port.
                (spec, default_port)
            } else {
                (host, parse_port(port_str)?)
            }
        } else {
            (spec, default_port)
        };

        if port == 0 {
            return Err(ConnectError::Parse(format!(
                "endpoint '{spec}' has no port and no default port was given"
            )));
        }
        Self::new(host, port)
    }

    /// Parse a URI endpoint, falling back to the scheme's well-known port.
    ///
    /// # Errors
    /// Fails on malformed URIs, host-less URIs, and URIs whose scheme has no
    /// well-known port when `default_port` is zero.
    pub fn parse_uri(uri: &str, default_port: u16) -> Result<Self> {
        let url = Url::parse(uri)?;
        let host = url
            .host_str()
            .ok_or_else(|| ConnectError::Parse(format!("URI '{uri}' has no host")))?;
        // url keeps the brackets on IPv6 hosts; drop them.
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port = match url.port_or_known_default() {
            Some(port) => port,
            None if default_port > 0 => default_port,
            None => {
                return Err(ConnectError::Parse(format!(
                    "URI '{uri}' has no port and no default port was given"
                )))
            }
        };
        Self::new(host, port)
    }

    /// Hostname this endpoint was created with
    pub fn host(&self) -> &str {
        &self.data().host
    }

    /// Port this endpoint was created with
    pub fn port(&self) -> u16 {
        self.data().port
    }

    /// Wrap `ptr`, taking a new reference; the caller keeps its own.
    pub fn from_raw_none(ptr: *mut RawObject) -> Result<Self> {
        Self::from_object(ObjectRef::from_raw_none(ptr)?)
    }

    /// Wrap `ptr`, adopting the reference the caller already holds.
    pub fn from_raw_full(ptr: *mut RawObject) -> Result<Self> {
        Self::from_object(ObjectRef::from_raw_full(ptr)?)
    }

    fn from_object(obj: ObjectRef) -> Result<Self> {
        if obj.type_code() != *NETWORK_ADDRESS_TYPE {
            return Err(ConnectError::TypeMismatch(
                "object is not a network address".to_string(),
            ));
        }
        Ok(Self {
            inner: Connectable::from_object(obj)?,
        })
    }

    /// Borrow the raw pointer; no reference is transferred.
    pub fn as_raw(&self) -> *mut RawObject {
        self.inner.as_raw()
    }

    /// Transfer this wrapper's reference to the caller.
    pub fn into_raw(self) -> *mut RawObject {
        self.inner.into_raw()
    }

    /// Upcast to the capability wrapper, sharing the same native object.
    pub fn upcast(&self) -> Connectable {
        self.inner.clone()
    }

    fn data(&self) -> &NetworkAddressData {
        // Sound: the type code was checked on construction.
        unsafe { self.inner.object().header().payload::<NetworkAddressData>() }
    }
}

impl SocketConnectable for NetworkAddress {
    fn enumerate(&self) -> Result<AddressEnumerator> {
        self.inner.enumerate()
    }

    fn proxy_enumerate(&self) -> Result<AddressEnumerator> {
        self.inner.proxy_enumerate()
    }

    fn to_description(&self) -> String {
        self.inner.to_description()
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_description())
    }
}

/// An endpoint that is already a resolved socket address
///
/// Its enumerator yields exactly that address and is then exhausted.
#[derive(Debug, Clone)]
pub struct InetSocketAddress {
    inner: Connectable,
}

impl InetSocketAddress {
    /// Wrap a resolved socket address as an endpoint.
    pub fn new(addr: SocketAddr) -> Result<Self> {
        let obj = RawObject::alloc(*INET_SOCKET_ADDRESS_TYPE, InetSocketAddressData { addr });
        Ok(Self {
            inner: Connectable::from_object(obj)?,
        })
    }

    /// The wrapped socket address
    pub fn addr(&self) -> SocketAddr {
        self.data().addr
    }

    /// Wrap `ptr`, taking a new reference; the caller keeps its own.
    pub fn from_raw_none(ptr: *mut RawObject) -> Result<Self> {
        Self::from_object(ObjectRef::from_raw_none(ptr)?)
    }

    /// Wrap `ptr`, adopting the reference the caller already holds.
    pub fn from_raw_full(ptr: *mut RawObject) -> Result<Self> {
        Self::from_object(ObjectRef::from_raw_full(ptr)?)
    }

    fn from_object(obj: ObjectRef) -> Result<Self> {
        if obj.type_code() != *INET_SOCKET_ADDRESS_TYPE {
            return Err(ConnectError::TypeMismatch(
                "object is not an inet socket address".to_string(),
            ));
        }
        Ok(Self {
            inner: Connectable::from_object(obj)?,
        })
    }

    /// Borrow the raw pointer; no reference is transferred.
    pub fn as_raw(&self) -> *mut RawObject {
        self.inner.as_raw()
    }

    /// Transfer this wrapper's reference to the caller.
    pub fn into_raw(self) -> *mut RawObject {
        self.inner.into_raw()
    }

    /// Upcast to the capability wrapper, sharing the same native object.
    pub fn upcast(&self) -> Connectable {
        self.inner.clone()
    }

    fn data(&self) -> &InetSocketAddressData {
        // Sound: the type code was checked on construction.
        unsafe { self.inner.object().header().payload::<InetSocketAddressData>() }
    }
}

impl SocketConnectable for InetSocketAddress {
    fn enumerate(&self) -> Result<AddressEnumerator> {
        self.inner.enumerate()
    }

    fn proxy_enumerate(&self) -> Result<AddressEnumerator> {
        self.inner.proxy_enumerate()
    }

    fn to_description(&self) -> String {
        self.inner.to_description()
    }
}

impl fmt::Display for InetSocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_description())
    }
}

fn parse_port(port: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|_| ConnectError::Parse(format!("invalid port '{port}'")))
}
