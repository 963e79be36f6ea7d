//! C FFI Interface for the sockc Static Library
//!
//! This module provides C-compatible functions for integrating the
//! socket-endpoint binding into applications written in other languages
//! (Swift, Kotlin, C#, etc.). Objects cross the boundary as raw
//! reference-counted handles; every function checks its pointers.

#![allow(clippy::missing_safety_doc)]

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::address::{InetSocketAddress, NetworkAddress};
use crate::connectable::{Connectable, SocketConnectable};
use crate::enumerator::AddressEnumerator;
use crate::object::{self, registry, RawObject};
use crate::{Config, ConnectError};

/// Error codes returned by C FFI functions
#[repr(C)]
pub enum SockcError {
    Success = 0,
    InvalidConfig = 1,
    RegistrationFailed = 2,
    TypeMismatch = 3,
    ResolutionFailed = 4,
    InvalidParameter = 5,
    ParseFailed = 6,
    BufferTooSmall = 7,
    Exhausted = 8,
    InternalError = 99,
}

impl From<ConnectError> for SockcError {
    fn from(error: ConnectError) -> Self {
        match error {
            ConnectError::Config(_) => SockcError::InvalidConfig,
            ConnectError::Registration(_) => SockcError::RegistrationFailed,
            ConnectError::TypeMismatch(_) => SockcError::TypeMismatch,
            ConnectError::InvalidHandle(_) => SockcError::InvalidParameter,
            ConnectError::Parse(_) => SockcError::ParseFailed,
            ConnectError::Resolution(_) => SockcError::ResolutionFailed,
            _ => SockcError::InternalError,
        }
    }
}

/// Copy `value` into a caller-supplied, null-terminated buffer.
unsafe fn copy_to_buffer(value: &str, buffer: *mut c_char, buffer_len: usize) -> c_int {
    let cstr = match CString::new(value) {
        Ok(s) => s,
        Err(_) => return SockcError::InternalError as c_int,
    };

    let bytes = cstr.as_bytes_with_nul();
    if bytes.len() > buffer_len {
        return SockcError::BufferTooSmall as c_int;
    }

    ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, buffer, bytes.len());
    SockcError::Success as c_int
}

unsafe fn cstr_arg<'a>(value: *const c_char) -> Option<&'a str> {
    if value.is_null() {
        return None;
    }
    CStr::from_ptr(value).to_str().ok()
}

/// Get library version
///
/// # Returns
/// - Version string (caller must not free)
#[no_mangle]
pub unsafe extern "C" fn sockc_version() -> *const c_char {
    static VERSION_CSTR: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION_CSTR.as_ptr() as *const c_char
}

/// Parse and validate a TOML configuration string
///
/// # Parameters
/// - `config_str`: TOML configuration string
/// - `error_msg`: Output buffer for error messages (nullable)
/// - `error_msg_len`: Size of error message buffer
///
/// # Returns
/// - 0 on success
/// - Error code on failure
#[no_mangle]
pub unsafe extern "C" fn sockc_parse_config(
    config_str: *const c_char,
    error_msg: *mut c_char,
    error_msg_len: usize,
) -> c_int {
    let Some(config_str) = cstr_arg(config_str) else {
        return SockcError::InvalidParameter as c_int;
    };

    match config_str.parse::<Config>().and_then(|c| c.validate()) {
        Ok(()) => SockcError::Success as c_int,
        Err(err) => {
            if !error_msg.is_null() && error_msg_len > 0 {
                let message = format!("{err}");
                let truncated: String = message
                    .chars()
                    .take(error_msg_len.saturating_sub(1))
                    .collect();
                let _ = copy_to_buffer(&truncated, error_msg, error_msg_len);
            }
            SockcError::from(err) as c_int
        }
    }
}

/// Create a network-address endpoint for `host:port`
///
/// # Returns
/// - Raw handle owning one reference on success
/// - NULL on failure
#[no_mangle]
pub unsafe extern "C" fn sockc_network_address_new(
    host: *const c_char,
    port: u16,
) -> *mut RawObject {
    let Some(host) = cstr_arg(host) else {
        return ptr::null_mut();
    };

    match NetworkAddress::new(host, port) {
        Ok(addr) => addr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Parse a `host:port` endpoint string into a network-address handle
///
/// # Parameters
/// - `spec`: Endpoint string (`host`, `host:port`, `[v6]:port`, bare v6)
/// - `default_port`: Port assumed when `spec` carries none (0 = require one)
///
/// # Returns
/// - Raw handle owning one reference on success
/// - NULL on failure
#[no_mangle]
pub unsafe extern "C" fn sockc_network_address_parse(
    spec: *const c_char,
    default_port: u16,
) -> *mut RawObject {
    let Some(spec) = cstr_arg(spec) else {
        return ptr::null_mut();
    };

    match NetworkAddress::parse(spec, default_port) {
        Ok(addr) => addr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Create an endpoint from an already-resolved address literal
///
/// # Parameters
/// - `addr`: IP address literal, e.g. "192.0.2.1" or "2001:db8::1"
/// - `port`: Port number
///
/// # Returns
/// - Raw handle owning one reference on success
/// - NULL on failure
#[no_mangle]
pub unsafe extern "C" fn sockc_inet_socket_address_new(
    addr: *const c_char,
    port: u16,
) -> *mut RawObject {
    let Some(addr) = cstr_arg(addr) else {
        return ptr::null_mut();
    };

    let Ok(ip) = addr.parse::<std::net::IpAddr>() else {
        return ptr::null_mut();
    };

    match InetSocketAddress::new(std::net::SocketAddr::new(ip, port)) {
        Ok(endpoint) => endpoint.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Take one reference on a native object handle
#[no_mangle]
pub unsafe extern "C" fn sockc_object_ref(obj: *mut RawObject) {
    if !obj.is_null() {
        object::obj_ref(obj);
    }
}

/// Release one reference on a native object handle
///
/// The object is destroyed when the last reference goes.
#[no_mangle]
pub unsafe extern "C" fn sockc_object_unref(obj: *mut RawObject) {
    if !obj.is_null() {
        object::obj_unref(obj);
    }
}

/// Get the current reference count of a native object handle
///
/// # Returns
/// - Reference count, or -1 for a null handle
#[no_mangle]
pub unsafe extern "C" fn sockc_object_ref_count(obj: *const RawObject) -> c_int {
    if obj.is_null() {
        return -1;
    }
    (*obj).ref_count() as c_int
}

/// Get the registered type name of a native object handle
///
/// # Returns
/// - 0 on success
/// - Error code on failure
#[no_mangle]
pub unsafe extern "C" fn sockc_object_type_name(
    obj: *const RawObject,
    buffer: *mut c_char,
    buffer_len: usize,
) -> c_int {
    if obj.is_null() || buffer.is_null() || buffer_len == 0 {
        return SockcError::InvalidParameter as c_int;
    }

    match registry::type_name((*obj).type_code()) {
        Some(name) => copy_to_buffer(&name, buffer, buffer_len),
        None => SockcError::TypeMismatch as c_int,
    }
}

/// Create a fresh address enumerator for a connectable handle
///
/// The caller owns one reference on the returned enumerator and must
/// release it with `sockc_object_unref`.
///
/// # Returns
/// - Raw enumerator handle on success
/// - NULL when the handle is null or its type lacks the capability
#[no_mangle]
pub unsafe extern "C" fn sockc_connectable_enumerate(obj: *mut RawObject) -> *mut RawObject {
    let Ok(connectable) = Connectable::from_raw_none(obj) else {
        return ptr::null_mut();
    };

    match connectable.enumerate() {
        Ok(enumerator) => enumerator.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Get a human-readable description of a connectable handle
///
/// # Returns
/// - 0 on success
/// - Error code on failure
#[no_mangle]
pub unsafe extern "C" fn sockc_connectable_describe(
    obj: *mut RawObject,
    buffer: *mut c_char,
    buffer_len: usize,
) -> c_int {
    if buffer.is_null() || buffer_len == 0 {
        return SockcError::InvalidParameter as c_int;
    }

    match Connectable::from_raw_none(obj) {
        Ok(connectable) => copy_to_buffer(&connectable.to_description(), buffer, buffer_len),
        Err(err) => SockcError::from(err) as c_int,
    }
}

/// Advance an enumerator and write the next address as `ip:port`
///
/// # Returns
/// - 0 on success
/// - 8 (`Exhausted`) when no addresses remain
/// - Error code on failure
#[no_mangle]
pub unsafe extern "C" fn sockc_enumerator_next(
    obj: *mut RawObject,
    buffer: *mut c_char,
    buffer_len: usize,
) -> c_int {
    if buffer.is_null() || buffer_len == 0 {
        return SockcError::InvalidParameter as c_int;
    }

    let enumerator = match AddressEnumerator::from_raw_none(obj) {
        Ok(enumerator) => enumerator,
        Err(err) => return SockcError::from(err) as c_int,
    };

    match enumerator.next() {
        Ok(Some(addr)) => copy_to_buffer(&addr.to_string(), buffer, buffer_len),
        Ok(None) => SockcError::Exhausted as c_int,
        Err(err) => SockcError::from(err) as c_int,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn cstring(value: &str) -> CString {
        CString::new(value).expect("no interior nul")
    }

    #[test]
    fn test_version_is_non_null() {
        let version = unsafe { CStr::from_ptr(sockc_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_parse_config_success() {
        let config = cstring("[resolver]\ndefault_port = 443\n");
        let code = unsafe { sockc_parse_config(config.as_ptr(), ptr::null_mut(), 0) };
        assert_eq!(code, SockcError::Success as c_int);
    }

    #[test]
    fn test_parse_config_reports_error() {
        let config = cstring("[logging]\nlevel = \"verbose\"\n");
        let mut buffer = [0 as c_char; 256];
        let code =
            unsafe { sockc_parse_config(config.as_ptr(), buffer.as_mut_ptr(), buffer.len()) };
        assert_eq!(code, SockcError::InvalidConfig as c_int);

        let message = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        assert!(message.to_str().unwrap().contains("verbose"));
    }

    #[test]
    fn test_parse_config_null_rejected() {
        let code = unsafe { sockc_parse_config(ptr::null(), ptr::null_mut(), 0) };
        assert_eq!(code, SockcError::InvalidParameter as c_int);
    }

    #[test]
    fn test_endpoint_lifecycle_over_c_abi() {
        let host = cstring("192.0.2.9");
        let obj = unsafe { sockc_inet_socket_address_new(host.as_ptr(), 443) };
        assert!(!obj.is_null());
        assert_eq!(unsafe { sockc_object_ref_count(obj) }, 1);

        unsafe { sockc_object_ref(obj) };
        assert_eq!(unsafe { sockc_object_ref_count(obj) }, 2);
        unsafe { sockc_object_unref(obj) };
        assert_eq!(unsafe { sockc_object_ref_count(obj) }, 1);

        let mut buffer = [0 as c_char; 64];
        let code = unsafe { sockc_object_type_name(obj, buffer.as_mut_ptr(), buffer.len()) };
        assert_eq!(code, SockcError::Success as c_int);
        let name = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        assert_eq!(name.to_str().unwrap(), "inet-socket-address");

        unsafe { sockc_object_unref(obj) };
    }

    #[test]
    fn test_enumerate_and_drain_over_c_abi() {
        let host = cstring("192.0.2.9");
        let obj = unsafe { sockc_inet_socket_address_new(host.as_ptr(), 443) };
        assert!(!obj.is_null());

        let enumerator = unsafe { sockc_connectable_enumerate(obj) };
        assert!(!enumerator.is_null());
        // The endpoint keeps its own reference; the enumerator is fresh.
        assert_eq!(unsafe { sockc_object_ref_count(obj) }, 1);
        assert_eq!(unsafe { sockc_object_ref_count(enumerator) }, 1);

        let mut buffer = [0 as c_char; 64];
        let code = unsafe { sockc_enumerator_next(enumerator, buffer.as_mut_ptr(), buffer.len()) };
        assert_eq!(code, SockcError::Success as c_int);
        let addr = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        assert_eq!(addr.to_str().unwrap(), "192.0.2.9:443");

        let code = unsafe { sockc_enumerator_next(enumerator, buffer.as_mut_ptr(), buffer.len()) };
        assert_eq!(code, SockcError::Exhausted as c_int);

        unsafe { sockc_object_unref(enumerator) };
        unsafe { sockc_object_unref(obj) };
    }

    #[test]
    fn test_enumerate_rejects_non_connectable() {
        let host = cstring("192.0.2.9");
        let obj = unsafe { sockc_inet_socket_address_new(host.as_ptr(), 443) };
        let enumerator = unsafe { sockc_connectable_enumerate(obj) };
        assert!(!enumerator.is_null());

        // An enumerator is not itself connectable.
        let nested = unsafe { sockc_connectable_enumerate(enumerator) };
        assert!(nested.is_null());

        unsafe { sockc_object_unref(enumerator) };
        unsafe { sockc_object_unref(obj) };
    }

    #[test]
    fn test_describe_over_c_abi() {
        let spec = cstring("example.com:8080");
        let obj = unsafe { sockc_network_address_parse(spec.as_ptr(), 0) };
        assert!(!obj.is_null());

        let mut buffer = [0 as c_char; 64];
        let code = unsafe { sockc_connectable_describe(obj, buffer.as_mut_ptr(), buffer.len()) };
        assert_eq!(code, SockcError::Success as c_int);
        let described = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        assert_eq!(described.to_str().unwrap(), "example.com:8080");

        unsafe { sockc_object_unref(obj) };
    }

    #[test]
    fn test_buffer_too_small() {
        let spec = cstring("example.com:8080");
        let obj = unsafe { sockc_network_address_parse(spec.as_ptr(), 0) };
        let mut buffer = [0 as c_char; 4];
        let code = unsafe { sockc_connectable_describe(obj, buffer.as_mut_ptr(), buffer.len()) };
        assert_eq!(code, SockcError::BufferTooSmall as c_int);

        unsafe { sockc_object_unref(obj) };
    }

    #[test]
    fn test_null_handles_rejected() {
        assert!(unsafe { sockc_network_address_new(ptr::null(), 80) }.is_null());
        assert!(unsafe { sockc_network_address_parse(ptr::null(), 80) }.is_null());
        assert!(unsafe { sockc_connectable_enumerate(ptr::null_mut()) }.is_null());
        assert_eq!(unsafe { sockc_object_ref_count(ptr::null()) }, -1);

        let mut buffer = [0 as c_char; 16];
        let code = unsafe {
            sockc_enumerator_next(ptr::null_mut(), buffer.as_mut_ptr(), buffer.len())
        };
        assert_eq!(code, SockcError::InvalidParameter as c_int);

        // Null unref is a no-op, not a crash.
        unsafe { sockc_object_unref(ptr::null_mut()) };
    }

    #[test]
    fn test_parse_rejects_bad_spec() {
        let spec = cstring("example.com");
        // No port in the spec and no default port supplied.
        assert!(unsafe { sockc_network_address_parse(spec.as_ptr(), 0) }.is_null());
    }
}
