//! Process-wide type registry: type registration and interface attachment
//!
//! Concrete native types register a name here and receive a [`TypeCode`].
//! A type that implements the connectable capability attaches its
//! function-pointer table at registration time; attachment is validated
//! up front so a type missing the required slots never reaches dispatch.

use super::TypeCode;
use crate::connectable::ConnectableIface;
use crate::error::{ConnectError, Result};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

struct TypeRecord {
    name: String,
    connectable: Option<ConnectableIface>,
}

#[derive(Default)]
struct Registry {
    by_name: HashMap<String, TypeCode>,
    records: Vec<TypeRecord>,
}

lazy_static! {
    static ref REGISTRY: Mutex<Registry> = Mutex::new(Registry::default());
}

fn lock() -> std::sync::MutexGuard<'static, Registry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Register a concrete native type under `name`.
///
/// # Errors
/// Fails when `name` is empty or already registered.
pub fn register_type(name: &str) -> Result<TypeCode> {
    if name.is_empty() {
        return Err(ConnectError::Registration(
            "type name cannot be empty".to_string(),
        ));
    }

    let mut registry = lock();
    if registry.by_name.contains_key(name) {
        return Err(ConnectError::Registration(format!(
            "type '{name}' is already registered"
        )));
    }

    let code = TypeCode(registry.records.len() as u32);
    registry.records.push(TypeRecord {
        name: name.to_string(),
        connectable: None,
    });
    registry.by_name.insert(name.to_string(), code);
    log::debug!("registered native type '{name}' as type code {}", code.0);
    Ok(code)
}

/// Declare that the type behind `code` implements the connectable capability.
///
/// # Errors
/// Fails at registration time when `code` was never registered, when the
/// table's required `enumerate` slot is absent, or when the capability is
/// already attached to that type.
pub fn add_connectable_interface(code: TypeCode, iface: ConnectableIface) -> Result<()> {
    if iface.enumerate.is_none() {
        return Err(ConnectError::Registration(
            "connectable interface table is missing its enumerate slot".to_string(),
        ));
    }

    let mut registry = lock();
    let record = registry
        .records
        .get_mut(code.0 as usize)
        .ok_or_else(|| {
            ConnectError::Registration(format!("type code {} was never registered", code.0))
        })?;

    if record.connectable.is_some() {
        return Err(ConnectError::Registration(format!(
            "type '{}' already implements the connectable interface",
            record.name
        )));
    }

    record.connectable = Some(iface);
    log::debug!("attached connectable interface to type '{}'", record.name);
    Ok(())
}

/// Fetch the connectable table attached to `code`, if any.
pub fn connectable_interface(code: TypeCode) -> Option<ConnectableIface> {
    lock()
        .records
        .get(code.0 as usize)
        .and_then(|record| record.connectable)
}

/// Registered name of `code`, if any.
pub fn type_name(code: TypeCode) -> Option<String> {
    lock()
        .records
        .get(code.0 as usize)
        .map(|record| record.name.clone())
}

/// Look up a previously registered type by name.
pub fn lookup_type(name: &str) -> Option<TypeCode> {
    lock().by_name.get(name).copied()
}
