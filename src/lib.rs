//! sockc - Static Library for Socket-Endpoint Capability Binding
//!
//! This is a **static library** exposing a "socket-connectable" capability —
//! the ability of a value to name a network endpoint and lazily enumerate
//! resolved socket addresses for it — over a reference-counted native
//! object system with a stable C interface.
//!
//! ## What This Library Provides
//! - A native object substrate: reference-counted instances, runtime type
//!   registration, and interface attachment via function-pointer tables
//! - Typed wrapper handles with explicit wrap/unwrap conversions that
//!   either take a new reference or adopt an existing one
//! - Concrete endpoint types (hostnames, resolved socket addresses) and
//!   the lazy address enumerator their capability produces
//! - Configuration parsing and validation (TOML format)
//! - C FFI bindings for integration with other languages
//!
//! ## What Your Application Must Implement
//! - Driving the enumerator and connecting to the addresses it yields
//! - Any proxy or transport behavior layered above address resolution
//!
//! Resolution is lazy throughout: constructing an endpoint never touches
//! the network, and resolution failures surface when an enumerator is
//! driven, not before.

pub mod address;
pub mod config;
pub mod connectable;
pub mod enumerator;
pub mod error;
pub mod object;

mod resolver;

// Re-export core types for static library interface
pub use address::{InetSocketAddress, NetworkAddress};
pub use config::{AddressOrder, Config, LoggingConfig, ResolverConfig};
pub use connectable::{Connectable, ConnectableIface, SocketConnectable};
pub use enumerator::AddressEnumerator;
pub use error::{ConnectError, Result};
pub use object::{ObjectRef, RawObject, TypeCode};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// C FFI Interface for cross-platform integration
pub mod ffi;
