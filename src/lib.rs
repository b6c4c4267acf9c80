//! # sovran-registry
//!
//! A thread-safe registry keyed by type, for wiring dependencies at startup.
//!
//! A [`Container`] holds at most one value per [`TypeKey`]. The key is derived
//! from a type parameter, never from a value: register a service under its own
//! type, or under a surrogate type when several implementations of one
//! capability need to live side by side.
//!
//! ## Key Features
//!
//! - **Type is the key**: no string keys to manage
//! - **Pointer-stripped keys**: `Foo`, `&Foo`, `Box<Foo>` and `Arc<Foo>` share one slot
//! - **Surrogate keys**: many implementations of one trait, each under its own marker
//! - **Thread-safe**: one `parking_lot` mutex guards the map; handles are `Send + Sync`
//! - **Checked retrieval**: a runtime type test guards every lookup
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_registry::Container;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct DatabaseConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! let services = Container::new();
//! services.add(DatabaseConfig {
//!     host: "localhost".to_string(),
//!     port: 5432,
//! });
//!
//! let config = services.get::<DatabaseConfig>();
//! assert_eq!(config.port, 5432);
//! assert_eq!(services.len(), 1);
//!
//! // Recoverable lookups return an Option instead of panicking
//! assert!(services.try_get::<u64>().is_none());
//! ```
//!
//! ### Several Implementations of One Capability
//!
//! ```rust
//! use sovran_registry::Container;
//! use std::sync::Arc;
//!
//! trait Storage: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct Disk;
//! struct Memory;
//!
//! impl Storage for Disk {
//!     fn name(&self) -> &'static str { "disk" }
//! }
//!
//! impl Storage for Memory {
//!     fn name(&self) -> &'static str { "memory" }
//! }
//!
//! let services = Container::new();
//! services.add_as::<Arc<dyn Storage>, Disk>(Arc::new(Disk));
//! services.add_as::<Arc<dyn Storage>, Memory>(Arc::new(Memory));
//!
//! let cold = services.get_as::<Arc<dyn Storage>, Disk>();
//! let hot = services.get_as::<Arc<dyn Storage>, Memory>();
//! assert_eq!(cold.name(), "disk");
//! assert_eq!(hot.name(), "memory");
//! ```
//!
//! ### Error Handling
//!
//! `get` and `get_as` panic when nothing usable is stored; that is the right
//! behaviour on a startup path where a missing service is a wiring bug. Code
//! that wants to recover uses `try_get`, or `resolve` to keep the diagnostic:
//!
//! ```rust
//! use sovran_registry::{Container, ContainerError, NotFoundReason};
//!
//! let services = Container::new();
//! services.add::<&'static str>("hello");
//!
//! match services.resolve::<i32>() {
//!     Ok(value) => println!("value: {}", value),
//!     Err(ContainerError::NotFound { key, reason: NotFoundReason::Missing }) => {
//!         println!("nothing registered under {}", key)
//!     }
//!     Err(e) => println!("other error: {}", e),
//! }
//! ```

mod any_value;
mod container;
mod error;
mod key;

pub use container::Container;
pub use error::{ContainerError, NotFoundReason};
pub use key::{type_key, TypeKey};
