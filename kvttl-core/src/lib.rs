//! # kvttl Core
//!
//! An in-process key-value store with optional per-entry TTL (time-to-live).
//!
//! ## Features
//!
//! - Generic over key and value types (`K: Eq + Hash`)
//! - One reader/writer lock per store; check-and-mutate is always atomic
//! - Exclusive insert: `put` never overwrites a live entry
//! - TTLs can be set or replaced independently of the value, and updating a
//!   value never touches its TTL
//! - Expiry is enforced on every access (lazy), independent of reclamation
//! - Background sweeper that periodically frees expired entries
//!
//! ## Example
//!
//! ```rust,no_run
//! use kvttl_core::{Store, StoreConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Store with a sweeper running every 30 seconds
//!     let config = StoreConfig::default()
//!         .with_sweep_interval(Duration::from_secs(30));
//!     let store: Store<String, String> = Store::with_config(config);
//!
//!     // Store a value with a 60 second TTL
//!     store.put_with_ttl("user:123", "John Doe", Duration::from_secs(60)).unwrap();
//!
//!     if let Ok(value) = store.get("user:123") {
//!         println!("User: {}", value);
//!     }
//!
//!     if let Ok(Some(remaining)) = store.ttl_remaining("user:123") {
//!         println!("Expires in {:?}", remaining);
//!     }
//!
//!     store.delete("user:123").unwrap();
//! }
//! ```

mod config;
mod entry;
mod error;
mod store;
mod sweeper;

pub use config::StoreConfig;
pub use entry::{Entry, MAX_TTL};
pub use error::StoreError;
pub use store::Store;
pub use sweeper::Sweeper;
