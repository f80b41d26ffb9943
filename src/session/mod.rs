//! Session guard and its collaborators.
//!
//! ARCHITECTURE
//! ============
//! - `model`: session record and role-tagged profile.
//! - `directory`: credential lookup.
//! - `store`: durable key-value port and adapters.
//! - `routing`: pure (role, path) -> redirect decision.
//! - `guard`: owns the session; sequences lookup, storage, and routing.

pub mod directory;
pub mod guard;
pub mod model;
pub mod routing;
pub mod store;

pub use directory::Directory;
pub use guard::{SessionGuard, SessionSnapshot};
pub use model::Role;
pub use routing::RoutingPolicy;
pub use store::{FileStore, KeyValueStore, MemoryStore, Namespaced, PgStore};
