#[cfg(feature = "postgres")]
#[macro_use]
extern crate diesel;

mod enums;
mod error;
mod memory;
mod store;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
mod schema;


pub mod object_id;
pub mod project_assignments;
pub mod project_files;
pub mod projects;
pub mod sessions;
pub mod users;

pub use enums::*;
pub use error::*;
pub use memory::MemoryStore;
pub use store::*;

#[cfg(feature = "postgres")]
pub use postgres::{connect, PgStore, Pool, PoolExt, MIGRATIONS};

pub fn new_uuid() -> uuid::Uuid {
    ulid::Ulid::new().into()
}
