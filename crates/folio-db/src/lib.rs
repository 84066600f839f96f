mod collection;
mod config;
mod cursor;
mod database;
mod error;
mod executor;
mod instance;
mod memory;
mod queryset;

pub use collection::Collection;
pub use config::FolioConfig;
pub use cursor::Cursor;
pub use database::Database;
pub use error::DbError;
pub use instance::{Instance, tag_document};
pub use memory::MemoryCollection;
pub use queryset::QuerySet;

pub use bson::{Bson, Document};
