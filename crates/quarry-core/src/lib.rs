pub mod criteria;
pub use criteria::Criteria;

pub mod driver;

mod error;
pub use error::{Error, FieldCategory};

pub mod schema;
pub use schema::SchemaDescriptor;

pub mod stmt;

/// A Result type alias that uses Quarry's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
