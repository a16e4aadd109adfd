pub mod etl;
pub mod export;
pub mod fetch;
pub mod portfolio;
pub mod summary;

pub use crate::domain::model::{Portfolio, Record, ResultSet, SourceKind};
pub use crate::domain::ports::{SecuritySource, Storage};
pub use crate::utils::error::Result;
