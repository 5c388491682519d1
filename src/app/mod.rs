pub mod context;
pub mod error;

pub use context::{AppContext, OpenedArticle};
pub use error::{ErrorKind, Result, SwipediaError};
