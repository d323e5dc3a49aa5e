//! Persistence seam of the comment system.
//!
//! The API layer depends only on the [`StorageAdapter`] and [`UserDirectory`]
//! traits; concrete backends live behind them. [`MemoryStorage`] is the
//! in-process reference backend used by the server binary and the tests.

pub mod adapter;
pub mod error;
pub mod memory;
pub mod models;

pub use adapter::{StorageAdapter, UserDirectory};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use models::{Comment, CommentQuery, CommentRef, SerializedComment};
