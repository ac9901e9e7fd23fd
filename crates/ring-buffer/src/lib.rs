//! Multi-Reader Ring Buffer
//!
//! Provides a fixed-capacity ring buffer with one writer and a bounded set
//! of readers, each owning a private cursor.
//!
//! Emptiness is decided by cursor equality only. A reader that falls a full
//! revolution behind cannot tell "caught up" from "overwritten".

mod buffer;
mod error;
mod reader;
mod registry;

pub use buffer::{RingBuffer, Word, DEFAULT_CAPACITY};
pub use error::RingError;
pub use reader::MultiReader;
pub use registry::{ReaderCursor, ReaderRegistry, DEFAULT_MAX_READERS};
