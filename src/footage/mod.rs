//! Stock-footage retrieval for Relato.
//!
//! Background clips come from the Pexels video API and are cached in a
//! local library directory so repeated queries reuse earlier downloads.

mod library;
mod pexels;

pub use library::{ClipRecord, FootageLibrary};
pub use pexels::{PexelsClient, StockVideo, StockVideoFile};
