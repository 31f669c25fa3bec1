//! Feed text ingestion: block extraction and event parsing.

pub mod block;
pub mod parse;

pub use parse::parse_feed;
