pub mod catalog_parser;

pub use catalog_parser::{CatalogParser, Parser};
