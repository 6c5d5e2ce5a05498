pub mod arena;
pub mod constants;
pub mod decode;
pub mod document;
pub mod encode;
pub mod error;
pub mod num;
pub mod options;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod pool;
pub mod text;
pub mod token;

use std::io::{self, Read, Write};

pub use crate::decode::{CharSource, IoSource, Reader};
pub use crate::document::{Document, NodeRef, PropertyRef, ValueRef};
pub use crate::encode::Writer;
pub use crate::error::Error;
pub use crate::options::{Indent, ReadOptions, WriteOptions};
pub use crate::pool::Pool;
pub use crate::token::{DataType, TokenRef};

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse(input: &str) -> Result<Document> {
    Document::parse(input)
}

pub fn parse_with_options(input: &str, options: &ReadOptions) -> Result<Document> {
    Document::parse_with_options(input, options)
}

pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    Document::from_read(reader)
}

pub fn to_string(document: &Document) -> String {
    to_string_with_options(document, &WriteOptions::default())
}

pub fn to_string_with_options(document: &Document, options: &WriteOptions) -> String {
    encode::to_string(document, options)
}

pub fn to_writer<W: Write>(writer: W, document: &Document) -> io::Result<()> {
    to_writer_with_options(writer, document, &WriteOptions::default())
}

pub fn to_writer_with_options<W: Write>(
    writer: W,
    document: &Document,
    options: &WriteOptions,
) -> io::Result<()> {
    encode::to_writer(writer, document, options)
}
