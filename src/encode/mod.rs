mod writer;

use std::fmt;
use std::io::{self, Write};

pub use writer::Writer;

use crate::document::Document;
use crate::options::WriteOptions;

/// Renders `document` as text.
///
/// Rendering into memory cannot fail; the writer prints whatever the
/// document holds.
///
/// # Examples
///
/// ```
/// use cuddle::{Document, WriteOptions};
///
/// let doc = Document::parse("node 0xff key=\"v\"").unwrap();
/// let text = cuddle::encode::to_string(&doc, &WriteOptions::default());
/// assert_eq!(text, "node 255 key=\"v\"\n");
/// ```
pub fn to_string(document: &Document, options: &WriteOptions) -> String {
    let mut writer = Writer::new(options);
    writer.write_document(document);
    let text = writer.finish();
    log::debug!("rendered {} bytes", text.len());
    text
}

pub fn to_writer<W: Write>(mut sink: W, document: &Document, options: &WriteOptions) -> io::Result<()> {
    let text = to_string(document, options);
    sink.write_all(text.as_bytes())?;
    sink.flush()
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self, &WriteOptions::default()))
    }
}
