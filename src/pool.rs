use crate::document::DocumentParts;

const LOOKAHEAD_CAPACITY: usize = 1024;

/// Recycled backing memory for documents and reader lookahead buffers.
///
/// A pool is an ordinary value owned by the caller; hand it to
/// [`Document::new_in`](crate::Document::new_in) and
/// [`Reader::with_pool`](crate::Reader::with_pool), and give the memory
/// back with the matching `release` calls when done.
#[derive(Debug, Default)]
pub struct Pool {
    documents: Vec<DocumentParts>,
    buffers: Vec<Vec<char>>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_document_parts(&mut self) -> DocumentParts {
        match self.documents.pop() {
            Some(parts) => {
                log::debug!("reusing pooled document storage");
                parts
            }
            None => DocumentParts::default(),
        }
    }

    pub fn put_document_parts(&mut self, parts: DocumentParts) {
        self.documents.push(parts);
    }

    pub fn take_buffer(&mut self, min_capacity: usize) -> Vec<char> {
        let position = self
            .buffers
            .iter()
            .position(|buffer| buffer.capacity() >= min_capacity);
        match position {
            Some(position) => self.buffers.swap_remove(position),
            None => Vec::with_capacity(min_capacity.max(LOOKAHEAD_CAPACITY)),
        }
    }

    pub fn put_buffer(&mut self, mut buffer: Vec<char>) {
        buffer.clear();
        self.buffers.push(buffer);
    }

    pub fn retained_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn retained_buffers(&self) -> usize {
        self.buffers.len()
    }
}
