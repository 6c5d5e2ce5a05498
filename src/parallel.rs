//! Batch parsing and rendering across the rayon thread pool.
//!
//! Each document is built and rendered by exactly one task; nothing is
//! shared mutably between threads.

use rayon::prelude::*;

use crate::options::WriteOptions;
use crate::{encode, Document, Result};

pub fn parse_all(inputs: &[&str]) -> Vec<Result<Document>> {
    inputs.par_iter().map(|input| Document::parse(input)).collect()
}

pub fn render_all(documents: &[Document], options: &WriteOptions) -> Vec<String> {
    documents
        .par_iter()
        .map(|document| encode::to_string(document, options))
        .collect()
}
