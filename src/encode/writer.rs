use smol_str::SmolStr;

use crate::document::{Document, NodeRef, ValueRef};
use crate::options::WriteOptions;
use crate::text::string::{write_identifier, write_quoted};
use crate::token::DataType;

/// Renders documents into an in-memory string.
pub struct Writer {
    buffer: String,
    trailing_newline: bool,
    indent_unit: SmolStr,
    indent_cache: Vec<String>,
}

impl Writer {
    pub fn new(options: &WriteOptions) -> Self {
        Self {
            buffer: String::new(),
            trailing_newline: options.trailing_newline,
            indent_unit: options.indent.unit(),
            indent_cache: vec![String::new()],
        }
    }

    pub fn finish(mut self) -> String {
        if !self.trailing_newline && self.buffer.ends_with('\n') {
            self.buffer.pop();
        }
        self.buffer
    }

    pub fn write_document(&mut self, document: &Document) {
        self.write_nodes(document, document.nodes(), 0);
    }

    /// Writes `nodes` at `depth`; an empty list is a lone newline.
    pub fn write_nodes(&mut self, document: &Document, nodes: &[NodeRef], depth: usize) {
        if nodes.is_empty() {
            self.buffer.push('\n');
            return;
        }
        for node in nodes {
            self.write_node(document, *node, depth);
        }
    }

    fn write_node(&mut self, document: &Document, node: NodeRef, depth: usize) {
        self.write_indent(depth);
        if let Some(annotation) = document.annotation(node) {
            self.write_annotation(annotation);
        }
        write_identifier(&mut self.buffer, document.name(node));

        for argument in document.arguments(node) {
            self.buffer.push(' ');
            self.write_value(document, *argument);
        }
        for property in document.properties(node) {
            self.buffer.push(' ');
            write_identifier(&mut self.buffer, document.key(*property));
            self.buffer.push('=');
            self.write_value(document, property.value());
        }

        let children = document.children(node);
        if !children.is_empty() {
            self.buffer.push_str(" {\n");
            self.write_nodes(document, children, depth + 1);
            self.write_indent(depth);
            self.buffer.push('}');
        }
        self.buffer.push('\n');
    }

    fn write_value(&mut self, document: &Document, value: ValueRef) {
        if let Some(annotation) = document.value_annotation(value) {
            self.write_annotation(annotation);
        }
        let data = document.value_data(value);
        match document.value_kind(value) {
            DataType::String => write_quoted(&mut self.buffer, data),
            DataType::Integer | DataType::Real | DataType::Keyword => {
                self.buffer.push_str(data)
            }
        }
    }

    fn write_annotation(&mut self, annotation: &str) {
        self.buffer.push('(');
        write_identifier(&mut self.buffer, annotation);
        self.buffer.push(')');
    }

    fn write_indent(&mut self, depth: usize) {
        if depth == 0 || self.indent_unit.is_empty() {
            return;
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.buffer.push_str(&self.indent_cache[depth]);
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let mut next = self.indent_cache.last().cloned().unwrap_or_default();
            next.push_str(&self.indent_unit);
            self.indent_cache.push(next);
        }
    }
}
