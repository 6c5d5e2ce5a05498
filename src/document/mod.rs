//! Node tree storage.
//!
//! A [`Document`] keeps nodes and values in flat buffers and their
//! argument, property and child lists as rows of [`RowArena`]s. Row 0 of
//! the children arena holds the root nodes. Everything is append-only;
//! handles stay valid for the lifetime of the document.

mod serde;

use std::io::Read;

use crate::arena::{define_handle, Buffer, RowArena, RowParts, SafeIndex};
use crate::constants::KEYWORDS;
use crate::decode::Reader;
use crate::num::number::{format_integer, format_real};
use crate::options::ReadOptions;
use crate::pool::Pool;
use crate::token::{DataType, TokenParts, TokenRef, TokenTable};
use crate::Result;

pub(crate) const ROOT_ROW: usize = 0;
const INITIAL_ROW_CAPACITY: usize = 4;

define_handle!(
    /// Handle to a node of a [`Document`].
    NodeRef
);

define_handle!(
    /// Handle to a value (argument or property value) of a [`Document`].
    ValueRef
);

/// A key/value pair in a node's property row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyRef {
    pub(crate) key: TokenRef,
    pub(crate) value: ValueRef,
}

impl PropertyRef {
    pub fn value(&self) -> ValueRef {
        self.value
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NodeEntry {
    pub(crate) name: TokenRef,
    pub(crate) annotation: TokenRef,
    pub(crate) arguments: SafeIndex,
    pub(crate) properties: SafeIndex,
    pub(crate) children: SafeIndex,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ValueEntry {
    pub(crate) value: TokenRef,
    pub(crate) annotation: TokenRef,
}

impl ValueEntry {
    pub(crate) fn new(value: TokenRef, annotation: Option<TokenRef>) -> Self {
        Self {
            value,
            annotation: annotation.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Document {
    pub(crate) nodes: Buffer<NodeEntry>,
    pub(crate) values: Buffer<ValueEntry>,
    pub(crate) arguments: RowArena<ValueRef>,
    pub(crate) properties: RowArena<PropertyRef>,
    pub(crate) children: RowArena<NodeRef>,
    pub(crate) tokens: TokenTable,
}

/// Released backing memory of a [`Document`], kept by a [`Pool`].
#[derive(Debug, Default)]
pub struct DocumentParts {
    nodes: Vec<NodeEntry>,
    values: Vec<ValueEntry>,
    arguments: RowParts<ValueRef>,
    properties: RowParts<PropertyRef>,
    children: RowParts<NodeRef>,
    tokens: TokenParts,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document on memory recycled from `pool`.
    pub fn new_in(pool: &mut Pool) -> Self {
        let parts = pool.take_document_parts();
        Self {
            nodes: Buffer::from_vec(parts.nodes),
            values: Buffer::from_vec(parts.values),
            arguments: RowArena::from_parts(parts.arguments),
            properties: RowArena::from_parts(parts.properties),
            children: RowArena::from_parts(parts.children),
            tokens: TokenTable::from_parts(parts.tokens),
        }
    }

    /// Clears the document and hands its memory back to `pool`.
    pub fn release(self, pool: &mut Pool) {
        pool.put_document_parts(DocumentParts {
            nodes: self.nodes.release(),
            values: self.values.release(),
            arguments: self.arguments.into_parts(),
            properties: self.properties.into_parts(),
            children: self.children.into_parts(),
            tokens: self.tokens.into_parts(),
        });
    }

    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_with_options(input, &ReadOptions::default())
    }

    pub fn parse_with_options(input: &str, options: &ReadOptions) -> Result<Self> {
        let mut document = Self::new();
        document.read_with_options(&mut Reader::new(input), options)?;
        Ok(document)
    }

    /// Parses UTF-8 text pulled from `reader`.
    pub fn from_read<R: Read>(reader: R) -> Result<Self> {
        let mut document = Self::new();
        document.read(&mut Reader::from_read(reader))?;
        Ok(document)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.arguments.clear();
        self.properties.clear();
        self.children.clear();
        self.tokens.clear();
    }

    /// Root nodes in document order.
    pub fn nodes(&self) -> &[NodeRef] {
        if self.children.rows_count() == 0 {
            return &[];
        }
        self.children.row(ROOT_ROW)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn name(&self, node: NodeRef) -> &str {
        self.tokens.get_token_data(self.nodes[node.index()].name)
    }

    pub fn annotation(&self, node: NodeRef) -> Option<&str> {
        self.token_text(self.nodes[node.index()].annotation)
    }

    pub fn arguments(&self, node: NodeRef) -> &[ValueRef] {
        match self.nodes[node.index()].arguments.get() {
            Some(row) => self.arguments.row(row),
            None => &[],
        }
    }

    /// Properties sorted by key.
    pub fn properties(&self, node: NodeRef) -> &[PropertyRef] {
        match self.nodes[node.index()].properties.get() {
            Some(row) => self.properties.row(row),
            None => &[],
        }
    }

    pub fn children(&self, node: NodeRef) -> &[NodeRef] {
        match self.nodes[node.index()].children.get() {
            Some(row) => self.children.row(row),
            None => &[],
        }
    }

    /// Looks up a property value by key with a binary search.
    pub fn property(&self, node: NodeRef, key: &str) -> Option<ValueRef> {
        let row = self.nodes[node.index()].properties.get()?;
        let at = self.find_property(row, key).ok()?;
        Some(self.properties.row(row)[at].value)
    }

    pub fn key(&self, property: PropertyRef) -> &str {
        self.tokens.get_token_data(property.key)
    }

    pub fn value_data(&self, value: ValueRef) -> &str {
        self.tokens.get_token_data(self.values[value.index()].value)
    }

    pub fn value_kind(&self, value: ValueRef) -> DataType {
        self.tokens.get_token_kind(self.values[value.index()].value)
    }

    pub fn value_annotation(&self, value: ValueRef) -> Option<&str> {
        self.token_text(self.values[value.index()].annotation)
    }

    fn token_text(&self, token: TokenRef) -> Option<&str> {
        token
            .is_valid()
            .then(|| self.tokens.get_token_data(token))
    }

    /// Appends a node named `name` under `parent`, or as a root for `None`.
    pub fn add_node(&mut self, parent: Option<NodeRef>, name: &str) -> NodeRef {
        self.add_nodes(parent, 1, name)[0]
    }

    /// Appends `count` nodes sharing one `name` token.
    pub fn add_nodes(&mut self, parent: Option<NodeRef>, count: usize, name: &str) -> &[NodeRef] {
        let name = self.tokens.allocate_token(DataType::String, name);
        let row = match parent {
            Some(parent) => self.touch_children_row(parent, count),
            None => {
                self.ensure_root_row(count);
                ROOT_ROW
            }
        };

        let first = self.nodes.len();
        self.nodes.push_many(
            count,
            NodeEntry {
                name,
                ..NodeEntry::default()
            },
        );
        let added = self.children.push(row, count);
        for (offset, slot) in added.iter_mut().enumerate() {
            *slot = NodeRef::new(first + offset);
        }
        added
    }

    /// Stores a value. `annotation` of `None` or `""` means no annotation.
    ///
    /// # Panics
    ///
    /// Panics when `kind` is [`DataType::Keyword`] and `data` is not one of
    /// `null`, `true` or `false` (compared case-insensitively).
    pub fn add_value(&mut self, kind: DataType, data: &str, annotation: Option<&str>) -> ValueRef {
        let value = match kind {
            DataType::Keyword => {
                let index = KEYWORDS
                    .iter()
                    .position(|keyword| keyword.eq_ignore_ascii_case(data));
                match index {
                    Some(index) => self.tokens.allocate_keyword_token(index),
                    None => panic!("{data:?} is not a keyword"),
                }
            }
            _ => self.tokens.allocate_token(kind, data),
        };
        let annotation = annotation
            .filter(|text| !text.is_empty())
            .map(|text| self.tokens.allocate_token(DataType::String, text));
        self.push_value(ValueEntry::new(value, annotation))
    }

    pub fn add_string(&mut self, data: &str) -> ValueRef {
        self.add_value(DataType::String, data, None)
    }

    pub fn add_integer<I: itoa::Integer>(&mut self, value: I) -> ValueRef {
        self.add_value(DataType::Integer, &format_integer(value), None)
    }

    /// # Panics
    ///
    /// Panics on NaN and infinities, which have no textual form.
    pub fn add_real(&mut self, value: f64) -> ValueRef {
        match format_real(value) {
            Some(text) => self.add_value(DataType::Real, &text, None),
            None => panic!("cannot store non-finite real {value}"),
        }
    }

    pub fn add_bool(&mut self, value: bool) -> ValueRef {
        let index = if value { 1 } else { 2 };
        let token = self.tokens.allocate_keyword_token(index);
        self.push_value(ValueEntry::new(token, None))
    }

    pub fn add_null(&mut self) -> ValueRef {
        let token = self.tokens.allocate_keyword_token(0);
        self.push_value(ValueEntry::new(token, None))
    }

    pub(crate) fn push_value(&mut self, entry: ValueEntry) -> ValueRef {
        ValueRef::new(self.values.push(entry))
    }

    pub fn add_argument(&mut self, node: NodeRef, value: ValueRef) {
        self.add_arguments(node, &[value]);
    }

    pub fn add_arguments(&mut self, node: NodeRef, values: &[ValueRef]) {
        if values.is_empty() {
            return;
        }
        let row = self.touch_arguments_row(node, values.len());
        self.arguments.push_slice(row, values);
    }

    /// Sets `key` to `value`, replacing an existing value for the same key.
    pub fn set_property(&mut self, node: NodeRef, key: &str, value: ValueRef) {
        let key = self.tokens.allocate_token(DataType::String, key);
        self.set_property_token(node, key, value);
    }

    pub(crate) fn set_property_token(&mut self, node: NodeRef, key: TokenRef, value: ValueRef) {
        let row = self.touch_properties_row(node, 1);
        let property = PropertyRef { key, value };
        match self.find_property(row, self.tokens.get_token_data(key)) {
            Ok(at) => self.properties.row_mut(row)[at] = property,
            Err(at) => self.properties.insert(row, at, 1)[0] = property,
        }
    }

    fn find_property(&self, row: usize, key: &str) -> std::result::Result<usize, usize> {
        self.properties
            .row(row)
            .binary_search_by(|property| self.tokens.get_token_data(property.key).cmp(key))
    }

    /// Sets the node annotation; empty text removes it.
    pub fn annotate(&mut self, node: NodeRef, text: &str) {
        let annotation = if text.is_empty() {
            TokenRef::default()
        } else {
            self.tokens.allocate_token(DataType::String, text)
        };
        self.nodes[node.index()].annotation = annotation;
    }

    pub fn rename(&mut self, node: NodeRef, name: &str) {
        let name = self.tokens.allocate_token(DataType::String, name);
        self.nodes[node.index()].name = name;
    }

    pub(crate) fn ensure_root_row(&mut self, capacity: usize) {
        if self.children.rows_count() == 0 {
            self.children.push_row(capacity.max(INITIAL_ROW_CAPACITY));
        }
    }

    fn touch_arguments_row(&mut self, node: NodeRef, capacity: usize) -> usize {
        if let Some(row) = self.nodes[node.index()].arguments.get() {
            return row;
        }
        let row = self.arguments.push_row(capacity.max(INITIAL_ROW_CAPACITY));
        self.nodes[node.index()].arguments = SafeIndex::new(row);
        row
    }

    fn touch_properties_row(&mut self, node: NodeRef, capacity: usize) -> usize {
        if let Some(row) = self.nodes[node.index()].properties.get() {
            return row;
        }
        let row = self.properties.push_row(capacity.max(INITIAL_ROW_CAPACITY));
        self.nodes[node.index()].properties = SafeIndex::new(row);
        row
    }

    fn touch_children_row(&mut self, node: NodeRef, capacity: usize) -> usize {
        if let Some(row) = self.nodes[node.index()].children.get() {
            return row;
        }
        self.ensure_root_row(INITIAL_ROW_CAPACITY);
        let row = self.children.push_row(capacity.max(INITIAL_ROW_CAPACITY));
        self.nodes[node.index()].children = SafeIndex::new(row);
        row
    }

    fn nodes_eq(&self, other: &Document, left: &[NodeRef], right: &[NodeRef]) -> bool {
        left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(a, b)| self.node_eq(other, *a, *b))
    }

    fn node_eq(&self, other: &Document, left: NodeRef, right: NodeRef) -> bool {
        if self.name(left) != other.name(right)
            || self.annotation(left) != other.annotation(right)
        {
            return false;
        }

        let (args, other_args) = (self.arguments(left), other.arguments(right));
        if args.len() != other_args.len()
            || !args
                .iter()
                .zip(other_args)
                .all(|(a, b)| self.value_eq(other, *a, *b))
        {
            return false;
        }

        let (props, other_props) = (self.properties(left), other.properties(right));
        if props.len() != other_props.len()
            || !props.iter().zip(other_props).all(|(a, b)| {
                self.key(*a) == other.key(*b) && self.value_eq(other, a.value, b.value)
            })
        {
            return false;
        }

        self.nodes_eq(other, self.children(left), other.children(right))
    }

    fn value_eq(&self, other: &Document, left: ValueRef, right: ValueRef) -> bool {
        self.value_kind(left) == other.value_kind(right)
            && self.value_data(left) == other.value_data(right)
            && self.value_annotation(left) == other.value_annotation(right)
    }
}

impl PartialEq for Document {
    /// Structural equality of the root node sequences.
    fn eq(&self, other: &Self) -> bool {
        self.nodes_eq(other, self.nodes(), other.nodes())
    }
}

impl Eq for Document {}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_build_and_query() {
        let mut doc = Document::new();
        let root = doc.add_node(None, "server");
        let port = doc.add_integer(8080);
        let host = doc.add_value(DataType::String, "localhost", Some("host"));
        doc.add_argument(root, port);
        doc.set_property(root, "host", host);
        let child = doc.add_node(Some(root), "route");

        assert_eq!(doc.nodes(), &[root]);
        assert_eq!(doc.name(root), "server");
        assert_eq!(doc.arguments(root), &[port]);
        assert_eq!(doc.value_data(port), "8080");
        assert_eq!(doc.value_kind(port), DataType::Integer);
        assert_eq!(doc.property(root, "host"), Some(host));
        assert_eq!(doc.value_annotation(host), Some("host"));
        assert_eq!(doc.children(root), &[child]);
        assert!(doc.children(child).is_empty());
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.value_count(), 2);
    }

    #[rstest::rstest]
    fn test_properties_stay_sorted() {
        let mut doc = Document::new();
        let node = doc.add_node(None, "n");
        for (key, value) in [("b", 1), ("a", 2), ("c", 3), ("ab", 4)] {
            let value = doc.add_integer(value);
            doc.set_property(node, key, value);
        }
        let keys: Vec<&str> = doc.properties(node).iter().map(|p| doc.key(*p)).collect();
        assert_eq!(keys, ["a", "ab", "b", "c"]);
    }

    #[rstest::rstest]
    fn test_property_overwrite_keeps_one_entry() {
        let mut doc = Document::new();
        let node = doc.add_node(None, "n");
        let first = doc.add_integer(1);
        let second = doc.add_integer(2);
        doc.set_property(node, "a", first);
        doc.set_property(node, "a", second);
        assert_eq!(doc.properties(node).len(), 1);
        assert_eq!(doc.property(node, "a"), Some(second));
        assert_eq!(doc.property(node, "missing"), None);
    }

    #[rstest::rstest]
    fn test_rows_grow_independently() {
        let mut doc = Document::new();
        let a = doc.add_node(None, "a");
        let b = doc.add_node(None, "b");
        for i in 0..20 {
            let value = doc.add_integer(i);
            doc.add_argument(a, value);
            let value = doc.add_integer(100 + i);
            doc.add_argument(b, value);
        }
        let a_args: Vec<&str> = doc.arguments(a).iter().map(|v| doc.value_data(*v)).collect();
        let b_args: Vec<&str> = doc.arguments(b).iter().map(|v| doc.value_data(*v)).collect();
        assert_eq!(a_args.len(), 20);
        assert_eq!(a_args[19], "19");
        assert_eq!(b_args[0], "100");
        assert_eq!(b_args[19], "119");
    }

    #[rstest::rstest]
    fn test_children_before_roots_keep_root_row() {
        let mut doc = Document::new();
        let parent = doc.add_node(None, "parent");
        let child = doc.add_node(Some(parent), "child");
        let second = doc.add_node(None, "second");
        assert_eq!(doc.nodes(), &[parent, second]);
        assert_eq!(doc.children(parent), &[child]);
    }

    #[rstest::rstest]
    fn test_add_nodes_shares_name() {
        let mut doc = Document::new();
        let parent = doc.add_node(None, "list");
        let items = doc.add_nodes(Some(parent), 3, "item").to_vec();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| doc.name(*item) == "item"));
        assert_eq!(doc.children(parent), items.as_slice());
    }

    #[rstest::rstest]
    fn test_keywords_and_scalars() {
        let mut doc = Document::new();
        let t = doc.add_value(DataType::Keyword, "TRUE", None);
        let f = doc.add_bool(false);
        let n = doc.add_null();
        let r = doc.add_real(1e20);
        assert_eq!(doc.value_data(t), "true");
        assert_eq!(doc.value_data(f), "false");
        assert_eq!(doc.value_data(n), "null");
        assert_eq!(doc.value_kind(n), DataType::Keyword);
        assert_eq!(doc.value_data(r), "1E+20");
    }

    #[rstest::rstest]
    #[should_panic(expected = "is not a keyword")]
    fn test_unknown_keyword_panics() {
        Document::new().add_value(DataType::Keyword, "maybe", None);
    }

    #[rstest::rstest]
    #[should_panic(expected = "dereferenced an unset handle")]
    fn test_unset_handle_panics() {
        let doc = Document::new();
        doc.name(NodeRef::default());
    }

    #[rstest::rstest]
    fn test_annotate_and_rename() {
        let mut doc = Document::new();
        let node = doc.add_node(None, "old");
        doc.annotate(node, "kind");
        doc.rename(node, "new");
        assert_eq!(doc.annotation(node), Some("kind"));
        assert_eq!(doc.name(node), "new");
        doc.annotate(node, "");
        assert_eq!(doc.annotation(node), None);
    }

    #[rstest::rstest]
    fn test_structural_equality() {
        let build = |value: i64, annotation: Option<&str>| {
            let mut doc = Document::new();
            let node = doc.add_node(None, "n");
            let value = doc.add_value(DataType::Integer, &value.to_string(), annotation);
            doc.add_argument(node, value);
            doc.add_node(Some(node), "child");
            doc
        };
        assert_eq!(build(1, None), build(1, None));
        assert_ne!(build(1, None), build(2, None));
        assert_ne!(build(1, None), build(1, Some("u8")));
    }

    #[rstest::rstest]
    fn test_pooled_documents_reuse_memory() {
        let mut pool = Pool::new();
        let mut doc = Document::new_in(&mut pool);
        doc.add_node(None, "first");
        doc.release(&mut pool);
        assert_eq!(pool.retained_documents(), 1);

        let doc = Document::new_in(&mut pool);
        assert_eq!(pool.retained_documents(), 0);
        assert!(doc.nodes().is_empty());
        assert_eq!(doc.node_count(), 0);
    }

    #[rstest::rstest]
    fn test_clear() {
        let mut doc = Document::new();
        doc.add_node(None, "n");
        doc.clear();
        assert!(doc.nodes().is_empty());
        assert_eq!(doc.node_count(), 0);
    }
}
