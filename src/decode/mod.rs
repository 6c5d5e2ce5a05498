//! Grammar driver: turns reader output into document storage.

mod reader;
mod source;

use smallvec::SmallVec;

pub use reader::Reader;
pub(crate) use reader::Literal;
pub use source::{CharSource, Exhausted, IoSource};

use crate::arena::SafeIndex;
use crate::document::{Document, NodeEntry, NodeRef, ValueEntry, ROOT_ROW};
use crate::options::ReadOptions;
use crate::token::{DataType, TokenRef};
use crate::Result;

type Arguments = SmallVec<[ValueEntry; 8]>;
type Properties = SmallVec<[(TokenRef, ValueEntry); 8]>;

impl Document {
    /// Reads nodes from `reader` and appends them to the root list.
    pub fn read<S: CharSource>(&mut self, reader: &mut Reader<S>) -> Result<()> {
        self.read_with_options(reader, &ReadOptions::default())
    }

    pub fn read_with_options<S: CharSource>(
        &mut self,
        reader: &mut Reader<S>,
        options: &ReadOptions,
    ) -> Result<()> {
        log::debug!("parsing document");
        self.ensure_root_row(0);
        reader.scan_all(Literal::LineSpace)?;

        let mut roots: SmallVec<[NodeRef; 16]> = SmallVec::new();
        while !reader.is_done() {
            if let Some(node) = self.read_node(reader, false, 0, options)? {
                roots.push(node);
            }
        }
        reader.check_failure()?;

        self.children.push_slice(ROOT_ROW, &roots);
        log::debug!(
            "parsed {} root nodes ({} nodes, {} values, {} tokens)",
            roots.len(),
            self.nodes.len(),
            self.values.len(),
            self.tokens.len()
        );
        Ok(())
    }

    /// Reads one node with its arguments, properties and child block.
    /// Returns `None` when the node was elided with `/-`, in which case
    /// nothing it allocated survives.
    fn read_node<S: CharSource>(
        &mut self,
        reader: &mut Reader<S>,
        parent_elided: bool,
        depth: usize,
        options: &ReadOptions,
    ) -> Result<Option<NodeRef>> {
        let mark = self.tokens.mark();
        let slash_dash = reader.scan(Literal::SlashDashComment)?;
        let elided = slash_dash || parent_elided;

        let annotation = reader.read_annotation(&mut self.tokens)?;
        let name = match reader.read_string(&mut self.tokens)? {
            Some(name) => name,
            None => match reader.read_identifier(&mut self.tokens) {
                Some(name) => name,
                None => return Err(reader.expectation_error("node name")),
            },
        };

        let mut arguments = Arguments::new();
        let mut properties = Properties::new();
        let mut child_block = None;

        loop {
            let spaced = reader.scan_all(Literal::NodeSpace)?;
            if reader.scan(Literal::NodeTerminator)? {
                break;
            }

            let item_elided = reader.scan(Literal::SlashDashComment)?;
            if reader.scan_symbol('{') {
                child_block = Some(item_elided);
                break;
            }
            if !spaced {
                return Err(reader.expectation_error("whitespace"));
            }

            let item_mark = self.tokens.mark();
            let item = self.read_item(reader)?;
            if item_elided {
                log::trace!("discarding elided node item");
                self.tokens.rewind(item_mark);
                continue;
            }
            match item {
                Item::Argument(entry) => arguments.push(entry),
                Item::Property(key, entry) => properties.push((key, entry)),
            }
        }

        let node = if elided {
            None
        } else {
            Some(self.store_node(name, annotation, arguments, properties))
        };

        if let Some(children_elided) = child_block {
            if depth >= options.max_depth {
                return Err(reader.error(format!(
                    "nesting deeper than {} levels",
                    options.max_depth
                )));
            }
            reader.scan_all(Literal::LineSpace)?;

            let mut children: SmallVec<[NodeRef; 8]> = SmallVec::new();
            while !reader.scan_symbol('}') {
                if reader.is_done() {
                    return Err(reader.expectation_error("}"));
                }
                let child = self.read_node(reader, elided || children_elided, depth + 1, options)?;
                children.extend(child);
            }
            reader.scan(Literal::NodeTerminator)?;

            if let Some(node) = node.filter(|_| !children.is_empty()) {
                let row = self.children.push_row_from(&children);
                self.nodes[node.index()].children = SafeIndex::new(row);
            }
        }

        reader.scan_all(Literal::LineSpace)?;
        if node.is_none() {
            if slash_dash {
                log::trace!("discarding elided node");
            }
            self.tokens.rewind(mark);
        }
        Ok(node)
    }

    /// Reads an argument or a `key=value` property.
    fn read_item<S: CharSource>(&mut self, reader: &mut Reader<S>) -> Result<Item> {
        if let Some(annotation) = reader.read_annotation(&mut self.tokens)? {
            let value = self.read_required_value(reader)?;
            return Ok(Item::Argument(ValueEntry::new(value, Some(annotation))));
        }

        let mut bare = false;
        let token = if let Some(token) = reader.read_string(&mut self.tokens)? {
            token
        } else if let Some(token) = reader.read_number(&mut self.tokens) {
            token
        } else if let Some(token) = reader.read_identifier(&mut self.tokens) {
            bare = true;
            token
        } else if let Some(token) = reader.read_keyword(&mut self.tokens) {
            token
        } else {
            return Err(reader.expectation_error("value or property"));
        };

        if self.tokens.get_token_kind(token) == DataType::String && reader.scan_symbol('=') {
            let annotation = reader.read_annotation(&mut self.tokens)?;
            let value = self.read_required_value(reader)?;
            return Ok(Item::Property(token, ValueEntry::new(value, annotation)));
        }
        if bare {
            return Err(reader.error("Unexpected identifier as node argument"));
        }
        Ok(Item::Argument(ValueEntry::new(token, None)))
    }

    fn read_required_value<S: CharSource>(&mut self, reader: &mut Reader<S>) -> Result<TokenRef> {
        match reader.read_value(&mut self.tokens)? {
            Some(value) => Ok(value),
            None => Err(reader.expectation_error("value")),
        }
    }

    fn store_node(
        &mut self,
        name: TokenRef,
        annotation: Option<TokenRef>,
        arguments: Arguments,
        properties: Properties,
    ) -> NodeRef {
        let node = NodeRef::new(self.nodes.push(NodeEntry {
            name,
            annotation: annotation.unwrap_or_default(),
            ..NodeEntry::default()
        }));

        let values: SmallVec<[_; 8]> = arguments
            .into_iter()
            .map(|entry| self.push_value(entry))
            .collect();
        self.add_arguments(node, &values);

        for (key, entry) in properties {
            let value = self.push_value(entry);
            self.set_property_token(node, key, value);
        }
        node
    }
}

enum Item {
    Argument(ValueEntry),
    Property(TokenRef, ValueEntry),
}
