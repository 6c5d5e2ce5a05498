use ::serde::ser::{SerializeMap, Serializer};
use ::serde::Serialize;

use super::{Document, NodeRef, PropertyRef, ValueRef};

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeList {
            document: self,
            nodes: self.nodes(),
        }
        .serialize(serializer)
    }
}

struct NodeList<'a> {
    document: &'a Document,
    nodes: &'a [NodeRef],
}

impl Serialize for NodeList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.nodes.iter().map(|node| NodeView {
            document: self.document,
            node: *node,
        }))
    }
}

struct NodeView<'a> {
    document: &'a Document,
    node: NodeRef,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let document = self.document;
        let annotation = document.annotation(self.node);

        let mut map = serializer.serialize_map(Some(4 + usize::from(annotation.is_some())))?;
        map.serialize_entry("name", document.name(self.node))?;
        if let Some(annotation) = annotation {
            map.serialize_entry("annotation", annotation)?;
        }
        map.serialize_entry(
            "arguments",
            &ValueList {
                document,
                values: document.arguments(self.node),
            },
        )?;
        map.serialize_entry(
            "properties",
            &PropertyMap {
                document,
                properties: document.properties(self.node),
            },
        )?;
        map.serialize_entry(
            "children",
            &NodeList {
                document,
                nodes: document.children(self.node),
            },
        )?;
        map.end()
    }
}

struct ValueList<'a> {
    document: &'a Document,
    values: &'a [ValueRef],
}

impl Serialize for ValueList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values.iter().map(|value| ValueView {
            document: self.document,
            value: *value,
        }))
    }
}

struct PropertyMap<'a> {
    document: &'a Document,
    properties: &'a [PropertyRef],
}

impl Serialize for PropertyMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.properties.iter().map(|property| {
            (
                self.document.key(*property),
                ValueView {
                    document: self.document,
                    value: property.value,
                },
            )
        }))
    }
}

struct ValueView<'a> {
    document: &'a Document,
    value: ValueRef,
}

impl Serialize for ValueView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let document = self.document;
        let annotation = document.value_annotation(self.value);

        let mut map = serializer.serialize_map(Some(2 + usize::from(annotation.is_some())))?;
        map.serialize_entry("kind", &document.value_kind(self.value))?;
        map.serialize_entry("data", document.value_data(self.value))?;
        if let Some(annotation) = annotation {
            map.serialize_entry("annotation", annotation)?;
        }
        map.end()
    }
}
