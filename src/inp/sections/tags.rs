//! Free-form category labels attached to objects

use crate::inp::error::SchemaError;
use crate::inp::lexing::Tokens;
use crate::inp::record::Cursor;
use crate::inp::schema::RecordType;

crate::keyword_enum! {
    /// Object category a tag applies to.
    pub enum TagKind {
        Gage => "Gage",
        Subcatch => "Subcatch",
        Node => "Node",
        Link => "Link",
    }
}

/// A tag is keyed by object category and name together, so a node and a
/// link sharing one name can carry different tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub kind: TagKind,
    pub name: String,
    pub tag: String,
}

crate::impl_record! {
    Tag {
        kind: "Tag",
        identifier: ["Kind", "Name"],
        fields: { "Kind" => kind, "Name" => name, "Tag" => tag },
    }
}

impl RecordType for Tag {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let tag = Tag {
            kind: cursor.required("Kind")?,
            name: cursor.required("Name")?,
            tag: cursor.required("Tag")?,
        };
        cursor.finish()?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inp::record::{Key, Record};

    fn line(text: &str) -> Tokens {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_tag_composite_key() {
        let tag = Tag::parse(&[line("NODE J1 Manhole")]).unwrap();
        assert_eq!(tag.kind, TagKind::Node);
        assert_eq!(tag.key(), Key::from(["Node", "J1"]));
        assert_eq!(tag.to_tokens(), vec![line("Node J1 Manhole")]);
    }

    #[test]
    fn test_tag_unknown_kind() {
        assert_eq!(
            Tag::parse(&[line("Pump P1 Big")]),
            Err(SchemaError::invalid("Kind", "Pump"))
        );
    }
}
