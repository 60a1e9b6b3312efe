//! Annotated tag object
//!
//! ## Format
//!
//! ```text
//! object <sha>
//! type <kind of the tagged object>
//! tag <name>
//! tagger <name> <email> <timestamp> <timezone>
//!
//! <message>
//! ```
//!
//! The `tagger` line is optional.

use crate::artifacts::objects::identity::Identity;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::KitError;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Tag {
    object_oid: ObjectId,
    tag_type: ObjectType,
    name: String,
    tagger: Option<Identity>,
    message: String,
}

impl Tag {
    pub fn object_oid(&self) -> &ObjectId {
        &self.object_oid
    }

    pub fn tag_type(&self) -> ObjectType {
        self.tag_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tagger(&self) -> Option<&Identity> {
        self.tagger.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("object {}", self.object_oid),
            format!("type {}", self.tag_type),
            format!("tag {}", self.name),
        ];
        if let Some(tagger) = &self.tagger {
            lines.push(format!("tagger {}", tagger.display()));
        }
        lines
    }
}

impl Packable for Tag {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content = format!("{}\n\n{}\n", self.header_lines().join("\n"), self.message);
        Ok(Bytes::from(content))
    }
}

impl Unpackable for Tag {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let bad = |reason: &str| KitError::BadObject(format!("invalid tag object: {reason}"));

        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        let content = String::from_utf8(content).map_err(|_| bad("not UTF-8"))?;

        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| bad("missing blank line before message"))?;
        let message = message.strip_suffix('\n').unwrap_or(message).to_string();

        let mut object_oid = None;
        let mut tag_type = None;
        let mut name = None;
        let mut tagger = None;

        for line in headers.lines() {
            match line.split_once(' ') {
                Some(("object", value)) => object_oid = Some(ObjectId::try_parse(value.to_string())?),
                Some(("type", value)) => tag_type = Some(ObjectType::try_from(value)?),
                Some(("tag", value)) => name = Some(value.to_string()),
                Some(("tagger", value)) => tagger = Some(Identity::try_from(value)?),
                _ => return Err(bad(&format!("unexpected line {line:?}")).into()),
            }
        }

        Ok(Tag {
            object_oid: object_oid.ok_or_else(|| bad("missing object line"))?,
            tag_type: tag_type.ok_or_else(|| bad("missing type line"))?,
            name: name.ok_or_else(|| bad("missing tag line"))?,
            tagger,
            message,
        })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn display(&self) -> String {
        format!("{}\n\n{}", self.header_lines().join("\n"), self.message)
    }
}
