//! Stored object encoding
//!
//! An object is stored as the zlib-compressed concatenation of its header and body:
//! `<type> SP <decimal body length> NUL <body>`.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{GitObject, Object, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use crate::errors::KitError;
use anyhow::Context;
use bytes::Bytes;
use std::io::{Read, Write};

pub fn compress(data: &[u8]) -> anyhow::Result<Bytes> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(data)
        .context("Unable to compress object content")?;

    encoder
        .finish()
        .map(Bytes::from)
        .context("Unable to finish compressing object content")
}

pub fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| KitError::BadObject(format!("unable to inflate object: {e}")))?;

    Ok(decompressed.into())
}

/// Compressed `header || body` of an object
pub fn encode(object: &impl Object) -> anyhow::Result<Bytes> {
    compress(&object.raw()?)
}

/// Inflate and parse a stored object
pub fn decode(data: &[u8]) -> anyhow::Result<GitObject> {
    parse(&decompress(data)?)
}

/// Parse an uncompressed `header || body`
pub fn parse(raw: &[u8]) -> anyhow::Result<GitObject> {
    let nul = raw
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| KitError::BadObject("object header is not NUL terminated".into()))?;
    let (header, body) = (&raw[..nul], &raw[nul + 1..]);

    let header = std::str::from_utf8(header)
        .map_err(|_| KitError::BadObject("object header is not ASCII".into()))?;
    let (kind, size) = header
        .split_once(' ')
        .ok_or_else(|| KitError::BadObject(format!("malformed object header {header:?}")))?;

    let object_type = ObjectType::try_from(kind)?;
    let size = size
        .parse::<usize>()
        .map_err(|_| KitError::BadObject(format!("invalid object size {size:?}")))?;
    if size != body.len() {
        return Err(KitError::BadObject(format!(
            "object size {size} does not match body length {}",
            body.len()
        ))
        .into());
    }

    Ok(match object_type {
        ObjectType::Blob => Blob::deserialize(body)?.into(),
        ObjectType::Tree => Tree::deserialize(body)?.into(),
        ObjectType::Commit => Commit::deserialize(body)?.into(),
        ObjectType::Tag => Tag::deserialize(body)?.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::entry_mode::EntryMode;
    use crate::artifacts::objects::identity::Identity;
    use crate::artifacts::objects::object_id::ObjectId;
    use crate::artifacts::objects::tree::TreeEntry;
    use chrono::{DateTime, FixedOffset};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn is_bad_object(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<KitError>(), Some(KitError::BadObject(_)))
    }

    #[test]
    fn encoded_blob_decodes_to_same_hash() {
        let blob = Blob::new(b"hello world".to_vec());
        let decoded = decode(&encode(&blob).unwrap()).unwrap();

        assert_eq!(decoded, GitObject::Blob(blob.clone()));
        assert_eq!(decoded.object_id().unwrap(), blob.object_id().unwrap());
    }

    #[test]
    fn encoded_tag_decodes_to_same_hash() {
        let tag = Tag::new(
            ObjectId::try_parse("369fb3f5db3baf1b96032979af0cae946d4fd134".to_string()).unwrap(),
            ObjectType::Commit,
            "test".to_string(),
            Some(Identity::try_from("Simon Taye <mulat.simon@gmail.com> 1625088346 +0000").unwrap()),
            "Test tag".to_string(),
        );

        let decoded = decode(&encode(&tag).unwrap()).unwrap();
        assert_eq!(decoded.object_type(), ObjectType::Tag);
        assert_eq!(
            decoded.object_id().unwrap().as_ref(),
            "83bf8e887fe355870191c95a4ed1dc106db81d29"
        );
    }

    #[rstest]
    #[case(b"blob 11hello world".as_slice())]
    #[case(b"blob -1\0x".as_slice())]
    #[case(b"blob eleven\0hello world".as_slice())]
    #[case(b"blob 12\0hello world".as_slice())]
    #[case(b"note 11\0hello world".as_slice())]
    #[case(b"blob\0".as_slice())]
    fn malformed_headers_are_bad_objects(#[case] raw: &[u8]) {
        let err = parse(raw).unwrap_err();

        assert!(is_bad_object(&err), "{err:?}");
    }

    #[test]
    fn garbage_is_not_inflated() {
        let err = decode(b"definitely not zlib").unwrap_err();

        assert!(is_bad_object(&err));
    }

    proptest! {
        #[test]
        fn any_blob_survives_encoding(content in proptest::collection::vec(any::<u8>(), 0..512)) {
            let blob = Blob::new(content);
            let decoded = decode(&encode(&blob).unwrap()).unwrap();

            prop_assert_eq!(decoded.object_id().unwrap(), blob.object_id().unwrap());
        }

        #[test]
        fn any_tree_survives_encoding(entries in proptest::collection::vec(tree_entry(), 0..12)) {
            let tree = Tree::new(entries);
            let decoded = decode(&encode(&tree).unwrap()).unwrap();

            prop_assert_eq!(decoded.object_id().unwrap(), tree.object_id().unwrap());
            prop_assert_eq!(decoded, GitObject::Tree(tree));
        }

        #[test]
        fn any_commit_survives_encoding(
            tree_oid in object_id(),
            parent in proptest::option::of(object_id()),
            author in identity(),
            committer in identity(),
            message in "[ -~\n]{0,80}",
        ) {
            let commit = Commit::new(tree_oid, parent, author, committer, message);
            let decoded = decode(&encode(&commit).unwrap()).unwrap();

            prop_assert_eq!(decoded.object_id().unwrap(), commit.object_id().unwrap());
            prop_assert_eq!(decoded, GitObject::Commit(commit));
        }

        #[test]
        fn any_tag_survives_encoding(
            target in object_id(),
            target_type in prop_oneof![
                Just(ObjectType::Blob),
                Just(ObjectType::Tree),
                Just(ObjectType::Commit),
                Just(ObjectType::Tag),
            ],
            name in "[A-Za-z0-9._/-]{1,24}",
            tagger in proptest::option::of(identity()),
            message in "[ -~\n]{0,80}",
        ) {
            let tag = Tag::new(target, target_type, name, tagger, message);
            let decoded = decode(&encode(&tag).unwrap()).unwrap();

            prop_assert_eq!(decoded.object_id().unwrap(), tag.object_id().unwrap());
            prop_assert_eq!(decoded, GitObject::Tag(tag));
        }
    }

    fn object_id() -> impl Strategy<Value = ObjectId> {
        any::<[u8; 20]>().prop_map(|raw| ObjectId::from_raw(&raw))
    }

    fn tree_entry() -> impl Strategy<Value = TreeEntry> {
        (
            prop_oneof![
                Just(EntryMode::Normal),
                Just(EntryMode::Executable),
                Just(EntryMode::Symlink),
                Just(EntryMode::Directory),
            ],
            "[A-Za-z0-9._-]{1,16}",
            object_id(),
        )
            .prop_map(|(mode, name, oid)| TreeEntry::new(mode, name, oid))
    }

    fn identity() -> impl Strategy<Value = Identity> {
        (
            "[A-Za-z]([A-Za-z .]{0,14}[A-Za-z])?",
            "[a-z0-9.]{1,10}@[a-z]{1,8}\\.[a-z]{2,3}",
            0i64..4_000_000_000,
            -720i32..=840,
        )
            .prop_map(|(name, email, seconds, offset_minutes)| {
                let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
                let timestamp = DateTime::from_timestamp(seconds, 0).unwrap().with_timezone(&offset);
                Identity::new(name, email, timestamp)
            })
    }
}
