//! Binary persistence of a whole store table.
//!
//! The table is written as a single BSON document:
//!
//! ```text
//! { "version": 1, "documents": [ ["<id>", <node>], ... ] }
//! ```
//!
//! BSON element types tag every node, so nested arrays and objects decode without any
//! external schema. Ids and object keys are stored as BSON strings inside `[key, node]`
//! pairs rather than as element names, because element names are NUL-terminated and
//! cannot hold U+0000. An object node is `{ "entries": [ [key, node], ... ] }`; every
//! other value maps onto the matching BSON element type.
//!
//! Writes go to a uniquely named temporary file in the destination directory that is
//! fsynced and then renamed over the destination, so a reader never observes a
//! half-written file and concurrent saves never share a temporary file.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{self, BufReader, Write},
    path::Path,
};

use bson::{Bson, Document as BsonDocument};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{
    document::DocumentId,
    error::{DocumentStoreError, DocumentStoreResult},
    value::{Map, Value},
};

/// In-memory table of every stored document, keyed by id.
pub type StoreMap = HashMap<DocumentId, Value>;

/// Format version written into every file.
pub const FORMAT_VERSION: i32 = 1;

const VERSION_KEY: &str = "version";
const DOCUMENTS_KEY: &str = "documents";
const ENTRIES_KEY: &str = "entries";

/// Encodes a table into its BSON byte representation.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if the BSON writer fails.
pub fn encode(store: &StoreMap) -> DocumentStoreResult<Vec<u8>> {
    let mut root = BsonDocument::new();
    root.insert(VERSION_KEY, FORMAT_VERSION);
    root.insert(DOCUMENTS_KEY, encode_entries(store.iter()));

    let mut bytes = Vec::new();
    root.to_writer(&mut bytes)?;

    Ok(bytes)
}

/// Decodes a table from bytes produced by [`encode`].
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] for malformed input, an unknown format
/// version, or element types outside the value model.
pub fn decode(bytes: &[u8]) -> DocumentStoreResult<StoreMap> {
    decode_document(BsonDocument::from_reader(bytes)?)
}

fn encode_entries<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>) -> Bson {
    Bson::Array(
        entries
            .map(|(key, value)| Bson::Array(vec![Bson::String(key.clone()), encode_node(value)]))
            .collect(),
    )
}

fn encode_node(value: &Value) -> Bson {
    match value {
        Value::Array(values) => Bson::Array(values.iter().map(encode_node).collect()),
        Value::Object(map) => {
            let mut node = BsonDocument::new();
            node.insert(ENTRIES_KEY, encode_entries(map.iter()));
            Bson::Document(node)
        }
        scalar => Bson::from(scalar.clone()),
    }
}

fn decode_entries<T>(bson: Bson) -> DocumentStoreResult<T>
where
    T: FromIterator<(String, Value)>,
{
    let Bson::Array(entries) = bson else {
        return Err(malformed("entry list is not an array"));
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            Bson::Array(pair) => match <[Bson; 2]>::try_from(pair) {
                Ok([Bson::String(key), node]) => Ok((key, decode_node(node)?)),
                _ => Err(malformed("entry is not a [string, value] pair")),
            },
            _ => Err(malformed("entry is not an array")),
        })
        .collect()
}

fn decode_node(bson: Bson) -> DocumentStoreResult<Value> {
    match bson {
        Bson::Array(values) => Ok(Value::Array(
            values
                .into_iter()
                .map(decode_node)
                .collect::<DocumentStoreResult<Vec<_>>>()?,
        )),
        Bson::Document(mut node) => match node.remove(ENTRIES_KEY) {
            Some(entries) if node.is_empty() => Ok(Value::Object(decode_entries::<Map>(entries)?)),
            _ => Err(malformed("object node must only hold an entry list")),
        },
        scalar => Value::try_from(scalar),
    }
}

fn malformed(reason: &str) -> DocumentStoreError {
    DocumentStoreError::Serialization(format!("malformed store file: {reason}"))
}

fn decode_document(mut root: BsonDocument) -> DocumentStoreResult<StoreMap> {
    match root.get(VERSION_KEY) {
        Some(Bson::Int32(FORMAT_VERSION)) => {}
        Some(other) => {
            return Err(DocumentStoreError::Serialization(format!(
                "unsupported store format version {other}"
            )));
        }
        None => {
            return Err(DocumentStoreError::Serialization(
                "store file has no format version".to_string(),
            ));
        }
    }

    match root.remove(DOCUMENTS_KEY) {
        Some(documents) => decode_entries(documents),
        None => Err(DocumentStoreError::Serialization(
            "store file has no document table".to_string(),
        )),
    }
}

/// Writes `store` to `path` atomically.
///
/// The bytes are written to a fresh temporary file next to `path`, synced, then renamed
/// into place. On failure the temporary file is removed and the previous contents of
/// `path` are left untouched.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Io`] for filesystem failures and
/// [`DocumentStoreError::Serialization`] if the table cannot be encoded.
pub fn save(path: &Path, store: &StoreMap) -> DocumentStoreResult<()> {
    let bytes = encode(store)?;

    let dir = match path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => dir,
        None => Path::new("."),
    };

    if let Err(err) = write_atomic(dir, path, &bytes) {
        warn!(path = %path.display(), error = %err, "Store save failed");
        return Err(err.into());
    }

    debug!(path = %path.display(), documents = store.len(), bytes = bytes.len(), "Saved store");

    Ok(())
}

/// Reads the table stored at `path`.
///
/// # Errors
///
/// Returns [`DocumentStoreError::StoreFileNotFound`] when `path` does not exist, so callers
/// can start from an empty table; other failures are [`DocumentStoreError::Io`] or
/// [`DocumentStoreError::Serialization`].
pub fn load(path: &Path) -> DocumentStoreResult<StoreMap> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(DocumentStoreError::StoreFileNotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };

    let store = decode_document(BsonDocument::from_reader(BufReader::new(file))?)?;
    debug!(path = %path.display(), documents = store.len(), "Loaded store");

    Ok(store)
}

/// The temporary file is deleted when dropped, so every early return cleans up after itself.
fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path)?;

    Ok(())
}
