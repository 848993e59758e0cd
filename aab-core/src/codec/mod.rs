//! Versioned payload codec for address books
//!
//! ```text
//! [b"AABT"][version u16 LE][body_len u32 LE][body]
//! ```
//!
//! The body is compact JSON of a flat document (see `wire`). Encoding is
//! deterministic: groups are emitted in pre-order and computers in group
//! pre-order, never in arena map order.

mod wire;

use thiserror::Error;
use zeroize::Zeroizing;

use crate::models::BookProperties;
use crate::store::Tree;
use crate::trace_operation_debug;
use crate::tracing::span_names;

use wire::{WireBook, WireComputer, WireGroup, WireProperties};

/// Payload magic
pub const PAYLOAD_MAGIC: &[u8; 4] = b"AABT";
/// Current payload version
pub const PAYLOAD_VERSION: u16 = 1;

const PREFIX_LEN: usize = 10;

/// Codec failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The payload does not start with a known identifier
    #[error("unknown payload format")]
    UnknownFormat,

    /// The payload version is not supported by this build
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u16),

    /// The payload is truncated or structurally invalid
    #[error("corrupted payload: {0}")]
    Corrupted(String),

    /// The tree could not be serialized
    #[error("failed to serialize payload: {0}")]
    Serialize(String),
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Encodes book properties and tree into a payload
///
/// The returned buffer holds passwords in plain text and is wiped on drop.
///
/// # Errors
///
/// Returns `Serialize` if JSON serialization fails or the body exceeds
/// `u32::MAX` bytes.
pub fn encode(properties: &BookProperties, tree: &Tree) -> CodecResult<Zeroizing<Vec<u8>>> {
    let _span = trace_operation_debug!(
        span_names::CODEC_ENCODE,
        groups = tree.group_count(),
        computers = tree.computer_count()
    )
    .entered();

    let group_order = tree.group_ids_preorder();
    let groups = group_order
        .iter()
        .filter_map(|id| tree.group(*id))
        .map(WireGroup::from)
        .collect();
    let computers = group_order
        .iter()
        .filter_map(|id| tree.group(*id))
        .flat_map(|group| group.computer_ids())
        .filter_map(|id| tree.computer(*id))
        .map(WireComputer::from)
        .collect();

    let document = WireBook {
        properties: WireProperties::from(properties),
        groups,
        computers,
    };

    let body = Zeroizing::new(
        serde_json::to_vec(&document).map_err(|e| CodecError::Serialize(e.to_string()))?,
    );
    let body_len = u32::try_from(body.len())
        .map_err(|_| CodecError::Serialize(format!("body of {} bytes is too large", body.len())))?;

    let mut out = Zeroizing::new(Vec::with_capacity(PREFIX_LEN + body.len()));
    out.extend_from_slice(PAYLOAD_MAGIC);
    out.extend_from_slice(&PAYLOAD_VERSION.to_le_bytes());
    out.extend_from_slice(&body_len.to_le_bytes());
    out.extend_from_slice(&body);

    tracing::debug!(size = out.len(), "Encoded address book payload");
    Ok(out)
}

/// Decodes a payload produced by [`encode`]
///
/// Builds a fresh tree; nothing is shared with any existing book.
///
/// # Errors
///
/// - `UnknownFormat` if the identifier does not match
/// - `UnsupportedVersion` for a version other than [`PAYLOAD_VERSION`]
/// - `Corrupted` for truncation, length mismatch, malformed JSON, missing
///   fields, bad parent references, duplicate ids, root problems or empty
///   names
pub fn decode(bytes: &[u8]) -> CodecResult<(BookProperties, Tree)> {
    let _span = trace_operation_debug!(span_names::CODEC_DECODE, size = bytes.len()).entered();

    if bytes.len() < PAYLOAD_MAGIC.len() || &bytes[..PAYLOAD_MAGIC.len()] != PAYLOAD_MAGIC {
        return Err(CodecError::UnknownFormat);
    }
    if bytes.len() < PREFIX_LEN {
        return Err(CodecError::Corrupted("payload header is truncated".to_string()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != PAYLOAD_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let body_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let body = &bytes[PREFIX_LEN..];
    if body.len() != body_len {
        return Err(CodecError::Corrupted(format!(
            "body length is {} bytes, header says {body_len}",
            body.len()
        )));
    }

    let document: WireBook =
        serde_json::from_slice(body).map_err(|e| CodecError::Corrupted(e.to_string()))?;

    build(document)
}

fn build(document: WireBook) -> CodecResult<(BookProperties, Tree)> {
    let WireBook {
        properties,
        groups,
        computers,
    } = document;

    let mut groups = groups.into_iter();
    let root = groups
        .next()
        .ok_or_else(|| CodecError::Corrupted("no root group".to_string()))?;
    if root.parent.is_some() {
        return Err(CodecError::Corrupted(
            "first group is not the root".to_string(),
        ));
    }
    if root.name.is_empty() {
        return Err(CodecError::Corrupted("root group has an empty name".to_string()));
    }

    let mut tree = Tree::from_root(root.into_group());
    for group in groups {
        if group.name.is_empty() {
            return Err(CodecError::Corrupted(format!("group {} has an empty name", group.id)));
        }
        tree.attach_decoded_group(group.into_group())
            .map_err(CodecError::Corrupted)?;
    }

    for computer in computers {
        if computer.name.is_empty() {
            return Err(CodecError::Corrupted(format!(
                "computer {} has an empty name",
                computer.id
            )));
        }
        tree.attach_decoded_computer(computer.into_computer())
            .map_err(CodecError::Corrupted)?;
    }

    if properties.name.is_empty() {
        return Err(CodecError::Corrupted("book has an empty name".to_string()));
    }

    Ok((properties.into_properties(), tree))
}
