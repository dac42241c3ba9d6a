//! Canonical byte encoding of proof records.
//!
//! The encoding is the UTF-8 text `url|timestamp|status|hash`. Field values are
//! not escaped: a value containing [`SEPARATOR`] makes the encoding ambiguous,
//! since `{url: "a|b", timestamp: "c"}` and `{url: "a", timestamp: "b|c"}` encode
//! identically. Existing signatures were produced over this exact encoding, so
//! collisions are reported through [`separator_collisions`] instead of being
//! escaped away.

use crate::record::{Field, ProofRecord};

/// Field separator.
pub const SEPARATOR: char = '|';

/// Serialize a record into the bytes that are signed and hashed.
pub fn canonicalize(record: &ProofRecord) -> Vec<u8> {
    let values = record.values();
    let len = values.iter().map(|v| v.len()).sum::<usize>() + values.len() - 1;
    let mut out = String::with_capacity(len);
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(value);
    }
    out.into_bytes()
}

/// Fields whose value contains the separator, in canonical order.
pub fn separator_collisions(record: &ProofRecord) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|field| record.get(*field).contains(SEPARATOR))
        .collect()
}
