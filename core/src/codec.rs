//! Decoding and authentication of uploaded save text.
//!
//! Web exports are obfuscated: base64 JSON with noise characters sprinkled
//! between every payload character, a fixed marker, then a salted MD5 of
//! the clean base64 rendered as lowercase hex. Mobile exports skip all of
//! that and ship the JSON raw behind their own marker. Both roads end at
//! the same plain JSON text.

use crate::error::SaveError;
use crate::save::SaveState;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use md5::{Digest, Md5};
use std::fmt::Write as _;

/// Separates the sprinkled payload from its checksum in web exports.
pub const ANTI_TAMPER_MARKER: &str = "Fe12NAfA3R6z4k0z";

/// Appended to the reconstructed base64 before hashing.
pub const CHECKSUM_SALT: &str = "af0ik392jrmt0nsfdghy0";

/// Present in mobile exports, which carry their JSON unencoded.
pub const RAW_FORMAT_MARKER: &str = "ClickerHeroesAccountSO";

/// Lowercase hex characters in an MD5 digest.
pub const CHECKSUM_LEN: usize = 32;

/// Decode an uploaded save into plain JSON text.
///
/// Rejections are data: every arm is reachable from a hostile upload and
/// none of them panic.
pub fn decode(encoded: &str) -> Result<String, SaveError> {
    if encoded.contains(RAW_FORMAT_MARKER) {
        return decode_raw(encoded);
    }

    let marker_at = encoded
        .find(ANTI_TAMPER_MARKER)
        .ok_or(SaveError::MarkerMissing)?;
    let sprinkled = &encoded[..marker_at];
    let trailer = &encoded[marker_at + ANTI_TAMPER_MARKER.len()..];

    let stored: String = trailer.chars().take(CHECKSUM_LEN).collect();
    let stored_len = stored.chars().count();
    if stored_len < CHECKSUM_LEN {
        return Err(SaveError::TruncatedChecksum { found: stored_len });
    }

    let payload = unsprinkle(sprinkled);
    let computed = salted_md5(&payload);
    if computed != stored {
        return Err(SaveError::ChecksumMismatch {
            stored,
            computed,
        });
    }

    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| SaveError::MalformedPayload {
            reason: format!("base64: {e}"),
        })?;
    let text = String::from_utf8(bytes).map_err(|e| SaveError::MalformedPayload {
        reason: format!("utf-8: {e}"),
    })?;
    debug!(
        "decoded web save: {} sprinkled chars -> {} chars of JSON",
        sprinkled.len(),
        text.len()
    );
    Ok(text)
}

/// Decode and deserialize in one step.
pub fn parse_save(encoded: &str) -> Result<SaveState, SaveError> {
    let text = decode(encoded)?;
    SaveState::deserialize(&text).ok_or(SaveError::UnreadableDocument)
}

/// Mobile variant: everything from the first `{` onward is the document.
fn decode_raw(encoded: &str) -> Result<String, SaveError> {
    let start = encoded.find('{').ok_or(SaveError::NoObjectStart)?;
    debug!("decoded raw-format save: {} chars of JSON", encoded.len() - start);
    Ok(encoded[start..].to_string())
}

/// Characters at even indices are payload, odd indices are noise. An
/// odd-length segment keeps its final payload character.
fn unsprinkle(sprinkled: &str) -> String {
    sprinkled.chars().step_by(2).collect()
}

fn salted_md5(payload: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(payload.as_bytes());
    hasher.update(CHECKSUM_SALT.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(CHECKSUM_LEN);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
