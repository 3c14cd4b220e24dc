//! Client hints: opaque tokens that let a caller skip re-anchoring.
//!
//! A token carries a resolved [`Anchor`] and the checksum of the graph it was
//! resolved against. It is only trusted when the query's checksum matches the
//! current graph and the anchor is valid for the current graph size; anything
//! else falls back to a fresh lookup.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::{OracleError, Result, Stage, TripError};
use crate::traits::{Anchor, Anchoring, Location};

#[derive(Debug, Serialize, Deserialize)]
struct HintPayload {
    checksum: u32,
    anchor: Anchor,
}

/// Encodes `anchor` as a URL-safe hint token bound to `checksum`.
pub fn encode_hint(anchor: &Anchor, checksum: u32) -> String {
    let payload = HintPayload {
        checksum,
        anchor: anchor.clone(),
    };
    // Serializing plain data into a Vec cannot fail.
    let bytes = serde_json::to_vec(&payload).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes a hint token into its checksum and anchor.
pub fn decode_hint(token: &str) -> std::result::Result<(u32, Anchor), String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|err| format!("hint is not valid base64: {}", err))?;
    let payload: HintPayload =
        serde_json::from_slice(&bytes).map_err(|err| format!("hint payload is malformed: {}", err))?;
    Ok((payload.checksum, payload.anchor))
}

/// Anchors every coordinate, reusing client hints where they are still valid.
///
/// `hints` may be shorter than `coordinates`; missing or empty entries are
/// looked up fresh.
pub fn resolve_locations<A>(
    anchoring: &A,
    coordinates: &[(f64, f64)],
    hints: &[Option<String>],
    checksum: Option<u32>,
) -> Result<Vec<Location>>
where
    A: Anchoring + ?Sized,
{
    let graph = anchoring.graph_version();
    let hints_usable = checksum == Some(graph.checksum);

    coordinates
        .iter()
        .enumerate()
        .map(|(index, &coordinate)| {
            let hint = hints
                .get(index)
                .and_then(|hint| hint.as_deref())
                .filter(|hint| hints_usable && !hint.is_empty());

            if let Some(token) = hint {
                let (token_checksum, anchor) = decode_hint(token)
                    .map_err(|reason| TripError::invalid_input(Some(index), reason))?;
                if token_checksum == graph.checksum && anchor.is_valid(graph.node_count) {
                    return Ok(Location { coordinate, anchor });
                }
                tracing::warn!(index, "stale client hint, re-anchoring");
            }

            let anchor = anchoring
                .anchor(coordinate)
                .map_err(|err| anchoring_error(index, err))?;
            Ok(Location { coordinate, anchor })
        })
        .collect()
}

fn anchoring_error(index: usize, err: OracleError) -> TripError {
    let err = match err {
        OracleError::InvalidAnchor { reason, .. } => OracleError::InvalidAnchor { index, reason },
        other => other,
    };
    TripError::oracle(Stage::Anchoring, err)
}
