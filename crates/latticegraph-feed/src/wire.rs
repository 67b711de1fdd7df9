//! Wire payload decoding.
//!
//! The block server delivers camelCase JSON: a full array from the
//! request/response endpoint, or one block per streamed event.

use latticegraph_core::Block;

use crate::error::FeedError;

/// Decode a full `/blocks`-style JSON array payload.
pub fn decode_blocks(payload: &str) -> Result<Vec<Block>, FeedError> {
    Ok(serde_json::from_str(payload)?)
}

/// Decode a single streamed block event payload.
pub fn decode_block(payload: &str) -> Result<Block, FeedError> {
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use latticegraph_core::Action;

    #[test]
    fn decodes_array_payload() {
        let payload = r#"[
            {"hash": "G", "account": "xtb:a", "action": "issue", "balance": 100.0},
            {"hash": "S1", "account": "xtb:a", "action": "send",
             "previous": "G", "link": "xtb:b", "balance": 60.0}
        ]"#;
        let blocks = decode_blocks(payload).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].action, Action::Send);
        assert_eq!(blocks[1].link, "xtb:b");
    }

    #[test]
    fn decodes_single_event_payload() {
        let payload = r#"{"hash": "O1", "account": "xtb:b", "action": "open",
                          "link": "S1", "balance": 40.0}"#;
        let block = decode_block(payload).unwrap();
        assert_eq!(block.action, Action::Open);
    }

    #[test]
    fn bad_payload_is_a_decode_error() {
        assert!(matches!(
            decode_block("{not json"),
            Err(FeedError::Decode(_))
        ));
        // Unknown action names are rejected at the seam as well.
        assert!(decode_block(r#"{"hash": "X", "account": "a", "action": "warp"}"#).is_err());
    }
}
