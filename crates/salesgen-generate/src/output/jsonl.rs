use salesgen_core::SalesEvent;

use crate::errors::GenerationError;

/// Render events as JSON Lines: one object per line, `\n` after every line.
///
/// An empty slice renders as a single `\n`.
pub fn encode_jsonl(events: &[SalesEvent]) -> Result<Vec<u8>, GenerationError> {
    let mut payload = Vec::with_capacity(events.len().saturating_mul(448).max(1));
    for (idx, event) in events.iter().enumerate() {
        if idx > 0 {
            payload.push(b'\n');
        }
        serde_json::to_writer(&mut payload, event)?;
    }
    payload.push(b'\n');
    Ok(payload)
}

/// Parse a JSON Lines payload back into events. Blank lines are skipped.
pub fn decode_jsonl(payload: &[u8]) -> Result<Vec<SalesEvent>, GenerationError> {
    payload
        .split(|byte| *byte == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .map(|line| serde_json::from_slice(line).map_err(GenerationError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_is_single_newline() {
        assert_eq!(encode_jsonl(&[]).unwrap(), b"\n".to_vec());
        assert!(decode_jsonl(b"\n").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage_lines() {
        let err = decode_jsonl(b"{\"event_id\":1}\n").unwrap_err();
        assert!(matches!(err, GenerationError::Json(_)));
    }
}
