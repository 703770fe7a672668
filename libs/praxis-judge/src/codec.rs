// Transport codec for payload fields exchanged with the execution backend.
// The backend expects base64 in both directions and may wrap long payloads
// in newlines on the way back.

use base64::{engine::general_purpose, Engine as _};

/// Encode text for wire transport.
pub fn encode(text: &str) -> String {
    general_purpose::STANDARD.encode(text)
}

/// Decode a wire payload field. An absent field stays absent.
///
/// Whitespace inside the payload is ignored before decoding. Malformed
/// payloads decode to `None` rather than failing the run.
pub fn decode(wire: Option<&str>) -> Option<String> {
    let wire = wire?;
    let compact: String = wire.chars().filter(|c| !c.is_whitespace()).collect();
    match general_purpose::STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::debug!(error = %e, "payload field is not valid base64");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_plain_text() {
        assert_eq!(decode(Some(&encode("hello"))), Some("hello".to_string()));
    }

    #[test]
    fn round_trip_empty_string() {
        assert_eq!(encode(""), "");
        assert_eq!(decode(Some("")), Some(String::new()));
    }

    #[test]
    fn round_trip_multiline_with_control_characters() {
        let text = "line1\nline2\r\n\tindented\n";
        assert_eq!(decode(Some(&encode(text))), Some(text.to_string()));
    }

    #[test]
    fn round_trip_unicode() {
        let text = "löve 日本語 ± emoji 🚀";
        assert_eq!(decode(Some(&encode(text))), Some(text.to_string()));
    }

    #[test]
    fn decode_none_is_none() {
        assert_eq!(decode(None), None);
    }

    #[test]
    fn decode_tolerates_newline_wrapped_payloads() {
        let text = "a long payload that the backend will wrap when encoding";
        let mut wire = encode(text);
        wire.insert(8, '\n');
        wire.push('\n');
        assert_eq!(decode(Some(&wire)), Some(text.to_string()));
    }

    #[test]
    fn decode_of_garbage_is_none() {
        assert_eq!(decode(Some("not base64!!!")), None);
    }
}
