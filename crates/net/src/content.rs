//! Decoding of contents API payloads

use base64::Engine;
use serde::Deserialize;
use tawata_errors::NetworkError;

/// The fields of a contents API response that matter here
#[derive(Debug, Deserialize)]
struct ContentsBody {
    content: Option<String>,
    encoding: Option<String>,
}

/// Decode a contents API response body into file text.
///
/// Bodies carrying both `content` and `encoding` are decoded; anything else
/// is returned unchanged so raw file responses still work.
///
/// # Errors
///
/// Returns an error for an unknown encoding, a malformed base64 payload, a
/// truncated (`none`) payload or text that is not UTF-8.
pub fn decode_body(body: &str) -> Result<String, NetworkError> {
    match serde_json::from_str::<ContentsBody>(body) {
        Ok(ContentsBody {
            content: Some(content),
            encoding: Some(encoding),
        }) => decode_content(&content, &encoding),
        _ => Ok(body.to_string()),
    }
}

/// Decode one `content` value according to its `encoding` tag.
///
/// # Errors
///
/// See [`decode_body`].
pub fn decode_content(content: &str, encoding: &str) -> Result<String, NetworkError> {
    match encoding.to_ascii_lowercase().as_str() {
        "base64" => {
            // The API wraps base64 payloads at 60 columns
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| NetworkError::DecodeFailed {
                    message: e.to_string(),
                })?;
            String::from_utf8(bytes).map_err(|e| NetworkError::DecodeFailed {
                message: e.to_string(),
            })
        }
        "utf-8" | "utf8" => Ok(content.to_string()),
        "none" => Err(NetworkError::DecodeFailed {
            message: "file too large for the contents API".to_string(),
        }),
        other => Err(NetworkError::UnsupportedEncoding {
            encoding: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64() {
        // base64("hello")
        assert_eq!(decode_content("aGVsbG8=", "base64").unwrap(), "hello");
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let body = r#"{"content": "eyJuYW1lIjog\nIndpZGdldCJ9\n", "encoding": "base64"}"#;
        assert_eq!(decode_body(body).unwrap(), r#"{"name": "widget"}"#);
    }

    #[test]
    fn test_passthrough_without_encoding() {
        let raw = r#"{"name": "widget", "files": ["lib"]}"#;
        assert_eq!(decode_body(raw).unwrap(), raw);
        assert_eq!(decode_body("node_modules\n").unwrap(), "node_modules\n");
    }

    #[test]
    fn test_unsupported_encoding() {
        assert!(matches!(
            decode_content("abc", "rot13"),
            Err(NetworkError::UnsupportedEncoding { .. })
        ));
        assert!(matches!(
            decode_content("", "none"),
            Err(NetworkError::DecodeFailed { .. })
        ));
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            decode_content("!!!not base64", "base64"),
            Err(NetworkError::DecodeFailed { .. })
        ));
    }
}
