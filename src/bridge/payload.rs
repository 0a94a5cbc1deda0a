//! Translation between broker payloads and chat lines.

use super::BridgeSettings;
use bytes::Bytes;
use serde_json::Value;
use serde_json_path::JsonPath;
use thiserror::Error;

/// Origin used when a payload cannot be attributed.
pub const BRIDGE_NICK: &str = "redis";
/// Username of every bridge-originated prefix.
pub const BRIDGE_USER: &str = "auto";
/// Host of every bridge-originated prefix. Lines from this host are never
/// published back to the broker.
pub const BRIDGE_HOST: &str = "redis";

/// An inbound payload, ready to be relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relayed {
    pub origin: String,
    pub text: String,
}

impl Relayed {
    /// The text split into chat lines, empty lines dropped.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split(['\n', '\r'])
            .filter(|line| !line.is_empty())
    }
}

#[derive(Debug, Error)]
enum ExtractError {
    #[error("bad path {path:?}: {reason}")]
    Path { path: String, reason: String },
    #[error("path {0:?} matched nothing")]
    NoMatch(String),
    #[error("path {0:?} did not select a non-empty string")]
    NotAString(String),
}

/// Evaluate a JSONPath. One match yields that value, several yield an
/// array of them, none is an error.
fn extract(expr: &str, value: &Value) -> Result<Value, ExtractError> {
    let path = JsonPath::parse(expr).map_err(|e| ExtractError::Path {
        path: expr.to_string(),
        reason: e.to_string(),
    })?;
    let mut nodes = path.query(value).all();
    match nodes.len() {
        0 => Err(ExtractError::NoMatch(expr.to_string())),
        1 => Ok(nodes.remove(0).clone()),
        _ => Ok(Value::Array(nodes.into_iter().cloned().collect())),
    }
}

/// Strings verbatim, everything else as compact JSON.
fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn diagnostic(raw: &str, err: impl std::fmt::Display) -> String {
    format!("{raw:?} [{err}]")
}

/// Turn a payload received on `topic` into a chat line.
///
/// Plain mode relays the payload as text, attributed to the topic. JSON
/// mode decodes it first; any decode or extraction failure is reported in
/// the text itself, quoting the raw payload. NUL characters are removed
/// from both origin and text.
pub fn inbound(topic: &str, payload: &[u8], settings: &BridgeSettings) -> Relayed {
    let mut relayed = decode(topic, payload, settings);
    relayed.origin.retain(|c| c != '\0');
    relayed.text.retain(|c| c != '\0');
    if relayed.origin.is_empty() {
        relayed.origin = BRIDGE_NICK.to_string();
    }
    relayed
}

fn decode(topic: &str, payload: &[u8], settings: &BridgeSettings) -> Relayed {
    let raw = String::from_utf8_lossy(payload);
    let mut relayed = Relayed {
        origin: topic.to_string(),
        text: raw.to_string(),
    };
    if !settings.json {
        return relayed;
    }

    let value: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(e) => {
            relayed.text = diagnostic(&raw, e);
            return relayed;
        }
    };

    relayed.text = match &settings.text_path {
        Some(path) => match extract(path, &value) {
            Ok(selected) => display_text(&selected),
            Err(e) => diagnostic(&raw, e),
        },
        None => display_text(&value),
    };

    if let Some(path) = &settings.nick_path {
        let nick = extract(path, &value).and_then(|selected| match selected {
            Value::String(s) => s
                .split_whitespace()
                .next()
                .map(str::to_string)
                .ok_or_else(|| ExtractError::NotAString(path.clone())),
            _ => Err(ExtractError::NotAString(path.clone())),
        });
        match nick {
            Ok(nick) => relayed.origin = nick,
            Err(e) => {
                relayed.origin = BRIDGE_NICK.to_string();
                relayed.text = diagnostic(&raw, e);
            }
        }
    }
    relayed
}

/// Payload to publish for a chat line seen in `channel`.
pub fn outbound(nick: &str, text: &str, channel: &str, settings: &BridgeSettings) -> Bytes {
    if settings.json {
        let body = serde_json::json!({
            "nick": nick,
            "text": text,
            "channel": channel,
        });
        Bytes::from(body.to_string())
    } else {
        Bytes::copy_from_slice(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(text: Option<&str>, nick: Option<&str>) -> BridgeSettings {
        BridgeSettings {
            json: true,
            text_path: text.map(str::to_string),
            nick_path: nick.map(str::to_string),
            publish: false,
        }
    }

    #[test]
    fn plain_payload_is_relayed_verbatim() {
        let relayed = inbound("alerts", b"disk {full}", &BridgeSettings::default());
        assert_eq!(relayed.origin, "alerts");
        assert_eq!(relayed.text, "disk {full}");
    }

    #[test]
    fn json_paths_select_text_and_origin() {
        let relayed = inbound(
            "t",
            br#"{"msg":"hi","who":"alice"}"#,
            &json(Some("$.msg"), Some("$.who")),
        );
        assert_eq!(
            relayed,
            Relayed {
                origin: "alice".into(),
                text: "hi".into()
            }
        );
    }

    #[test]
    fn malformed_json_is_quoted_with_error() {
        let relayed = inbound("t", b"{nope", &json(Some("$.msg"), None));
        assert_eq!(relayed.origin, "t");
        assert!(relayed.text.starts_with("\"{nope\" ["), "{}", relayed.text);
        assert!(relayed.text.ends_with(']'));
    }

    #[test]
    fn without_text_path_whole_value_is_used() {
        let relayed = inbound("t", br#"{ "a": [1, 2] }"#, &json(None, None));
        assert_eq!(relayed.text, r#"{"a":[1,2]}"#);

        let relayed = inbound("t", br#""just a string""#, &json(None, None));
        assert_eq!(relayed.text, "just a string");
    }

    #[test]
    fn non_string_text_is_rendered_as_json() {
        let relayed = inbound("t", br#"{"n":42}"#, &json(Some("$.n"), None));
        assert_eq!(relayed.text, "42");
    }

    #[test]
    fn several_matches_become_an_array() {
        let relayed = inbound(
            "t",
            br#"{"items":[{"id":"a"},{"id":"b"}]}"#,
            &json(Some("$.items[*].id"), None),
        );
        assert_eq!(relayed.text, r#"["a","b"]"#);
    }

    #[test]
    fn missing_text_path_reports_error() {
        let relayed = inbound("t", br#"{"x":1}"#, &json(Some("$.msg"), None));
        assert_eq!(relayed.origin, "t");
        assert!(relayed.text.contains("matched nothing"), "{}", relayed.text);
        assert!(relayed.text.starts_with(r#""{\"x\":1}""#));
    }

    #[test]
    fn unusable_nick_falls_back_to_bridge_identity() {
        for payload in [
            &br#"{"msg":"hi","who":7}"#[..],
            &br#"{"msg":"hi"}"#[..],
            &br#"{"msg":"hi","who":"   "}"#[..],
        ] {
            let relayed = inbound("t", payload, &json(Some("$.msg"), Some("$.who")));
            assert_eq!(relayed.origin, BRIDGE_NICK);
            assert!(relayed.text.contains(" ["), "{}", relayed.text);
        }
    }

    #[test]
    fn nick_keeps_first_token_only() {
        let relayed = inbound(
            "t",
            br#"{"msg":"hi","who":"alice smith\nextra"}"#,
            &json(Some("$.msg"), Some("$.who")),
        );
        assert_eq!(relayed.origin, "alice");
    }

    #[test]
    fn nul_is_stripped_from_origin_and_text() {
        let relayed = inbound("t", b"bad\0payload", &BridgeSettings::default());
        assert_eq!(relayed.text, "badpayload");

        let relayed = inbound(
            "t",
            br#"{"msg":"a\u0000b","who":"ca\u0000rol"}"#,
            &json(Some("$.msg"), Some("$.who")),
        );
        assert_eq!(relayed.origin, "carol");
        assert_eq!(relayed.text, "ab");

        let relayed = inbound("t", br#"{"msg":"hi","who":"\u0000"}"#, &json(Some("$.msg"), Some("$.who")));
        assert_eq!(relayed.origin, BRIDGE_NICK);
    }

    #[test]
    fn invalid_path_is_reported() {
        let relayed = inbound("t", br#"{"msg":"hi"}"#, &json(Some("msg["), None));
        assert!(relayed.text.contains("bad path"), "{}", relayed.text);
    }

    #[test]
    fn lines_skip_empty() {
        let relayed = Relayed {
            origin: "t".into(),
            text: "one\r\n\ntwo\n".into(),
        };
        assert_eq!(relayed.lines().collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn outbound_payloads() {
        let plain = outbound("bob", "ship it", "#ops", &BridgeSettings::default());
        assert_eq!(plain, Bytes::from_static(b"ship it"));

        let body = outbound("bob", "ship it", "#ops", &json(None, None));
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"nick": "bob", "text": "ship it", "channel": "#ops"})
        );
    }
}
