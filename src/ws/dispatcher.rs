//! Inbound frame dispatcher: one text frame in, one session event out.

use tracing::{debug, warn};

use crate::engine::types::SessionError;
use crate::session::SessionEvent;

use super::messages::ServerEvent;

/// Map an inbound text frame to the session event it triggers.
///
/// Frames whose `"type"` is unknown or whose payload does not match the
/// tag are reported as `SessionError::Protocol`.
pub fn dispatch(text: &str) -> Result<SessionEvent, SessionError> {
    let event: ServerEvent = serde_json::from_str(text).map_err(|e| {
        let tag = serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
            .unwrap_or_else(|| "<none>".to_string());
        SessionError::Protocol(format!("unreadable '{tag}' frame: {e}"))
    })?;
    debug!(tag = event.tag(), "frame dispatched");
    Ok(SessionEvent::Server(event))
}

/// Like [`dispatch`], but logs and drops frames that cannot be read.
pub fn dispatch_or_drop(text: &str) -> Option<SessionEvent> {
    match dispatch(text) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(%err, "inbound frame dropped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_disconnected_maps_to_server_event() {
        let event = dispatch(r#"{"type":"opponent_disconnected"}"#).unwrap();
        assert_eq!(event, SessionEvent::Server(ServerEvent::OpponentDisconnected));
    }

    #[test]
    fn valid_moves_maps_to_server_event() {
        let event = dispatch(r#"{"type":"valid_moves","moves":[[5,4],[4,4]]}"#).unwrap();
        assert_eq!(
            event,
            SessionEvent::Server(ServerEvent::ValidMoves {
                moves: vec![[5, 4], [4, 4]]
            })
        );
    }

    #[test]
    fn unknown_tag_is_protocol_error() {
        let err = dispatch(r#"{"type":"chat","text":"hi"}"#).unwrap_err();
        match err {
            SessionError::Protocol(msg) => assert!(msg.contains("'chat'")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_dropped() {
        assert!(dispatch("not json").is_err());
        assert!(dispatch_or_drop("not json").is_none());
        assert!(dispatch_or_drop(r#"{"type":"error"}"#).is_none());
    }

    #[test]
    fn error_frame_maps_to_server_event() {
        let event = dispatch_or_drop(r#"{"type":"error","message":"Not your turn"}"#);
        assert_eq!(
            event,
            Some(SessionEvent::Server(ServerEvent::error("Not your turn")))
        );
    }
}
