use driftboard_shared::{ClientMessage, ServerMessage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed text frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed binary frame: {0}")]
    Binary(#[from] bincode::error::DecodeError),
}

pub fn decode_text(text: &str) -> Result<ClientMessage, WireError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_binary(data: &[u8]) -> Result<ClientMessage, WireError> {
    let (message, _) = bincode::decode_from_slice(data, bincode::config::standard())?;
    Ok(message)
}

pub fn encode(message: &ServerMessage) -> Result<String, WireError> {
    Ok(serde_json::to_string(message)?)
}

#[cfg(test)]
mod tests {
    use driftboard_shared::{BrushStyle, Point, StrokeSegment};

    use super::*;

    #[test]
    fn text_and_binary_frames_decode_alike() {
        let segment = StrokeSegment::new(
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            "#abcdef",
            4.0,
            0.25,
            BrushStyle::Flat,
        );
        let message = ClientMessage::Draw(segment);
        let text = serde_json::to_string(&message).unwrap();
        let bytes = bincode::encode_to_vec(&message, bincode::config::standard()).unwrap();
        assert_eq!(decode_text(&text).unwrap(), message);
        assert_eq!(decode_binary(&bytes).unwrap(), message);
    }

    #[test]
    fn garbage_frames_are_wire_errors() {
        assert!(matches!(decode_text("{\"type\":\"erase\"}"), Err(WireError::Json(_))));
        assert!(matches!(decode_binary(&[0xff, 0xff, 0xff]), Err(WireError::Binary(_))));
    }

    #[test]
    fn server_messages_encode_as_tagged_json() {
        let encoded = encode(&ServerMessage::LoadDrawings { segments: vec![] }).unwrap();
        assert_eq!(encoded, r#"{"type":"loadDrawings","segments":[]}"#);
    }
}
