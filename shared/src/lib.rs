use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod color;

pub use color::Rgba;

pub const MAX_COLOR_LEN: usize = 32;

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BrushStyle {
    #[default]
    Round,
    Square,
    Flat,
}

impl BrushStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "round" => Some(Self::Round),
            "square" => Some(Self::Square),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Square => "square",
            Self::Flat => "flat",
        }
    }
}

/// One straight piece of a freehand gesture in canvas-absolute coordinates.
///
/// Field names are the wire names; decoding is by name, never by position.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct StrokeSegment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub color: String,
    pub size: f32,
    pub opacity: f32,
    pub brush: BrushStyle,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SegmentError {
    #[error("segment width must be positive, got {0}")]
    InvalidWidth(f32),
    #[error("segment opacity must be within [0, 1], got {0}")]
    InvalidOpacity(f32),
    #[error("segment endpoint is not finite")]
    NonFiniteCoordinate,
    #[error("unsupported segment color {0:?}")]
    InvalidColor(String),
}

impl StrokeSegment {
    pub fn new(
        start: Point,
        end: Point,
        color: impl Into<String>,
        size: f32,
        opacity: f32,
        brush: BrushStyle,
    ) -> Self {
        Self {
            x0: start.x,
            y0: start.y,
            x1: end.x,
            y1: end.y,
            color: color.into(),
            size,
            opacity,
            brush,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        if !self.start().is_finite() || !self.end().is_finite() {
            return Err(SegmentError::NonFiniteCoordinate);
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(SegmentError::InvalidWidth(self.size));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(SegmentError::InvalidOpacity(self.opacity));
        }
        if self.color.is_empty()
            || self.color.len() > MAX_COLOR_LEN
            || Rgba::parse(&self.color).is_none()
        {
            return Err(SegmentError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }

    pub fn validated(self) -> Result<Self, SegmentError> {
        self.validate()?;
        Ok(self)
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "draw")]
    Draw(StrokeSegment),
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "draw")]
    Draw(StrokeSegment),
    #[serde(rename = "loadDrawings")]
    LoadDrawings { segments: Vec<StrokeSegment> },
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Draw(_) => "draw",
            ServerMessage::LoadDrawings { .. } => "loadDrawings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> StrokeSegment {
        StrokeSegment::new(
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
            "#000000",
            2.0,
            1.0,
            BrushStyle::Round,
        )
    }

    #[test]
    fn draw_message_uses_flat_named_fields() {
        let json = serde_json::to_value(ClientMessage::Draw(segment())).unwrap();
        assert_eq!(json["type"], "draw");
        assert_eq!(json["x0"], 10.0);
        assert_eq!(json["y1"], 20.0);
        assert_eq!(json["color"], "#000000");
        assert_eq!(json["size"], 2.0);
        assert_eq!(json["opacity"], 1.0);
        assert_eq!(json["brush"], "round");
    }

    #[test]
    fn draw_message_decodes_regardless_of_field_order() {
        let text = r##"{"brush":"flat","opacity":0.5,"size":3,"color":"#ff0000","y1":4,"x1":3,"y0":2,"x0":1,"type":"draw"}"##;
        let ClientMessage::Draw(decoded) = serde_json::from_str(text).unwrap();
        assert_eq!(decoded.start(), Point::new(1.0, 2.0));
        assert_eq!(decoded.end(), Point::new(3.0, 4.0));
        assert_eq!(decoded.brush, BrushStyle::Flat);
    }

    #[test]
    fn draw_message_missing_endpoint_is_malformed() {
        let text = r##"{"type":"draw","x0":1,"y0":2,"x1":3,"color":"#000","size":1,"opacity":1,"brush":"round"}"##;
        assert!(serde_json::from_str::<ClientMessage>(text).is_err());
    }

    #[test]
    fn load_drawings_tag_and_payload() {
        let message = ServerMessage::LoadDrawings {
            segments: vec![segment(), segment()],
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "loadDrawings");
        assert_eq!(json["segments"].as_array().map(Vec::len), Some(2));
        assert_eq!(message.kind(), "loadDrawings");
    }

    #[test]
    fn bincode_frames_decode_to_same_message() {
        let message = ClientMessage::Draw(segment());
        let bytes = bincode::encode_to_vec(&message, bincode::config::standard()).unwrap();
        let (decoded, _): (ClientMessage, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn validation_accepts_ordinary_segment() {
        let mut accepted = segment();
        accepted.opacity = 0.5;
        accepted.size = 3.0;
        assert_eq!(accepted.clone().validated(), Ok(accepted));
    }

    #[test]
    fn validation_rejects_out_of_range_fields() {
        let mut bad = segment();
        bad.opacity = 1.5;
        assert_eq!(bad.validate(), Err(SegmentError::InvalidOpacity(1.5)));

        let mut bad = segment();
        bad.size = 0.0;
        assert_eq!(bad.validate(), Err(SegmentError::InvalidWidth(0.0)));

        let mut bad = segment();
        bad.size = -4.0;
        assert!(matches!(bad.validate(), Err(SegmentError::InvalidWidth(_))));

        let mut bad = segment();
        bad.x1 = f32::NAN;
        assert_eq!(bad.validate(), Err(SegmentError::NonFiniteCoordinate));

        let mut bad = segment();
        bad.color = "chartreuse".into();
        assert!(matches!(bad.validate(), Err(SegmentError::InvalidColor(_))));
    }

    #[test]
    fn brush_style_parses_case_insensitively() {
        assert_eq!(BrushStyle::parse("Square"), Some(BrushStyle::Square));
        assert_eq!(BrushStyle::parse(" flat "), Some(BrushStyle::Flat));
        assert_eq!(BrushStyle::parse("oval"), None);
    }
}
