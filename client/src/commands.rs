//! The slash-command line next to the board. Commands only touch local brush
//! settings and unlock flags; nothing here is sent to the server.

use driftboard_shared::BrushStyle;
use thiserror::Error;

use crate::color::ColorSpec;
use crate::engine::{CaptureEngine, CaptureError, Outbox};
use crate::surface::Surface;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Color(ColorSpec),
    Size(f32),
    Opacity(f32),
    Brush(BrushStyle),
    Unlock(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("type a command such as /color #ff0000")]
    Empty,
    #[error("unknown command /{0}")]
    Unknown(String),
    #[error("/{0} needs a value")]
    MissingArgument(&'static str),
    #[error("/{command} does not understand {value:?}")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input);
    let mut parts = input.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.next().map(str::trim).unwrap_or_default();
    let (command, value) = match name.as_str() {
        "" => return Err(CommandError::Empty),
        "color" | "colour" => ("color", argument),
        "size" | "width" => ("size", argument),
        "opacity" | "alpha" => ("opacity", argument),
        "brush" => ("brush", argument),
        "unlock" => ("unlock", argument),
        _ => return Err(CommandError::Unknown(name)),
    };
    if value.is_empty() {
        return Err(CommandError::MissingArgument(command));
    }
    let invalid = || CommandError::InvalidArgument {
        command,
        value: value.to_string(),
    };
    match command {
        "color" => ColorSpec::parse(value).map(Command::Color).ok_or_else(invalid),
        "size" => value.parse().map(Command::Size).map_err(|_| invalid()),
        "opacity" => value.parse().map(Command::Opacity).map_err(|_| invalid()),
        "brush" => BrushStyle::parse(value).map(Command::Brush).ok_or_else(invalid),
        _ => Ok(Command::Unlock(value.to_string())),
    }
}

/// Applies `command` and returns the status line to show the user.
pub fn apply_command<S: Surface, O: Outbox>(
    engine: &mut CaptureEngine<S, O>,
    command: Command,
) -> Result<String, CaptureError> {
    match command {
        Command::Color(color) => {
            let notice = match color.required_feature() {
                Some(feature) if !engine.unlocks().is_unlocked(feature) => {
                    format!("{color} selected, but {feature} is locked")
                }
                _ => format!("color {color}"),
            };
            engine.set_color(color);
            Ok(notice)
        }
        Command::Size(size) => {
            engine.set_size(size)?;
            Ok(format!("size {size}"))
        }
        Command::Opacity(opacity) => {
            let stored = engine.set_opacity(opacity);
            Ok(format!("opacity {stored}"))
        }
        Command::Brush(brush) => {
            engine.set_brush(brush);
            Ok(format!("brush {}", brush.as_str()))
        }
        Command::Unlock(code) => Ok(match engine.unlock(&code) {
            Some(feature) => format!("{feature} unlocked"),
            None => "that code does not unlock anything".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use driftboard_shared::{Rgba, StrokeSegment};

    use super::*;
    use crate::color::Feature;
    use crate::raster::Bitmap;

    struct Discard;

    impl Outbox for Discard {
        fn send(&self, _segment: &StrokeSegment) {}
    }

    fn engine() -> CaptureEngine<Bitmap, Rc<Discard>> {
        CaptureEngine::new(Bitmap::new(10, 10, Rgba::WHITE), Rc::new(Discard))
    }

    #[test]
    fn parses_each_command() {
        assert_eq!(
            parse_command("/color #00FF00"),
            Ok(Command::Color(ColorSpec::Solid("#00ff00".into())))
        );
        assert_eq!(parse_command("size 4.5"), Ok(Command::Size(4.5)));
        assert_eq!(parse_command("/opacity 0.25"), Ok(Command::Opacity(0.25)));
        assert_eq!(
            parse_command("/BRUSH square"),
            Ok(Command::Brush(BrushStyle::Square))
        );
        assert_eq!(
            parse_command("/unlock  prism "),
            Ok(Command::Unlock("prism".into()))
        );
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(parse_command("  "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("/erase"),
            Err(CommandError::Unknown("erase".into()))
        );
        assert_eq!(
            parse_command("/size"),
            Err(CommandError::MissingArgument("size"))
        );
        assert_eq!(
            parse_command("/brush oval"),
            Err(CommandError::InvalidArgument {
                command: "brush",
                value: "oval".into()
            })
        );
    }

    #[test]
    fn applying_commands_updates_brush() {
        let mut engine = engine();
        apply_command(&mut engine, Command::Size(5.0)).unwrap();
        apply_command(&mut engine, Command::Brush(BrushStyle::Flat)).unwrap();
        let notice = apply_command(&mut engine, Command::Opacity(3.0)).unwrap();
        assert_eq!(notice, "opacity 1");
        assert_eq!(engine.brush().size, 5.0);
        assert_eq!(engine.brush().brush, BrushStyle::Flat);
        assert_eq!(
            apply_command(&mut engine, Command::Size(-1.0)),
            Err(CaptureError::InvalidSize(-1.0))
        );
    }

    #[test]
    fn locked_color_selection_is_flagged_until_unlocked() {
        let mut engine = engine();
        let notice = apply_command(&mut engine, Command::Color(ColorSpec::Gold)).unwrap();
        assert_eq!(notice, "gold selected, but gold is locked");

        let notice = apply_command(&mut engine, Command::Unlock("midas".into())).unwrap();
        assert_eq!(notice, "gold unlocked");
        assert!(engine.unlocks().is_unlocked(Feature::Gold));
        let notice = apply_command(&mut engine, Command::Color(ColorSpec::Gold)).unwrap();
        assert_eq!(notice, "color gold");
    }
}
