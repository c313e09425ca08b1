/// A concrete color with straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses the color strings that may appear on the wire: `#rgb`,
    /// `#rrggbb` and `hsl(h, s%, l%)`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = value.to_ascii_lowercase();
        let inner = lower.strip_prefix("hsl(")?.strip_suffix(')')?;
        let mut parts = inner.split(',').map(str::trim);
        let hue = parts.next()?.trim_end_matches("deg").parse::<f32>().ok()?;
        let saturation = parse_percent(parts.next()?)?;
        let lightness = parse_percent(parts.next()?)?;
        if parts.next().is_some() || !hue.is_finite() {
            return None;
        }
        Some(Self::from_hsl(hue, saturation, lightness))
    }

    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hue = hue.rem_euclid(360.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = hue / 60.0;
        let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        Self::opaque(channel(r + m), channel(g + m), channel(b + m))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: channel(alpha),
            ..self
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16).unwrap_or(0) as u8 * 17);
            Some(Rgba::opaque(digits.next()?, digits.next()?, digits.next()?))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

fn parse_percent(value: &str) -> Option<f32> {
    let number = value.strip_suffix('%')?.trim().parse::<f32>().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some(number / 100.0)
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Rgba::parse("#000000"), Some(Rgba::BLACK));
        assert_eq!(Rgba::parse("#fff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::parse("#1F1f1f"), Some(Rgba::opaque(31, 31, 31)));
        assert_eq!(Rgba::parse("#12345"), None);
        assert_eq!(Rgba::parse("#gg0000"), None);
    }

    #[test]
    fn parses_hsl_primaries() {
        assert_eq!(Rgba::parse("hsl(0, 100%, 50%)"), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(Rgba::parse("hsl(120,100%,50%)"), Some(Rgba::opaque(0, 255, 0)));
        assert_eq!(Rgba::parse("HSL(240, 100%, 50%)"), Some(Rgba::opaque(0, 0, 255)));
        assert_eq!(Rgba::parse("hsl(240, 100, 50%)"), None);
    }

    #[test]
    fn hex_output_round_trips_through_parse() {
        let gold = Rgba::opaque(0xd4, 0xaf, 0x37);
        assert_eq!(gold.to_hex(), "#d4af37");
        assert_eq!(Rgba::parse(&gold.to_hex()), Some(gold));
    }
}
