//! Hex color parsing shared by the canvas painter and the export composer.
//!
//! Annotation colors are stored as the hex strings the toolbar produced.
//! Every consumer that needs components goes through [`Rgb::from_hex`],
//! including the six palette colors.

use serde::{Deserialize, Serialize};

/// An opaque 8-bit color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. The leading `#` is optional
    /// and alpha, when present, is discarded: highlights are painted opaque.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            6 | 8 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                if bytes.len() == 8 {
                    hex_val(bytes[6])?;
                    hex_val(bytes[7])?;
                }
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    /// Resolve a stored color string, falling back to black.
    pub fn resolve(color: &str) -> Self {
        Self::from_hex(color).unwrap_or_else(|| {
            log::warn!("unparseable color {color:?}, using black");
            Self::BLACK
        })
    }

    /// Emit as uppercase `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// The six colors offered by the toolbar, in display order.
pub const PALETTE: [(&str, Rgb); 6] = [
    ("#000000", Rgb::BLACK),
    ("#FFFFFF", Rgb::WHITE),
    ("#FF0000", Rgb::RED),
    ("#0000FF", Rgb::BLUE),
    ("#00FF00", Rgb::GREEN),
    ("#FFFF00", Rgb::YELLOW),
];
