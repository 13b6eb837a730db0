/// Packed 15-bit color: blue in bits 0-4, green in bits 5-9, red in bits 10-14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Bgr555(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Expands a 5-bit channel to 8 bits, truncating.
pub fn to_8bit(bit5: u8) -> u8 {
    (u16::from(bit5 & 0x1F) * 0xFF / 0x1F) as u8
}

/// Reduces an 8-bit channel to 5 bits, truncating.
pub fn from_8bit(bit8: u8) -> u8 {
    (u16::from(bit8) * 0x1F / 0xFF) as u8
}

impl Bgr555 {
    pub fn from_channels(blue: u8, green: u8, red: u8) -> Self {
        Self(
            u16::from(blue & 0x1F) | (u16::from(green & 0x1F) << 5) | (u16::from(red & 0x1F) << 10),
        )
    }

    pub fn blue(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    pub fn green(self) -> u8 {
        ((self.0 >> 5) & 0x1F) as u8
    }

    pub fn red(self) -> u8 {
        ((self.0 >> 10) & 0x1F) as u8
    }

    /// Opaque 8-bit color. Lossy in the sense that [`Bgr555::from_rgba8`] may be off by one step.
    pub fn to_rgba8(self) -> Rgba8 {
        Rgba8 {
            r: to_8bit(self.red()),
            g: to_8bit(self.green()),
            b: to_8bit(self.blue()),
            a: 0xFF,
        }
    }

    /// Alpha is dropped.
    pub fn from_rgba8(color: Rgba8) -> Self {
        Self::from_channels(from_8bit(color.b), from_8bit(color.g), from_8bit(color.r))
    }
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8 {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

pub fn palette_to_rgba8(palette: &[Bgr555]) -> Vec<Rgba8> {
    palette.iter().map(|color| color.to_rgba8()).collect()
}

/// Flattens pixels into the `RGBA RGBA ...` byte layout image encoders expect.
pub fn rgba8_bytes(pixels: &[Rgba8]) -> Vec<u8> {
    pixels.iter().flat_map(|pixel| pixel.to_bytes()).collect()
}
