use crate::nintendo::ntr::constants::{NTR_ICON_HEIGHT, NTR_ICON_WIDTH};
use crate::nintendo::ntr::graphics::color::palette_to_rgba8;
use crate::nintendo::ntr::graphics::pixels::{decode_indices, decode_rgba8};
use crate::nintendo::ntr::graphics::{Bgr555, ImageResult, PixelFormat, Rgba8};
use binrw::{BinRead, BinWrite};

/// Languages a banner carries a title slot for, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Japanese = 0,
    English = 1,
    French = 2,
    German = 3,
    Italian = 4,
    Spanish = 5,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Japanese,
        Language::English,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Spanish,
    ];
}

/// Banner located at `NdsHeader::banner_offset`, holding the icon and the localized titles.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct NdsBanner {
    pub version: u16,

    /// CRC-16 of the banner bytes 0x020..0x840
    pub checksum: u16,

    pub reserved: [u8; 28],

    /// 32x32 icon, 4 bits per pixel in 8x8 tiles
    pub icon: [u8; 512],

    /// Icon palette, index 0 is transparent
    pub palette: [u16; 16],

    /// UTF-16 titles, not every game fills every language
    pub titles: [[u16; 128]; 6],
}

impl NdsBanner {
    pub fn has_title(&self, language: Language) -> bool {
        self.titles[language as usize][0] != 0
    }

    /// Title for `language` with line breaks flattened to spaces, `None` when the slot is empty.
    pub fn title(&self, language: Language) -> Option<String> {
        if !self.has_title(language) {
            return None;
        }

        let raw = &self.titles[language as usize];
        let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());

        Some(String::from_utf16_lossy(&raw[..len]).replace('\n', " "))
    }

    pub fn palette(&self) -> [Bgr555; 16] {
        self.palette.map(Bgr555)
    }

    pub fn palette_rgba(&self) -> Vec<Rgba8> {
        palette_to_rgba8(&self.palette())
    }

    pub fn icon_rgba(&self) -> ImageResult<Vec<Rgba8>> {
        decode_rgba8(
            &self.icon,
            NTR_ICON_WIDTH,
            NTR_ICON_HEIGHT,
            PixelFormat::ICON,
            &self.palette(),
        )
    }

    /// Per-pixel palette indices of the icon.
    pub fn icon_indices(&self) -> ImageResult<Vec<u8>> {
        decode_indices(&self.icon, NTR_ICON_WIDTH, NTR_ICON_HEIGHT, PixelFormat::ICON)
    }
}
