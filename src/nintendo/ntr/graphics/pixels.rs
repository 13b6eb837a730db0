use crate::nintendo::ntr::graphics::color::{Bgr555, Rgba8};
use crate::nintendo::ntr::graphics::error::{ImageError, ImageResult};

const TILE_SIZE: u32 = 8;
const TILE_PIXELS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// Two pixels per byte, low nibble first
    Four,
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Raster order over the whole image
    Linear,
    /// 8x8 tiles stored one after another, raster order inside each tile
    Tiled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub depth: BitDepth,
    pub layout: Layout,
}

impl PixelFormat {
    /// Banner icons are 4-bit tiled.
    pub const ICON: PixelFormat = PixelFormat {
        depth: BitDepth::Four,
        layout: Layout::Tiled,
    };

    /// Bytes of sample data a `width` x `height` image needs.
    pub fn required_bytes(&self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self.depth {
            BitDepth::Four => pixels.div_ceil(2),
            BitDepth::Eight => pixels,
        }
    }
}

/// Reads the 4-bit sample at `offset`, low nibble first.
pub fn sample_4bit(data: &[u8], offset: usize) -> u8 {
    (data[offset >> 1] >> ((offset & 1) << 2)) & 0xF
}

/// Maps pixel `i` of tile `j` in an image `width` pixels wide to its raster position.
pub fn to_linear_space(i: usize, j: usize, width: usize) -> usize {
    let tiles_per_row = width / TILE_SIZE as usize;
    let x = (i % 8) + (j % tiles_per_row) * 8;
    let y = (i / 8) + (j / tiles_per_row) * 8;
    x + y * width
}

/// Walks every sample of the image, handing `(raster position, value)` to `visit`.
///
/// All preconditions are checked before the first sample is visited.
fn for_each_sample<F>(
    data: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
    mut visit: F,
) -> ImageResult<()>
where
    F: FnMut(usize, u8) -> ImageResult<()>,
{
    if format.layout == Layout::Tiled && (width % TILE_SIZE != 0 || height % TILE_SIZE != 0) {
        return Err(ImageError::TilingMismatch { width, height });
    }

    let expected = format.required_bytes(width, height);
    if data.len() < expected {
        return Err(ImageError::InsufficientData {
            expected,
            actual: data.len(),
        });
    }

    let sample = |index: usize| match format.depth {
        BitDepth::Four => sample_4bit(data, index),
        BitDepth::Eight => data[index],
    };

    match format.layout {
        Layout::Linear => {
            for i in 0..width as usize * height as usize {
                visit(i, sample(i))?;
            }
        }
        Layout::Tiled => {
            let tiles = (width / TILE_SIZE) as usize * (height / TILE_SIZE) as usize;
            for j in 0..tiles {
                for i in 0..TILE_PIXELS {
                    visit(
                        to_linear_space(i, j, width as usize),
                        sample(i + j * TILE_PIXELS),
                    )?;
                }
            }
        }
    }

    Ok(())
}

fn palette_entry(palette: &[Bgr555], index: u8) -> ImageResult<Bgr555> {
    palette
        .get(index as usize)
        .copied()
        .ok_or(ImageError::PaletteIndexOutOfRange {
            index,
            len: palette.len(),
        })
}

/// Raw palette indices in raster order (the "tilemap" view of an image).
pub fn decode_indices(
    data: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> ImageResult<Vec<u8>> {
    let mut out = vec![0u8; width as usize * height as usize];
    for_each_sample(data, width, height, format, |pos, value| {
        out[pos] = value;
        Ok(())
    })?;
    Ok(out)
}

pub fn decode_bgr555(
    data: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
    palette: &[Bgr555],
) -> ImageResult<Vec<Bgr555>> {
    let mut out = vec![Bgr555::default(); width as usize * height as usize];
    for_each_sample(data, width, height, format, |pos, value| {
        out[pos] = palette_entry(palette, value)?;
        Ok(())
    })?;
    Ok(out)
}

/// Palette index 0 is transparent and leaves the output pixel untouched.
pub fn decode_rgba8(
    data: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
    palette: &[Bgr555],
) -> ImageResult<Vec<Rgba8>> {
    let mut out = vec![Rgba8::TRANSPARENT; width as usize * height as usize];
    for_each_sample(data, width, height, format, |pos, value| {
        if value != 0 {
            out[pos] = palette_entry(palette, value)?.to_rgba8();
        }
        Ok(())
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const LINEAR_4: PixelFormat = PixelFormat {
        depth: BitDepth::Four,
        layout: Layout::Linear,
    };
    const LINEAR_8: PixelFormat = PixelFormat {
        depth: BitDepth::Eight,
        layout: Layout::Linear,
    };
    const TILED_8: PixelFormat = PixelFormat {
        depth: BitDepth::Eight,
        layout: Layout::Tiled,
    };

    #[test]
    fn four_bit_samples_low_nibble_first() {
        let data = [0x21, 0x43];
        assert_eq!(sample_4bit(&data, 0), 1);
        assert_eq!(sample_4bit(&data, 1), 2);
        assert_eq!(sample_4bit(&data, 2), 3);
        assert_eq!(sample_4bit(&data, 3), 4);
    }

    #[test]
    fn detiling_is_a_bijection() {
        for (w, h) in [(8usize, 8usize), (32, 32), (16, 8), (8, 24), (64, 16)] {
            let tiles = (w / 8) * (h / 8);
            let positions: HashSet<usize> = (0..tiles)
                .flat_map(|j| (0..64).map(move |i| to_linear_space(i, j, w)))
                .collect();

            assert_eq!(positions.len(), w * h);
            assert!(positions.iter().all(|&pos| pos < w * h));
        }
    }

    #[test]
    fn detiling_places_second_tile_to_the_right() {
        // 16x8: tile 1 starts at x = 8 on the first row
        assert_eq!(to_linear_space(0, 1, 16), 8);
        assert_eq!(to_linear_space(8, 1, 16), 24);
        // 8x16: tile 1 starts on row 8
        assert_eq!(to_linear_space(0, 1, 8), 64);
    }

    #[test]
    fn tiled_layout_rejects_unaligned_dimensions() {
        let data = vec![0u8; 12 * 8];
        assert_eq!(
            decode_indices(&data, 12, 8, TILED_8),
            Err(ImageError::TilingMismatch {
                width: 12,
                height: 8
            })
        );
        assert_eq!(
            decode_rgba8(&data, 12, 8, TILED_8, &[Bgr555(0)]),
            Err(ImageError::TilingMismatch {
                width: 12,
                height: 8
            })
        );
    }

    #[test]
    fn linear_layout_accepts_any_dimensions() {
        let data = [1, 2, 3, 4, 5, 6];
        assert_eq!(decode_indices(&data, 3, 2, LINEAR_8).unwrap(), data.to_vec());
    }

    #[test]
    fn short_data_is_rejected() {
        let data = [0u8; 7];
        assert_eq!(
            decode_indices(&data, 4, 4, LINEAR_4),
            Err(ImageError::InsufficientData {
                expected: 8,
                actual: 7
            })
        );
    }

    #[test]
    fn tiled_eight_bit_indices_follow_the_tile_order() {
        // Two tiles side by side, tile 0 filled with 1, tile 1 with 2
        let mut data = vec![1u8; 64];
        data.extend(vec![2u8; 64]);

        let out = decode_indices(&data, 16, 8, TILED_8).unwrap();
        for y in 0..8 {
            assert_eq!(&out[y * 16..y * 16 + 8], &[1; 8]);
            assert_eq!(&out[y * 16 + 8..y * 16 + 16], &[2; 8]);
        }
    }

    #[test]
    fn index_zero_stays_transparent() {
        let palette = [Bgr555(0x7FFF), Bgr555(0x001F)];
        let data = [0x10u8];

        let out = decode_rgba8(&data, 2, 1, LINEAR_4, &palette).unwrap();
        assert_eq!(out[0], Rgba8::TRANSPARENT);
        assert_eq!(out[1], Rgba8 { r: 0, g: 0, b: 255, a: 255 });
    }

    #[test]
    fn bgr555_output_looks_up_every_index() {
        let palette = [Bgr555(0x1111), Bgr555(0x2222)];
        let out = decode_bgr555(&[0, 1, 1], 3, 1, LINEAR_8, &palette).unwrap();
        assert_eq!(out, vec![Bgr555(0x1111), Bgr555(0x2222), Bgr555(0x2222)]);
    }

    #[test]
    fn out_of_range_palette_index_is_an_error() {
        let palette = [Bgr555(0); 16];
        assert_eq!(
            decode_bgr555(&[16], 1, 1, LINEAR_8, &palette),
            Err(ImageError::PaletteIndexOutOfRange { index: 16, len: 16 })
        );
    }

    #[test]
    fn icon_format_decodes_a_full_icon() {
        let data = [0x11u8; 512];
        let palette = [Bgr555(0x7FFF); 16];
        let out = decode_rgba8(&data, 32, 32, PixelFormat::ICON, &palette).unwrap();
        assert_eq!(out.len(), 32 * 32);
        assert!(out.iter().all(|p| p.a == 0xFF));
    }
}
