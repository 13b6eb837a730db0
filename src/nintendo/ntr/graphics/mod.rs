pub mod color;
pub mod error;
pub mod pixels;

pub use color::{Bgr555, Rgba8};
pub use error::{ImageError, ImageResult};
pub use pixels::{BitDepth, Layout, PixelFormat};
