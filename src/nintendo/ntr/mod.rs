pub mod checksum;
pub mod constants;
pub mod error;
pub mod export;
pub mod fs;
pub mod graphics;
pub mod header;
pub mod models;
pub mod overlay;
pub mod rom;

#[cfg(test)]
mod test_rom;

pub use rom::NtrRom;
