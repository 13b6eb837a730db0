pub mod banner;
pub mod fnt;
pub mod header;
pub mod overlay;
