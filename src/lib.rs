pub mod commands;
pub mod nintendo;
