use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Commands specific to NTR (Nintendo DS) ROMs
#[derive(Subcommand, Debug, Eq, PartialEq)]
pub enum NtrCommands {
    Info(InfoCommand),
    Files(FilesCommand),
    Export(ExportCommand),
}

/// Prints the header, banner titles and checksums of one or more ROMs.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct InfoCommand {
    /// Only print title, codes and version
    #[arg(long, short = 'b', default_value_t = false)]
    pub basic: bool,

    /// Print where every region of the ROM is located
    #[arg(long, short = 'l', default_value_t = false)]
    pub locations: bool,

    /// ROM files to inspect
    #[arg(value_name = "ROMS", required = true)]
    pub roms: Vec<PathBuf>,
}

/// Lists the file system of one or more ROMs.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct FilesCommand {
    /// Only list folders
    #[arg(long, short = 'F', default_value_t = false)]
    pub folders: bool,

    /// ROM files to list
    #[arg(value_name = "ROMS", required = true)]
    pub roms: Vec<PathBuf>,
}

/// Extracts the icon, binaries, overlays and files of one or more ROMs.
#[derive(Parser, Debug, Clone, Default, Eq, PartialEq)]
#[command(
    long_about = "Extracts the icon, binaries, overlays and files of one or more ROMs\n\nNote: Every ROM is exported into its own directory, named after the ROM without its extension unless --output is given\nWithout any selection flag everything is exported"
)]
pub struct ExportCommand {
    /// Banner icon as a 32x32 PNG
    #[arg(long, default_value_t = false)]
    pub icon: bool,

    /// Banner icon palette as a 16x1 PNG
    #[arg(long, default_value_t = false)]
    pub icon_palette: bool,

    /// Raw icon palette indices as a 32x32 greyscale PNG
    #[arg(long, default_value_t = false)]
    pub icon_tilemap: bool,

    /// ARM9 binary
    #[arg(long, default_value_t = false)]
    pub arm9: bool,

    /// ARM7 binary
    #[arg(long, default_value_t = false)]
    pub arm7: bool,

    /// ARM9 overlay table and the overlay files it references
    #[arg(long, default_value_t = false)]
    pub arm9_overlay: bool,

    /// ARM7 overlay table and the overlay files it references
    #[arg(long, default_value_t = false)]
    pub arm7_overlay: bool,

    /// Debug ROM
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Every file of the file system
    #[arg(long, default_value_t = false)]
    pub files: bool,

    /// Everything above
    #[arg(long, short = 'a', default_value_t = false)]
    pub all: bool,

    /// Output directory, with several ROMs each one gets a subdirectory named after it
    #[arg(long, short = 'o', value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// ROM files to export
    #[arg(value_name = "ROMS", required = true)]
    pub roms: Vec<PathBuf>,
}

impl ExportCommand {
    /// Applies `--all` and falls back to everything when nothing was selected.
    pub fn resolved(&self) -> Self {
        let nothing_selected = !(self.icon
            || self.icon_palette
            || self.icon_tilemap
            || self.arm9
            || self.arm7
            || self.arm9_overlay
            || self.arm7_overlay
            || self.debug
            || self.files);

        if !(self.all || nothing_selected) {
            return self.clone();
        }

        Self {
            icon: true,
            icon_palette: true,
            icon_tilemap: true,
            arm9: true,
            arm7: true,
            arm9_overlay: true,
            arm7_overlay: true,
            debug: true,
            files: true,
            all: true,
            output: self.output.clone(),
            roms: self.roms.clone(),
        }
    }
}
