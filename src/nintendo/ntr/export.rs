use crate::commands::ntr::{ExportCommand, FilesCommand, InfoCommand};
use crate::nintendo::ntr::constants::{
    NTR_ICON_HEIGHT, NTR_ICON_PALETTE_SIZE, NTR_ICON_WIDTH, NTR_LANGUAGES,
};
use crate::nintendo::ntr::error::{NintendoNTRError, NintendoNTRResult};
use crate::nintendo::ntr::fs::node::TreeNode;
use crate::nintendo::ntr::graphics::Rgba8;
use crate::nintendo::ntr::graphics::color::rgba8_bytes;
use crate::nintendo::ntr::models::banner::{Language, NdsBanner};
use crate::nintendo::ntr::models::header::RomRegion;
use crate::nintendo::ntr::overlay::Cpu;
use crate::nintendo::ntr::rom::NtrRom;
use image::{GrayImage, ImageFormat, RgbaImage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::fs;

fn hex_range(offset: u32, size: u32) -> String {
    format!(
        "[{offset:#x}, {:#x})",
        u64::from(offset) + u64::from(size)
    )
}

fn plural(count: u16, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Human readable header, banner and checksum summary.
///
/// `basic` limits it to the identifying fields, `locations` to the region map; neither means both
/// plus the advanced fields and checksums.
pub fn info_report(rom: &NtrRom, basic: bool, locations: bool) -> NintendoNTRResult<String> {
    let header = rom.header();
    let everything = !basic && !locations;
    let mut lines = Vec::new();

    if basic || everything {
        lines.push("-------\tROM header base\t--------".to_string());
        lines.push(format!("Game title: {}", header.title()));
        lines.push(format!("Game code: {}", header.game_code()));
        lines.push(format!("Maker code: {}", header.maker_code()));
        lines.push(format!("Version: {}", header.version));
        lines.push(format!("Unit code: {}", header.unit_code));

        if let Some(banner) = rom.banner()? {
            lines.push("Localized names:".to_string());
            for language in Language::ALL {
                if let Some(title) = banner.title(language) {
                    lines.push(format!("\t{}: {title}", NTR_LANGUAGES[language as usize]));
                }
            }
        }
        lines.push(String::new());
    }

    if everything {
        let checksums = rom.checksums();
        lines.push("-------\tROM header advanced\t--------".to_string());
        lines.push(format!("Encryption seed: {}", header.encryption_seed));
        lines.push(format!(
            "Capacity: {} ({} KiB)",
            header.capacity,
            128u64.checked_shl(u32::from(header.capacity)).unwrap_or(0)
        ));
        lines.push(format!("Card control: {:#x}", header.card_control));
        lines.push(format!("Secure card control: {:#x}", header.secure_card_control));
        lines.push(format!("Secure area checksum: {:#x}", header.secure_area_checksum));
        lines.push(format!(
            "Secure area loading timeout: {:#x}",
            header.secure_area_timeout
        ));
        lines.push(format!("Logo checksum: {}", checksums.logo));
        lines.push(format!("Header checksum: {}", checksums.header));
        if let Some(banner) = checksums.banner {
            lines.push(format!("Banner checksum: {banner}"));
        }
        lines.push(String::new());
    }

    if locations || everything {
        lines.push("-------\tROM header locations\t--------".to_string());
        lines.push(format!(
            "ARM9 binary: {} loaded at {:#x}, entry {:#x}",
            hex_range(header.arm9_offset, header.arm9_size),
            header.arm9_load,
            header.arm9_entry
        ));
        lines.push(format!("ARM9 auto load: {:#x}", header.arm9_autoload));
        lines.push(format!(
            "ARM7 binary: {} loaded at {:#x}, entry {:#x}",
            hex_range(header.arm7_offset, header.arm7_size),
            header.arm7_load,
            header.arm7_entry
        ));
        lines.push(format!("ARM7 auto load: {:#x}", header.arm7_autoload));

        for cpu in [Cpu::Arm9, Cpu::Arm7] {
            let (offset, size) = header.region(cpu.table_region());
            let overlays = rom.overlays(cpu)?;
            let compressed = overlays
                .iter()
                .filter(|overlay| overlay.entry.is_compressed())
                .count();
            lines.push(format!(
                "{}: {} with {} overlays, {compressed} compressed",
                cpu.table_region(),
                hex_range(offset, size),
                overlays.len()
            ));
        }

        for region in [
            RomRegion::FileNameTable,
            RomRegion::FileAllocationTable,
            RomRegion::DebugRom,
        ] {
            let (offset, size) = header.region(region);
            lines.push(format!("{region}: {}", hex_range(offset, size)));
        }
        if header.has_banner() {
            lines.push(format!("Banner: {:#x}", header.banner_offset));
        }
        lines.push(String::new());
    }

    Ok(lines.join("\n"))
}

fn printable_magic(magic: [u8; 4]) -> Option<String> {
    magic
        .iter()
        .all(u8::is_ascii_alphanumeric)
        .then(|| String::from_utf8_lossy(&magic).into_owned())
}

fn describe_node(rom: &NtrRom, node: &TreeNode) -> String {
    let mut parts = Vec::new();

    if node.is_folder() {
        if node.child_folder_count() > 0 {
            parts.push(plural(node.child_folder_count(), "folder"));
        }
        if node.child_file_count() > 0 {
            parts.push(plural(node.child_file_count(), "file"));
        }
    } else {
        parts.push(format!(
            "offset {:#x} and size {} ({:#x})",
            node.offset, node.size, node.size
        ));
        if let Some(magic) = rom.magic(node.id).and_then(printable_magic) {
            parts.push(format!("magic number \"{magic}\""));
        }
    }

    if parts.is_empty() {
        node.to_string()
    } else {
        format!("{node} with {}", parts.join(", "))
    }
}

/// One line per node in id order, optionally folders only.
pub fn files_report(rom: &NtrRom, folders_only: bool) -> String {
    rom.fs()
        .nodes()
        .iter()
        .filter(|node| !folders_only || node.is_folder())
        .map(|node| describe_node(rom, node))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn show_info(cmd: InfoCommand) -> NintendoNTRResult<()> {
    for path in &cmd.roms {
        let report = NtrRom::open(path)
            .await
            .and_then(|rom| info_report(&rom, cmd.basic, cmd.locations));

        match report {
            Ok(report) => println!("-------\t{}\t--------\n{report}", path.display()),
            Err(err) => warn!("Skipping {}: {err}", path.display()),
        }
    }

    Ok(())
}

pub async fn list_files(cmd: FilesCommand) -> NintendoNTRResult<()> {
    for path in &cmd.roms {
        match NtrRom::open(path).await {
            Ok(rom) => println!(
                "-------\t{}\t--------\n{}\n",
                path.display(),
                files_report(&rom, cmd.folders)
            ),
            Err(err) => warn!("Skipping {}: {err}", path.display()),
        }
    }

    Ok(())
}

/// Names that would escape the export directory or address a parent are refused.
fn check_name(name: &str) -> NintendoNTRResult<()> {
    if name.is_empty() || name == "." || name.contains("..") || name.contains(['/', '\\']) {
        return Err(NintendoNTRError::UnsafeName(name.to_string()));
    }
    Ok(())
}

fn encode_rgba_png(pixels: &[Rgba8], width: u32, height: u32) -> NintendoNTRResult<Vec<u8>> {
    let image = RgbaImage::from_raw(width, height, rgba8_bytes(pixels))
        .ok_or(NintendoNTRError::PixelBufferSize { width, height })?;

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn encode_grey_png(samples: Vec<u8>, width: u32, height: u32) -> NintendoNTRResult<Vec<u8>> {
    let image = GrayImage::from_raw(width, height, samples)
        .ok_or(NintendoNTRError::PixelBufferSize { width, height })?;

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

async fn write_output(dir: &Path, name: &str, data: &[u8]) -> NintendoNTRResult<()> {
    let path = dir.join(name);
    debug!("Writing {} ({} bytes)", path.display(), data.len());
    fs::write(path, data).await?;
    Ok(())
}

async fn export_icons(
    banner: Option<NdsBanner>,
    options: &ExportCommand,
    dir: &Path,
) -> NintendoNTRResult<usize> {
    let banner = banner.ok_or(NintendoNTRError::NoBanner)?;
    let mut written = 0;

    if options.icon {
        let png = encode_rgba_png(&banner.icon_rgba()?, NTR_ICON_WIDTH, NTR_ICON_HEIGHT)?;
        write_output(dir, "icon.png", &png).await?;
        written += 1;
    }
    if options.icon_palette {
        let png = encode_rgba_png(&banner.palette_rgba(), NTR_ICON_PALETTE_SIZE as u32, 1)?;
        write_output(dir, "icon_palette.png", &png).await?;
        written += 1;
    }
    if options.icon_tilemap {
        let png = encode_grey_png(banner.icon_indices()?, NTR_ICON_WIDTH, NTR_ICON_HEIGHT)?;
        write_output(dir, "icon_tilemap.png", &png).await?;
        written += 1;
    }

    Ok(written)
}

async fn export_overlays(rom: &NtrRom, cpu: Cpu, dir: &Path) -> NintendoNTRResult<usize> {
    let table = rom.region_bytes(cpu.table_region());
    if table.is_empty() {
        return Ok(0);
    }

    write_output(dir, &format!("arm{}_overlay.bin", cpu.digit()), table).await?;

    let overlay_dir = dir.join("overlay");
    fs::create_dir_all(&overlay_dir).await?;

    let overlays = rom.overlays(cpu)?;
    for overlay in &overlays {
        let file = overlay.file;
        let data = &rom.data()[file.start as usize..file.end as usize];
        write_output(&overlay_dir, &overlay.file_name(cpu), data).await?;
    }

    Ok(overlays.len() + 1)
}

/// Writes the file tree below `dir/files`, skipping nodes with unsafe names and their subtrees.
async fn export_files(rom: &NtrRom, dir: &Path, pb: &ProgressBar) -> NintendoNTRResult<usize> {
    let tree = rom.fs();
    let root = dir.join("files");
    fs::create_dir_all(&root).await?;

    pb.set_length(tree.files().count() as u64);

    // children always have larger ids than their parent, so parents are resolved first
    let mut targets: Vec<Option<PathBuf>> = vec![None; tree.len()];
    targets[0] = Some(root);
    let mut written = 0;

    for node in tree.nodes().iter().skip(1) {
        let Some(parent) = node.parent.and_then(|parent| targets[parent].clone()) else {
            if node.is_file() {
                pb.inc(1);
            }
            continue;
        };

        if let Err(err) = check_name(&node.name) {
            warn!("{err}, skipping {node}");
            if node.is_file() {
                pb.inc(1);
            }
            continue;
        }

        let target = parent.join(&node.name);
        if node.is_folder() {
            fs::create_dir_all(&target).await?;
        } else {
            let data = rom.read_file(node.id)?;
            fs::write(&target, data).await?;
            written += 1;
            pb.inc(1);
        }
        targets[node.id] = Some(target);
    }

    Ok(written)
}

/// Exports everything `options` selects into `dir`. `options` should already be resolved.
pub async fn export_rom(
    rom: &NtrRom,
    options: &ExportCommand,
    dir: &Path,
    pb: &ProgressBar,
) -> NintendoNTRResult<usize> {
    if fs::metadata(dir).await.is_ok_and(|meta| !meta.is_dir()) {
        return Err(NintendoNTRError::OutputNotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).await?;

    let mut written = 0;

    if options.icon || options.icon_palette || options.icon_tilemap {
        match export_icons(rom.banner()?, options, dir).await {
            Ok(count) => written += count,
            Err(NintendoNTRError::NoBanner) => warn!("ROM has no banner, skipping the icon"),
            Err(err) => return Err(err),
        }
    }

    let regions = [
        (options.arm9, RomRegion::Arm9, "arm9.bin"),
        (options.arm7, RomRegion::Arm7, "arm7.bin"),
        (options.debug, RomRegion::DebugRom, "debug.bin"),
    ];
    for (selected, region, name) in regions {
        let bytes = rom.region_bytes(region);
        if selected && !bytes.is_empty() {
            write_output(dir, name, bytes).await?;
            written += 1;
        }
    }

    if options.arm9_overlay {
        written += export_overlays(rom, Cpu::Arm9, dir).await?;
    }
    if options.arm7_overlay {
        written += export_overlays(rom, Cpu::Arm7, dir).await?;
    }

    if options.files {
        written += export_files(rom, dir, pb).await?;
    }

    Ok(written)
}

fn output_dir(cmd: &ExportCommand, rom: &Path) -> PathBuf {
    match &cmd.output {
        Some(output) if cmd.roms.len() == 1 => output.clone(),
        Some(output) => output.join(rom.file_stem().unwrap_or(rom.as_os_str())),
        None => rom.with_extension(""),
    }
}

pub async fn export(cmd: ExportCommand, multi: MultiProgress) -> NintendoNTRResult<()> {
    let options = cmd.resolved();
    let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

    for path in &options.roms {
        let dir = output_dir(&options, path);
        let pb = multi.add(ProgressBar::new(0));
        pb.set_style(style.clone());
        pb.set_message(path.display().to_string());

        let result = match NtrRom::open(path).await {
            Ok(rom) => export_rom(&rom, &options, &dir, &pb).await,
            Err(err) => Err(err),
        };
        pb.finish_and_clear();
        multi.remove(&pb);

        match result {
            Ok(written) => info!(
                "Exported {written} files from {} to {}",
                path.display(),
                dir.display()
            ),
            Err(err) => warn!("Skipping {}: {err}", path.display()),
        }
    }

    Ok(())
}
