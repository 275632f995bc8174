//! Shell command handlers for the batch resizer.

use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::core::{ImageId, ImageSize};
use crate::processing::{BatchCoordinator, ImageSnapshot, ResizeStatus};
use crate::utils::{ResizerError, ResizerResult, read_input, save_archive, save_artifact};

pub const HELP: &str = "\
Commands:
  add <path>...          select image files
  list                   show selected images and export status
  width <id> <px>        request a new width
  height <id> <px>       request a new height
  size <id> <w> <h>      request an exact size
  lock <id> on|off       toggle the aspect ratio lock
  save <id> <dir>        write the current preview to <dir>
  zip <dir>              write the batch archive to <dir>
  remove <id>            remove one image
  clear                  remove every image
  help                   show this help
  quit                   exit";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Vec<PathBuf>),
    List,
    Width { id: ImageId, width: u32 },
    Height { id: ImageId, height: u32 },
    Size { id: ImageId, size: ImageSize },
    Lock { id: ImageId, keep: bool },
    Save { id: ImageId, dir: PathBuf },
    Zip { dir: PathBuf },
    Remove(ImageId),
    Clear,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> ResizerResult<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("add", paths) if !paths.is_empty() => Self::Add(paths.iter().map(PathBuf::from).collect()),
            ("add", _) => return Err(ResizerError::usage("add <path>...")),
            ("list" | "ls", []) => Self::List,
            ("width", [id, px]) => Self::Width { id: id.parse()?, width: pixels(px)? },
            ("width", _) => return Err(ResizerError::usage("width <id> <px>")),
            ("height", [id, px]) => Self::Height { id: id.parse()?, height: pixels(px)? },
            ("height", _) => return Err(ResizerError::usage("height <id> <px>")),
            ("size", [id, w, h]) => Self::Size {
                id: id.parse()?,
                size: ImageSize::new(pixels(w)?, pixels(h)?),
            },
            ("size", _) => return Err(ResizerError::usage("size <id> <w> <h>")),
            ("lock", [id, toggle]) => Self::Lock { id: id.parse()?, keep: on_off(toggle)? },
            ("lock", _) => return Err(ResizerError::usage("lock <id> on|off")),
            ("save", [id, dir]) => Self::Save { id: id.parse()?, dir: PathBuf::from(dir) },
            ("save", _) => return Err(ResizerError::usage("save <id> <dir>")),
            ("zip", [dir]) => Self::Zip { dir: PathBuf::from(dir) },
            ("zip", _) => return Err(ResizerError::usage("zip <dir>")),
            ("remove" | "rm", [id]) => Self::Remove(id.parse()?),
            ("remove" | "rm", _) => return Err(ResizerError::usage("remove <id>")),
            ("clear", []) => Self::Clear,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            (other, _) => return Err(ResizerError::usage(format!("unknown command '{other}', try 'help'"))),
        };
        Ok(Some(command))
    }

    /// Destructive commands the shell confirms before running.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Self::Remove(_) | Self::Clear)
    }
}

fn pixels(raw: &str) -> ResizerResult<u32> {
    raw.parse()
        .map_err(|_| ResizerError::usage(format!("'{raw}' is not a pixel count")))
}

fn on_off(raw: &str) -> ResizerResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(ResizerError::usage(format!("expected on|off, got '{raw}'"))),
    }
}

/// Runs one command against the batch and returns the text to print.
pub async fn execute(batch: &BatchCoordinator, command: Command) -> ResizerResult<String> {
    debug!("Executing {:?}", command);
    match command {
        Command::Add(paths) => add(batch, paths).await,
        Command::List => Ok(list(batch)),
        Command::Width { id, width } => requested(id, batch.request_width(id, width)),
        Command::Height { id, height } => requested(id, batch.request_height(id, height)),
        Command::Size { id, size } => requested(id, batch.request_size(id, size)),
        Command::Lock { id, keep } => {
            batch.set_keep_aspect_ratio(id, keep)?;
            Ok(format!("Aspect ratio lock for {} is {}", id, if keep { "on" } else { "off" }))
        }
        Command::Save { id, dir } => {
            let artifact = batch
                .artifact(id)
                .ok_or_else(|| ResizerError::state(format!("No preview available for {}", id)))?;
            let path = save_artifact(&dir, &artifact).await?;
            Ok(format!("Saved {} ({}) to {}", id, format_bytes(artifact.byte_size), path.display()))
        }
        Command::Zip { dir } => {
            let archive = batch.export_archive()?;
            let path = save_archive(&dir, &archive, &batch.config().archive_name).await?;
            Ok(format!(
                "Saved {} file(s), {} to {}",
                archive.entry_count,
                format_bytes(archive.byte_size),
                path.display()
            ))
        }
        Command::Remove(id) => {
            batch.remove_image(id)?;
            Ok(format!("Removed {}", id))
        }
        Command::Clear => {
            batch.clear_all();
            Ok("Cleared all images".to_string())
        }
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

async fn add(batch: &BatchCoordinator, paths: Vec<PathBuf>) -> ResizerResult<String> {
    let mut files = Vec::with_capacity(paths.len());
    let mut report = String::new();

    for path in &paths {
        match read_input(path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                let _ = writeln!(report, "Skipped {}: {}", path.display(), e);
            }
        }
    }

    if files.is_empty() {
        return Err(ResizerError::IO(report.trim_end().to_string()));
    }

    let names: Vec<String> = files.iter().map(|(name, _)| name.clone()).collect();
    let ids = batch.add_images(files);
    for (id, name) in ids.iter().zip(&names) {
        let _ = writeln!(report, "Added {} {}", id, name);
    }
    Ok(report.trim_end().to_string())
}

fn requested(id: ImageId, result: ResizerResult<ImageSize>) -> ResizerResult<String> {
    let size = result?;
    Ok(format!("Resizing {} to {}", id, size))
}

fn list(batch: &BatchCoordinator) -> String {
    let images = batch.images();
    let mut out = String::new();

    if images.is_empty() {
        out.push_str("No images selected\n");
    }
    for image in &images {
        let _ = writeln!(out, "{}", describe(image));
    }

    let _ = write!(out, "In flight: {}  ", batch.busy_count());
    match batch.export_archive() {
        Ok(archive) => {
            let _ = write!(
                out,
                "Archive: {} file(s), {}",
                archive.entry_count,
                format_bytes(archive.byte_size)
            );
        }
        Err(reason) => {
            let _ = write!(out, "Archive unavailable ({})", reason);
        }
    }
    out
}

fn describe(image: &ImageSnapshot) -> String {
    let status = match image.status {
        ResizeStatus::Pending => "pending",
        ResizeStatus::Decoding => "decoding",
        ResizeStatus::Ready => "ready",
        ResizeStatus::Resizing => "resizing",
        ResizeStatus::Failed => "failed",
        ResizeStatus::Removed => "removed",
    };

    let mut line = format!("{:<5} {:<24} {:<9}", image.id.to_string(), image.name, status);
    if let Some(natural) = image.natural_size {
        let _ = write!(line, " {} -> {}", natural, image.target_size);
        if image.requested_size != image.target_size {
            let _ = write!(line, " (requested {})", image.requested_size);
        }
    }
    if let Some(preview) = &image.preview {
        let _ = write!(line, "  {}", format_bytes(preview.byte_size));
    }
    if image.keep_aspect_ratio {
        line.push_str("  [locked]");
    }
    if let Some(error) = &image.error {
        let _ = write!(line, "  error: {}", error);
    }
    line
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
