//! Image inputs: path expansion, MIME detection, loading.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::ExtractionError;

/// Extensions picked up when scanning a directory.
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// MIME type for a supported image path, by extension.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

/// Expands the given paths into the ordered list of images to process.
///
/// Files are kept in argument order (whatever their extension; unsupported
/// ones fail later, per image). Directories contribute their image files
/// sorted by name. Subdirectories are not descended into.
pub fn collect_image_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("Failed to read directory: {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_image_file(p))
                .collect();
            entries.sort();
            crate::log(&format!(
                "Found {} image(s) in {}",
                entries.len(),
                path.display()
            ));
            images.extend(entries);
        } else if path.exists() {
            images.push(path.clone());
        } else {
            return Err(anyhow!("No such file or directory: {}", path.display()));
        }
    }

    Ok(images)
}

/// Asks for a directory path on stdin.
pub fn prompt_for_directory() -> Result<PathBuf> {
    print!("Enter the directory containing leaderboard images: ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read directory path")?;

    // Drag-and-drop into a terminal often wraps the path in quotes
    let trimmed = line.trim().trim_matches(|c| c == '"' || c == '\'');
    if trimmed.is_empty() {
        return Err(anyhow!("No directory given"));
    }

    let dir = PathBuf::from(trimmed);
    if !dir.is_dir() {
        return Err(anyhow!("Not a directory: {}", dir.display()));
    }
    Ok(dir)
}

/// One image ready to hand to a source adapter.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// File name used in logs and summaries
    pub label: String,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl ImageInput {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>, mime_type: &'static str) -> Self {
        Self {
            label: label.into(),
            bytes,
            mime_type,
        }
    }

    /// Reads an image from disk. Failures are per-image errors.
    pub fn load(path: &Path) -> Result<Self, ExtractionError> {
        let mime_type = mime_type_for(path).ok_or_else(|| {
            ExtractionError::Image(format!(
                "unsupported image type (expected png, jpg or jpeg): {}",
                path.display()
            ))
        })?;
        let bytes = fs::read(path).map_err(|e| {
            ExtractionError::Image(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(Self::new(label_for(path), bytes, mime_type))
    }
}

pub fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
