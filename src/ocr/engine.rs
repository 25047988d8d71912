use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable, TesseractSettings};

/// Runs Tesseract on a preprocessed image and returns the plain text.
pub fn recognize_text(img: &GrayImage, settings: &TesseractSettings) -> Result<String> {
    let tesseract_exe = find_tesseract_executable(settings)?;

    // Save image to temporary file
    let temp_input = NamedTempFile::with_suffix(".png")?;
    img.save(temp_input.path())
        .context("Failed to write temporary OCR input")?;

    let mut command = Command::new(&tesseract_exe);
    command.arg(temp_input.path()).arg("stdout");
    if let Some(tessdata_dir) = find_tessdata_dir(settings) {
        command.arg("--tessdata-dir").arg(tessdata_dir);
    }
    command
        .arg("-l")
        .arg(&settings.languages)
        .arg("--psm")
        .arg(settings.page_segmentation_mode.to_string());

    let output = command
        .output()
        .with_context(|| format!("Failed to run {}", tesseract_exe.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("Tesseract failed: {}", stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_executable_is_error() {
        let dir = tempdir().unwrap();
        let settings = TesseractSettings {
            executable: Some(dir.path().join("absent")),
            ..Default::default()
        };
        let img = GrayImage::new(2, 2);
        assert!(recognize_text(&img, &settings).is_err());
    }
}
