use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::process::Command;

/// Common install locations checked after `PATH`.
const COMMON_TESSERACT_PATHS: [&str; 5] = [
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Where to find Tesseract and which languages to load.
#[derive(Debug, Clone)]
pub struct TesseractSettings {
    /// Explicit executable path; searched for when `None`
    pub executable: Option<PathBuf>,
    /// Explicit tessdata directory; falls back to `TESSDATA_PREFIX`
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract `-l` argument, e.g. `eng` or `eng+fra+deu`
    pub languages: String,
    /// Tesseract `--psm` page segmentation mode
    pub page_segmentation_mode: u8,
}

impl Default for TesseractSettings {
    fn default() -> Self {
        Self {
            executable: None,
            tessdata_dir: None,
            languages: "eng".to_string(),
            page_segmentation_mode: 6,
        }
    }
}

fn responds_to_version(exe: &PathBuf) -> bool {
    Command::new(exe)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Finds the Tesseract executable: explicit path, then `PATH`, then common
/// install locations.
pub fn find_tesseract_executable(settings: &TesseractSettings) -> Result<PathBuf> {
    if let Some(exe) = &settings.executable {
        if exe.exists() {
            return Ok(exe.clone());
        }
        return Err(anyhow!(
            "Configured Tesseract executable not found: {}",
            exe.display()
        ));
    }

    let on_path = PathBuf::from("tesseract");
    if responds_to_version(&on_path) {
        return Ok(on_path);
    }

    for path in &COMMON_TESSERACT_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR, add it to PATH, \
         or set \"tesseract_path\" in config.json."
    ))
}

/// Tessdata directory to pass explicitly, if any.
///
/// `None` lets Tesseract use its built-in default.
pub fn find_tessdata_dir(settings: &TesseractSettings) -> Option<PathBuf> {
    if let Some(dir) = &settings.tessdata_dir {
        return Some(dir.clone());
    }
    let prefix = PathBuf::from(std::env::var_os("TESSDATA_PREFIX")?);
    let nested = prefix.join("tessdata");
    if nested.is_dir() { Some(nested) } else { Some(prefix) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_missing_executable_is_error() {
        let dir = tempdir().unwrap();
        let settings = TesseractSettings {
            executable: Some(dir.path().join("no-such-tesseract")),
            ..Default::default()
        };
        let err = find_tesseract_executable(&settings).unwrap_err();
        assert!(err.to_string().contains("no-such-tesseract"));
    }

    #[test]
    fn test_explicit_existing_executable_is_used() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("tesseract");
        std::fs::write(&exe, b"").unwrap();
        let settings = TesseractSettings {
            executable: Some(exe.clone()),
            ..Default::default()
        };
        assert_eq!(find_tesseract_executable(&settings).unwrap(), exe);
    }

    #[test]
    fn test_explicit_tessdata_dir_wins() {
        let settings = TesseractSettings {
            tessdata_dir: Some(PathBuf::from("/data/tess")),
            ..Default::default()
        };
        assert_eq!(
            find_tessdata_dir(&settings),
            Some(PathBuf::from("/data/tess"))
        );
    }
}
