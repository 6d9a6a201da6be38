//! Caption font resolution.
//!
//! Faces are looked up from a configured list of candidate files (first
//! existing path wins), read into memory once, and shared read-only through
//! an `Arc<FontSet>`. A weight whose file cannot be found or parsed falls back
//! to the built-in Spleen bitmap face.

use ab_glyph::FontArc;
use log::{info, warn};
use std::path::{Path, PathBuf};

use super::FontWeight;
use crate::error::PosterError;

/// File names of the caption faces.
pub const REGULAR_FILE: &str = "PlayfairDisplay-Regular.ttf";
pub const BOLD_FILE: &str = "PlayfairDisplay-Bold.ttf";

/// Directories searched by [`FontConfig::default`], in order.
const DEFAULT_DIRS: &[&str] = &["assets/fonts", "fonts", "/usr/share/fonts/truetype/playfair"];

/// Candidate font files for each weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    pub regular: Vec<PathBuf>,
    pub bold: Vec<PathBuf>,
}

impl FontConfig {
    /// Build candidates by joining the standard file names onto each directory.
    pub fn from_dirs<P: AsRef<Path>>(dirs: &[P]) -> Self {
        Self {
            regular: dirs.iter().map(|d| d.as_ref().join(REGULAR_FILE)).collect(),
            bold: dirs.iter().map(|d| d.as_ref().join(BOLD_FILE)).collect(),
        }
    }

    /// No candidates at all: always renders with the bitmap face.
    pub fn none() -> Self {
        Self {
            regular: Vec::new(),
            bold: Vec::new(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self::from_dirs(DEFAULT_DIRS)
    }
}

/// A resolved face.
#[derive(Clone)]
pub enum Face {
    /// Outline font parsed from file bytes held in memory.
    Outline(FontArc),
    /// Built-in Spleen 12x24 bitmap face.
    Bitmap,
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::Outline(_) => f.write_str("Face::Outline"),
            Face::Bitmap => f.write_str("Face::Bitmap"),
        }
    }
}

/// Regular and bold faces for caption rendering.
#[derive(Debug, Clone)]
pub struct FontSet {
    regular: Face,
    bold: Face,
}

impl FontSet {
    /// Resolve every weight from the configured candidates.
    ///
    /// Never fails: a missing face is logged as `FontUnavailable` and replaced
    /// with the bitmap face.
    pub fn load(config: &FontConfig) -> Self {
        Self {
            regular: resolve_face(&config.regular, "regular"),
            bold: resolve_face(&config.bold, "bold"),
        }
    }

    /// Bitmap face for every weight.
    pub fn fallback() -> Self {
        Self {
            regular: Face::Bitmap,
            bold: Face::Bitmap,
        }
    }

    /// Build from font file bytes already in memory.
    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> Result<Self, PosterError> {
        let parse = |bytes: Vec<u8>, label: &str| {
            FontArc::try_from_vec(bytes)
                .map(Face::Outline)
                .map_err(|e| PosterError::FontUnavailable(format!("{} face: {}", label, e)))
        };
        Ok(Self {
            regular: parse(regular, "regular")?,
            bold: parse(bold, "bold")?,
        })
    }

    pub fn face(&self, weight: FontWeight) -> &Face {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    /// True if this weight renders with its outline face rather than the fallback.
    pub fn is_embedded(&self, weight: FontWeight) -> bool {
        matches!(self.face(weight), Face::Outline(_))
    }
}

fn resolve_face(candidates: &[PathBuf], label: &str) -> Face {
    match load_first(candidates) {
        Ok((path, font)) => {
            info!("Loaded {} caption font from {}", label, path.display());
            Face::Outline(font)
        }
        Err(e) => {
            warn!("{}; rendering {} captions with the bitmap face", e, label);
            Face::Bitmap
        }
    }
}

fn load_first(candidates: &[PathBuf]) -> Result<(PathBuf, FontArc), PosterError> {
    let path = candidates.iter().find(|p| p.is_file()).ok_or_else(|| {
        PosterError::FontUnavailable(format!(
            "none of {} candidate path(s) exist",
            candidates.len()
        ))
    })?;

    let bytes = std::fs::read(path)?;
    let font = FontArc::try_from_vec(bytes).map_err(|e| {
        PosterError::FontUnavailable(format!("{} is not a usable font: {}", path.display(), e))
    })?;

    Ok((path.clone(), font))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dirs_orders_candidates() {
        let config = FontConfig::from_dirs(&["a", "b"]);
        assert_eq!(
            config.regular,
            vec![
                PathBuf::from("a").join(REGULAR_FILE),
                PathBuf::from("b").join(REGULAR_FILE)
            ]
        );
        assert_eq!(config.bold[1], PathBuf::from("b").join(BOLD_FILE));
    }

    #[test]
    fn test_missing_fonts_fall_back() {
        let set = FontSet::load(&FontConfig::from_dirs(&["/definitely/not/here"]));
        assert!(!set.is_embedded(FontWeight::Regular));
        assert!(!set.is_embedded(FontWeight::Bold));
    }

    #[test]
    fn test_garbage_bytes_are_font_unavailable() {
        let err = FontSet::from_bytes(vec![0, 1, 2, 3], vec![]).unwrap_err();
        assert_eq!(err.kind(), "FontUnavailable");
    }

    #[test]
    fn test_unparseable_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("mapposter-fonts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(REGULAR_FILE), b"not a font").unwrap();

        let set = FontSet::load(&FontConfig::from_dirs(&[&dir]));
        assert!(!set.is_embedded(FontWeight::Regular));

        std::fs::remove_dir_all(&dir).ok();
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts").join(name)
    }

    #[test]
    fn test_from_bytes_resolves_outline_faces() {
        let regular = std::fs::read(fixture("DejaVuSans.ttf")).unwrap();
        let bold = std::fs::read(fixture("DejaVuSans-Bold.ttf")).unwrap();
        let set = FontSet::from_bytes(regular, bold).unwrap();

        assert!(matches!(set.face(FontWeight::Regular), Face::Outline(_)));
        assert!(matches!(set.face(FontWeight::Bold), Face::Outline(_)));
        assert!(set.is_embedded(FontWeight::Regular));
        assert!(set.is_embedded(FontWeight::Bold));
    }

    #[test]
    fn test_load_takes_first_existing_candidate() {
        let config = FontConfig {
            regular: vec![PathBuf::from("/definitely/not/here.ttf"), fixture("DejaVuSans.ttf")],
            bold: vec![fixture("DejaVuSans-Bold.ttf")],
        };
        let set = FontSet::load(&config);
        assert!(set.is_embedded(FontWeight::Regular));
        assert!(set.is_embedded(FontWeight::Bold));
    }

    #[test]
    fn test_one_missing_weight_falls_back_alone() {
        let config = FontConfig {
            regular: vec![fixture("DejaVuSans.ttf")],
            bold: Vec::new(),
        };
        let set = FontSet::load(&config);
        assert!(set.is_embedded(FontWeight::Regular));
        assert!(!set.is_embedded(FontWeight::Bold));
    }
}
