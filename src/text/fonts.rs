//! Font resolution and caching.
//!
//! Fonts are loaded from an explicit `fontFile` path when the configuration
//! supplies one, otherwise from a probe list of well-known system font
//! locations. Loaded fonts are cached per catalog, and the catalog is owned
//! by the engine instance that uses it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::FontVec;
use tracing::debug;

use crate::error::RenderError;

/// Default glyph size in pixels when the font spec carries none.
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Well-known system font locations, probed in order when no font file is
/// configured.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/gnu-free/FreeSans.ttf",
];

/// First resolvable system font, if the host has one.
///
/// Exposed so tests that need real rasterization can skip cleanly on hosts
/// without fonts.
pub fn system_font_path() -> Option<PathBuf> {
    SYSTEM_FONT_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// A parsed font spec string, e.g. `"DejaVu Sans 28"`.
///
/// The trailing number is the pixel size; the family part is informational
/// only (glyph lookup goes through the resolved font file).
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: Option<String>,
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: None,
            size: DEFAULT_FONT_SIZE,
        }
    }
}

impl FontSpec {
    pub fn parse(spec: Option<&str>) -> FontSpec {
        let Some(spec) = spec.map(str::trim).filter(|s| !s.is_empty()) else {
            return FontSpec::default();
        };

        // bare size, e.g. "32"
        if let Ok(size) = spec.parse::<f32>() {
            if size > 0.0 {
                return FontSpec { family: None, size };
            }
        }

        // family followed by size, e.g. "DejaVu Sans 28"
        if let Some((family, tail)) = spec.rsplit_once(char::is_whitespace) {
            if let Ok(size) = tail.parse::<f32>() {
                if size > 0.0 {
                    return FontSpec {
                        family: Some(family.trim().to_string()),
                        size,
                    };
                }
            }
        }

        FontSpec {
            family: Some(spec.to_string()),
            size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Instance-scoped font loader and cache.
#[derive(Default)]
pub struct FontCatalog {
    cache: HashMap<PathBuf, Arc<FontVec>>,
    fallback: Option<Arc<FontVec>>,
}

impl FontCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a font: the given file when present, the system fallback
    /// otherwise. Results are cached for the catalog's lifetime.
    pub fn resolve(
        &mut self,
        font_file: Option<&Path>,
    ) -> std::result::Result<Arc<FontVec>, RenderError> {
        match font_file {
            Some(path) => {
                if let Some(font) = self.cache.get(path) {
                    return Ok(Arc::clone(font));
                }
                let font = Arc::new(load_font(path)?);
                self.cache.insert(path.to_path_buf(), Arc::clone(&font));
                Ok(font)
            }
            None => self.fallback(),
        }
    }

    fn fallback(&mut self) -> std::result::Result<Arc<FontVec>, RenderError> {
        if let Some(font) = &self.fallback {
            return Ok(Arc::clone(font));
        }

        for candidate in SYSTEM_FONT_PATHS {
            let path = Path::new(candidate);
            if !path.is_file() {
                continue;
            }
            match load_font(path) {
                Ok(font) => {
                    debug!("using system font {candidate}");
                    let font = Arc::new(font);
                    self.fallback = Some(Arc::clone(&font));
                    return Ok(font);
                }
                Err(_) => continue,
            }
        }

        Err(RenderError::FontUnavailable {
            reason: "no font file configured and no known system font found".to_string(),
        })
    }
}

fn load_font(path: &Path) -> std::result::Result<FontVec, RenderError> {
    let bytes = std::fs::read(path).map_err(|e| RenderError::FontLoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    FontVec::try_from_vec(bytes).map_err(|e| RenderError::FontLoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_spec_defaults() {
        assert_eq!(FontSpec::parse(None), FontSpec::default());
        assert_eq!(FontSpec::parse(Some("  ")), FontSpec::default());
    }

    #[test]
    fn test_font_spec_family_and_size() {
        let spec = FontSpec::parse(Some("DejaVu Sans 28"));
        assert_eq!(spec.family.as_deref(), Some("DejaVu Sans"));
        assert_eq!(spec.size, 28.0);
    }

    #[test]
    fn test_font_spec_bare_size() {
        let spec = FontSpec::parse(Some("32"));
        assert_eq!(spec.family, None);
        assert_eq!(spec.size, 32.0);
    }

    #[test]
    fn test_font_spec_family_only() {
        let spec = FontSpec::parse(Some("Monospace"));
        assert_eq!(spec.family.as_deref(), Some("Monospace"));
        assert_eq!(spec.size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_missing_font_file_is_an_error() {
        let mut catalog = FontCatalog::new();
        let err = catalog
            .resolve(Some(Path::new("/nonexistent/font.ttf")))
            .unwrap_err();
        assert!(matches!(err, RenderError::FontLoadFailed { .. }));
    }

    #[test]
    fn test_fallback_resolves_when_host_has_fonts() {
        let Some(_) = system_font_path() else {
            return;
        };
        let mut catalog = FontCatalog::new();
        assert!(catalog.resolve(None).is_ok());
        // second resolve hits the cache
        assert!(catalog.resolve(None).is_ok());
    }
}
