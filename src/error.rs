use thiserror::Error;

/// Main error type for the countdown compositor library
#[derive(Error, Debug)]
pub enum CountdownError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Animation error: {0}")]
    Animation(#[from] AnimationError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
///
/// Raised while converting an untyped template value into the typed
/// configuration model. Parsing is fail-fast: the first violation in an
/// object aborts the whole parse, before any rendering work happens.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing {field} attribute")]
    MissingField { field: String },

    #[error("{field} must be a {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("{field} should be a valid hexadecimal color string")]
    InvalidColor { field: String },

    #[error("Failed to parse template file: {path}")]
    ParseFailed { path: String },
}

/// Rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Countdown rendering was invoked on a surface that was not built
    /// from a countdown template. Reported distinctly from configuration
    /// errors.
    #[error("the surface is not configured for countdown rendering")]
    NotCountdownMode,

    #[error("invalid text")]
    InvalidText,

    #[error("no usable font: {reason}")]
    FontUnavailable { reason: String },

    #[error("failed to load font file {path}: {reason}")]
    FontLoadFailed { path: String, reason: String },

    /// A duration unit holds a value the two-digit glyph table cannot
    /// represent. The clock never produces these; only a directly injected
    /// start duration can.
    #[error("{unit} value {value} is outside the glyph range 0..100")]
    DigitOutOfRange { unit: &'static str, value: u32 },
}

/// Animation assembly errors.
#[derive(Error, Debug)]
pub enum AnimationError {
    #[error("no frames to assemble")]
    NoFrames,

    #[error("frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    PageSizeMismatch {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("GIF encoding failed: {reason}")]
    EncodingFailed { reason: String },
}

/// Convenience type alias for Results using CountdownError
pub type Result<T> = std::result::Result<T, CountdownError>;

impl ConfigError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            field: field.into(),
            expected,
        }
    }

    pub fn invalid_color(field: impl Into<String>) -> Self {
        Self::InvalidColor {
            field: field.into(),
        }
    }
}
