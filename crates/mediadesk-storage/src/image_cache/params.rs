//! Image request parameters.
//!
//! Each parameter accepts the literal `default`. The canonical string of a
//! parsed parameter is used verbatim as a cache path segment.

use std::fmt;
use std::str::FromStr;

use mediadesk_core::{AppError, AppResult};

/// Token meaning "no explicit value".
pub const DEFAULT_TOKEN: &str = "default";

/// Requested output dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// Keep the source dimensions.
    Default,
    /// Target box; a `None` side is derived from the aspect ratio.
    Box {
        /// Target width.
        width: Option<u32>,
        /// Target height.
        height: Option<u32>,
    },
}

impl FromStr for ImageSize {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == DEFAULT_TOKEN {
            return Ok(Self::Default);
        }
        let invalid = || AppError::validation(format!("Invalid image size: '{s}'"));
        let (w, h) = s.split_once('x').ok_or_else(invalid)?;
        let side = |v: &str| -> AppResult<Option<u32>> {
            if v == "?" {
                return Ok(None);
            }
            match v.parse::<u32>() {
                Ok(n) if n > 0 => Ok(Some(n)),
                _ => Err(invalid()),
            }
        };
        Ok(Self::Box {
            width: side(w)?,
            height: side(h)?,
        })
    }
}

impl ImageSize {
    /// Reject a box with a side larger than `max` pixels.
    pub fn ensure_within(&self, max: u32) -> AppResult<()> {
        if let Self::Box { width, height } = *self {
            if width.max(height).is_some_and(|side| side > max) {
                return Err(AppError::validation(format!(
                    "Image size '{self}' exceeds the {max}px limit"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: &Option<u32>| v.map_or_else(|| "?".to_string(), |n| n.to_string());
        match self {
            Self::Default => f.write_str(DEFAULT_TOKEN),
            Self::Box { width, height } => write!(f, "{}x{}", side(width), side(height)),
        }
    }
}

/// How the source is fitted into the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Scale to fit inside the box, preserving aspect ratio.
    #[default]
    Fit,
    /// Scale to cover the box, preserving aspect ratio, no cropping.
    Fill,
    /// Cover the box and crop the overflow to exact dimensions.
    Exact,
    /// Resize to the box ignoring aspect ratio.
    Stretch,
    /// Like `Fit` but never enlarge.
    ShrinkOnly,
}

impl FitMode {
    /// Return the mode as a token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Fill => "fill",
            Self::Exact => "exact",
            Self::Stretch => "stretch",
            Self::ShrinkOnly => "shrink_only",
        }
    }
}

impl FromStr for FitMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fit" => Ok(Self::Fit),
            "fill" => Ok(Self::Fill),
            "exact" => Ok(Self::Exact),
            "stretch" => Ok(Self::Stretch),
            "shrink_only" | "shrink-only" => Ok(Self::ShrinkOnly),
            _ => Err(AppError::validation(format!("Invalid image format: '{s}'"))),
        }
    }
}

/// Supported image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// JPEG (`jpg` is accepted as an alias).
    Jpeg,
    /// PNG.
    Png,
    /// GIF.
    Gif,
}

impl ImageType {
    /// Parse a file extension or type token.
    pub fn from_extension(ext: &str) -> AppResult<Self> {
        match ext.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            _ => Err(AppError::unsupported_image_type(format!(
                "Unsupported image type '{ext}', expected one of jpeg, jpg, png, gif"
            ))),
        }
    }

    /// Parse the extension of a logical path.
    pub fn from_path(path: &str) -> AppResult<Self> {
        let basename = path.rsplit('/').next().unwrap_or(path);
        let ext = basename.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
        Self::from_extension(ext)
    }

    /// The encoder used for this type.
    pub fn format(&self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Gif => image::ImageFormat::Gif,
        }
    }

    /// MIME type of encoded output.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }
}

/// A parsed `size`/`format`/`type` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Requested dimensions.
    pub size: ImageSize,
    /// Requested fit mode, `None` for default.
    pub fit: Option<FitMode>,
    /// Requested output type, `None` to keep the source type.
    pub output: Option<ImageType>,
    type_token: String,
}

impl ImageRequest {
    /// Parse the three raw tokens. Fails before any I/O on unsupported
    /// output types.
    pub fn parse(size: &str, format: &str, image_type: &str) -> AppResult<Self> {
        let size = size.parse()?;
        let fit = match format {
            DEFAULT_TOKEN => None,
            other => Some(other.parse()?),
        };
        let type_token = image_type.to_lowercase();
        let output = match type_token.as_str() {
            DEFAULT_TOKEN => None,
            other => Some(ImageType::from_extension(other)?),
        };
        Ok(Self {
            size,
            fit,
            output,
            type_token,
        })
    }

    /// A request for the untouched original.
    pub fn original() -> Self {
        Self {
            size: ImageSize::Default,
            fit: None,
            output: None,
            type_token: DEFAULT_TOKEN.to_string(),
        }
    }

    /// Whether the original file satisfies this request for a source of
    /// type `source`.
    pub fn is_passthrough(&self, source: ImageType) -> bool {
        self.size == ImageSize::Default
            && self.fit.is_none()
            && self.output.is_none_or(|out| out == source)
    }

    /// Output type for a source of type `source`.
    pub fn output_for(&self, source: ImageType) -> ImageType {
        self.output.unwrap_or(source)
    }

    /// The `{size}/{format}/{type}` cache path segments.
    pub fn segments(&self) -> [String; 3] {
        [
            self.size.to_string(),
            self.fit
                .map_or(DEFAULT_TOKEN, |f| f.as_str())
                .to_string(),
            self.type_token.clone(),
        ]
    }
}
