use std::path::PathBuf;
use std::{error, fmt, io};

/// Error type for map loading, saving and the layer-data codec.
#[derive(Debug)]
pub enum MapError {
    /// File I/O error, with the path involved.
    Io { path: PathBuf, source: io::Error },
    /// JSON parse or serialize error.
    Json(serde_json::Error),
    /// Unsupported file format (non-JSON).
    UnsupportedFormat(String),
    /// Map `orientation` attribute is none of the four known values.
    UnknownOrientation(String),
    /// Map `renderorder` attribute is none of the four known values.
    UnknownRenderOrder(String),
    /// Map `staggeraxis` attribute is neither `x` nor `y`.
    UnknownStaggerAxis(String),
    /// Map `staggerindex` attribute is neither `odd` nor `even`.
    UnknownStaggerIndex(String),
    /// Layer data carries an encoding other than `base64`.
    UnsupportedEncoding { layer: String, encoding: String },
    /// Layer data carries a compression other than `zlib`.
    UnsupportedCompression { layer: String, compression: String },
    /// Malformed base64 text.
    CorruptBase64(String),
    /// Malformed deflate stream.
    CorruptStream(String),
    /// Two tilesets claim overlapping gid ranges.
    TilesetOverlap { first: String, second: String },
    /// A layer's plain data array does not match the map dimensions.
    InvalidLayerSize {
        layer: String,
        expected: usize,
        actual: usize,
    },
    /// Structurally invalid map document.
    InvalidMap(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            MapError::Json(err) => write!(f, "JSON error: {}", err),
            MapError::UnsupportedFormat(path) => {
                write!(f, "Unsupported file format (expected .json): {}", path)
            }
            MapError::UnknownOrientation(s) => write!(f, "Unknown orientation: {:?}", s),
            MapError::UnknownRenderOrder(s) => write!(f, "Unknown render order: {:?}", s),
            MapError::UnknownStaggerAxis(s) => write!(f, "Unknown stagger axis: {:?}", s),
            MapError::UnknownStaggerIndex(s) => write!(f, "Unknown stagger index: {:?}", s),
            MapError::UnsupportedEncoding { layer, encoding } => write!(
                f,
                "Layer '{}': unsupported encoding {:?}, use base64",
                layer, encoding
            ),
            MapError::UnsupportedCompression { layer, compression } => write!(
                f,
                "Layer '{}': unsupported compression {:?}, use zlib",
                layer, compression
            ),
            MapError::CorruptBase64(reason) => write!(f, "Corrupt base64 data: {}", reason),
            MapError::CorruptStream(reason) => write!(f, "Corrupt compressed stream: {}", reason),
            MapError::TilesetOverlap { first, second } => write!(
                f,
                "Tilesets '{}' and '{}' claim overlapping gid ranges",
                first, second
            ),
            MapError::InvalidLayerSize {
                layer,
                expected,
                actual,
            } => write!(
                f,
                "Layer '{}': data holds {} gids, map dimensions need {}",
                layer, actual, expected
            ),
            MapError::InvalidMap(reason) => write!(f, "Invalid map: {}", reason),
        }
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::Json(err)
    }
}

impl error::Error for MapError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Json(err) => Some(err),
            _ => None,
        }
    }
}
