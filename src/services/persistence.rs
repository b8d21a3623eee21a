//! Persistence service: snapshot load at startup, snapshot save per tick.
//!
//! DESIGN
//! ======
//! A snapshot is two artifacts: a small JSON metadata record (position,
//! direction, color) and a PNG of the full bitmap. The scheduler clones the
//! canvas under its lock and hands the copy here, so both artifacts always
//! describe the same instant. File reads, decoding, encoding and writes run
//! on the blocking pool; each artifact is written to a sibling temp file and
//! renamed.
//!
//! ERROR HANDLING
//! ==============
//! A missing or malformed metadata record is fatal at startup. A missing or
//! unreadable bitmap is a first run: the whole snapshot is discarded and
//! the canvas starts fresh. Every save error is fatal to the caller; there
//! is no retry.

use std::io;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::canvas::{CANVAS_HEIGHT, CANVAS_WIDTH, CanvasState, Direction, Position, Rgb, Walker};

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to read metadata {}: {source}", path.display())]
    ReadMetadata { path: PathBuf, source: io::Error },
    #[error("malformed metadata {}: {source}", path.display())]
    ParseMetadata { path: PathBuf, source: serde_json::Error },
    #[error("invalid metadata {}: {reason}", path.display())]
    InvalidMetadata { path: PathBuf, reason: String },
    #[error("failed to encode metadata: {0}")]
    EncodeMetadata(#[source] serde_json::Error),
    #[error("failed to encode bitmap: {0}")]
    EncodeBitmap(#[source] image::ImageError),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("snapshot task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Why a stored bitmap could not be used. Never fatal.
#[derive(Debug, thiserror::Error)]
enum BitmapUnavailable {
    #[error("bitmap artifact not found")]
    Missing,
    #[error("bitmap artifact unreadable: {0}")]
    Unreadable(#[source] io::Error),
    #[error("bitmap artifact could not be decoded: {0}")]
    Decode(#[source] image::ImageError),
    #[error("bitmap is {width}x{height}, expected {}x{}", CANVAS_WIDTH, CANVAS_HEIGHT)]
    WrongSize { width: u32, height: u32 },
}

// =============================================================================
// METADATA RECORD
// =============================================================================

/// On-disk metadata. Field names and the numeric direction code are kept
/// compatible with existing `data.json` files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MetadataRecord {
    #[serde(rename = "CurPos")]
    pub(crate) position: [i64; 2],
    #[serde(rename = "CurDir")]
    pub(crate) direction: u8,
    #[serde(rename = "CurColor")]
    pub(crate) color: [u8; 3],
}

impl From<Walker> for MetadataRecord {
    fn from(walker: Walker) -> Self {
        Self {
            position: [i64::from(walker.position.x), i64::from(walker.position.y)],
            direction: walker.direction.into(),
            color: walker.color.0,
        }
    }
}

impl MetadataRecord {
    /// Check ranges that JSON types alone don't enforce.
    fn into_walker(self) -> Result<Walker, String> {
        let [x, y] = self.position;
        let in_range = |v: i64, limit: u32| match u32::try_from(v) {
            Ok(v) if v < limit => Some(v),
            _ => None,
        };
        let (Some(px), Some(py)) = (in_range(x, CANVAS_WIDTH), in_range(y, CANVAS_HEIGHT)) else {
            return Err(format!("position ({x}, {y}) outside {CANVAS_WIDTH}x{CANVAS_HEIGHT} canvas"));
        };
        let direction =
            Direction::try_from(self.direction).map_err(|code| format!("unknown direction code {code}"))?;
        Ok(Walker { position: Position::new(px, py), direction, color: Rgb(self.color) })
    }
}

// =============================================================================
// SNAPSHOT STORE
// =============================================================================

/// Locations of the two snapshot artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    data_path: PathBuf,
    pic_path: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(data_path: impl Into<PathBuf>, pic_path: impl Into<PathBuf>) -> Self {
        Self { data_path: data_path.into(), pic_path: pic_path.into() }
    }

    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    #[must_use]
    pub fn pic_path(&self) -> &Path {
        &self.pic_path
    }

    /// Restore canvas state at startup. Reads and decoding run on the
    /// blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata record is missing, is not valid
    /// JSON, or holds an out-of-range position or direction code.
    pub async fn load(&self) -> Result<CanvasState, PersistError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load_blocking()).await?
    }

    /// Synchronous load, used from the blocking pool.
    ///
    /// # Errors
    ///
    /// Same as [`SnapshotStore::load`].
    pub fn load_blocking(&self) -> Result<CanvasState, PersistError> {
        let walker = self.read_metadata()?;

        match self.read_bitmap() {
            Ok(bitmap) => {
                let canvas = CanvasState::restore(walker, bitmap);
                info!(
                    x = canvas.position.x,
                    y = canvas.position.y,
                    direction = ?canvas.direction,
                    painted = canvas.painted_pixels(),
                    "snapshot restored"
                );
                Ok(canvas)
            }
            // EDGE: metadata and bitmap are a matched pair; losing the bitmap
            // discards the recorded walker too.
            Err(reason) => {
                warn!(%reason, path = %self.pic_path.display(), "starting fresh canvas");
                Ok(CanvasState::fresh())
            }
        }
    }

    /// Persist a point-in-time copy of the canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or either artifact cannot be written.
    pub async fn save(&self, snapshot: CanvasState) -> Result<(), PersistError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.save_blocking(&snapshot)).await?
    }

    /// Synchronous save, used from the blocking pool.
    ///
    /// # Errors
    ///
    /// Same as [`SnapshotStore::save`].
    pub fn save_blocking(&self, snapshot: &CanvasState) -> Result<(), PersistError> {
        let record = MetadataRecord::from(snapshot.walker());
        let json = serde_json::to_vec(&record).map_err(PersistError::EncodeMetadata)?;
        let png = encode_png(&snapshot.bitmap)?;

        write_replacing(&self.data_path, &json)?;
        write_replacing(&self.pic_path, &png)?;

        debug!(x = snapshot.position.x, y = snapshot.position.y, bytes = png.len(), "snapshot saved");
        Ok(())
    }

    fn read_metadata(&self) -> Result<Walker, PersistError> {
        let path = &self.data_path;
        let bytes = std::fs::read(path).map_err(|source| PersistError::ReadMetadata { path: path.clone(), source })?;
        let record: MetadataRecord = serde_json::from_slice(&bytes)
            .map_err(|source| PersistError::ParseMetadata { path: path.clone(), source })?;
        record
            .into_walker()
            .map_err(|reason| PersistError::InvalidMetadata { path: path.clone(), reason })
    }

    fn read_bitmap(&self) -> Result<RgbaImage, BitmapUnavailable> {
        let bytes = match std::fs::read(&self.pic_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(BitmapUnavailable::Missing),
            Err(e) => return Err(BitmapUnavailable::Unreadable(e)),
        };
        let bitmap = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .map_err(BitmapUnavailable::Decode)?
            .into_rgba8();
        let (width, height) = bitmap.dimensions();
        if (width, height) != (CANVAS_WIDTH, CANVAS_HEIGHT) {
            return Err(BitmapUnavailable::WrongSize { width, height });
        }
        Ok(bitmap)
    }
}

fn encode_png(bitmap: &RgbaImage) -> Result<Vec<u8>, PersistError> {
    let mut png = Vec::new();
    let (width, height) = bitmap.dimensions();
    PngEncoder::new(&mut png)
        .write_image(bitmap.as_raw(), width, height, ColorType::Rgba8)
        .map_err(PersistError::EncodeBitmap)?;
    Ok(png)
}

/// Write `bytes` to a temp file beside `path`, then rename over `path`.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let write_err = |source| PersistError::Write { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
