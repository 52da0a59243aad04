//! Tileset atlas lookup: which tileset owns a gid, and where that tile sits
//! inside the tileset image.

use glam::UVec2;
use tracing::warn;

use crate::error::MapError;

/// Pixel rectangle inside a tileset image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Narrow contract with the external image loader: where the atlas comes
/// from and how big it is. The texture handle itself lives outside this
/// crate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRef {
    pub source: String,
    /// Pixel size, kept for columns/bounds sanity checks.
    pub size: UVec2,
    /// Optional color key (e.g. `"#ff00ff"`) the loader should mask out.
    pub transparent: Option<String>,
}

/// One image atlas with a regular grid, owning the contiguous gid range
/// `[first_gid, first_gid + tile_count)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    pub name: String,
    pub first_gid: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub spacing: u32,
    pub margin: u32,
    pub image: ImageRef,
}

impl Tileset {
    #[inline]
    pub fn contains(&self, gid: u32) -> bool {
        self.first_gid <= gid && gid < self.first_gid + self.tile_count
    }

    /// Pixel rect of `gid` inside the atlas. Pass a cleaned gid (flip bits
    /// stripped). `columns == 0` yields the zero rect instead of dividing by
    /// it; a gid outside the tileset's range does the same.
    pub fn to_pixel_rect(&self, gid: u32) -> PixelRect {
        if !self.contains(gid) {
            warn!(gid, tileset = %self.name, "gid does not belong to this tileset");
            return PixelRect::default();
        }
        if self.columns == 0 {
            return PixelRect::default();
        }
        let local = gid - self.first_gid;
        let col = local % self.columns;
        let row = local / self.columns;
        PixelRect {
            x: col * (self.tile_w + self.spacing) + self.margin,
            y: row * (self.tile_h + self.spacing) + self.margin,
            w: self.tile_w,
            h: self.tile_h,
        }
    }

    /// Inverse of [`Tileset::to_pixel_rect`], valid only for positions lying
    /// exactly on a cell's top-left corner.
    pub fn to_gid(&self, pos: (u32, u32)) -> u32 {
        if self.tile_w == 0 || self.tile_h == 0 {
            return 0;
        }
        1 + (pos.0 - self.margin) / (self.tile_w + self.spacing)
            + (pos.1 - self.margin) / (self.tile_h + self.spacing) * self.columns
    }
}

/// First tileset (in insertion order) owning `gid`. Linear scan; maps carry
/// tens of tilesets at most.
pub fn find_tileset(tilesets: &[Tileset], gid: u32) -> Option<&Tileset> {
    tilesets.iter().find(|t| t.contains(gid))
}

/// Gid ranges across a map's tilesets must never overlap; violating this is
/// a load-time error.
pub fn check_disjoint(tilesets: &[Tileset]) -> Result<(), MapError> {
    for (n, a) in tilesets.iter().enumerate() {
        for b in &tilesets[n + 1..] {
            let overlap = a.first_gid < b.first_gid + b.tile_count
                && b.first_gid < a.first_gid + a.tile_count;
            if overlap {
                return Err(MapError::TilesetOverlap {
                    first: a.name.clone(),
                    second: b.name.clone(),
                });
            }
        }
    }
    Ok(())
}
