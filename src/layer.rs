//! Layers and the tile grid store. The grid owns its cells; map geometry and
//! the tileset list are passed in explicitly wherever they are needed, so
//! layers never point back at their map.

use glam::{vec2, Vec2};
use tracing::warn;

use crate::gid::TileId;
use crate::object::Object;
use crate::projection::{coords_to_world, storage_index, MapGeometry};
use crate::tileset::{ImageRef, PixelRect, Tileset};

/// How a tile layer's data was persisted, remembered so saving reproduces
/// the same form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEncoding {
    /// Plain array of gids in the JSON.
    Plain,
    /// Base64 text wrapping a zlib stream.
    Base64Zlib,
}

/// One grid cell: the stored gid (flip bits intact), its precomputed screen
/// anchor, and the texture rect attached when the gid resolves to a tileset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub gid: TileId,
    pub anchor: Vec2,
    pub tex_rect: Option<PixelRect>,
}

/// Grid of cells for one tile layer, laid out in render order.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    pub encoding: DataEncoding,
    cells: Vec<Cell>,
    bound_tileset: Option<usize>,
}

impl TileGrid {
    /// Builds an empty grid with every cell's anchor precomputed from the
    /// geometry.
    pub fn new(geom: &MapGeometry) -> Self {
        let (cols, rows) = (geom.size.x, geom.size.y);
        let mut cells = vec![
            Cell {
                gid: TileId(0),
                anchor: Vec2::ZERO,
                tex_rect: None,
            };
            geom.cell_count()
        ];
        for j in 0..rows {
            for i in 0..cols {
                cells[storage_index(geom.render_order, cols, rows, i, j)].anchor =
                    coords_to_world(geom, i, j);
            }
        }
        TileGrid {
            encoding: DataEncoding::Plain,
            cells,
            bound_tileset: None,
        }
    }

    /// Index into the map's tileset list this grid draws from, bound to the
    /// first tileset that resolved a cell. `None` until a tile resolves.
    pub fn bound_tileset(&self) -> Option<usize> {
        self.bound_tileset
    }

    /// Writes `gid` at logical `(x, y)`. Out-of-range coordinates are
    /// ignored. A non-empty gid binds the grid to its tileset on first use
    /// and attaches the tile's pixel rect; a gid no tileset owns keeps its
    /// raw value (so saving round-trips) but stays rect-less and renders as
    /// empty.
    pub fn set_tile(
        &mut self,
        geom: &MapGeometry,
        tilesets: &[Tileset],
        x: u32,
        y: u32,
        gid: TileId,
    ) {
        let (cols, rows) = (geom.size.x, geom.size.y);
        if x >= cols || y >= rows {
            return;
        }
        let idx = storage_index(geom.render_order, cols, rows, x, y);
        let tex_rect = if gid.is_empty() {
            None
        } else {
            let clean = gid.clean();
            match tilesets.iter().position(|t| t.contains(clean)) {
                Some(owner) => {
                    if self.bound_tileset.is_none() {
                        self.bound_tileset = Some(owner);
                    }
                    Some(tilesets[owner].to_pixel_rect(clean))
                }
                None => {
                    warn!(gid = clean, x, y, "no tileset owns this gid, cell left empty");
                    None
                }
            }
        };
        let cell = &mut self.cells[idx];
        cell.gid = gid;
        cell.tex_rect = tex_rect;
    }

    /// Stored gid at logical `(x, y)`, or `None` out of range.
    pub fn tile_at(&self, geom: &MapGeometry, x: u32, y: u32) -> Option<TileId> {
        let (cols, rows) = (geom.size.x, geom.size.y);
        if x >= cols || y >= rows {
            return None;
        }
        Some(self.cells[storage_index(geom.render_order, cols, rows, x, y)].gid)
    }

    /// Full cell at logical `(x, y)`, or `None` out of range.
    pub fn cell(&self, geom: &MapGeometry, x: u32, y: u32) -> Option<&Cell> {
        let (cols, rows) = (geom.size.x, geom.size.y);
        if x >= cols || y >= rows {
            return None;
        }
        Some(&self.cells[storage_index(geom.render_order, cols, rows, x, y)])
    }

    /// Screen quad for the cell: anchor-cornered, sized by the bound
    /// tileset's tile size when one is bound, else the map tile size.
    /// Corners run clockwise from the anchor.
    pub fn quad(
        &self,
        geom: &MapGeometry,
        tilesets: &[Tileset],
        x: u32,
        y: u32,
    ) -> Option<[Vec2; 4]> {
        let cell = self.cell(geom, x, y)?;
        let (w, h) = match self.bound_tileset.and_then(|i| tilesets.get(i)) {
            Some(ts) => (ts.tile_w as f32, ts.tile_h as f32),
            None => (geom.tile_size.x as f32, geom.tile_size.y as f32),
        };
        let a = cell.anchor;
        Some([a, a + vec2(w, 0.0), a + vec2(w, h), a + vec2(0.0, h)])
    }

    /// Recomputes every anchor and re-resolves every non-empty cell. Call
    /// after the geometry or the tileset list changed; cached anchors and
    /// the bound tileset are stale otherwise.
    pub fn rebuild(&mut self, geom: &MapGeometry, tilesets: &[Tileset]) {
        let (cols, rows) = (geom.size.x, geom.size.y);
        self.cells.resize(
            geom.cell_count(),
            Cell {
                gid: TileId(0),
                anchor: Vec2::ZERO,
                tex_rect: None,
            },
        );
        self.bound_tileset = None;
        for j in 0..rows {
            for i in 0..cols {
                let idx = storage_index(geom.render_order, cols, rows, i, j);
                self.cells[idx].anchor = coords_to_world(geom, i, j);
                let gid = self.cells[idx].gid;
                self.set_tile(geom, tilesets, i, j, gid);
            }
        }
    }

    /// Decodes persisted bytes into the grid: each 4 consecutive bytes form
    /// one little-endian gid, consumed in logical row-major order. A
    /// trailing 1-3 byte remainder is dropped; a short buffer fills only the
    /// cells it covers.
    pub fn decode_data(&mut self, geom: &MapGeometry, tilesets: &[Tileset], bytes: &[u8]) {
        let (cols, rows) = (geom.size.x, geom.size.y);
        if cols == 0 || rows == 0 {
            return;
        }
        let mut x = 0u32;
        let mut y = 0u32;
        for chunk in bytes.chunks_exact(4) {
            let gid = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            self.set_tile(geom, tilesets, x, y, TileId(gid));
            x = (x + 1) % cols;
            if x == 0 {
                y += 1;
            }
        }
    }

    /// Exact inverse of [`TileGrid::decode_data`]: 4 little-endian bytes per
    /// cell in logical row-major order, flip bits included, 0 for empty
    /// cells.
    pub fn encode_data(&self, geom: &MapGeometry) -> Vec<u8> {
        let (cols, rows) = (geom.size.x, geom.size.y);
        let mut out = Vec::with_capacity(geom.cell_count() * 4);
        for j in 0..rows {
            for i in 0..cols {
                let gid = self.cells[storage_index(geom.render_order, cols, rows, i, j)].gid;
                out.extend_from_slice(&gid.raw().to_le_bytes());
            }
        }
        out
    }

    /// Gids in logical row-major order, for the plain-array persisted form.
    pub fn gids(&self, geom: &MapGeometry) -> Vec<u32> {
        let (cols, rows) = (geom.size.x, geom.size.y);
        let mut out = Vec::with_capacity(geom.cell_count());
        for j in 0..rows {
            for i in 0..cols {
                out.push(self.cells[storage_index(geom.render_order, cols, rows, i, j)].gid.raw());
            }
        }
        out
    }
}

/// Layer payload, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Tiles(TileGrid),
    Objects { objects: Vec<Object> },
    Image(ImageRef),
}

/// One map layer: the header every kind shares plus the kind payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
    /// World offset applied to everything in this layer.
    pub offset: Vec2,
    pub kind: LayerKind,
}
