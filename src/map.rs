//! Map assembly: raw document in, validated geometry + tilesets + decoded
//! layers out, and the reverse for saving.

use std::fs;
use std::path::Path;

use glam::{uvec2, vec2, IVec2, Vec2};
use tracing::warn;

use crate::compression::{compress, decompress};
use crate::error::MapError;
use crate::gid::TileId;
use crate::layer::{DataEncoding, Layer, LayerKind, TileGrid};
use crate::loader::json_loader::{
    RawData, RawExternalTileset, RawLayer, RawMap, RawObject, RawPoint, RawTileset,
};
use crate::object::{Object, ObjectShape};
use crate::projection::{
    coords_to_world, world_to_coords, MapGeometry, Orientation, RenderOrder, StaggerAxis,
    StaggerIndex,
};
use crate::tileset::{check_disjoint, find_tileset, ImageRef, Tileset};

/// A loaded map: immutable geometry, the tileset list shared by every layer,
/// and the layers themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub geometry: MapGeometry,
    pub background_color: Option<String>,
    pub tilesets: Vec<Tileset>,
    pub layers: Vec<Layer>,
}

impl Map {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(MapError::UnsupportedFormat(path.display().to_string()));
        }
        let txt = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawMap = serde_json::from_str(&txt)?;
        Self::from_raw(raw, path.parent())
    }

    pub fn load_from_str(json: &str) -> Result<Self, MapError> {
        let raw: RawMap = serde_json::from_str(json)?;
        Self::from_raw(raw, None)
    }

    fn from_raw(raw: RawMap, base_dir: Option<&Path>) -> Result<Self, MapError> {
        let geometry = MapGeometry {
            orientation: Orientation::parse(&raw.orientation)?,
            render_order: RenderOrder::parse(&raw.renderorder)?,
            size: uvec2(raw.width, raw.height),
            tile_size: uvec2(raw.tilewidth, raw.tileheight),
            stagger_axis: match raw.staggeraxis.as_deref() {
                Some(s) => StaggerAxis::parse(s)?,
                None => StaggerAxis::Y,
            },
            stagger_index: match raw.staggerindex.as_deref() {
                Some(s) => StaggerIndex::parse(s)?,
                None => StaggerIndex::Odd,
            },
            hex_side: raw.hexsidelength,
        };

        let mut tilesets = Vec::with_capacity(raw.tilesets.len());
        for ts in raw.tilesets {
            tilesets.push(load_tileset(ts, base_dir)?);
        }
        check_disjoint(&tilesets)?;

        let mut layers = Vec::with_capacity(raw.layers.len());
        for l in raw.layers {
            if let Some(layer) = load_layer(l, &geometry, &tilesets)? {
                layers.push(layer);
            }
        }

        Ok(Map {
            geometry,
            background_color: raw.backgroundcolor,
            tilesets,
            layers,
        })
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json_string(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string_pretty(&self.to_raw()?)?)
    }

    fn to_raw(&self) -> Result<RawMap, MapError> {
        let geom = &self.geometry;
        let staggered = matches!(
            geom.orientation,
            Orientation::Staggered | Orientation::Hexagonal
        );
        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            layers.push(save_layer(layer, geom)?);
        }
        Ok(RawMap {
            width: geom.size.x,
            height: geom.size.y,
            tilewidth: geom.tile_size.x,
            tileheight: geom.tile_size.y,
            orientation: geom.orientation.as_str().to_owned(),
            renderorder: geom.render_order.as_str().to_owned(),
            staggeraxis: staggered.then(|| geom.stagger_axis.as_str().to_owned()),
            staggerindex: staggered.then(|| geom.stagger_index.as_str().to_owned()),
            hexsidelength: geom.hex_side,
            backgroundcolor: self.background_color.clone(),
            tilesets: self.tilesets.iter().map(save_tileset).collect(),
            layers,
        })
    }

    /// First tileset owning the (cleaned) gid, in insertion order.
    pub fn find_tileset(&self, gid: u32) -> Option<&Tileset> {
        find_tileset(&self.tilesets, gid)
    }

    /// Screen-space anchor for a grid coordinate.
    pub fn coords_to_world(&self, i: u32, j: u32) -> Vec2 {
        coords_to_world(&self.geometry, i, j)
    }

    /// Grid coordinate containing a screen-space point, where the inverse
    /// projection is specified.
    pub fn world_to_coords(&self, world: Vec2) -> Option<IVec2> {
        world_to_coords(&self.geometry, world)
    }

    /// Writes a gid into a tile layer, re-resolving that cell's texture
    /// rect. Non-tile layers and out-of-range indices are ignored.
    pub fn set_tile(&mut self, layer: usize, x: u32, y: u32, gid: TileId) {
        let geometry = self.geometry;
        if let Some(Layer {
            kind: LayerKind::Tiles(grid),
            ..
        }) = self.layers.get_mut(layer)
        {
            grid.set_tile(&geometry, &self.tilesets, x, y, gid);
        }
    }

    /// Stored gid in a tile layer, or `None` for other kinds / out of range.
    pub fn tile_at(&self, layer: usize, x: u32, y: u32) -> Option<TileId> {
        match self.layers.get(layer) {
            Some(Layer {
                kind: LayerKind::Tiles(grid),
                ..
            }) => grid.tile_at(&self.geometry, x, y),
            _ => None,
        }
    }
}

fn load_tileset(raw: RawTileset, base_dir: Option<&Path>) -> Result<Tileset, MapError> {
    let raw = match raw.source {
        Some(src) => {
            let Some(dir) = base_dir else {
                return Err(MapError::InvalidMap(format!(
                    "external tileset {src} cannot be resolved without a map file path"
                )));
            };
            if !src.ends_with(".json") {
                return Err(MapError::UnsupportedFormat(src));
            }
            let path = dir.join(&src);
            let txt = fs::read_to_string(&path).map_err(|source| MapError::Io {
                path: path.clone(),
                source,
            })?;
            let ext: RawExternalTileset = serde_json::from_str(&txt)?;
            RawTileset {
                firstgid: raw.firstgid,
                source: None,
                name: ext.name,
                tilewidth: ext.tilewidth,
                tileheight: ext.tileheight,
                tilecount: ext.tilecount,
                columns: ext.columns,
                spacing: ext.spacing,
                margin: ext.margin,
                image: ext.image,
                imagewidth: ext.imagewidth,
                imageheight: ext.imageheight,
                transparentcolor: ext.transparentcolor,
            }
        }
        None => raw,
    };

    if raw.columns > 0 && raw.imagewidth > 0 {
        let needed = raw.columns * (raw.tilewidth + raw.spacing) - raw.spacing + 2 * raw.margin;
        if needed > raw.imagewidth {
            warn!(
                tileset = %raw.name,
                columns = raw.columns,
                imagewidth = raw.imagewidth,
                "tileset columns do not fit the image width"
            );
        }
    }

    Ok(Tileset {
        name: raw.name,
        first_gid: raw.firstgid,
        tile_count: raw.tilecount,
        columns: raw.columns,
        tile_w: raw.tilewidth,
        tile_h: raw.tileheight,
        spacing: raw.spacing,
        margin: raw.margin,
        image: ImageRef {
            source: raw.image,
            size: uvec2(raw.imagewidth, raw.imageheight),
            transparent: raw.transparentcolor,
        },
    })
}

fn save_tileset(ts: &Tileset) -> RawTileset {
    RawTileset {
        firstgid: ts.first_gid,
        source: None,
        name: ts.name.clone(),
        tilewidth: ts.tile_w,
        tileheight: ts.tile_h,
        tilecount: ts.tile_count,
        columns: ts.columns,
        spacing: ts.spacing,
        margin: ts.margin,
        image: ts.image.source.clone(),
        imagewidth: ts.image.size.x,
        imageheight: ts.image.size.y,
        transparentcolor: ts.image.transparent.clone(),
    }
}

fn load_layer(
    raw: RawLayer,
    geom: &MapGeometry,
    tilesets: &[Tileset],
) -> Result<Option<Layer>, MapError> {
    let kind = match raw.kind.as_deref().unwrap_or("tilelayer") {
        "tilelayer" => {
            let mut grid = TileGrid::new(geom);
            match raw.data {
                Some(RawData::Tiles(gids)) => {
                    let expected = geom.cell_count();
                    if gids.len() != expected {
                        return Err(MapError::InvalidLayerSize {
                            layer: raw.name,
                            expected,
                            actual: gids.len(),
                        });
                    }
                    for (n, &gid) in gids.iter().enumerate() {
                        let n = n as u32;
                        grid.set_tile(geom, tilesets, n % geom.size.x, n / geom.size.x, TileId(gid));
                    }
                    grid.encoding = DataEncoding::Plain;
                }
                Some(RawData::Encoded(text)) => {
                    match raw.encoding.as_deref() {
                        Some("base64") => {}
                        other => {
                            return Err(MapError::UnsupportedEncoding {
                                layer: raw.name,
                                encoding: other.unwrap_or("").to_owned(),
                            });
                        }
                    }
                    match raw.compression.as_deref() {
                        Some("zlib") => {}
                        other => {
                            return Err(MapError::UnsupportedCompression {
                                layer: raw.name,
                                compression: other.unwrap_or("").to_owned(),
                            });
                        }
                    }
                    let bytes = decompress(text.trim())?;
                    grid.decode_data(geom, tilesets, &bytes);
                    grid.encoding = DataEncoding::Base64Zlib;
                }
                None => {}
            }
            LayerKind::Tiles(grid)
        }
        "objectgroup" => LayerKind::Objects {
            objects: raw.objects.into_iter().map(object_from_raw).collect(),
        },
        "imagelayer" => LayerKind::Image(ImageRef {
            source: raw.image.unwrap_or_default(),
            size: uvec2(raw.imagewidth, raw.imageheight),
            transparent: raw.transparentcolor,
        }),
        other => {
            warn!(layer = %raw.name, kind = other, "unsupported layer kind skipped");
            return Ok(None);
        }
    };
    Ok(Some(Layer {
        name: raw.name,
        visible: raw.visible,
        opacity: raw.opacity,
        offset: vec2(raw.offsetx, raw.offsety),
        kind,
    }))
}

fn save_layer(layer: &Layer, geom: &MapGeometry) -> Result<RawLayer, MapError> {
    let mut raw = RawLayer {
        name: layer.name.clone(),
        visible: layer.visible,
        opacity: layer.opacity,
        offsetx: layer.offset.x,
        offsety: layer.offset.y,
        ..RawLayer::default()
    };
    match &layer.kind {
        LayerKind::Tiles(grid) => {
            raw.kind = Some("tilelayer".to_owned());
            raw.width = geom.size.x;
            raw.height = geom.size.y;
            match grid.encoding {
                DataEncoding::Plain => {
                    raw.data = Some(RawData::Tiles(grid.gids(geom)));
                }
                DataEncoding::Base64Zlib => {
                    raw.encoding = Some("base64".to_owned());
                    raw.compression = Some("zlib".to_owned());
                    raw.data = Some(RawData::Encoded(compress(&grid.encode_data(geom))?));
                }
            }
        }
        LayerKind::Objects { objects } => {
            raw.kind = Some("objectgroup".to_owned());
            raw.objects = objects.iter().map(object_to_raw).collect();
        }
        LayerKind::Image(image) => {
            raw.kind = Some("imagelayer".to_owned());
            raw.image = Some(image.source.clone());
            raw.imagewidth = image.size.x;
            raw.imageheight = image.size.y;
            raw.transparentcolor = image.transparent.clone();
        }
    }
    Ok(raw)
}

fn object_from_raw(raw: RawObject) -> Object {
    let shape = if let Some(gid) = raw.gid {
        ObjectShape::Tile { gid: TileId(gid) }
    } else if raw.point {
        ObjectShape::Point
    } else if raw.ellipse {
        ObjectShape::Ellipse
    } else if !raw.polygon.is_empty() {
        ObjectShape::Polygon(raw.polygon.iter().map(|p| vec2(p.x, p.y)).collect())
    } else if !raw.polyline.is_empty() {
        ObjectShape::Polyline(raw.polyline.iter().map(|p| vec2(p.x, p.y)).collect())
    } else {
        ObjectShape::Rect
    };
    Object {
        id: raw.id,
        name: raw.name,
        x: raw.x,
        y: raw.y,
        width: raw.width,
        height: raw.height,
        rotation: raw.rotation,
        visible: raw.visible,
        shape,
    }
}

fn object_to_raw(obj: &Object) -> RawObject {
    let mut raw = RawObject {
        id: obj.id,
        name: obj.name.clone(),
        x: obj.x,
        y: obj.y,
        width: obj.width,
        height: obj.height,
        rotation: obj.rotation,
        visible: obj.visible,
        point: false,
        ellipse: false,
        polygon: Vec::new(),
        polyline: Vec::new(),
        gid: None,
    };
    match &obj.shape {
        ObjectShape::Rect => {}
        ObjectShape::Point => raw.point = true,
        ObjectShape::Ellipse => raw.ellipse = true,
        ObjectShape::Polygon(points) => {
            raw.polygon = points.iter().map(|p| RawPoint { x: p.x, y: p.y }).collect();
        }
        ObjectShape::Polyline(points) => {
            raw.polyline = points.iter().map(|p| RawPoint { x: p.x, y: p.y }).collect();
        }
        ObjectShape::Tile { gid } => raw.gid = Some(gid.raw()),
    }
    raw
}
