//! Renderer-agnostic Tiled JSON map decoder: layer-data codec, tileset atlas
//! lookup and screen-space cell geometry.

pub mod compression;
mod error;
mod gid;
mod layer;
mod loader {
    pub mod json_loader;
}
mod map;
mod object;
mod projection;
mod tileset;

pub use error::MapError;
pub use gid::{TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use layer::{Cell, DataEncoding, Layer, LayerKind, TileGrid};
pub use map::Map;
pub use object::{Object, ObjectShape};
pub use projection::{
    coords_to_world, storage_index, world_to_coords, MapGeometry, Orientation, RenderOrder,
    StaggerAxis, StaggerIndex,
};
pub use tileset::{check_disjoint, find_tileset, ImageRef, PixelRect, Tileset};
