//! Pure coordinate math: grid coordinates to screen-space anchors and back,
//! plus the render-order mapping from logical coordinates to storage indices.

use glam::{ivec2, vec2, IVec2, UVec2, Vec2};

use crate::error::MapError;

/// Map geometry family, matching the `orientation` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl Orientation {
    pub fn parse(s: &str) -> Result<Self, MapError> {
        match s {
            "orthogonal" => Ok(Orientation::Orthogonal),
            "isometric" => Ok(Orientation::Isometric),
            "staggered" => Ok(Orientation::Staggered),
            "hexagonal" => Ok(Orientation::Hexagonal),
            other => Err(MapError::UnknownOrientation(other.to_owned())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Orthogonal => "orthogonal",
            Orientation::Isometric => "isometric",
            Orientation::Staggered => "staggered",
            Orientation::Hexagonal => "hexagonal",
        }
    }
}

/// Order in which a renderer expects cells to be iterated, and therefore the
/// order cells are laid out in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOrder {
    RightDown,
    RightUp,
    LeftUp,
    LeftDown,
}

impl RenderOrder {
    pub fn parse(s: &str) -> Result<Self, MapError> {
        match s {
            "right-down" => Ok(RenderOrder::RightDown),
            "right-up" => Ok(RenderOrder::RightUp),
            "left-up" => Ok(RenderOrder::LeftUp),
            "left-down" => Ok(RenderOrder::LeftDown),
            other => Err(MapError::UnknownRenderOrder(other.to_owned())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RenderOrder::RightDown => "right-down",
            RenderOrder::RightUp => "right-up",
            RenderOrder::LeftUp => "left-up",
            RenderOrder::LeftDown => "left-down",
        }
    }
}

/// Which axis the staggered/hexagonal half-tile shift runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerAxis {
    X,
    Y,
}

impl StaggerAxis {
    pub fn parse(s: &str) -> Result<Self, MapError> {
        match s {
            "x" => Ok(StaggerAxis::X),
            "y" => Ok(StaggerAxis::Y),
            other => Err(MapError::UnknownStaggerAxis(other.to_owned())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StaggerAxis::X => "x",
            StaggerAxis::Y => "y",
        }
    }
}

/// Whether odd- or even-indexed rows/columns carry the half-tile offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerIndex {
    Odd,
    Even,
}

impl StaggerIndex {
    pub fn parse(s: &str) -> Result<Self, MapError> {
        match s {
            "odd" => Ok(StaggerIndex::Odd),
            "even" => Ok(StaggerIndex::Even),
            other => Err(MapError::UnknownStaggerIndex(other.to_owned())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StaggerIndex::Odd => "odd",
            StaggerIndex::Even => "even",
        }
    }

    /// The line parity (0 or 1) that keeps the unshifted position.
    #[inline]
    fn parity(self) -> u32 {
        match self {
            StaggerIndex::Odd => 0,
            StaggerIndex::Even => 1,
        }
    }
}

/// Everything the projector needs about a map. Layers built from one of these
/// must be rebuilt if any field changes; cached anchors go stale otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapGeometry {
    pub orientation: Orientation,
    pub render_order: RenderOrder,
    /// Grid dimensions in cells (columns, rows).
    pub size: UVec2,
    /// Base tile size in pixels.
    pub tile_size: UVec2,
    pub stagger_axis: StaggerAxis,
    pub stagger_index: StaggerIndex,
    pub hex_side: u32,
}

impl MapGeometry {
    pub fn cell_count(&self) -> usize {
        (self.size.x * self.size.y) as usize
    }
}

/// Screen-space anchor (top-left corner of the cell quad) for the logical
/// grid coordinate `(i, j)`.
pub fn coords_to_world(geom: &MapGeometry, i: u32, j: u32) -> Vec2 {
    let tw = geom.tile_size.x as f32;
    let th = geom.tile_size.y as f32;
    let hex = geom.hex_side as f32;
    let parity = geom.stagger_index.parity();

    let stagger_x = |i: u32, j: u32| {
        if j % 2 == parity {
            i as f32 * tw
        } else {
            (i as f32 + 0.5) * tw
        }
    };
    let stagger_y = |i: u32, j: u32| {
        if i % 2 == parity {
            j as f32 * th
        } else {
            (j as f32 + 0.5) * th
        }
    };

    match geom.orientation {
        Orientation::Orthogonal => vec2(i as f32 * tw, j as f32 * th),
        Orientation::Isometric => vec2(
            (i as f32 - j as f32) * tw / 2.0,
            (i + j) as f32 * th / 2.0,
        ),
        Orientation::Staggered => match geom.stagger_axis {
            StaggerAxis::Y => vec2(stagger_x(i, j), j as f32 * th / 2.0),
            StaggerAxis::X => vec2(i as f32 * tw / 2.0, stagger_y(i, j)),
        },
        Orientation::Hexagonal => match geom.stagger_axis {
            StaggerAxis::Y => vec2(stagger_x(i, j), j as f32 * ((th - hex) / 2.0 + hex)),
            StaggerAxis::X => vec2(i as f32 * ((tw - hex) / 2.0 + hex), stagger_y(i, j)),
        },
    }
}

/// Maps logical `(i, j)` to the linear index cells occupy in storage.
///
/// Left-down completes the flip lattice: columns reversed, rows forward, so
/// each order is a distinct permutation of the grid (see DESIGN.md for the
/// left-down choice).
#[inline]
pub fn storage_index(order: RenderOrder, cols: u32, rows: u32, i: u32, j: u32) -> usize {
    let idx = match order {
        RenderOrder::RightDown => i + j * cols,
        RenderOrder::RightUp => i + (rows - 1 - j) * cols,
        RenderOrder::LeftUp => (cols - 1 - i) + (rows - 1 - j) * cols,
        RenderOrder::LeftDown => (cols - 1 - i) + j * cols,
    };
    idx as usize
}

/// Inverse projection: which cell contains the screen-space point.
///
/// Orthogonal and staggered are supported; the isometric and hexagonal
/// inverses are not implemented and return `None`.
pub fn world_to_coords(geom: &MapGeometry, world: Vec2) -> Option<IVec2> {
    match geom.orientation {
        Orientation::Orthogonal => Some(ivec2(
            (world.x / geom.tile_size.x as f32).floor() as i32,
            (world.y / geom.tile_size.y as f32).floor() as i32,
        )),
        Orientation::Staggered => Some(world_to_stagger_coords(
            world,
            geom.tile_size,
            geom.stagger_axis,
            geom.stagger_index,
        )),
        Orientation::Isometric | Orientation::Hexagonal => None,
    }
}

/// Half-tile decomposition with a 30-degree tie-break picking the diagonal
/// half of the staggered cell the point falls in. Matched with
/// [`coords_to_world`]; change them together.
fn world_to_stagger_coords(
    world: Vec2,
    tile_size: UVec2,
    axis: StaggerAxis,
    index: StaggerIndex,
) -> IVec2 {
    const RAD_30: f32 = 0.523_599;

    let s = vec2(tile_size.x as f32 * 0.5, tile_size.y as f32 * 0.5);
    let mut mc = vec2((world.x / s.x).floor(), (world.y / s.y).floor());
    let p = world - vec2(mc.x * s.x, mc.y * s.y);
    let parity = index.parity() as i32;

    match axis {
        StaggerAxis::Y => {
            if (mc.x as i32 + mc.y as i32) % 2 == parity {
                if (s.y - p.y).atan2(p.x) > RAD_30 {
                    mc.x -= 1.0;
                    mc.y -= 1.0;
                }
            } else if (-p.y).atan2(p.x) > -RAD_30 {
                mc.y -= 1.0;
            } else {
                mc.x -= 1.0;
            }
            ivec2((mc.x * 0.5).floor() as i32, mc.y as i32)
        }
        StaggerAxis::X => {
            if (mc.x as i32 + mc.y as i32) % 2 == parity {
                if (s.x - p.x).atan2(p.y) > RAD_30 {
                    mc.x -= 1.0;
                    mc.y -= 1.0;
                }
            } else if (-p.x).atan2(p.y) > -RAD_30 {
                mc.x -= 1.0;
            } else {
                mc.y -= 1.0;
            }
            ivec2(mc.x as i32, (mc.y * 0.5).floor() as i32)
        }
    }
}
