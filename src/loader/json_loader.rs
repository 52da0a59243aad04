//! Raw serde structs mirroring the Tiled JSON attribute names. This is the
//! whole boundary with the document format; everything past here works on
//! the typed model.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}
fn default_orientation() -> String {
    "orthogonal".to_owned()
}
fn default_renderorder() -> String {
    "right-down".to_owned()
}
fn is_false(b: &bool) -> bool {
    !*b
}
fn is_zero(v: &u32) -> bool {
    *v == 0
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RawMap {
    pub width: u32,
    pub height: u32,
    pub tilewidth: u32,
    pub tileheight: u32,
    #[serde(default = "default_orientation")]
    pub orientation: String,
    #[serde(default = "default_renderorder")]
    pub renderorder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staggeraxis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staggerindex: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub hexsidelength: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backgroundcolor: Option<String>,
    #[serde(default)]
    pub tilesets: Vec<RawTileset>,
    #[serde(default)]
    pub layers: Vec<RawLayer>,
}

/// Tileset entry in a map: embedded attributes, or a `source` reference to
/// an external tileset file.
#[derive(Debug, Deserialize, Serialize)]
pub struct RawTileset {
    pub firstgid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub tilecount: u32,
    #[serde(default)]
    pub columns: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub spacing: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub margin: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub imagewidth: u32,
    #[serde(default)]
    pub imageheight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparentcolor: Option<String>,
}

/// External tileset file body (everything but `firstgid`).
#[derive(Debug, Deserialize)]
pub struct RawExternalTileset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub tilecount: u32,
    #[serde(default)]
    pub columns: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub margin: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub imagewidth: u32,
    #[serde(default)]
    pub imageheight: u32,
    #[serde(default)]
    pub transparentcolor: Option<String>,
}

/// Tile-layer payload: a plain gid array, or encoded text.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawData {
    Tiles(Vec<u32>),
    Encoded(String),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RawLayer {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "one")]
    pub opacity: f32,
    #[serde(default)]
    pub offsetx: f32,
    #[serde(default)]
    pub offsety: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RawData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<RawObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub imagewidth: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub imageheight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparentcolor: Option<String>,
}

impl Default for RawLayer {
    fn default() -> Self {
        RawLayer {
            kind: None,
            name: String::new(),
            width: 0,
            height: 0,
            visible: true,
            opacity: 1.0,
            offsetx: 0.0,
            offsety: 0.0,
            encoding: None,
            compression: None,
            data: None,
            objects: Vec::new(),
            image: None,
            imagewidth: 0,
            imageheight: 0,
            transparentcolor: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RawObject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub point: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ellipse: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polygon: Vec<RawPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polyline: Vec<RawPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RawPoint {
    pub x: f32,
    pub y: f32,
}
