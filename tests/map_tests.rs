// tests/map_tests.rs

use tiled_grid::{
    compression, DataEncoding, Layer, LayerKind, Map, MapError, ObjectShape, Orientation, TileId,
};

fn base64_map_json(encoding: &str, compression_attr: &str, blob: &str) -> String {
    format!(
        r#"{{
          "width": 2, "height": 2,
          "tilewidth": 16, "tileheight": 16,
          "orientation": "orthogonal",
          "renderorder": "right-down",
          "tilesets": [{{
            "firstgid": 1, "name": "terrain",
            "tilewidth": 16, "tileheight": 16,
            "tilecount": 4, "columns": 2,
            "image": "terrain.png", "imagewidth": 32, "imageheight": 32
          }}],
          "layers": [{{
            "type": "tilelayer", "name": "ground",
            "width": 2, "height": 2,
            "encoding": "{encoding}", "compression": "{compression_attr}",
            "data": "{blob}"
          }}]
        }}"#
    )
}

fn blob_for(gids: &[u32]) -> String {
    let bytes: Vec<u8> = gids.iter().flat_map(|g| g.to_le_bytes()).collect();
    compression::compress(&bytes).unwrap()
}

#[test]
fn loads_base64_zlib_layer_data() {
    let map = Map::load_from_str(&base64_map_json("base64", "zlib", &blob_for(&[1, 0, 2, 0])))
        .expect("map should load");

    assert_eq!(map.tile_at(0, 0, 0), Some(TileId(1)));
    assert_eq!(map.tile_at(0, 1, 0), Some(TileId(0)));
    assert_eq!(map.tile_at(0, 0, 1), Some(TileId(2)));
    assert_eq!(map.tile_at(0, 1, 1), Some(TileId(0)));

    let LayerKind::Tiles(grid) = &map.layers[0].kind else {
        panic!("expected a tile layer");
    };
    assert_eq!(grid.encoding, DataEncoding::Base64Zlib);
    assert_eq!(grid.bound_tileset(), Some(0));
    let rect = grid.cell(&map.geometry, 0, 1).unwrap().tex_rect.unwrap();
    assert_eq!((rect.x, rect.y, rect.w, rect.h), (16, 0, 16, 16));
}

#[test]
fn blob_may_be_wrapped_in_whitespace() {
    let padded = format!("  {}  ", blob_for(&[1, 0, 2, 0]));
    let map = Map::load_from_str(&base64_map_json("base64", "zlib", &padded)).unwrap();
    assert_eq!(map.tile_at(0, 0, 0), Some(TileId(1)));
}

#[test]
fn error_on_unsupported_encoding() {
    let err = Map::load_from_str(&base64_map_json("csv", "zlib", "AAAA")).unwrap_err();
    assert!(matches!(
        err,
        MapError::UnsupportedEncoding { ref layer, ref encoding }
            if layer == "ground" && encoding == "csv"
    ));
}

#[test]
fn error_on_unsupported_compression() {
    let err = Map::load_from_str(&base64_map_json("base64", "gzip", "AAAA")).unwrap_err();
    assert!(matches!(
        err,
        MapError::UnsupportedCompression { ref compression, .. } if compression == "gzip"
    ));
}

#[test]
fn error_on_corrupt_blob() {
    // valid base64, but not a zlib stream
    let err = Map::load_from_str(&base64_map_json("base64", "zlib", "AAAAAAAA")).unwrap_err();
    assert!(matches!(err, MapError::CorruptStream(_)));
}

#[test]
fn error_on_overlapping_tilesets() {
    let json = r#"{
      "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
      "tilesets": [
        {"firstgid": 1, "name": "a", "tilewidth": 8, "tileheight": 8, "tilecount": 4, "columns": 2, "image": "a.png"},
        {"firstgid": 3, "name": "b", "tilewidth": 8, "tileheight": 8, "tilecount": 4, "columns": 2, "image": "b.png"}
      ],
      "layers": []
    }"#;
    let err = Map::load_from_str(json).unwrap_err();
    assert!(matches!(
        err,
        MapError::TilesetOverlap { ref first, ref second } if first == "a" && second == "b"
    ));
}

#[test]
fn error_on_layer_size_mismatch() {
    let json = r#"{
      "width": 2, "height": 2, "tilewidth": 8, "tileheight": 8,
      "layers": [ { "type": "tilelayer", "name": "oops", "data": [1, 2, 3] } ]
    }"#;
    let err = Map::load_from_str(json).unwrap_err();
    assert!(matches!(
        err,
        MapError::InvalidLayerSize { ref layer, expected: 4, actual: 3 } if layer == "oops"
    ));
}

#[test]
fn error_on_unknown_orientation() {
    let json = r#"{
      "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
      "orientation": "spherical", "layers": []
    }"#;
    assert!(matches!(
        Map::load_from_str(json).unwrap_err(),
        MapError::UnknownOrientation(s) if s == "spherical"
    ));
}

#[test]
fn unresolved_gid_renders_empty_but_round_trips() {
    let json = r#"{
      "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
      "tilesets": [{"firstgid": 1, "name": "a", "tilewidth": 8, "tileheight": 8, "tilecount": 4, "columns": 2, "image": "a.png"}],
      "layers": [ { "type": "tilelayer", "name": "L", "data": [99] } ]
    }"#;
    let map = Map::load_from_str(json).expect("unowned gids are not a load error");
    let LayerKind::Tiles(grid) = &map.layers[0].kind else {
        panic!("expected a tile layer");
    };
    let cell = grid.cell(&map.geometry, 0, 0).unwrap();
    assert_eq!(cell.gid, TileId(99));
    assert_eq!(cell.tex_rect, None);

    // the raw gid comes back out on save
    let saved = map.to_json_string().unwrap();
    let reloaded = Map::load_from_str(&saved).unwrap();
    assert_eq!(reloaded.tile_at(0, 0, 0), Some(TileId(99)));
}

#[test]
fn load_ignores_extra_fields() {
    let json = r#"{
      "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
      "dummyField": "ignored",
      "layers": [ { "type": "tilelayer", "name": "L", "data": [0], "opacity": 0.5 } ]
    }"#;
    let map = Map::load_from_str(json).expect("should ignore unknown fields");
    assert_eq!(map.layers[0].name, "L");
    assert_eq!(map.layers[0].opacity, 0.5);
}

#[test]
fn integration_unsupported_format() {
    let err = Map::load_from_file("foo.tmx").unwrap_err();
    match err {
        MapError::UnsupportedFormat(path) => assert_eq!(path, "foo.tmx"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn object_and_image_layers_are_parsed() {
    let json = r#"{
      "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
      "layers": [
        {
          "type": "objectgroup", "name": "spawns",
          "objects": [
            {"id": 1, "name": "spawn", "x": 12.0, "y": 20.0, "rotation": 45.0},
            {"id": 2, "name": "wall", "x": 0.0, "y": 0.0, "polygon": [{"x":0,"y":0},{"x":8,"y":0},{"x":8,"y":8}]},
            {"id": 3, "name": "marker", "x": 4.0, "y": 4.0, "point": true},
            {"id": 4, "name": "stamp", "x": 0.0, "y": 8.0, "gid": 2147483649}
          ]
        },
        {
          "type": "imagelayer", "name": "backdrop",
          "image": "sky.png", "imagewidth": 320, "imageheight": 200
        }
      ]
    }"#;
    let map = Map::load_from_str(json).unwrap();

    let LayerKind::Objects { objects } = &map.layers[0].kind else {
        panic!("expected an object layer");
    };
    assert_eq!(objects.len(), 4);
    assert_eq!(objects[0].rotation, 45.0);
    assert!(matches!(objects[0].shape, ObjectShape::Rect));
    assert!(matches!(&objects[1].shape, ObjectShape::Polygon(p) if p.len() == 3));
    assert!(matches!(objects[2].shape, ObjectShape::Point));
    // 2147483649 has bit 31 set: gid 1, horizontally flipped
    match objects[3].shape {
        ObjectShape::Tile { gid } => {
            assert_eq!(gid.clean(), 1);
            assert!(gid.flip_h());
        }
        ref other => panic!("expected a tile object, got {other:?}"),
    }

    let LayerKind::Image(image) = &map.layers[1].kind else {
        panic!("expected an image layer");
    };
    assert_eq!(image.source, "sky.png");
    assert_eq!(image.size.x, 320);
}

#[test]
fn save_reverses_the_load_pipeline() -> anyhow::Result<()> {
    let original = base64_map_json("base64", "zlib", &blob_for(&[1, 0, 2, 0]));
    let map = Map::load_from_str(&original)?;

    let saved = map.to_json_string()?;
    // the layer stays in its persisted encoding
    assert!(saved.contains("\"encoding\": \"base64\""));
    assert!(saved.contains("\"compression\": \"zlib\""));

    let reloaded = Map::load_from_str(&saved)?;
    assert_eq!(reloaded.geometry, map.geometry);
    assert_eq!(reloaded.tilesets, map.tilesets);
    for (a, b) in reloaded.layers.iter().zip(&map.layers) {
        assert_eq!(a, b);
    }
    Ok(())
}

#[test]
fn plain_array_layers_stay_plain_on_save() -> anyhow::Result<()> {
    let json = r#"{
      "width": 2, "height": 1, "tilewidth": 8, "tileheight": 8,
      "tilesets": [{"firstgid": 1, "name": "a", "tilewidth": 8, "tileheight": 8, "tilecount": 4, "columns": 2, "image": "a.png"}],
      "layers": [ { "type": "tilelayer", "name": "L", "width": 2, "height": 1, "data": [2, 0] } ]
    }"#;
    let map = Map::load_from_str(json)?;
    let saved = map.to_json_string()?;
    assert!(!saved.contains("encoding"));

    let reloaded = Map::load_from_str(&saved)?;
    assert_eq!(reloaded.tile_at(0, 0, 0), Some(TileId(2)));
    assert_eq!(reloaded.tile_at(0, 1, 0), Some(TileId(0)));
    Ok(())
}

#[test]
fn staggered_map_attributes_reach_the_geometry() {
    let json = r#"{
      "width": 2, "height": 4, "tilewidth": 64, "tileheight": 32,
      "orientation": "staggered", "staggeraxis": "y", "staggerindex": "even",
      "layers": []
    }"#;
    let map = Map::load_from_str(json).unwrap();
    assert_eq!(map.geometry.orientation, Orientation::Staggered);
    // even rows shift half a tile under an even stagger index
    assert_eq!(map.coords_to_world(1, 0).x, 96.0);
    assert_eq!(map.coords_to_world(1, 1).x, 64.0);
}

#[test]
fn layer_helpers_skip_non_tile_layers() {
    let json = r#"{
      "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
      "layers": [ { "type": "objectgroup", "name": "O", "objects": [] } ]
    }"#;
    let mut map = Map::load_from_str(json).unwrap();
    assert_eq!(map.tile_at(0, 0, 0), None);
    map.set_tile(0, 0, 0, TileId(1));
    assert!(matches!(
        map.layers[0],
        Layer { kind: LayerKind::Objects { ref objects }, .. } if objects.is_empty()
    ));
}
