use egui::Pos2;

/// Tile cell dimensions in image pixels. Edge tiles may be partial when the
/// image is not an exact multiple of the tile size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl Default for TileSize {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
        }
    }
}

/// The tile under the pointer, produced per hover. `x`/`y` are the world-space
/// anchor of the tile's top-left corner; `mouse` is the raw screen position,
/// kept for tooltip placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileDescriptor {
    pub index: u32,
    pub col: u32,
    pub row: u32,
    pub x: u32,
    pub y: u32,
    pub mouse: Pos2,
}

pub fn grid_size(tile: TileSize, image_width: u32, image_height: u32) -> (u32, u32) {
    (
        image_width.div_ceil(tile.width),
        image_height.div_ceil(tile.height),
    )
}

/// Map a world point to its tile, or `None` outside `[0,w) x [0,h)`.
pub fn tile_at(
    world: Pos2,
    tile: TileSize,
    image_width: u32,
    image_height: u32,
    mouse: Pos2,
) -> Option<TileDescriptor> {
    if world.x < 0.0
        || world.y < 0.0
        || world.x >= image_width as f32
        || world.y >= image_height as f32
    {
        return None;
    }
    let col = (world.x / tile.width as f32).floor() as u32;
    let row = (world.y / tile.height as f32).floor() as u32;
    let (cols, _) = grid_size(tile, image_width, image_height);
    Some(TileDescriptor {
        index: row * cols + col,
        col,
        row,
        x: col * tile.width,
        y: row * tile.height,
        mouse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    const TILE: TileSize = TileSize {
        width: 32,
        height: 32,
    };

    #[test]
    fn grid_size_rounds_up_partial_tiles() {
        assert_eq!(grid_size(TILE, 100, 80), (4, 3));
        assert_eq!(grid_size(TILE, 64, 64), (2, 2));
        assert_eq!(grid_size(TILE, 1, 1), (1, 1));
    }

    #[test]
    fn tile_lookup_inside_image() {
        let td = tile_at(pos2(35.0, 10.0), TILE, 100, 80, pos2(400.0, 300.0))
            .expect("point is inside the image");
        assert_eq!(td.col, 1);
        assert_eq!(td.row, 0);
        assert_eq!(td.index, 1);
        assert_eq!(td.x, 32);
        assert_eq!(td.y, 0);
        assert_eq!(td.mouse, pos2(400.0, 300.0));
    }

    #[test]
    fn tile_index_spans_rows() {
        let td = tile_at(pos2(35.0, 70.0), TILE, 100, 80, Pos2::ZERO).unwrap();
        assert_eq!((td.col, td.row), (1, 2));
        assert_eq!(td.index, 2 * 4 + 1);
    }

    #[test]
    fn outside_image_is_none() {
        assert_eq!(tile_at(pos2(150.0, 10.0), TILE, 100, 80, Pos2::ZERO), None);
        assert_eq!(tile_at(pos2(100.0, 10.0), TILE, 100, 80, Pos2::ZERO), None);
        assert_eq!(tile_at(pos2(-0.5, 10.0), TILE, 100, 80, Pos2::ZERO), None);
        assert_eq!(tile_at(pos2(10.0, 80.0), TILE, 100, 80, Pos2::ZERO), None);
    }

    #[test]
    fn last_partial_tile_is_addressable() {
        // 100x80 with 32px tiles: column 3 is only 4px wide.
        let td = tile_at(pos2(99.0, 79.0), TILE, 100, 80, Pos2::ZERO).unwrap();
        assert_eq!((td.col, td.row), (3, 2));
        assert_eq!((td.x, td.y), (96, 64));
    }
}
