/// Edge length of one world tile, in world units (metres)
pub const TILE_SIZE: f64 = 2048.0;

/// Half a tile; tiles are centred on multiples of `TILE_SIZE`
pub const HALF_TILE_SIZE: f64 = TILE_SIZE / 2.0;

/// Maximum distance between a location and a track feature for the two to be
/// considered the same place
pub const PROXIMITY_TOLERANCE: f64 = 1.0;

/// Tolerance for comparing computed lengths and offsets
pub const FLOAT_TOLERANCE: f64 = 1e-6;

/// Number of tiles searched around a location when looking up track features
pub const DEFAULT_SEARCH_RADIUS_TILES: i32 = 1;

/// Node index reserved for "no node"
pub const NO_NODE: u32 = 0;
