/// Custom property marking an object as generated by the road builder.
/// Curves carry their road type name, crossroads carry `ROAD_TYPE_CROSSROAD_VALUE`.
pub const ROAD_TYPE_PROPERTY: &str = "tq_road_type";
pub const ROAD_TYPE_CROSSROAD_VALUE: &str = "CROSSROAD";

/// Custom property storing the committed crossroad centroid.
pub const CROSSROAD_POSITION_PROPERTY: &str = "tq_cx_position";

pub const ROAD_COLLECTION_NAME: &str = "traffiq roads";
pub const CROSSROAD_PREFIX: &str = "tq_crossroad";
pub const ROAD_PREFIX: &str = "tq_road";

/// Road type descriptor files start with this prefix.
pub const ROAD_TYPE_FILE_PREFIX: &str = "tq_";
/// Shared node group libraries, never road types themselves.
pub const LIBRARY_FILE_PREFIX: &str = "tq_Library";
pub const ROAD_TYPE_FILE_EXTENSION: &str = "json";
/// Road type files are only picked up below a directory with this name.
pub const ROADS_DIR_NAME: &str = "roads";

/// Default distance (m) by which segment ends are pulled away from a crossroad.
pub const DEFAULT_CROSSROAD_POINTS_OFFSET: f32 = 15.0;
pub const MIN_CROSSROAD_POINTS_OFFSET: f32 = 1.0;
pub const DEFAULT_GRID_SCALE_MULTIPLIER: f32 = 10.0;

pub const CROSSWALK_WIDTH: f32 = 3.5;
pub const CROSSWALK_POSITION_OFFSET: f32 = 1.75;
pub const DEFAULT_ROAD_MARKING_WIDTH: f32 = 0.1;

/// Relative tolerance when matching stored crossroad end points to spline points.
pub const POSITION_MATCH_REL_TOL: f32 = 1e-6;

/// Every curve and crossroad object is expected at the world origin.
pub const ORIGIN_REL_TOL: f32 = 1e-6;

/// Node groups authored in the road geonodes library.
pub mod road_nodegroup {
    pub const INPUT: &str = "tq_InputCurve";
    pub const MARKINGS: &str = "tq_RoadMark";
    pub const DISTRIBUTE: &str = "tq_Distribute";
    pub const ROAD_PROFILE: &str = "tq_Profile";
    pub const SCATTER: &str = "tq_Scatter";
    pub const CROSSWALK: &str = "tq_Crosswalk";
    pub const CLEANUP: &str = "tq_Cleanup";
}

/// Node groups authored in the crossroad geonodes library.
pub mod crossroad_nodegroup {
    pub const REGISTER: &str = "tq_CX_RegisterAdjacency";
    pub const PROFILE: &str = "tq_CX_Profile";
    pub const BUILD: &str = "tq_CX_Build";
    pub const INSTANCE: &str = "tq_CX_Instance";
}
