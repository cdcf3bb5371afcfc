// ---------------------------------------------------------------------------
// Error types for road network editing, road type parsing and configuration
// ---------------------------------------------------------------------------

use std::fmt;

use crate::road_network::{CrossroadId, SegmentAdjacency, SegmentId};

/// Errors raised while editing the road network graph.
#[derive(Debug, Clone, PartialEq)]
pub enum RoadNetworkError {
    /// A crossroad needs at least two adjacent segment ends.
    TooFewAdjacencies { found: usize },
    /// Only the first or last point of a spline can touch a crossroad.
    NotAnEndpoint {
        segment: SegmentId,
        point_idx: usize,
        point_count: usize,
    },
    /// The segment end already belongs to another crossroad.
    AdjacencyClaimed {
        adjacency: SegmentAdjacency,
        owner: CrossroadId,
    },
    /// The adjacency being re-pointed is not registered.
    UnmappedAdjacency(SegmentAdjacency),
    UnknownCrossroad(CrossroadId),
    /// The adjacency points at a segment that is not in the network.
    UnknownSegment(SegmentId),
    /// The segment's spline no longer exists in the scene.
    StaleSegment(SegmentId),
}

impl fmt::Display for RoadNetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoadNetworkError::TooFewAdjacencies { found } => {
                write!(f, "Crossroad needs at least 2 adjacencies, got {found}")
            }
            RoadNetworkError::NotAnEndpoint {
                segment,
                point_idx,
                point_count,
            } => write!(
                f,
                "Point {point_idx} of segment {} ({point_count} points) is not an endpoint",
                segment.0
            ),
            RoadNetworkError::AdjacencyClaimed { adjacency, owner } => write!(
                f,
                "Adjacency {adjacency} is already connected to crossroad {}",
                owner.0
            ),
            RoadNetworkError::UnmappedAdjacency(adjacency) => {
                write!(f, "Adjacency {adjacency} is not connected to any crossroad")
            }
            RoadNetworkError::UnknownCrossroad(id) => write!(f, "Unknown crossroad {}", id.0),
            RoadNetworkError::UnknownSegment(id) => write!(f, "Unknown segment {}", id.0),
            RoadNetworkError::StaleSegment(id) => {
                write!(f, "Segment {} references a spline that no longer exists", id.0)
            }
        }
    }
}

impl std::error::Error for RoadNetworkError {}

/// Errors raised by the incremental road builder.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderError {
    /// The call does not fit the current build state, e.g. finishing while idle.
    InvalidState(&'static str),
    /// The build point refers to data that is no longer in the scene.
    StaleBuildPoint,
    /// A segment cannot be joined with itself.
    JoinSameSpline,
    Network(RoadNetworkError),
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::InvalidState(msg) => write!(f, "Invalid builder state: {msg}"),
            BuilderError::StaleBuildPoint => write!(f, "Build point is no longer valid"),
            BuilderError::JoinSameSpline => write!(f, "Cannot join a segment with itself"),
            BuilderError::Network(e) => write!(f, "Road network error: {e}"),
        }
    }
}

impl std::error::Error for BuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuilderError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RoadNetworkError> for BuilderError {
    fn from(e: RoadNetworkError) -> Self {
        BuilderError::Network(e)
    }
}

/// Errors raised while parsing or loading road types.
#[derive(Debug)]
pub enum RoadTypeError {
    Io(std::io::Error),
    Parse(String),
    /// A profile layer lacks an input the parser relies on.
    MissingInput { layer: usize, input: &'static str },
    /// The modifier stack has no profile layer at all.
    NoProfiles,
}

impl fmt::Display for RoadTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoadTypeError::Io(e) => write!(f, "I/O error: {e}"),
            RoadTypeError::Parse(msg) => write!(f, "Parse error: {msg}"),
            RoadTypeError::MissingInput { layer, input } => {
                write!(f, "Profile layer {layer} is missing input '{input}'")
            }
            RoadTypeError::NoProfiles => write!(f, "Road type has no profile layers"),
        }
    }
}

impl std::error::Error for RoadTypeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoadTypeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RoadTypeError {
    fn from(e: std::io::Error) -> Self {
        RoadTypeError::Io(e)
    }
}

impl From<serde_json::Error> for RoadTypeError {
    fn from(e: serde_json::Error) -> Self {
        RoadTypeError::Parse(e.to_string())
    }
}

/// Errors raised while loading road generator settings.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "I/O error: {e}"),
            SettingsError::Parse(msg) => write!(f, "Invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e.to_string())
    }
}

/// Errors raised by the build-roads operator.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorError {
    /// Another build-roads session holds the lock.
    AlreadyRunning,
    /// No road type files exist at the configured path.
    RoadTypesMissing(String),
    /// The currently selected road type is not in the library.
    UnknownRoadType(String),
    Builder(BuilderError),
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorError::AlreadyRunning => {
                write!(f, "Another instance of the operator is already running!")
            }
            OperatorError::RoadTypesMissing(path) => {
                write!(f, "Road generator files do not exist at {path}")
            }
            OperatorError::UnknownRoadType(name) => write!(f, "Unknown road type '{name}'"),
            OperatorError::Builder(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OperatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OperatorError::Builder(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BuilderError> for OperatorError {
    fn from(e: BuilderError) -> Self {
        OperatorError::Builder(e)
    }
}
