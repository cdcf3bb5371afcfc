//! Interactive build roads operator.
//!
//! The operator wraps a [`RoadBuilder`](crate::road_builder::RoadBuilder) in a
//! modal state machine fed with host input events. Only one operator runs at a
//! time, guarded by [`BuildRoadsLock`]. Inside Bevy the session lives in the
//! [`BuildRoadsSession`] resource and is driven by [`ModalInput`] events.

pub mod operator;
pub mod systems;
pub mod types;


pub use operator::{BuildRoadsOperator, TextLine};
pub use systems::{drive_build_roads, start_build_roads, BuildRoadsPlugin, BuildRoadsSession};
pub use types::{
    BuildRoadsLock, BuildRoadsRequest, EventKind, EventValue, ModalAction, ModalEvent, ModalInput,
    OverlayGridScale,
};
