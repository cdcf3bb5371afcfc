use bevy::prelude::*;

pub mod camera;
pub mod input;
pub mod overlay;

use camera::CameraDrag;
use input::CursorGroundPos;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraDrag>()
            .init_resource::<CursorGroundPos>()
            .add_systems(Startup, (camera::setup_camera, setup_lighting))
            .add_systems(
                Update,
                (
                    camera::camera_pan_keyboard,
                    camera::camera_middle_drag,
                    camera::camera_zoom,
                    camera::apply_orbit_camera,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (input::update_cursor_ground_pos, input::forward_modal_input)
                    .chain()
                    .after(camera::apply_orbit_camera)
                    .before(roads::build_roads::drive_build_roads),
            )
            .add_systems(
                Update,
                (overlay::draw_ground_grid, overlay::draw_build_roads_overlay)
                    .after(roads::build_roads::drive_build_roads),
            );
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            ..default()
        },
        Transform::from_xyz(100.0, -100.0, 300.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });
}
