use avian3d::prelude::*;
use bevy::{
    input::mouse::AccumulatedMouseMotion,
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow},
};
use slope_locomotion::prelude::*;

/// Mouse sensitivity in radians per pixel
const SENSITIVITY: f32 = 0.003;

/// Eye height above the player's center
const EYE_OFFSET: f32 = 0.8;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Slope Locomotion Playground".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(LocomotionPlugin)
        .add_systems(Startup, (setup, setup_cursor_grab))
        .add_systems(Update, (look, follow_player, log_messages, toggle_cursor_grab))
        .run();
}

/// Simple first-person view; writes the player's orientation frame
#[derive(Component, Default)]
struct ViewAngles {
    yaw: f32,
    pitch: f32,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_player(&mut commands, PlayerConfig::default(), Vec3::new(0.0, 2.0, 0.0));

    commands.spawn((
        Camera3d::default(),
        ViewAngles::default(),
        Transform::from_xyz(0.0, 2.0 + EYE_OFFSET, 0.0),
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let ground_mat = materials.add(Color::srgb(0.35, 0.55, 0.35));
    let ramp_mat = materials.add(Color::srgb(0.52, 0.50, 0.48));
    let steep_mat = materials.add(Color::srgb(0.6, 0.3, 0.3));
    let ceiling_mat = materials.add(Color::srgb(0.4, 0.3, 0.3));

    // ── Floor ────────────────────────────────────────────────────
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(200.0, 200.0))),
        MeshMaterial3d(ground_mat),
        Transform::default(),
        RigidBody::Static,
        Collider::half_space(Vec3::Y),
        CollisionLayers::new(GameLayer::Ground, [GameLayer::Player]),
    ));

    // ── Ramps: walkable (30°) and too steep (60°) ────────────────
    for (x, degrees, material) in [(-6.0, 30.0_f32, ramp_mat), (6.0, 60.0, steep_mat)] {
        let length = 12.0;
        let rotation = Quat::from_rotation_x(degrees.to_radians());
        let center = Vec3::new(x, length / 2.0 * degrees.to_radians().sin(), -12.0);

        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(4.0, 0.2, length))),
            MeshMaterial3d(material),
            Transform::from_translation(center).with_rotation(rotation),
            RigidBody::Static,
            Collider::cuboid(4.0, 0.2, length),
            CollisionLayers::new(GameLayer::Ground, [GameLayer::Player]),
        ));
    }

    // ── Low ceiling: crouch under, forced to stay crouched ───────
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(4.0, 0.5, 6.0))),
        MeshMaterial3d(ceiling_mat),
        Transform::from_xyz(0.0, 1.5, 10.0),
        RigidBody::Static,
        Collider::cuboid(4.0, 0.5, 6.0),
        CollisionLayers::new(GameLayer::Default, [GameLayer::Player]),
    ));
}

fn look(
    motion: Res<AccumulatedMouseMotion>,
    mut camera: Query<(&mut Transform, &mut ViewAngles)>,
    mut player: Query<&mut Orientation, With<Player>>,
) {
    let Ok((mut transform, mut angles)) = camera.single_mut() else {
        return;
    };

    angles.yaw -= motion.delta.x * SENSITIVITY;
    angles.pitch = (angles.pitch - motion.delta.y * SENSITIVITY)
        .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    transform.rotation = Quat::from_euler(EulerRot::YXZ, angles.yaw, angles.pitch, 0.0);

    // Pitch stays out of the movement frame
    if let Ok(mut orientation) = player.single_mut() {
        *orientation = Orientation::from_yaw(angles.yaw);
    }
}

fn follow_player(
    player: Query<&Transform, With<Player>>,
    mut camera: Query<&mut Transform, (With<ViewAngles>, Without<Player>)>,
) {
    let (Ok(player), Ok(mut camera)) = (player.single(), camera.single_mut()) else {
        return;
    };
    camera.translation = player.translation + Vec3::Y * EYE_OFFSET;
}

fn log_messages(mut reader: MessageReader<LocomotionMessage>) {
    for message in reader.read() {
        info!("{message:?}");
    }
}

fn setup_cursor_grab(mut cursor_query: Query<&mut CursorOptions, With<PrimaryWindow>>) {
    if let Ok(mut cursor) = cursor_query.single_mut() {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
    }
}

fn toggle_cursor_grab(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut cursor_query: Query<&mut CursorOptions, With<PrimaryWindow>>,
) {
    let Ok(mut cursor) = cursor_query.single_mut() else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Escape) {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    } else if mouse.just_pressed(MouseButton::Left) && cursor.grab_mode == CursorGrabMode::None {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
    }
}
