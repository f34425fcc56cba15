//! Playground Example
//!
//! A playable first-person scene: a floor, a wall and a stack of crates to
//! throw around with the gravity gun.
//!
//! ## Controls
//! - **W/A/S/D**: Move
//! - **Mouse**: Look
//! - **Shift**: Dash (while moving on the ground)
//! - **Space**: Jump
//! - **F** (hold): Jetpack
//! - **E**: Grab / drop
//! - **Left mouse**: Launch the held crate, or whatever is in front of you
//! - **Esc**: Release the cursor

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_rapier3d::prelude::*;
use fps_gravity_controller::prelude::*;

// ==================== Constants ====================

const PLAYER_HALF_HEIGHT: f32 = 0.6;
const PLAYER_RADIUS: f32 = 0.3;

const CRATE_HALF_SIZE: f32 = 0.4;

/// Radians of look per pixel of mouse motion.
const MOUSE_SENSITIVITY: f32 = 0.002;

/// Marks the player character.
#[derive(Component)]
struct Player;

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Playground - First-Person Controller Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics, in metres with the default gravity
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        // Character controller
        .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
        .add_systems(Startup, (setup, grab_cursor))
        .add_systems(Update, (player_input, release_cursor, log_gravity_gun))
        .add_systems(
            PostUpdate,
            follow_camera.before(bevy::transform::TransformSystem::TransformPropagate),
        )
        .run();
}

// ==================== Setup ====================

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Floor, top face at y = 0
    commands.spawn((
        Transform::from_xyz(0.0, -0.5, 0.0),
        Mesh3d(meshes.add(Cuboid::new(40.0, 1.0, 40.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.3))),
        RigidBody::Fixed,
        Collider::cuboid(20.0, 0.5, 20.0),
    ));

    // A wall to dash into
    commands.spawn((
        Transform::from_xyz(0.0, 1.5, -12.0),
        Mesh3d(meshes.add(Cuboid::new(10.0, 3.0, 0.5))),
        MeshMaterial3d(materials.add(Color::srgb(0.4, 0.5, 0.3))),
        RigidBody::Fixed,
        Collider::cuboid(5.0, 1.5, 0.25),
    ));

    // Crates
    let crate_mesh = meshes.add(Cuboid::from_length(CRATE_HALF_SIZE * 2.0));
    let crate_material = materials.add(Color::srgb(0.8, 0.5, 0.2));
    for row in 0..3 {
        for column in 0..3 {
            commands.spawn((
                Transform::from_xyz(
                    (column as f32 - 1.0) * 1.2,
                    CRATE_HALF_SIZE + row as f32 * CRATE_HALF_SIZE * 2.0,
                    -6.0,
                ),
                Mesh3d(crate_mesh.clone()),
                MeshMaterial3d(crate_material.clone()),
                RigidBody::Dynamic,
                Collider::cuboid(CRATE_HALF_SIZE, CRATE_HALF_SIZE, CRATE_HALF_SIZE),
            ));
        }
    }

    // Player
    commands.spawn((
        Name::new("Player"),
        Player,
        Transform::from_xyz(0.0, PLAYER_HALF_HEIGHT + PLAYER_RADIUS + 0.1, 0.0),
        FirstPersonController,
        ControllerConfig::metric(),
        Rapier3dCharacterBundle::rotation_locked(),
        Collider::capsule_y(PLAYER_HALF_HEIGHT, PLAYER_RADIUS),
    ));

    commands.spawn((Camera3d::default(), Transform::default()));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Text::new("WASD: Move | Mouse: Look | Shift: Dash | Space: Jump | F: Jet | E: Grab | LMB: Fire"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn grab_cursor(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = windows.single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

fn release_cursor(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }
    if let Ok(mut window) = windows.single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

// ==================== Input ====================

fn axis(keyboard: &ButtonInput<KeyCode>, positive: KeyCode, negative: KeyCode) -> f32 {
    let mut value = 0.0;
    if keyboard.pressed(positive) {
        value += 1.0;
    }
    if keyboard.pressed(negative) {
        value -= 1.0;
    }
    value
}

/// Translate keyboard and mouse state into controller inputs.
fn player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    q_player: Query<Entity, With<Player>>,
    mut inputs: EventWriter<ControllerInputEvent>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let mut send = |input| {
        inputs.write(ControllerInputEvent::new(player, input));
    };

    send(ControllerInput::Forward(axis(&keyboard, KeyCode::KeyW, KeyCode::KeyS)));
    send(ControllerInput::Right(axis(&keyboard, KeyCode::KeyD, KeyCode::KeyA)));

    if mouse_motion.delta != Vec2::ZERO {
        send(ControllerInput::Turn(-mouse_motion.delta.x * MOUSE_SENSITIVITY));
        send(ControllerInput::LookUp(-mouse_motion.delta.y * MOUSE_SENSITIVITY));
    }

    if keyboard.just_pressed(KeyCode::ShiftLeft) {
        send(ControllerInput::Dash);
    }
    if keyboard.just_pressed(KeyCode::Space) {
        send(ControllerInput::Jump);
    }
    if keyboard.just_released(KeyCode::Space) {
        send(ControllerInput::StopJumping);
    }
    if keyboard.just_pressed(KeyCode::KeyF) {
        send(ControllerInput::ThrustPressed);
    }
    if keyboard.just_released(KeyCode::KeyF) {
        send(ControllerInput::ThrustReleased);
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        send(ControllerInput::Interact);
    }
    if mouse_buttons.just_pressed(MouseButton::Left) {
        send(ControllerInput::Fire);
    }
}

// ==================== Camera ====================

/// Put the camera at the player's eye, looking along the view.
fn follow_camera(
    q_player: Query<(&Transform, &ViewAngles, &ControllerConfig), With<Player>>,
    mut q_camera: Query<&mut Transform, (With<Camera3d>, Without<Player>)>,
) {
    let (Ok((player, view, config)), Ok(mut camera)) = (q_player.single(), q_camera.single_mut())
    else {
        return;
    };
    camera.translation = config.eye_position(player.translation);
    camera.rotation = view.camera_rotation();
}

fn log_gravity_gun(mut events: EventReader<GravityGunEvent>) {
    for event in events.read() {
        info!(?event, "gravity gun");
    }
}
