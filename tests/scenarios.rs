use approx::assert_relative_eq;
use cgmath::{Point3, Rad};
use test_case::test_case;
use voxel_sandbox::{
    application_state::{ApplicationState, MAX_FRAME_TIME, NOMINAL_FRAME_TIME},
    config::{GameConfig, WorldConfig},
    engine_state::{
        physics::{
            player::{LocomotionMode, MovementConfig},
            probe::ContactFlags,
            resolver::{CollisionResolver, MoveIntent},
        },
        scene::Collaborators,
        voxels::{
            block::block_type::BlockType,
            noise_field::{ConstantNoise, NoiseField, TerrainParameters},
            world::WorldState,
        },
    },
};
use web_time::Instant;
use winit::keyboard::KeyCode;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn flat_host() -> ApplicationState {
    let config = GameConfig {
        world: WorldConfig {
            terrain: TerrainParameters::superflat(10),
            parkour: None,
        },
        ..GameConfig::default()
    };
    ApplicationState::new(config, Collaborators::headless())
}

fn run_frames(host: &mut ApplicationState, now: &mut Instant, frames: usize) {
    for _ in 0..frames {
        *now += NOMINAL_FRAME_TIME;
        host.frame(*now);
    }
}

fn settled_host() -> (ApplicationState, Instant) {
    let mut host = flat_host();
    let mut now = Instant::now();
    run_frames(&mut host, &mut now, 300);
    (host, now)
}

#[test]
fn stubbed_noise_pins_the_height_formula() {
    init_logging();
    let mut params = TerrainParameters::with_seed(0.0);
    params.height.gap = 100.0;
    params.height.amplitude = 10.0;
    let field = NoiseField::with_raw_noise(params, Box::new(ConstantNoise(0.5)));
    assert_eq!(field.height_at(0, 0), 35);
}

#[test]
fn worlds_with_the_same_seed_agree() {
    let first = WorldState::new(TerrainParameters::with_seed(0.25), None);
    let second = WorldState::new(TerrainParameters::with_seed(0.25), None);
    for x in -20..20 {
        for z in -20..20 {
            assert_eq!(first.field().height_at(x, z), second.field().height_at(x, z));
            for y in 0..45 {
                let position = Point3::new(x, y, z);
                assert_eq!(
                    first.query().block_at(position),
                    second.query().block_at(position)
                );
            }
        }
    }
}

#[test]
fn place_remove_place_equals_one_placement() {
    let position = Point3::new(4, 20, -3);
    let mut once = WorldState::new(TerrainParameters::superflat(10), None);
    once.record_edit(position, BlockType::Diamond, true);

    let mut thrice = WorldState::new(TerrainParameters::superflat(10), None);
    thrice.record_edit(position, BlockType::Diamond, true);
    thrice.record_edit(position, BlockType::Diamond, false);
    thrice.record_edit(position, BlockType::Diamond, true);

    assert_eq!(once.query().block_at(position), thrice.query().block_at(position));
    assert_eq!(thrice.query().block_at(position), BlockType::Diamond);
    assert_eq!(once.edits().len(), thrice.edits().len());
}

#[test]
fn bedrock_ignores_removal_edits() {
    let mut world = WorldState::new(TerrainParameters::default(), None);
    for x in -3..3 {
        let position = Point3::new(x, 0, x * 2);
        world.record_edit(position, BlockType::Bedrock, false);
        assert_eq!(world.query().block_at(position), BlockType::Bedrock);
        assert!(world.query().is_solid(position));
    }
}

#[test]
fn resting_player_stays_put() {
    init_logging();
    let (mut host, mut now) = settled_host();
    let before = host.engine_state.locomotion().position();
    run_frames(&mut host, &mut now, 1);

    let state = host.engine_state.locomotion().state();
    assert!(state.contacts.down);
    assert!(!state.contacts.any_horizontal());
    assert_eq!(state.velocity.y, 0.0);
    assert_eq!(host.engine_state.locomotion().position(), before);
}

#[test]
fn jump_closes_the_ground_probe_until_the_window_ends() {
    let (mut host, mut now) = settled_host();
    let body_height = host.engine_state.locomotion().config().body.height;

    host.input_manager.intake_key(KeyCode::Space, true, false);
    run_frames(&mut host, &mut now, 1);
    host.input_manager.intake_key(KeyCode::Space, false, false);

    let locomotion = host.engine_state.locomotion();
    assert!(locomotion.state().is_jumping);
    assert_eq!(locomotion.down_reach(), 0.0);
    assert!(locomotion.state().velocity.y > 6.0);
    assert!(locomotion.state().velocity.y <= 7.2 + 1e-4);

    run_frames(&mut host, &mut now, 20);
    assert_eq!(host.engine_state.locomotion().down_reach(), body_height);

    run_frames(&mut host, &mut now, 100);
    let state = host.engine_state.locomotion().state();
    assert!(state.contacts.down);
    assert!(!state.is_jumping);
}

#[test]
fn walking_into_a_wall_stops_at_its_face() {
    let (mut host, mut now) = settled_host();
    for y in 11..=13 {
        for z in -2..=2 {
            host.engine_state
                .world_mut()
                .record_edit(Point3::new(2, y, z), BlockType::Stone, true);
        }
    }

    host.input_manager.intake_key(KeyCode::KeyW, true, false);
    run_frames(&mut host, &mut now, 120);

    let position = host.engine_state.locomotion().position();
    assert!(position.x < 1.5, "walked into the wall: {:?}", position);
    assert!(position.x > 0.5);
    assert_relative_eq!(position.z, 0.0, epsilon = 1e-4);
    assert!(host.engine_state.locomotion().state().contacts.front);
}

#[test]
fn slow_frames_do_not_pass_through_walls() {
    let (mut host, mut now) = settled_host();
    for y in 11..=13 {
        for z in -2..=2 {
            host.engine_state
                .world_mut()
                .record_edit(Point3::new(2, y, z), BlockType::Stone, true);
        }
    }

    host.input_manager.intake_key(KeyCode::KeyW, true, false);
    for _ in 0..20 {
        now += MAX_FRAME_TIME;
        host.frame(now);
    }

    let position = host.engine_state.locomotion().position();
    assert!(position.x < 1.5, "walked into the wall: {:?}", position);
    assert!(position.x > 1.0);
    assert!(host.engine_state.locomotion().state().contacts.front);
}

#[test]
fn straight_on_front_contact_moves_nowhere() {
    let contacts = ContactFlags {
        front: true,
        ..ContactFlags::default()
    };
    let intent = MoveIntent {
        forward: 4.317,
        strafe: 0.0,
        vertical: 0.0,
    };
    let resolution = CollisionResolver::resolve(&contacts, intent, Rad(0.0), 0.016);
    assert_eq!(resolution.displacement.x, 0.0);
    assert_eq!(resolution.displacement.z, 0.0);
}

#[test_case(LocomotionMode::Walking, 7.2 ; "walking")]
#[test_case(LocomotionMode::Sprinting, 7.84 ; "sprinting")]
#[test_case(LocomotionMode::Sneaking, 6.8 ; "sneaking")]
fn jump_impulses(mode: LocomotionMode, expected: f32) {
    assert_relative_eq!(
        MovementConfig::default().jump_velocity(mode),
        expected,
        epsilon = 1e-5
    );
}

#[test]
fn new_game_starts_clean() {
    let (mut host, mut now) = settled_host();
    host.engine_state
        .world_mut()
        .record_edit(Point3::new(1, 11, 1), BlockType::Glass, true);
    host.input_manager.intake_key(KeyCode::KeyQ, true, false);
    run_frames(&mut host, &mut now, 1);
    assert_eq!(host.engine_state.locomotion().mode(), LocomotionMode::Flying);

    host.new_game(99);
    assert!(host.engine_state.world().edits().is_empty());
    assert!(host.scheduler.is_empty());
    assert_eq!(host.engine_state.locomotion().mode(), LocomotionMode::Walking);
    assert_eq!(host.engine_state.locomotion().position().y, 40.0);
}
