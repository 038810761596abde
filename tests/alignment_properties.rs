use glam::{Quat, Vec3};
use kestrel_placement::alignment::{find_actor_alignment_rotation, SurfaceAlignment};

const EPSILON: f32 = 1e-4;

fn assert_vec_close(actual: Vec3, expected: Vec3) {
    assert!(actual.distance(expected) < EPSILON, "actual {actual:?}, expected {expected:?}");
}

fn assert_same_rotation(actual: Quat, expected: Quat) {
    assert!(actual.dot(expected).abs() > 1.0 - EPSILON, "actual {actual:?}, expected {expected:?}");
}

#[test]
fn already_aligned_rotation_is_returned_unchanged() {
    let rotation = Quat::from_rotation_z(0.4);
    let aligned = find_actor_alignment_rotation(rotation, Vec3::Z, Vec3::Z);
    assert_same_rotation(aligned, rotation);
}

#[test]
fn anti_parallel_axis_is_flipped_exactly() {
    let aligned = find_actor_alignment_rotation(Quat::IDENTITY, Vec3::Z, Vec3::NEG_Z);
    assert_vec_close(aligned * Vec3::Z, Vec3::NEG_Z);
}

#[test]
fn anti_parallel_axis_is_flipped_from_any_orientation() {
    let rotations = [
        Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.8),
        Quat::from_rotation_z(2.2) * Quat::from_rotation_x(-0.6),
    ];
    for rotation in rotations {
        for axis in [Vec3::Z, Vec3::NEG_X] {
            let target = -(rotation * axis);
            let aligned = find_actor_alignment_rotation(rotation, axis, target);
            assert_vec_close(aligned * axis, target);
        }
    }
}

#[test]
fn horizontal_targets_are_reached_with_a_yaw() {
    let aligned = find_actor_alignment_rotation(Quat::IDENTITY, Vec3::NEG_X, Vec3::Y);
    assert_vec_close(aligned * Vec3::NEG_X, Vec3::Y);
}

#[test]
fn standing_actors_keep_their_spin_around_the_normal() {
    let target = Vec3::new(0.0, 0.6, 0.8);
    let unspun = find_actor_alignment_rotation(Quat::IDENTITY, Vec3::Z, target);
    assert_vec_close(unspun * Vec3::Z, target);
    for spin in [0.7_f32, 2.4, -1.3] {
        let aligned = find_actor_alignment_rotation(Quat::from_rotation_z(spin), Vec3::Z, target);
        assert_vec_close(aligned * Vec3::Z, target);
        assert_same_rotation(aligned * unspun.inverse(), Quat::from_axis_angle(target, spin));
    }
}

#[test]
fn aligning_twice_changes_nothing() {
    let normals = [Vec3::new(0.0, 0.6, 0.8), Vec3::X, Vec3::new(0.8, 0.0, -0.6), Vec3::NEG_Y];
    for normal in normals {
        for spin in [0.0_f32, 0.7, 2.4] {
            let once = SurfaceAlignment::STAND_ON_SURFACE.align(normal, Quat::from_rotation_z(spin));
            let twice = SurfaceAlignment::STAND_ON_SURFACE.align(normal, once);
            assert_same_rotation(twice, once);
        }
    }
}

#[test]
fn disabled_alignment_resets_to_identity() {
    let aligned = SurfaceAlignment::Disabled.align(Vec3::X, Quat::from_rotation_y(1.0));
    assert_eq!(aligned, Quat::IDENTITY);
    assert_eq!(SurfaceAlignment::Disabled.axis(), None);
    assert_eq!(SurfaceAlignment::FACE_SURFACE.axis(), Some(Vec3::NEG_X));
}

#[test]
fn targets_turned_about_world_up_turn_the_result_by_the_same_yaw() {
    let target = Vec3::new(0.0, 0.6, 0.8);
    let facing = find_actor_alignment_rotation(Quat::IDENTITY, Vec3::NEG_X, target);
    assert_vec_close(facing * Vec3::NEG_X, target);
    for yaw in [0.9_f32, -2.1] {
        let turn = Quat::from_rotation_z(yaw);
        let turned = find_actor_alignment_rotation(Quat::IDENTITY, Vec3::NEG_X, turn * target);
        assert_vec_close(turned * Vec3::NEG_X, turn * target);
        assert_same_rotation(turned * facing.inverse(), turn);
    }
}

#[test]
fn turning_actor_and_target_together_commutes_with_alignment() {
    let start = Quat::from_rotation_x(0.3);
    let target = Vec3::new(0.8, 0.0, -0.6);
    for axis in [Vec3::Z, Vec3::NEG_X] {
        let aligned = find_actor_alignment_rotation(start, axis, target);
        for yaw in [0.9_f32, -2.1] {
            let turn = Quat::from_rotation_z(yaw);
            let turned = find_actor_alignment_rotation(turn * start, axis, turn * target);
            assert_same_rotation(turned, turn * aligned);
        }
    }
}
