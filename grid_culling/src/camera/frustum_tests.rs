use glam::{Mat4, Vec3, Vec4};
use crate::scene::AABB;
use super::*;

/// Frustum looking down -Z from `eye`, OpenGL clip conventions.
fn perspective_frustum(eye: Vec3, fov: f32, far: f32) -> Frustum {
    let projection = Mat4::perspective_rh_gl(fov, 1.0, 0.1, far);
    let view = Mat4::look_at_rh(eye, eye + Vec3::NEG_Z, Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

/// Axis-aligned "frustum": the box [-5, 5]^3 expressed as six inward planes.
fn box_frustum() -> Frustum {
    Frustum::from_planes([
        Vec4::new(1.0, 0.0, 0.0, 5.0),   // x >= -5
        Vec4::new(-1.0, 0.0, 0.0, 5.0),  // x <= 5
        Vec4::new(0.0, 1.0, 0.0, 5.0),   // y >= -5
        Vec4::new(0.0, -1.0, 0.0, 5.0),  // y <= 5
        Vec4::new(0.0, 0.0, 1.0, 5.0),   // z >= -5
        Vec4::new(0.0, 0.0, -1.0, 5.0),  // z <= 5
    ])
}

/// Reference rejection test: some plane has all eight corners outside.
fn all_corners_outside_some_plane(frustum: &Frustum, aabb: &AABB) -> bool {
    frustum.planes.iter().any(|plane| {
        aabb.corners()
            .iter()
            .all(|corner| plane.truncate().dot(*corner) + plane.w < 0.0)
    })
}

fn make_aabb(min: Vec3, max: Vec3) -> AABB {
    AABB::new(min, max)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_frustum_from_perspective_is_normalized() {
    let frustum = perspective_frustum(Vec3::new(0.0, 0.0, 5.0), std::f32::consts::FRAC_PI_4, 100.0);
    for plane in &frustum.planes {
        let normal_len = plane.truncate().length();
        assert!((normal_len - 1.0).abs() < 1e-4, "plane normal should be unit length");
    }
    assert!(frustum.is_finite());
}

#[test]
fn test_from_planes_normalizes() {
    let frustum = Frustum::from_planes([Vec4::new(0.0, 2.0, 0.0, 4.0); 6]);
    assert_eq!(frustum.planes[PLANE_TOP], Vec4::new(0.0, 1.0, 0.0, 2.0));
}

#[test]
fn test_signed_distance_sign() {
    let frustum = box_frustum();
    assert!(frustum.signed_distance(PLANE_LEFT, Vec3::ZERO) > 0.0);
    assert!(frustum.signed_distance(PLANE_LEFT, Vec3::new(-6.0, 0.0, 0.0)) < 0.0);
}

#[test]
fn test_nan_frustum_is_not_finite() {
    let frustum = Frustum { planes: [Vec4::splat(f32::NAN); 6] };
    assert!(!frustum.is_finite());
}

// ============================================================================
// Frustum::intersects_aabb
// ============================================================================

#[test]
fn test_aabb_inside_all_half_spaces_is_accepted() {
    let frustum = box_frustum();
    let aabb = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    assert!(frustum.intersects_aabb(&aabb));
}

#[test]
fn test_aabb_outside_single_plane_is_rejected() {
    let frustum = box_frustum();
    // Inside five planes, fully beyond x = 5
    let aabb = make_aabb(Vec3::new(6.0, -1.0, -1.0), Vec3::new(7.0, 1.0, 1.0));
    assert!(!frustum.intersects_aabb(&aabb));
}

#[test]
fn test_aabb_straddling_plane_is_accepted() {
    let frustum = box_frustum();
    let aabb = make_aabb(Vec3::new(4.0, 0.0, 0.0), Vec3::new(6.0, 1.0, 1.0));
    assert!(frustum.intersects_aabb(&aabb));
}

#[test]
fn test_corner_false_positive_is_tolerated() {
    let frustum = box_frustum();
    // Outside the corner region but not fully outside any single plane:
    // the conservative test keeps it.
    let aabb = make_aabb(Vec3::new(4.9, 4.9, -1.0), Vec3::new(9.0, 9.0, 1.0));
    assert!(frustum.intersects_aabb(&aabb));
}

#[test]
fn test_aabb_behind_camera() {
    let frustum = perspective_frustum(Vec3::new(0.0, 0.0, 5.0), std::f32::consts::FRAC_PI_2, 100.0);
    let aabb = make_aabb(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 12.0));
    assert!(!frustum.intersects_aabb(&aabb));
}

#[test]
fn test_aabb_beyond_far_plane() {
    let frustum = perspective_frustum(Vec3::new(0.0, 0.0, 5.0), std::f32::consts::FRAC_PI_2, 10.0);
    let aabb = make_aabb(Vec3::new(-1.0, -1.0, -20.0), Vec3::new(1.0, 1.0, -18.0));
    assert!(!frustum.intersects_aabb(&aabb));
}

#[test]
fn test_aabb_in_front_of_camera() {
    let frustum = perspective_frustum(Vec3::new(0.0, 0.0, 5.0), std::f32::consts::FRAC_PI_2, 100.0);
    let aabb = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    assert!(frustum.intersects_aabb(&aabb));
}

#[test]
fn test_positive_vertex_matches_eight_corner_test() {
    let frustum = perspective_frustum(Vec3::new(2.0, 1.0, 4.0), std::f32::consts::FRAC_PI_3, 30.0);

    // Sweep unit boxes over a volume around the camera
    for x in -12..12 {
        for y in -3..4 {
            for z in -40..10 {
                let min = Vec3::new(x as f32, y as f32, z as f32);
                let aabb = make_aabb(min, min + Vec3::ONE);
                assert_eq!(
                    frustum.intersects_aabb(&aabb),
                    !all_corners_outside_some_plane(&frustum, &aabb),
                    "mismatch for box at {:?}", min
                );
            }
        }
    }
}

#[test]
fn test_no_false_negative_for_box_containing_inside_point() {
    let frustum = perspective_frustum(Vec3::ZERO, std::f32::consts::FRAC_PI_2, 50.0);
    let inside_points = [
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(3.0, -2.0, -10.0),
        Vec3::new(-20.0, 15.0, -40.0),
    ];
    for point in inside_points {
        assert!((0..6).all(|p| frustum.signed_distance(p, point) >= 0.0));
        // Any box touching an inside point must be kept
        let aabb = make_aabb(point - Vec3::splat(0.25), point + Vec3::splat(0.25));
        assert!(frustum.intersects_aabb(&aabb));
        let large = make_aabb(point - Vec3::new(100.0, 0.5, 0.5), point + Vec3::new(0.1, 0.5, 0.5));
        assert!(frustum.intersects_aabb(&large));
    }
}

// ============================================================================
// Frustum::classify_aabb
// ============================================================================

#[test]
fn test_classify_inside_partial_outside() {
    let frustum = box_frustum();
    let inside = make_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    let partial = make_aabb(Vec3::splat(4.0), Vec3::splat(6.0));
    let outside = make_aabb(Vec3::splat(6.0), Vec3::splat(7.0));

    assert_eq!(frustum.classify_aabb(&inside), FrustumTest::Inside);
    assert_eq!(frustum.classify_aabb(&partial), FrustumTest::Partial);
    assert_eq!(frustum.classify_aabb(&outside), FrustumTest::Outside);
}

#[test]
fn test_plane_constants() {
    assert_eq!(PLANE_LEFT, 0);
    assert_eq!(PLANE_RIGHT, 1);
    assert_eq!(PLANE_BOTTOM, 2);
    assert_eq!(PLANE_TOP, 3);
    assert_eq!(PLANE_NEAR, 4);
    assert_eq!(PLANE_FAR, 5);
}
