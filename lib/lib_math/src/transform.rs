use glam::{Mat4, Vec2, Vec3, Vec4, vec3};

/// Corners of the unit quad in the order every quad is written:
/// top-left, top-right, bottom-right, bottom-left.
pub const UNIT_QUAD_CORNERS: [Vec4; 4] = [
    Vec4::new(-0.5, 0.5, 0.0, 1.0),
    Vec4::new(0.5, 0.5, 0.0, 1.0),
    Vec4::new(0.5, -0.5, 0.0, 1.0),
    Vec4::new(-0.5, -0.5, 0.0, 1.0),
];

/// `translate(position) * rotate_z(rotation) * scale(size)`.
///
/// The quad is scaled and rotated about its own center before being placed.
/// Rotation is in degrees, counter-clockwise.
pub fn model_matrix(position: Vec3, size: Vec2, rotation_degrees: f32) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_z(rotation_degrees.to_radians())
        * Mat4::from_scale(vec3(size.x, size.y, 1.0))
}

pub fn model_view_projection(
    view_projection: &Mat4,
    position: Vec3,
    size: Vec2,
    rotation_degrees: f32,
) -> Mat4 {
    *view_projection * model_matrix(position, size, rotation_degrees)
}

/// Runs the unit quad corners through `mvp`, preserving corner order.
pub fn transform_corners(mvp: &Mat4) -> [Vec3; 4] {
    UNIT_QUAD_CORNERS.map(|corner| {
        let clip = *mvp * corner;

        if clip.w != 0.0 && clip.w != 1.0 {
            clip.truncate() / clip.w
        } else {
            clip.truncate()
        }
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use glam::vec2;

    use super::*;
    use crate::Camera;

    fn assert_xy(actual: Vec3, x: f32, y: f32) {
        assert_abs_diff_eq!(actual.x, x, epsilon = 1e-5);
        assert_abs_diff_eq!(actual.y, y, epsilon = 1e-5);
    }

    #[test]
    fn unit_quad_at_origin_matches_clip_space() {
        let camera = Camera {
            orthographic_size: 1.0,
            ..Camera::default()
        };

        let mvp = model_view_projection(&camera.view_projection(1.0), Vec3::ZERO, Vec2::ONE, 0.0);
        let [tl, tr, br, bl] = transform_corners(&mvp);

        assert_xy(tl, -0.5, 0.5);
        assert_xy(tr, 0.5, 0.5);
        assert_xy(br, 0.5, -0.5);
        assert_xy(bl, -0.5, -0.5);
    }

    #[test]
    fn rotation_happens_about_the_quad_center() {
        let mvp = model_view_projection(&Mat4::IDENTITY, vec3(2.0, 1.0, 0.0), vec2(2.0, 1.0), 90.0);
        let [tl, tr, br, bl] = transform_corners(&mvp);

        assert_xy(tl, 2.0 - 0.5, 1.0 - 1.0);
        assert_xy(tr, 2.0 - 0.5, 1.0 + 1.0);
        assert_xy(br, 2.0 + 0.5, 1.0 + 1.0);
        assert_xy(bl, 2.0 + 0.5, 1.0 - 1.0);
    }

    #[test]
    fn zero_sized_quad_collapses_to_its_position() {
        let camera = Camera::default();
        let vp = camera.view_projection(1.0);

        let mvp = model_view_projection(&vp, vec3(0.25, 0.5, 0.0), Vec2::ZERO, 45.0);
        let corners = transform_corners(&mvp);

        for corner in corners {
            assert_xy(corner, 0.25, 0.5);
        }
    }

    #[test]
    fn degenerate_camera_collapses_quads_to_a_point() {
        let camera = Camera {
            orthographic_size: 0.0,
            ..Camera::default()
        };

        for aspect_ratio in [1.0, 0.0] {
            let vp = camera.view_projection(aspect_ratio);
            let mvp = model_view_projection(&vp, vec3(3.0, -1.0, 0.0), Vec2::ONE, 30.0);
            let corners = transform_corners(&mvp);

            for corner in corners {
                assert!(corner.is_finite(), "corner {corner} for aspect {aspect_ratio}");
                assert_eq!(corner, corners[0]);
            }
        }
    }

    #[test]
    fn transform_is_deterministic() {
        let camera = Camera::default();
        let vp = camera.view_projection(16.0 / 9.0);

        let a = transform_corners(&model_view_projection(&vp, vec3(0.3, -0.7, 0.0), vec2(1.5, 0.5), 33.0));
        let b = transform_corners(&model_view_projection(&vp, vec3(0.3, -0.7, 0.0), vec2(1.5, 0.5), 33.0));

        assert_eq!(a, b);
    }
}
