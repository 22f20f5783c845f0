use glam::{Mat4, Vec2, Vec3, vec3, vec4};

/// A 2D orthographic camera.
///
/// The eye sits at `position` and looks toward -Z with +Y up, so world space is
/// right-handed with +X to the right of the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Half of the visible world height.
    pub orthographic_size: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: vec3(0.0, 0.0, 1.0),
            orthographic_size: 1.0,
            near_plane: 0.1,
            far_plane: 100.0,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position - Vec3::Z, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let half_height = self.orthographic_size;
        let half_width = self.orthographic_size * aspect_ratio;

        // A zero extent collapses the visible area onto the view center.
        if half_width == 0.0 || half_height == 0.0 {
            let mut projection =
                Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, self.near_plane, self.far_plane);
            projection.x_axis.x = 0.0;
            projection.y_axis.y = 0.0;

            return projection;
        }

        Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near_plane,
            self.far_plane,
        )
    }

    /// `projection * view`, computed once per frame.
    pub fn view_projection(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    /// Converts a window position (pixels, origin top-left, y down) into world XY.
    pub fn screen_to_world(&self, screen_position: Vec2, screen_size: Vec2) -> Vec2 {
        if screen_size.x <= 0.0 || screen_size.y <= 0.0 || self.orthographic_size == 0.0 {
            return self.position.truncate();
        }

        let ndc_x = screen_position.x / screen_size.x * 2.0 - 1.0;
        let ndc_y = 1.0 - screen_position.y / screen_size.y * 2.0;

        let inverse = self
            .view_projection(screen_size.x / screen_size.y)
            .inverse();

        let world = inverse * vec4(ndc_x, ndc_y, 0.0, 1.0);
        let world = world / world.w;

        world.truncate().truncate()
    }
}
