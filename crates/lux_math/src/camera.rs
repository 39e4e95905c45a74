use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::Ray;

/// Pinhole camera that generates one primary ray per pixel.
///
/// Pixel rows are counted from the bottom of the image: pixel `(x, y)` maps to
/// normalized device coordinates `(x / width, y / height) * 2 - 1`. The same
/// convention is used when the denoiser reprojects world positions back onto a
/// previous frame, so the two must stay in sync.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub vertical_fov: f32,
    pub near: f32,
    pub far: f32,

    width: u32,
    height: u32,
    view: Mat4,
    projection: Mat4,
    inverse_view: Mat4,
    inverse_projection: Mat4,
    ray_directions: Vec<Vec3>,
}

impl Camera {
    /// Create a camera at `position` looking at `target`.
    pub fn new(position: Vec3, target: Vec3, vertical_fov: f32) -> Self {
        let mut camera = Self {
            position,
            forward: (target - position).normalize_or_zero(),
            up: Vec3::Y,
            vertical_fov,
            near: 0.1,
            far: 100.0,
            width: 0,
            height: 0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            ray_directions: Vec::new(),
        };
        camera.recompute_view();
        camera
    }

    /// Set the clip planes.
    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self.recompute_projection();
        self.recompute_ray_directions();
        self
    }

    /// Resize the viewport. A no-op when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;

        // Order matters: directions depend on both matrices.
        self.recompute_projection();
        self.recompute_view();
    }

    /// Move the camera and re-aim it.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.forward = (target - position).normalize_or_zero();
        self.recompute_view();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the view matrix (world → camera space)
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Get the projection matrix (camera → clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Normalized world-space direction of the primary ray through pixel `(x, y)`.
    pub fn ray_direction(&self, x: u32, y: u32) -> Vec3 {
        self.ray_directions[(y * self.width + x) as usize]
    }

    /// Primary ray through pixel `(x, y)`.
    pub fn primary_ray(&self, x: u32, y: u32) -> Ray {
        Ray::new(self.position, self.ray_direction(x, y))
    }

    /// Normalized direction through a continuous image position in pixel
    /// units, e.g. `(x + 0.5, y + 0.5)` for a pixel center.
    pub fn direction_through(&self, px: f32, py: f32) -> Vec3 {
        let (width, height) = (self.width.max(1) as f32, self.height.max(1) as f32);
        let ndc = Vec2::new(px / width, py / height) * 2.0 - 1.0;
        let target = self.inverse_projection * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let eye_dir = (target.truncate() / target.w).normalize();
        let world_dir = self.inverse_view * eye_dir.extend(0.0);
        world_dir.truncate().normalize()
    }

    fn recompute_projection(&mut self) {
        let aspect = if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        };
        self.projection =
            Mat4::perspective_rh(self.vertical_fov.to_radians(), aspect, self.near, self.far);
        self.inverse_projection = self.projection.inverse();
    }

    fn recompute_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.forward, self.up);
        self.inverse_view = self.view.inverse();
        self.recompute_ray_directions();
    }

    fn recompute_ray_directions(&mut self) {
        let (width, height) = (self.width, self.height);
        self.ray_directions.clear();
        self.ray_directions.reserve((width * height) as usize);

        for y in 0..height {
            for x in 0..width {
                let direction = self.direction_through(x as f32, y as f32);
                self.ray_directions.push(direction);
            }
        }
    }
}
