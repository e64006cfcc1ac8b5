//! Orbit camera, inertial damping controller and view/projection uniforms.
//!
//! The camera orbits a target point: its pose is a yaw/pitch pair and a
//! distance rather than a free transform. The [`OrbitController`] accumulates
//! mouse input and feeds it into the camera through exponential damping, so
//! rotation, pan and zoom glide to a stop instead of snapping.

use instant::Duration;
use wgpu::util::DeviceExt;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector2, Vector3, perspective};
use winit::event::{MouseScrollDelta, WindowEvent};

/// wgpu clip space covers z in [0, 1] while cgmath produces OpenGL-style
/// [-1, 1], so every projection matrix is corrected with this factor.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Keeps the pitch away from the poles where `look_at` degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.05;

/// A camera orbiting a target point.
#[derive(Debug)]
pub struct Camera {
    pub target: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub distance: f32,
}

impl Camera {
    pub fn new<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        target: Point3<f32>,
        yaw: Y,
        pitch: P,
        distance: f32,
    ) -> Self {
        Self {
            target,
            yaw: yaw.into(),
            pitch: pitch.into(),
            distance,
        }
    }

    /// Derive the orbit pose that places the eye at `eye` looking at `target`.
    pub fn looking_from(eye: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude();
        let yaw = Rad(offset.z.atan2(offset.x));
        let pitch = Rad((offset.y / distance).asin());
        Self {
            target,
            yaw,
            pitch,
            distance,
        }
    }

    /// The eye position in world space.
    pub fn position(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        self.target
            + Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw) * self.distance
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }
}

#[derive(Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Accumulates mouse input and applies it to a [`Camera`] with inertial
/// damping: each frame a fixed fraction of the pending motion is consumed,
/// the rest carries over.
#[derive(Debug)]
pub struct OrbitController {
    rotate_speed: f32,
    zoom_speed: f32,
    pan_speed: f32,
    damping: f32,
    min_distance: f32,
    max_distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
    pending_pan: Vector2<f32>,
}

impl OrbitController {
    pub fn new(min_distance: f32, max_distance: f32, damping: f32) -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 2.0,
            pan_speed: 0.002,
            damping,
            min_distance,
            max_distance,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            pending_pan: Vector2::new(0.0, 0.0),
        }
    }

    /// Left-drag: rotate around the target.
    pub fn handle_rotate(&mut self, dx: f64, dy: f64) {
        self.pending_yaw += dx as f32 * self.rotate_speed;
        self.pending_pitch += dy as f32 * self.rotate_speed;
    }

    /// Right-drag: pan the target in the view plane.
    pub fn handle_pan(&mut self, dx: f64, dy: f64) {
        self.pending_pan.x += dx as f32 * self.pan_speed;
        self.pending_pan.y += dy as f32 * self.pan_speed;
    }

    /// Scroll wheel zoom; other window events are ignored.
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            self.pending_zoom += match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
            };
        }
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        // Fraction of the pending motion consumed this frame, normalized so
        // the feel is the same at any frame rate.
        let t = 1.0 - (1.0 - self.damping).powf(dt.as_secs_f32() * 60.0);

        let yaw = self.pending_yaw * t;
        let pitch = self.pending_pitch * t;
        let zoom = self.pending_zoom * t;
        let pan = self.pending_pan * t;
        self.pending_yaw -= yaw;
        self.pending_pitch -= pitch;
        self.pending_zoom -= zoom;
        self.pending_pan -= pan;

        camera.yaw += Rad(yaw);
        camera.pitch = Rad((camera.pitch.0 - pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT));
        camera.distance =
            (camera.distance - zoom * self.zoom_speed).clamp(self.min_distance, self.max_distance);

        if pan.x != 0.0 || pan.y != 0.0 {
            let forward = (camera.target - camera.position()).normalize();
            let right = forward.cross(Vector3::unit_y()).normalize();
            let up = right.cross(forward);
            camera.target += (right * -pan.x + up * pan.y) * camera.distance;
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera state bundled with its GPU resources.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        camera: Camera,
        controller: OrbitController,
        projection: &Projection,
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = Self::bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::EuclideanSpace;

    #[test]
    fn looking_from_round_trips_eye_position() {
        let eye = Point3::new(20.0, 15.0, 20.0);
        let camera = Camera::looking_from(eye, Point3::origin());
        let recovered = camera.position();
        assert!((recovered.x - eye.x).abs() < 1e-4);
        assert!((recovered.y - eye.y).abs() < 1e-4);
        assert!((recovered.z - eye.z).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped_to_distance_bounds() {
        let mut camera = Camera::looking_from(Point3::new(20.0, 15.0, 20.0), Point3::origin());
        let mut controller = OrbitController::new(10.0, 50.0, 0.05);
        // A huge zoom-in request must not pass the minimum distance.
        controller.pending_zoom = 1e6;
        for _ in 0..600 {
            controller.update(&mut camera, Duration::from_millis(16));
        }
        assert!(camera.distance >= 10.0);

        controller.pending_zoom = -1e6;
        for _ in 0..600 {
            controller.update(&mut camera, Duration::from_millis(16));
        }
        assert!(camera.distance <= 50.0);
    }

    #[test]
    fn damping_consumes_pending_rotation() {
        let mut camera = Camera::looking_from(Point3::new(20.0, 15.0, 20.0), Point3::origin());
        let mut controller = OrbitController::new(10.0, 50.0, 0.05);
        controller.handle_rotate(100.0, 0.0);
        let start_yaw = camera.yaw;
        for _ in 0..600 {
            controller.update(&mut camera, Duration::from_millis(16));
        }
        // All of the requested rotation eventually lands on the camera.
        assert!(((camera.yaw - start_yaw).0 - 100.0 * 0.005).abs() < 1e-3);
        assert!(controller.pending_yaw.abs() < 1e-4);
    }
}
