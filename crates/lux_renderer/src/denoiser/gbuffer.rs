//! Per-pixel frame storage.

use lux_math::{Mat4, Vec3};

use crate::Color;

/// Row-major 2D buffer; row 0 is the bottom of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Clone + Default> FrameBuffer<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); (width * height) as usize],
        }
    }

    /// Reallocate for a new size and reset every cell to its default.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize((width * height) as usize, T::default());
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> FrameBuffer<T> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> &T {
        &self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, x: u32, y: u32) -> &mut T {
        &mut self.data[(y * self.width + x) as usize]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Everything the denoiser knows about one pixel of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texel {
    pub position: Vec3,
    pub color: Color,
    /// World-space normal, flipped toward the camera.
    pub normal: Vec3,
    /// False when the primary ray missed; such pixels are never filtered.
    pub contributor: bool,
    pub primitive_id: Option<u32>,
}

impl Texel {
    /// A pixel whose primary ray left the scene.
    pub fn background(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

impl Default for Texel {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Color::ZERO,
            normal: Vec3::ZERO,
            contributor: false,
            primitive_id: None,
        }
    }
}

/// One frame of texels plus the camera matrices it was captured with.
#[derive(Debug, Clone, PartialEq)]
pub struct GBuffer {
    pub texels: FrameBuffer<Texel>,
    pub view: Mat4,
    pub projection: Mat4,
}

impl GBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            texels: FrameBuffer::new(width, height),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    pub fn reset(&mut self, width: u32, height: u32) {
        self.texels.reset(width, height);
        self.view = Mat4::IDENTITY;
        self.projection = Mat4::IDENTITY;
    }

    pub fn width(&self) -> u32 {
        self.texels.width()
    }

    pub fn height(&self) -> u32 {
        self.texels.height()
    }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> &Texel {
        self.texels.get(x, y)
    }

    #[inline]
    pub fn color(&self, x: u32, y: u32) -> Color {
        self.texels.get(x, y).color
    }
}
