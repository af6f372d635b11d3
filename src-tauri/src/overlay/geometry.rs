//! Geometry, color and pixel-buffer types shared by the overlay pipeline.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Bounds of the proxy region in device-independent (CSS) units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Backing-buffer size for this geometry at the given scale.
    ///
    /// Fractional pixels are truncated; negative or non-finite sizes
    /// collapse to zero.
    pub fn pixel_size(&self, device_pixel_ratio: f64) -> PixelSize {
        let scale = sanitize_pixel_ratio(device_pixel_ratio);
        PixelSize {
            width: to_pixels(self.width * scale),
            height: to_pixels(self.height * scale),
        }
    }
}

fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.trunc().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Device pixel ratio with non-positive or non-finite values replaced by 1.0.
pub fn sanitize_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

/// 8-bit sRGB color resolved from the proxy region's background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear-space clear color for an sRGB render target.
    pub fn to_linear(self) -> wgpu::Color {
        wgpu::Color {
            r: srgb_to_linear(self.r),
            g: srgb_to_linear(self.g),
            b: srgb_to_linear(self.b),
            a: 1.0,
        }
    }
}

/// Convert one 8-bit sRGB channel to linear light.
pub fn srgb_to_linear(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Size of the drawable in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn pack(self) -> u64 {
        ((self.width as u64) << 32) | self.height as u64
    }

    fn unpack(packed: u64) -> Self {
        Self {
            width: (packed >> 32) as u32,
            height: packed as u32,
        }
    }
}

/// Backing-buffer size written by geometry handling and read by the render loop.
///
/// Width and height are packed into one atomic so a reader never observes a
/// half-written size. Last write wins.
#[derive(Debug, Default)]
pub struct PixelBuffer {
    size: AtomicU64,
}

impl PixelBuffer {
    pub fn resize(&self, size: PixelSize) {
        self.size.store(size.pack(), Ordering::Release);
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::unpack(self.size.load(Ordering::Acquire))
    }
}

/// Overlay color written by surface updates and read by the render loop.
#[derive(Debug, Default)]
pub struct SharedColor {
    rgb: AtomicU32,
}

impl SharedColor {
    pub fn set(&self, color: Rgb) {
        let packed = (color.r as u32) << 16 | (color.g as u32) << 8 | color.b as u32;
        self.rgb.store(packed, Ordering::Release);
    }

    pub fn get(&self) -> Rgb {
        let packed = self.rgb.load(Ordering::Acquire);
        Rgb::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_scales_by_ratio() {
        let g = Geometry::new(10.0, 20.0, 300.0, 200.0);
        assert_eq!(g.pixel_size(1.0), PixelSize::new(300, 200));
        assert_eq!(g.pixel_size(1.5), PixelSize::new(450, 300));
        assert_eq!(g.pixel_size(2.0), PixelSize::new(600, 400));
    }

    #[test]
    fn fractional_pixels_are_truncated() {
        let g = Geometry::new(0.0, 0.0, 100.7, 301.0);
        assert_eq!(g.pixel_size(1.0), PixelSize::new(100, 301));
        assert_eq!(g.pixel_size(1.5), PixelSize::new(151, 451));
    }

    #[test]
    fn pixel_size_handles_bad_input() {
        let g = Geometry::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(g.pixel_size(0.0), PixelSize::new(100, 50));
        assert_eq!(g.pixel_size(f64::NAN), PixelSize::new(100, 50));

        let negative = Geometry::new(0.0, 0.0, -5.0, f64::INFINITY);
        assert!(negative.pixel_size(1.0).is_empty());
    }

    #[test]
    fn zero_size_geometry_has_empty_buffer() {
        assert!(Geometry::new(5.0, 5.0, 0.0, 10.0).pixel_size(2.0).is_empty());
        assert!(!Geometry::new(5.0, 5.0, 1.0, 10.0).pixel_size(2.0).is_empty());
    }

    #[test]
    fn srgb_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-9);
        // Linear segment below the knee
        assert!((srgb_to_linear(10) - (10.0 / 255.0) / 12.92).abs() < 1e-12);
        // Mid-grey is darker in linear space
        assert!(srgb_to_linear(128) < 0.25);
    }

    #[test]
    fn rgb_to_linear_is_opaque() {
        let c = Rgb::new(12, 34, 56).to_linear();
        assert_eq!(c.a, 1.0);
        assert!(c.r < c.g && c.g < c.b);
    }

    #[test]
    fn pixel_buffer_last_write_wins() {
        let buffer = PixelBuffer::default();
        assert!(buffer.size().is_empty());
        buffer.resize(PixelSize::new(640, 480));
        buffer.resize(PixelSize::new(800, 600));
        assert_eq!(buffer.size(), PixelSize::new(800, 600));

        buffer.resize(PixelSize::new(u32::MAX, 0));
        assert_eq!(buffer.size(), PixelSize::new(u32::MAX, 0));
    }

    #[test]
    fn shared_color_keeps_latest() {
        let color = SharedColor::default();
        assert_eq!(color.get(), Rgb::new(0, 0, 0));

        color.set(Rgb::new(12, 34, 56));
        assert_eq!(color.get(), Rgb::new(12, 34, 56));

        color.set(Rgb::new(255, 0, 128));
        assert_eq!(color.get(), Rgb::new(255, 0, 128));
    }

    #[test]
    fn geometry_deserializes_from_layout_json() {
        let g: Geometry =
            serde_json::from_str(r#"{"x":10,"y":20,"width":300,"height":200}"#).unwrap();
        assert_eq!(g, Geometry::new(10.0, 20.0, 300.0, 200.0));
    }
}
