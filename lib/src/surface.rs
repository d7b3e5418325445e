use cairo::{Context, Format, ImageSurface};

use crate::{
    error::Error,
    frame::{Frame, PixelFormat},
};

/// sanity bound for computed blit geometry, anything beyond this is degenerate
const MAX_BLIT_EXTENT: f64 = 1_000_000.0;

/// a cairo image surface backed by its own copy of the pixel data
///
/// the rgba buffer is moved into the surface at creation, so buffer and surface
/// handle share one lifetime and the memory is released exactly once when the
/// surface is dropped
///
/// cairo surfaces are not thread safe, keep a managed surface on the render side
pub struct ManagedSurface {
    surface: ImageSurface,
    width: i32,
    height: i32,
}

impl ManagedSurface {
    /// wrap a 3-channel frame into a surface with an opaque alpha channel
    ///
    /// grayscale frames are rejected, callers convert through [`Frame::to_rgb8`] first
    pub fn wrap(frame: &Frame) -> Result<Self, Error> {
        if frame.format() != PixelFormat::Rgb8 {
            return Err(Error::InvalidFrame(format!("expected a 3-channel frame, got {:?}", frame.format())));
        }

        let width = frame.width() as i32;
        let height = frame.height() as i32;

        let mut data = vec![0_u8; frame.width() as usize * frame.height() as usize * 4];
        for (pixel, rgb) in data.chunks_exact_mut(4).zip(frame.data().chunks_exact(3)) {
            // ARgb32 holds one native-endian u32 per pixel
            let argb = 0xff00_0000_u32 | u32::from(rgb[0]) << 16 | u32::from(rgb[1]) << 8 | u32::from(rgb[2]);
            pixel.copy_from_slice(&argb.to_ne_bytes());
        }

        let surface = ImageSurface::create_for_data(data, Format::ARgb32, width, height, width * 4)
            .map_err(Error::SurfaceCreate)?;

        Ok(Self { surface, width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// scale and center the surface into the target area, preserving aspect ratio
    ///
    /// degenerate geometry (zero-sized or non-finite targets, zero-sized surface) is
    /// not an error, the call simply leaves the context untouched; drawing errors are
    /// logged and the context state is restored either way
    pub fn blit(&self, ctx: &Context, target_width: f64, target_height: f64) {
        let Some(geometry) = BlitGeometry::compute(self.width, self.height, target_width, target_height) else {
            return;
        };

        if let Err(err) = ctx.save() {
            log::error!("unable to save drawing context state: {err}");
            return;
        }
        if let Err(err) = self.paint(ctx, geometry) {
            log::error!("recoverable error whilst drawing frame surface: {err}");
        }
        if let Err(err) = ctx.restore() {
            log::error!("unable to restore drawing context state: {err}");
        }
    }

    fn paint(&self, ctx: &Context, geometry: BlitGeometry) -> Result<(), Error> {
        ctx.translate(geometry.x, geometry.y);
        ctx.scale(geometry.scale, geometry.scale);
        ctx.set_source_surface(&self.surface, 0.0, 0.0).map_err(Error::Draw)?;
        ctx.paint().map_err(Error::Draw)
    }
}

/// scale factor and centering offsets for fitting a surface into a target area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlitGeometry {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl BlitGeometry {
    /// compute the uniform scale and centering offsets, `None` for degenerate geometry
    pub fn compute(surface_width: i32, surface_height: i32, target_width: f64, target_height: f64) -> Option<Self> {
        if !target_width.is_finite() || !target_height.is_finite() || target_width <= 0.0 || target_height <= 0.0 {
            return None;
        }
        if surface_width <= 0 || surface_height <= 0 {
            return None;
        }

        let scale = f64::min(target_width / surface_width as f64, target_height / surface_height as f64);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        let new_width = (surface_width as f64 * scale).floor();
        let new_height = (surface_height as f64 * scale).floor();
        let x = ((target_width - new_width) / 2.0).floor();
        let y = ((target_height - new_height) / 2.0).floor();

        if [scale, new_width, new_height, x, y].iter().any(|value| value.abs() > MAX_BLIT_EXTENT) {
            return None;
        }

        Some(Self { scale, x, y })
    }
}
