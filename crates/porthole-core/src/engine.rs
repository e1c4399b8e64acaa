use std::io::{BufRead, Seek, Write};
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::compose::{self, PreviewTransform};
use crate::config::{display_scale_for, EngineConfig};
use crate::error::{PortholeError, Result};
use crate::geometry::{resolve_sampling, Sampling, ViewGeometry, Viewport};
use crate::gesture::{GestureAction, GestureTracker, PointerPhase, TouchPoint};
use crate::region::{self, DecodedPreview};
use crate::source::SourceImage;

/// Requested crop output resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CropResolution {
    /// Keep the native resolution of the crop rectangle.
    Native,
    /// Downsample so the output edge is close to this many pixels.
    Target(u32),
}

impl CropResolution {
    /// Map the signed convention used by embedders: zero or negative means
    /// native resolution.
    pub fn from_raw(resolution: i32) -> Self {
        if resolution <= 0 {
            Self::Native
        } else {
            Self::Target(resolution as u32)
        }
    }
}

/// The interactive crop engine: owns the source, the pan/zoom geometry, the
/// gesture tracker and the live preview bitmap.
///
/// All operations run on the caller's thread; the engine hands out no
/// shared state. Loading a new source replaces the previous one wholesale,
/// and the preview bitmap is dropped whenever a newly decoded one takes its
/// place.
pub struct CropEngine {
    viewport: Viewport,
    display_scale: f32,
    mask_color: u32,
    source: Option<SourceImage>,
    geometry: Option<ViewGeometry>,
    sampling: Sampling,
    preview: Option<DecodedPreview>,
    tracker: GestureTracker,
}

impl CropEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            viewport: Viewport::new(config.viewport_width, config.viewport_height),
            display_scale: display_scale_for(config.preview_quality),
            mask_color: config.mask_color,
            source: None,
            geometry: None,
            sampling: Sampling::identity(),
            preview: None,
            tracker: GestureTracker::new(),
        })
    }

    /// Replace the source image, resetting the view to the fitted state and
    /// decoding the first preview.
    pub fn set_source(&mut self, source: SourceImage) -> Result<()> {
        info!(
            width = source.width(),
            height = source.height(),
            "Source loaded"
        );
        self.preview = None;
        self.source = Some(source);
        self.tracker.reset();
        self.reset_view()
    }

    /// Load a source image file and make it the current source.
    pub fn set_source_path(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "Opening source");
        self.set_source(SourceImage::open(path)?)
    }

    /// Load a source from a seekable byte stream and make it current.
    pub fn set_source_reader<R: BufRead + Seek>(&mut self, reader: R) -> Result<()> {
        self.set_source(SourceImage::from_reader(reader)?)
    }

    /// Resize the viewport. The view resets to the fitted state, matching
    /// what a fresh load would produce at the new size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.viewport = Viewport::checked(width, height)?;
        self.reset_view()
    }

    /// Change the preview quality (clamped to [0, 1]) and re-decode the
    /// preview at the new display scale.
    pub fn set_preview_quality(&mut self, quality: f32) -> Result<()> {
        self.display_scale = display_scale_for(quality);
        if let Some(geometry) = self.geometry {
            self.sampling = resolve_sampling(geometry.zoom, self.display_scale);
            return self.refresh_preview();
        }
        Ok(())
    }

    pub fn set_mask_color(&mut self, color: u32) {
        self.mask_color = color;
    }

    /// Set the zoom directly. The value is clamped to the coverage floor
    /// before the preview re-decodes.
    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        if let Some(geometry) = self.geometry.as_mut() {
            geometry.zoom = zoom;
        }
        self.apply_zoom()
    }

    /// Set the view center directly, in source pixels. The value is clamped
    /// to the coverage bounds before the preview re-decodes.
    pub fn set_center(&mut self, x: f32, y: f32) -> Result<()> {
        if let Some(geometry) = self.geometry.as_mut() {
            geometry.center_x = x;
            geometry.center_y = y;
        }
        self.refresh_preview()
    }

    /// Feed one pointer event. Pan and pinch actions mutate the geometry
    /// and refresh the preview. A decode failure is returned to the caller
    /// but leaves the previous preview bitmap in place, so the view keeps
    /// rendering.
    pub fn pointer_event(
        &mut self,
        phase: PointerPhase,
        pointer: usize,
        touches: &[TouchPoint],
    ) -> Result<()> {
        let Some(action) = self.tracker.handle(phase, pointer, touches) else {
            return Ok(());
        };
        if self.geometry.is_none() {
            // Gestures before a source loads have nothing to move.
            return Ok(());
        }
        match action {
            GestureAction::Pan { dx, dy } => {
                if let Some(geometry) = self.geometry.as_mut() {
                    // Dragging display pixels moves the center the opposite
                    // way in source pixels, shrunk by the zoom.
                    geometry.center_x -= dx / geometry.zoom;
                    geometry.center_y -= dy / geometry.zoom;
                }
                self.refresh_preview()
            }
            GestureAction::Pinch { factor } => {
                if let Some(geometry) = self.geometry.as_mut() {
                    geometry.zoom *= factor;
                }
                self.apply_zoom()
            }
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn geometry(&self) -> Option<ViewGeometry> {
        self.geometry
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    pub fn display_scale(&self) -> f32 {
        self.display_scale
    }

    pub fn mask_color(&self) -> u32 {
        self.mask_color
    }

    pub fn source_dimensions(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(|s| s.dimensions())
    }

    /// The decoded bitmap currently backing the preview, if any.
    pub fn preview(&self) -> Option<&DecodedPreview> {
        self.preview.as_ref()
    }

    /// Placement of the current preview bitmap in the viewport.
    pub fn preview_transform(&self) -> Option<PreviewTransform> {
        self.preview.as_ref().map(|preview| {
            compose::preview_transform(self.viewport, preview, self.sampling, self.display_scale)
        })
    }

    /// Composite the current frame: the preview under its transform with
    /// the circular mask over it.
    pub fn render_preview(&self) -> RgbaImage {
        let placed = self.preview.as_ref().map(|preview| {
            let transform =
                compose::preview_transform(self.viewport, preview, self.sampling, self.display_scale);
            (preview, transform)
        });
        compose::render_frame(self.viewport, placed, self.mask_color)
    }

    /// Decode the crop: the square bounding the preview circle around the
    /// current center, downsampled for the requested resolution. The
    /// preview state is left untouched.
    pub fn crop_image(&mut self, resolution: CropResolution) -> Result<RgbaImage> {
        let Some(geometry) = self.geometry else {
            return Err(PortholeError::NoSourceLoaded);
        };
        let Some(source) = self.source.as_mut() else {
            return Err(PortholeError::NoSourceLoaded);
        };
        let radius = self.viewport.preview_radius();
        let (width, height) = source.dimensions();
        let rect = region::plan_crop_region(&geometry, radius, width, height);
        let sample_factor = match resolution {
            CropResolution::Native => 1,
            CropResolution::Target(target) => {
                region::crop_sample_factor(&geometry, radius, target)
            }
        };
        debug!(rect = ?rect, sample_factor, "Decoding crop region");
        let image = source.decode_region(rect, sample_factor)?;
        info!(
            width = image.width(),
            height = image.height(),
            "Crop decoded"
        );
        Ok(image)
    }

    /// Encode the crop losslessly as PNG into a seekable sink.
    pub fn crop_to_writer<W: Write + Seek>(
        &mut self,
        writer: &mut W,
        resolution: CropResolution,
    ) -> Result<()> {
        let image = self.crop_image(resolution)?;
        image.write_to(writer, ImageFormat::Png)?;
        Ok(())
    }

    /// Encode the crop losslessly as a PNG file.
    pub fn crop_to_path(&mut self, path: &Path, resolution: CropResolution) -> Result<()> {
        let image = self.crop_image(resolution)?;
        image.save_with_format(path, ImageFormat::Png)?;
        info!(path = %path.display(), "Crop saved");
        Ok(())
    }

    /// Recompute the fitted geometry and first preview for the current
    /// source and viewport.
    fn reset_view(&mut self) -> Result<()> {
        let Some(source) = self.source.as_ref() else {
            return Ok(());
        };
        let (width, height) = source.dimensions();
        let radius = self.viewport.preview_radius();
        let geometry = ViewGeometry::fitted(width, height, radius);
        self.geometry = Some(geometry);
        self.sampling = resolve_sampling(geometry.zoom, self.display_scale);
        self.refresh_preview()
    }

    /// The zoom changed: clamp it to the coverage floor, re-resolve the
    /// sampling, re-decode.
    fn apply_zoom(&mut self) -> Result<()> {
        let Some(source) = self.source.as_ref() else {
            return Ok(());
        };
        let (width, height) = source.dimensions();
        let radius = self.viewport.preview_radius();
        let Some(geometry) = self.geometry.as_mut() else {
            return Ok(());
        };
        geometry.clamp_zoom(width, height, radius);
        self.sampling = resolve_sampling(geometry.zoom, self.display_scale);
        self.refresh_preview()
    }

    /// Re-decode the preview region around the current center. The center
    /// is clamped first; on success the new bitmap replaces the old one,
    /// on failure the old one stays.
    fn refresh_preview(&mut self) -> Result<()> {
        let radius = self.viewport.preview_radius();
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };
        let (width, height) = source.dimensions();
        let Some(geometry) = self.geometry.as_mut() else {
            return Ok(());
        };
        geometry.clamp_center(width, height, radius);
        let plan = region::plan_view_region(
            geometry,
            self.viewport,
            width,
            height,
            self.sampling.sample_factor,
        );
        debug!(
            rect = ?plan.rect,
            sample_factor = self.sampling.sample_factor,
            "Decoding view region"
        );
        let bitmap = source.decode_region(plan.rect, self.sampling.sample_factor)?;
        self.preview = Some(DecodedPreview {
            bitmap,
            sample_factor: self.sampling.sample_factor,
            offset_x: plan.offset_x,
            offset_y: plan.offset_y,
        });
        Ok(())
    }
}
