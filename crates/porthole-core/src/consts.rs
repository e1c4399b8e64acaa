/// Default viewport edge length (display pixels) when none is configured.
pub const DEFAULT_VIEWPORT_SIZE: u32 = 100;

/// Fraction of the limiting half-viewport covered by the circular preview
/// window.
pub const PREVIEW_RADIUS_FACTOR: f32 = 0.8;

/// Default preview quality; maps to a display scale of 0.5.
pub const DEFAULT_PREVIEW_QUALITY: f32 = 4.0 / 9.0;

/// Display scale at preview quality 0.
pub const MIN_DISPLAY_SCALE: f32 = 0.1;

/// Span of the quality-to-display-scale mapping.
pub const DISPLAY_SCALE_RANGE: f32 = 0.9;

/// Default mask overlay color (ARGB): roughly half-opaque black.
pub const DEFAULT_MASK_COLOR: u32 = 0x9000_0000;

/// Safety margin in source pixels added on unclamped decode-rect edges to
/// absorb float rounding at high zoom.
pub const DECODE_MARGIN: f32 = 1.0;

/// Minimum pixel count (width * height) at which pixel loops switch to
/// row-level parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in distance ratios.
pub const EPSILON: f32 = 1e-10;
