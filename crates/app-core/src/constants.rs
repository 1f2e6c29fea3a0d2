// Shared visual/audio tuning constants used by both web and native frontends.

// Analyser defaults (byte-frequency mapping)
pub const DEFAULT_FFT_SIZE: usize = 256; // 128 bins
pub const DEFAULT_MIN_DECIBELS: f32 = -70.0;
pub const DEFAULT_MAX_DECIBELS: f32 = -10.0;
pub const DEFAULT_SMOOTHING: f32 = 0.53;
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;
pub const MAX_BYTE_MAGNITUDE: f32 = 255.0;

// Particle tube
pub const DEFAULT_PARTICLE_COUNT: usize = 5000;
pub const TUBE_RADIUS: f32 = 3.0;
pub const TUBE_LENGTH: f32 = 50.0; // drift coordinate wraps back to this
pub const DRIFT_LOWER_BOUND: f32 = 0.0;
pub const DRIFT_BASE_RATE: f32 = 0.1; // units per frame at silence
pub const PARTICLE_SIZE_MIN: f32 = 1.0;
pub const PARTICLE_SIZE_SPAN: f32 = 2.0;

// Light-responsive sphere
pub const SPHERE_RADIUS: f32 = 2.0;
pub const SPHERE_SEGMENTS: u32 = 32;

// Cameras
pub const SPHERE_CAMERA_Z: f32 = 6.0;
pub const SPHERE_FOVY_DEG: f32 = 45.0;
pub const TUNNEL_CAMERA_X: f32 = -2.0; // sits just before the wrap point, looking down the tube
pub const TUNNEL_FOVY_DEG: f32 = 60.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Fallback surface size before the first resize arrives
pub const DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);

// Clear colour behind translucent scenes
pub const CLEAR_RGB: [f64; 3] = [0.02, 0.02, 0.04];
