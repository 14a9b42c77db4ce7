// Default render parameters
pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 768;
pub const DEFAULT_FOV: f32 = 1.05; // vertical field of view, radians
pub const DEFAULT_BOUNCE_DEPTH: u32 = 4;

// Floating point comparisons
pub const FEQ_EPSILON: f32 = 1e-4;

// Geometric epsilons and sentinels
pub const RAY_EPSILON: f32 = 1e-3; // minimum hit distance accepted by a primitive
pub const RAY_BIAS: f32 = 1e-3; // origin offset along the normal for spawned rays
pub const NO_HIT_DISTANCE: f32 = 1e10; // nearest-distance starting sentinel
pub const MAX_TRACE_DISTANCE: f32 = 1000.0; // hits past this count as a miss
