// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Configuration

//! Engine configuration.
//!
//! Every knob the host can turn lives in [`NetworkConfig`]. All structs
//! deserialize with `#[serde(default)]`, so a host can pass a partial JSON
//! object and get defaults for the rest. [`NetworkConfig::validate`] is run
//! by the network constructor before anything is built.

use serde::{Deserialize, Serialize};

use crate::types::Color;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from configuration validation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be > 0, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },
    #[error("min_edges_per_node ({min}) exceeds max_edges_per_node ({max})")]
    EdgeRange { min: u32, max: u32 },
    #[error("{0} palette is empty")]
    EmptyPalette(&'static str),
    #[error("canvas size must be finite and non-negative, got {width}x{height}")]
    CanvasSize { width: f64, height: f64 },
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Node placement strategy. Also selects the matching edge generator:
/// scatter layouts get planar nearest-neighbour edges, lattices get
/// k-nearest edges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    #[default]
    Scatter,
    Lattice,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RestoringForce {
    /// Pull proportional to displacement from the origin.
    #[default]
    Linear,
    /// Linear pull scaled by `(distance / drift_radius) ^ exponent`.
    Power { exponent: f64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Hard clamp to `drift_radius` around the origin, damped bounce.
    #[default]
    DriftRadius,
    /// Clamp to the canvas rectangle, damped bounce.
    CanvasEdge,
}

/// How the final destination of a new packet is chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DestinationPolicy {
    /// The first hop is the destination.
    SingleHop,
    /// Probabilistically extend the planned route past the first hop.
    #[default]
    MultiHopChain,
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub strategy: LayoutStrategy,
    /// Target node count. Lattices round this to a full grid.
    pub node_count: u32,
    /// Gap kept free on every canvas side, in pixels.
    pub margin: f64,
    /// Minimum distance between scattered nodes, in pixels.
    pub min_spacing: f64,
    /// Rejection-sampling attempts per node before accepting the last sample.
    pub placement_retries: u32,
    /// Lattice jitter as a fraction of the cell size.
    pub lattice_jitter: f64,
    pub node_palette: Vec<Color>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: LayoutStrategy::Scatter,
            node_count: 40,
            margin: 40.0,
            min_spacing: 60.0,
            placement_retries: 30,
            lattice_jitter: 0.3,
            node_palette: vec![
                Color::rgb(0x5e, 0xea, 0xd4),
                Color::rgb(0x60, 0xa5, 0xfa),
                Color::rgb(0xa7, 0x8b, 0xfa),
                Color::rgb(0xe2, 0xe8, 0xf0),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// EdgeConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EdgeConfig {
    pub min_edges_per_node: u32,
    pub max_edges_per_node: u32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self { min_edges_per_node: 1, max_edges_per_node: 3 }
    }
}

// ---------------------------------------------------------------------------
// MotionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Pixels per second.
    pub max_speed: f64,
    /// Amplitude of the random acceleration, pixels per second squared.
    pub acceleration: f64,
    /// Velocity multiplier applied once per tick.
    pub damping: f64,
    /// Allowed wander distance from the origin, in pixels.
    pub drift_radius: f64,
    pub return_strength: f64,
    pub restoring: RestoringForce,
    pub boundary: BoundaryPolicy,
    /// Fraction of speed kept when bouncing off a boundary.
    pub bounce: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 12.0,
            acceleration: 6.0,
            damping: 0.98,
            drift_radius: 25.0,
            return_strength: 0.6,
            restoring: RestoringForce::Linear,
            boundary: BoundaryPolicy::DriftRadius,
            bounce: 0.5,
        }
    }
}

impl MotionConfig {
    /// No random push and no spring: residual velocity simply damps out.
    pub fn stationary() -> Self {
        Self {
            acceleration: 0.0,
            return_strength: 0.0,
            damping: 0.85,
            ..Self::default()
        }
    }

    pub fn is_stationary(&self) -> bool {
        self.acceleration == 0.0 && self.return_strength == 0.0
    }
}

// ---------------------------------------------------------------------------
// PacketConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PacketConfig {
    /// Edge fractions travelled per second.
    pub speed: f64,
    pub max_hops: u32,
    pub destination: DestinationPolicy,
    /// Chance that a new packet's route is planned past its first hop.
    pub extend_probability: f64,
    /// Chance to stop after each planned extension step.
    pub stop_probability: f64,
    /// Emission is refused while this many packets are in flight.
    pub max_active: u32,
    /// Random source picks before falling back to a scan.
    pub source_retries: u32,
    pub packet_palette: Vec<Color>,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            speed: 0.6,
            max_hops: 8,
            destination: DestinationPolicy::MultiHopChain,
            extend_probability: 0.6,
            stop_probability: 0.35,
            max_active: 64,
            source_retries: 16,
            packet_palette: vec![
                Color::rgb(0x22, 0xd3, 0xee),
                Color::rgb(0xf4, 0x72, 0xb6),
                Color::rgb(0xfa, 0xcc, 0x15),
                Color::rgb(0x4a, 0xde, 0x80),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// EffectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectKindConfig {
    /// Lifetime in seconds.
    pub duration: f64,
    pub color: Color,
}

impl Default for EffectKindConfig {
    fn default() -> Self {
        Self { duration: 0.5, color: Color::rgb(0xff, 0xff, 0xff) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectConfig {
    pub pulse: EffectKindConfig,
    pub processing: EffectKindConfig,
    pub blink: EffectKindConfig,
    pub ripple: EffectKindConfig,
    /// Add a ripple at the destination when a packet is delivered.
    pub ripple_on_delivery: bool,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            pulse: EffectKindConfig { duration: 0.6, color: Color::rgb(0x7d, 0xd3, 0xfc) },
            processing: EffectKindConfig { duration: 0.35, color: Color::rgb(0xfd, 0xe6, 0x8a) },
            blink: EffectKindConfig { duration: 0.5, color: Color::rgb(0xf8, 0x71, 0x71) },
            ripple: EffectKindConfig { duration: 1.2, color: Color::rgb(0x99, 0xf6, 0xe4) },
            ripple_on_delivery: true,
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub layout: LayoutConfig,
    pub edges: EdgeConfig,
    pub motion: MotionConfig,
    pub packets: PacketConfig,
    pub effects: EffectConfig,
    /// Chance per host frame that `Network::frame` emits a packet.
    pub emission_probability: f64,
    /// Upper bound on a single tick's delta, in seconds.
    pub max_dt: f64,
    /// Fixed RNG seed. `None` lets the constructor pick one.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            edges: EdgeConfig::default(),
            motion: MotionConfig::default(),
            packets: PacketConfig::default(),
            effects: EffectConfig::default(),
            emission_probability: 0.04,
            max_dt: 0.1,
            seed: None,
        }
    }
}

impl NetworkConfig {
    /// Jittered lattice that holds still; packets still travel.
    pub fn static_lattice() -> Self {
        Self {
            layout: LayoutConfig { strategy: LayoutStrategy::Lattice, ..LayoutConfig::default() },
            edges: EdgeConfig { min_edges_per_node: 2, max_edges_per_node: 3 },
            motion: MotionConfig::stationary(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        non_negative("layout.margin", layout.margin)?;
        non_negative("layout.min_spacing", layout.min_spacing)?;
        non_negative("layout.lattice_jitter", layout.lattice_jitter)?;
        if layout.node_palette.is_empty() {
            return Err(ConfigError::EmptyPalette("node"));
        }

        if self.edges.min_edges_per_node > self.edges.max_edges_per_node {
            return Err(ConfigError::EdgeRange {
                min: self.edges.min_edges_per_node,
                max: self.edges.max_edges_per_node,
            });
        }

        let motion = &self.motion;
        non_negative("motion.max_speed", motion.max_speed)?;
        non_negative("motion.acceleration", motion.acceleration)?;
        unit_range("motion.damping", motion.damping)?;
        non_negative("motion.drift_radius", motion.drift_radius)?;
        non_negative("motion.return_strength", motion.return_strength)?;
        unit_range("motion.bounce", motion.bounce)?;
        if let RestoringForce::Power { exponent } = motion.restoring {
            finite("motion.restoring.exponent", exponent)?;
        }

        let packets = &self.packets;
        positive("packets.speed", packets.speed)?;
        unit_range("packets.extend_probability", packets.extend_probability)?;
        unit_range("packets.stop_probability", packets.stop_probability)?;
        if packets.packet_palette.is_empty() {
            return Err(ConfigError::EmptyPalette("packet"));
        }

        let effects = &self.effects;
        positive("effects.pulse.duration", effects.pulse.duration)?;
        positive("effects.processing.duration", effects.processing.duration)?;
        positive("effects.blink.duration", effects.blink.duration)?;
        positive("effects.ripple.duration", effects.ripple.duration)?;

        unit_range("emission_probability", self.emission_probability)?;
        positive("max_dt", self.max_dt)?;
        Ok(())
    }
}

/// Canvas dimensions accepted by construction and resize.
pub fn validate_canvas(width: f64, height: f64) -> Result<(), ConfigError> {
    if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::CanvasSize { width, height })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

fn unit_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { field, value });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
