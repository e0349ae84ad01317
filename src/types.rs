// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Type Definitions

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::effects::{EffectKind, PulseRole};
use crate::geometry::Point;

pub type NodeId = u32;
pub type PacketId = u64;

// ─── Color ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must look like #rrggbb, got {0:?}")]
    Malformed(String),
}

/// sRGB color, serialized as a `#rrggbb` string so the canvas can use it as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uniform pick from `palette`; white when the palette is empty.
    pub fn pick<R: Rng + ?Sized>(palette: &[Color], rng: &mut R) -> Color {
        palette.choose(rng).copied().unwrap_or(Self::WHITE)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ColorError::Malformed(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError::Malformed(s.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

// ─── Layout Slot ─────────────────────────────────────────────────────────────

/// Where a node sits in the layout, independent of canvas size.
///
/// Resize recomputes pixel positions from this, so the relative layout
/// survives any number of resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayoutSlot {
    /// Normalized coordinates in [0, 1] within the margin box.
    Scatter { u: f64, v: f64 },
    /// Cell in a `rows` x `cols` lattice; jitter is re-rolled on resize.
    Lattice { row: u32, col: u32, rows: u32, cols: u32 },
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Spawn point; spring anchor for the restoring force.
    pub origin_x: f64,
    pub origin_y: f64,
    pub color: Color,
    /// Targets of the edges this node created, in creation order.
    pub outgoing: Vec<NodeId>,
    pub slot: LayoutSlot,
}

impl Node {
    pub fn new(id: NodeId, position: Point, color: Color, slot: LayoutSlot) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            vx: 0.0,
            vy: 0.0,
            origin_x: position.x,
            origin_y: position.y,
            color,
            outgoing: Vec::new(),
            slot,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.origin_x, self.origin_y)
    }

    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Move to `position`, make it the new anchor and drop any drift state.
    pub fn reanchor(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
        self.origin_x = position.x;
        self.origin_y = position.y;
        self.vx = 0.0;
        self.vy = 0.0;
    }
}

// ─── Edge ────────────────────────────────────────────────────────────────────

/// Directed, source-initiated connection. Drawn undirected; routed one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    /// Order-independent key used for de-duplication.
    pub fn unordered_key(&self) -> (NodeId, NodeId) {
        if self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }
}

// ─── Packet State ────────────────────────────────────────────────────────────

/// Observable packet states at tick boundaries.
///
/// Intermediate arrival is resolved inside a single router step and always
/// leaves the packet either `Traveling` on a new edge or in a terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PacketState {
    Traveling,
    ArrivedFinal,
    DroppedHopLimit,
    DroppedNoRoute,
}

impl PacketState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Traveling)
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::DroppedHopLimit | Self::DroppedNoRoute)
    }
}

// ─── Packet ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    pub id: PacketId,
    pub source: NodeId,
    pub target: NodeId,
    /// Travel fraction along `source -> target`, always in [0, 1].
    pub progress: f64,
    pub hops: u32,
    pub final_target: NodeId,
    /// Nodes the packet has departed from, oldest first.
    pub path: Vec<NodeId>,
    pub color: Color,
    pub state: PacketState,
}

impl Packet {
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }
}

// ─── Renderer Snapshot ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeView {
    pub source: NodeId,
    pub target: NodeId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketView {
    pub id: PacketId,
    pub source: NodeId,
    pub target: NodeId,
    pub progress: f64,
    pub x: f64,
    pub y: f64,
    pub hops: u32,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectView {
    pub kind: EffectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<PulseRole>,
    pub node: NodeId,
    pub elapsed: f64,
    pub duration: f64,
    pub color: Color,
}

/// Read-only view of everything the canvas renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSnapshot {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub packets: Vec<PacketView>,
    pub effects: Vec<EffectView>,
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub ticks: u64,
    pub emitted: u64,
    pub delivered: u64,
    pub dropped_hop_limit: u64,
    pub dropped_no_route: u64,
    pub active_packets: u32,
    pub live_effects: u32,
    pub node_count: u32,
    pub edge_count: u32,
    #[serde(default)]
    pub total_delivered_hops: u64,
}

impl NetworkStats {
    pub fn avg_hops(&self) -> f64 {
        if self.delivered == 0 {
            0.0
        } else {
            self.total_delivered_hops as f64 / self.delivered as f64
        }
    }
}

// ─── FrameReport ─────────────────────────────────────────────────────────────

/// Outcome of one host frame driven through `Network::frame`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameReport {
    /// Delta actually simulated, after capping.
    pub dt: f64,
    pub emitted: Option<PacketId>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
