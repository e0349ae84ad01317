// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Simulation Core

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

use crate::config::{validate_canvas, ConfigError, NetworkConfig};
use crate::effects::EffectScheduler;
use crate::geometry::lerp;
use crate::graph;
use crate::kinematics;
use crate::routing;
use crate::types::*;

/// Seed used when neither the config nor the host supplies one.
pub const DEFAULT_SEED: u64 = 0x6d65_7368;

/// Turn a seed handed over by a JS host into an RNG seed.
///
/// Whole numbers keep their value so native and wasm runs agree. Fractional
/// values such as `Math.random()` use their full bit pattern.
pub fn host_seed(seed: f64) -> u64 {
    if !seed.is_finite() {
        return DEFAULT_SEED;
    }
    let magnitude = seed.abs();
    if magnitude.fract() == 0.0 {
        magnitude as u64
    } else {
        magnitude.to_bits()
    }
}

// ─── Network struct ──────────────────────────────────────────────────────────

/// The whole simulation: graph, moving nodes, packets in flight and the
/// effect queues the renderer reads. One instance per canvas.
#[wasm_bindgen]
pub struct Network {
    pub(crate) config: NetworkConfig,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) packets: Vec<Packet>,
    pub(crate) effects: EffectScheduler,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) next_packet_id: PacketId,
    pub(crate) stats: NetworkStats,
    pub(crate) last_timestamp: Option<f64>,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl Network {
    /// Validate `config` and build a network for a `width` x `height` canvas.
    ///
    /// Uses `config.seed`, or [`DEFAULT_SEED`] when unset.
    pub fn build(width: f64, height: f64, config: NetworkConfig) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        Self::with_seed(width, height, config, seed)
    }

    /// Like [`Network::build`] but with an explicit seed that overrides
    /// `config.seed`.
    pub fn with_seed(
        width: f64,
        height: f64,
        config: NetworkConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_canvas(width, height)?;
        Ok(Self::assemble(width, height, config, seed))
    }

    /// Build without validation; callers guarantee `config` and the canvas
    /// size are valid.
    pub(crate) fn assemble(width: f64, height: f64, config: NetworkConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph::Graph { nodes, edges } =
            graph::build(width, height, &config.layout, &config.edges, &mut rng);
        let effects = EffectScheduler::new(config.effects.clone());

        Self {
            config,
            width,
            height,
            nodes,
            edges,
            packets: Vec::new(),
            effects,
            rng,
            next_packet_id: 0,
            stats: NetworkStats::default(),
            last_timestamp: None,
        }
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `dt` is capped at `config.max_dt`; negative or non-finite values
    /// count as zero.
    pub fn tick(&mut self, dt: f64) {
        let dt = self.clamp_dt(dt);

        self.effects.advance(dt);

        kinematics::update_nodes(
            &mut self.nodes,
            &self.config.motion,
            self.width,
            self.height,
            dt,
            &mut self.rng,
        );

        let report = routing::advance_packets(
            &mut self.packets,
            &self.nodes,
            &self.config.packets,
            dt,
            &mut self.effects,
            &mut self.rng,
        );
        routing::sweep_inactive(&mut self.packets, &mut self.effects);

        self.stats.ticks += 1;
        self.stats.delivered += report.delivered as u64;
        self.stats.total_delivered_hops += report.delivered_hops;
        self.stats.dropped_hop_limit += report.dropped_hop_limit as u64;
        self.stats.dropped_no_route += report.dropped_no_route as u64;
    }

    /// Launch one packet from a random routable node.
    ///
    /// Returns `None` without side effects when the network has fewer than
    /// two nodes, no edges, or already carries `max_active` packets.
    pub fn emit_packet(&mut self) -> Option<PacketId> {
        if self.nodes.len() < 2 || self.edges.is_empty() {
            return None;
        }
        if self.packets.len() >= self.config.packets.max_active as usize {
            return None;
        }
        let id = self.next_packet_id;
        let packet = routing::spawn_packet(
            id,
            &self.nodes,
            &self.config.packets,
            &mut self.effects,
            &mut self.rng,
        )?;
        self.next_packet_id += 1;
        self.stats.emitted += 1;
        self.packets.push(packet);
        Some(id)
    }

    /// Re-place nodes for a new canvas size.
    ///
    /// Positions follow the original relative layout; velocities are zeroed
    /// and origins move to the new positions. Edges and packets in flight are
    /// untouched. Invalid sizes and empty networks are ignored.
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.nodes.is_empty() {
            return;
        }
        if let Err(err) = validate_canvas(width, height) {
            log::debug!("ignoring resize: {}", err);
            return;
        }
        self.width = width;
        self.height = height;
        graph::relayout(&mut self.nodes, width, height, &self.config.layout, &mut self.rng);
        log::debug!("resized to {}x{}", width, height);
    }

    /// One host animation frame at `timestamp_ms`.
    ///
    /// Derives `dt` from the previous frame's timestamp (zero on the first
    /// frame or when time runs backwards), emits a packet with
    /// `config.emission_probability`, then ticks.
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameReport {
        if !timestamp_ms.is_finite() {
            return FrameReport::default();
        }
        let raw_dt = match self.last_timestamp {
            Some(prev) if timestamp_ms > prev => (timestamp_ms - prev) / 1000.0,
            _ => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);

        let emitted = if self.rng.gen_bool(self.config.emission_probability) {
            self.emit_packet()
        } else {
            None
        };
        let dt = self.clamp_dt(raw_dt);
        self.tick(dt);
        FrameReport { dt, emitted }
    }

    /// Rebuild the graph for the current canvas, dropping packets, effects
    /// and stats. The RNG stream continues, so the new layout differs.
    pub fn reset(&mut self) {
        let graph::Graph { nodes, edges } = graph::build(
            self.width,
            self.height,
            &self.config.layout,
            &self.config.edges,
            &mut self.rng,
        );
        self.nodes = nodes;
        self.edges = edges;
        self.packets.clear();
        self.effects.clear();
        self.stats = NetworkStats::default();
        self.last_timestamp = None;
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        let position = |id: NodeId| self.nodes.get(id as usize).map(Node::position);

        let nodes = self
            .nodes
            .iter()
            .map(|n| NodeView { id: n.id, x: n.x, y: n.y, color: n.color })
            .collect();

        let edges = self
            .edges
            .iter()
            .filter_map(|e| {
                let (a, b) = (position(e.source)?, position(e.target)?);
                Some(EdgeView { source: e.source, target: e.target, x1: a.x, y1: a.y, x2: b.x, y2: b.y })
            })
            .collect();

        let packets = self
            .packets
            .iter()
            .filter_map(|p| {
                let at = lerp(position(p.source)?, position(p.target)?, p.progress);
                Some(PacketView {
                    id: p.id,
                    source: p.source,
                    target: p.target,
                    progress: p.progress,
                    x: at.x,
                    y: at.y,
                    hops: p.hops,
                    color: p.color,
                })
            })
            .collect();

        NetworkSnapshot {
            width: self.width,
            height: self.height,
            nodes,
            edges,
            packets,
            effects: self.effects.views(),
        }
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            active_packets: self.packets.len() as u32,
            live_effects: self.effects.len() as u32,
            node_count: self.nodes.len() as u32,
            edge_count: self.edges.len() as u32,
            ..self.stats.clone()
        }
    }

    pub fn config(&self) -> &NetworkConfig { &self.config }
    pub fn width(&self) -> f64 { self.width }
    pub fn height(&self) -> f64 { self.height }
    pub fn nodes(&self) -> &[Node] { &self.nodes }
    pub fn edges(&self) -> &[Edge] { &self.edges }
    pub fn packets(&self) -> &[Packet] { &self.packets }
    pub fn effects(&self) -> &EffectScheduler { &self.effects }

    fn clamp_dt(&self, dt: f64) -> f64 {
        if dt.is_finite() && dt > 0.0 {
            dt.min(self.config.max_dt)
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EdgeConfig, LayoutConfig};
    use crate::effects::EffectKind;

    fn network(seed: u64) -> Network {
        Network::with_seed(800.0, 600.0, NetworkConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = NetworkConfig::default();
        config.max_dt = 0.0;
        assert!(Network::build(800.0, 600.0, config).is_err());
        assert!(matches!(
            Network::build(f64::NAN, 600.0, NetworkConfig::default()),
            Err(ConfigError::CanvasSize { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_graph() {
        let a = network(3);
        let b = network(3);
        assert_eq!(a.edges, b.edges);
        for (x, y) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(x.position(), y.position());
        }
    }

    #[test]
    fn test_host_seed_keeps_fractional_entropy() {
        assert_eq!(host_seed(42.0), 42);
        assert_eq!(host_seed(-42.0), 42);
        assert_eq!(host_seed(f64::NAN), DEFAULT_SEED);
        assert_ne!(host_seed(0.137), host_seed(0.912));
        assert_ne!(host_seed(0.137), 0);

        let a = network(host_seed(0.137));
        let b = network(host_seed(0.912));
        let same_layout = a
            .nodes
            .iter()
            .zip(&b.nodes)
            .all(|(x, y)| x.position() == y.position());
        assert!(!same_layout);
    }

    #[test]
    fn test_dt_is_capped() {
        let net = network(1);
        assert_eq!(net.clamp_dt(5.0), net.config.max_dt);
        assert_eq!(net.clamp_dt(-1.0), 0.0);
        assert_eq!(net.clamp_dt(f64::NAN), 0.0);
        assert_eq!(net.clamp_dt(0.016), 0.016);
    }

    #[test]
    fn test_emit_packet_assigns_sequential_ids() {
        let mut net = network(4);
        let first = net.emit_packet().unwrap();
        let second = net.emit_packet().unwrap();
        assert_eq!((first, second), (0, 1));
        assert_eq!(net.packets.len(), 2);
        assert_eq!(net.stats().emitted, 2);
        assert_eq!(net.effects.queue(EffectKind::Pulse).len(), 2);
    }

    #[test]
    fn test_emit_packet_respects_active_cap() {
        let mut config = NetworkConfig::default();
        config.packets.max_active = 3;
        let mut net = Network::with_seed(800.0, 600.0, config, 5).unwrap();
        for _ in 0..10 {
            net.emit_packet();
        }
        assert_eq!(net.packets.len(), 3);
    }

    #[test]
    fn test_emit_packet_noop_without_edges() {
        let mut config = NetworkConfig::default();
        config.edges = EdgeConfig { min_edges_per_node: 0, max_edges_per_node: 0 };
        let mut net = Network::with_seed(800.0, 600.0, config, 6).unwrap();
        assert!(net.edges.is_empty());
        assert_eq!(net.emit_packet(), None);
        assert!(net.packets.is_empty());
        assert!(net.effects.is_empty());
    }

    #[test]
    fn test_emit_packet_noop_with_single_node() {
        let mut config = NetworkConfig::default();
        config.layout = LayoutConfig { node_count: 1, ..LayoutConfig::default() };
        let mut net = Network::with_seed(800.0, 600.0, config, 7).unwrap();
        assert_eq!(net.emit_packet(), None);
        net.tick(0.016);
        assert_eq!(net.stats().ticks, 1);
    }

    #[test]
    fn test_frame_derives_dt_from_timestamps() {
        let mut config = NetworkConfig::default();
        config.emission_probability = 0.0;
        let mut net = Network::with_seed(800.0, 600.0, config, 8).unwrap();
        assert_eq!(net.frame(1000.0).dt, 0.0);
        assert!((net.frame(1016.0).dt - 0.016).abs() < 1e-12);
        // stalled host loop: capped
        assert_eq!(net.frame(6016.0).dt, net.config.max_dt);
        // clock went backwards
        assert_eq!(net.frame(10.0).dt, 0.0);
        assert_eq!(net.frame(f64::NAN), FrameReport::default());
        assert_eq!(net.stats().ticks, 4);
    }

    #[test]
    fn test_frame_emits_when_probability_is_one() {
        let mut config = NetworkConfig::default();
        config.emission_probability = 1.0;
        let mut net = Network::with_seed(800.0, 600.0, config, 9).unwrap();
        let report = net.frame(0.0);
        assert_eq!(report.emitted, Some(0));
    }

    #[test]
    fn test_resize_keeps_graph_and_packets() {
        let mut net = network(10);
        net.emit_packet();
        net.tick(0.05);
        let edges = net.edges.clone();
        let packet_ids: Vec<PacketId> = net.packets.iter().map(|p| p.id).collect();

        net.resize(1600.0, 900.0);
        assert_eq!((net.width, net.height), (1600.0, 900.0));
        assert_eq!(net.edges, edges);
        assert_eq!(net.packets.iter().map(|p| p.id).collect::<Vec<_>>(), packet_ids);
        for node in &net.nodes {
            assert_eq!(node.speed(), 0.0);
            assert_eq!(node.origin(), node.position());
            assert!(node.x <= 1600.0 && node.y <= 900.0);
        }
    }

    #[test]
    fn test_resize_ignores_invalid_sizes() {
        let mut net = network(11);
        let before: Vec<_> = net.nodes.iter().map(Node::position).collect();
        net.resize(-5.0, 100.0);
        net.resize(f64::INFINITY, 100.0);
        assert_eq!((net.width, net.height), (800.0, 600.0));
        let after: Vec<_> = net.nodes.iter().map(Node::position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_resize_empty_network_is_noop() {
        let mut config = NetworkConfig::default();
        config.layout.node_count = 0;
        let mut net = Network::with_seed(800.0, 600.0, config, 12).unwrap();
        net.resize(100.0, 100.0);
        assert_eq!((net.width, net.height), (800.0, 600.0));
    }

    #[test]
    fn test_snapshot_interpolates_packets() {
        let mut net = network(13);
        net.emit_packet().unwrap();
        net.packets[0].progress = 0.5;
        let snap = net.snapshot();
        let p = &snap.packets[0];
        let a = net.nodes[p.source as usize].position();
        let b = net.nodes[p.target as usize].position();
        assert!((p.x - (a.x + b.x) / 2.0).abs() < 1e-9);
        assert!((p.y - (a.y + b.y) / 2.0).abs() < 1e-9);
        assert_eq!(snap.nodes.len(), net.nodes.len());
        assert_eq!(snap.edges.len(), net.edges.len());
        assert_eq!(snap.effects.len(), 1);
    }

    #[test]
    fn test_reset_clears_runtime_state() {
        let mut net = network(14);
        for _ in 0..5 {
            net.emit_packet();
        }
        net.tick(0.05);
        net.reset();
        assert!(net.packets.is_empty());
        assert!(net.effects.is_empty());
        assert_eq!(net.stats().ticks, 0);
        assert_eq!(net.stats().node_count, NetworkConfig::default().layout.node_count);
    }
}
