// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Bench Scenario Definitions

use meshfield_engine::config::{BoundaryPolicy, DestinationPolicy, LayoutStrategy, RestoringForce};
use meshfield_engine::{Network, NetworkConfig};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub width: f64,
    pub height: f64,
    /// Host frame interval in milliseconds.
    pub frame_ms: f64,
    /// Applied on top of the base config (defaults or `--config`).
    pub tune: fn(&mut NetworkConfig),
    /// Called before every frame with the frame index.
    pub mid_event: Option<fn(&mut Network, u64)>,
}

// ─── Tuning Functions ───────────────────────────────────────────────────────

fn scatter_drift(_config: &mut NetworkConfig) {}

fn busy_scatter(config: &mut NetworkConfig) {
    config.emission_probability = 0.5;
    config.packets.max_active = 256;
    config.layout.node_count = 80;
    config.layout.min_spacing = 40.0;
}

fn lattice_static(config: &mut NetworkConfig) {
    let seed = config.seed;
    *config = NetworkConfig::static_lattice();
    config.seed = seed;
}

fn canvas_edge(config: &mut NetworkConfig) {
    config.motion.boundary = BoundaryPolicy::CanvasEdge;
    config.motion.return_strength = 0.0;
    config.motion.acceleration = 80.0;
    config.motion.max_speed = 60.0;
    config.motion.damping = 1.0;
}

fn power_return(config: &mut NetworkConfig) {
    config.motion.restoring = RestoringForce::Power { exponent: 2.0 };
    config.motion.acceleration = 30.0;
}

fn single_hop(config: &mut NetworkConfig) {
    config.packets.destination = DestinationPolicy::SingleHop;
    config.emission_probability = 0.2;
}

fn long_chains(config: &mut NetworkConfig) {
    config.packets.extend_probability = 1.0;
    config.packets.stop_probability = 0.05;
    config.packets.max_hops = 4;
    config.emission_probability = 0.2;
}

fn sparse_edges(config: &mut NetworkConfig) {
    config.edges.min_edges_per_node = 0;
    config.edges.max_edges_per_node = 1;
    config.emission_probability = 0.3;
}

fn resize_lattice(config: &mut NetworkConfig) {
    config.layout.strategy = LayoutStrategy::Lattice;
    config.emission_probability = 0.2;
}

// ─── Mid-run Events ─────────────────────────────────────────────────────────

const CHURN_SIZES: [(f64, f64); 4] = [(1280.0, 720.0), (640.0, 480.0), (1920.0, 1080.0), (320.0, 568.0)];

fn resize_churn(net: &mut Network, frame: u64) {
    if frame > 0 && frame % 120 == 0 {
        let (w, h) = CHURN_SIZES[(frame / 120) as usize % CHURN_SIZES.len()];
        net.resize(w, h);
    }
}

fn periodic_reset(net: &mut Network, frame: u64) {
    if frame > 0 && frame % 500 == 0 {
        net.reset();
    }
}

// ─── Scenario List ──────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "SCATTER_DRIFT",
            label: "Scatter layout, drift radius",
            category: "layout",
            width: 1280.0,
            height: 720.0,
            frame_ms: 1000.0 / 60.0,
            tune: scatter_drift,
            mid_event: None,
        },
        Scenario {
            name: "SCATTER_BUSY",
            label: "Dense scatter, heavy traffic",
            category: "traffic",
            width: 1920.0,
            height: 1080.0,
            frame_ms: 1000.0 / 60.0,
            tune: busy_scatter,
            mid_event: None,
        },
        Scenario {
            name: "LATTICE_STATIC",
            label: "Static lattice",
            category: "layout",
            width: 1280.0,
            height: 720.0,
            frame_ms: 1000.0 / 60.0,
            tune: lattice_static,
            mid_event: None,
        },
        Scenario {
            name: "CANVAS_EDGE",
            label: "Free roaming, canvas bounce",
            category: "motion",
            width: 800.0,
            height: 600.0,
            frame_ms: 1000.0 / 60.0,
            tune: canvas_edge,
            mid_event: None,
        },
        Scenario {
            name: "POWER_RETURN",
            label: "Power-law restoring force",
            category: "motion",
            width: 1280.0,
            height: 720.0,
            frame_ms: 1000.0 / 60.0,
            tune: power_return,
            mid_event: None,
        },
        Scenario {
            name: "SINGLE_HOP",
            label: "Single-hop destinations",
            category: "routing",
            width: 1280.0,
            height: 720.0,
            frame_ms: 1000.0 / 60.0,
            tune: single_hop,
            mid_event: None,
        },
        Scenario {
            name: "LONG_CHAINS",
            label: "Long chains, tight hop limit",
            category: "routing",
            width: 1280.0,
            height: 720.0,
            frame_ms: 1000.0 / 60.0,
            tune: long_chains,
            mid_event: None,
        },
        Scenario {
            name: "SPARSE_EDGES",
            label: "Sparse graph, dead ends",
            category: "routing",
            width: 1280.0,
            height: 720.0,
            frame_ms: 1000.0 / 60.0,
            tune: sparse_edges,
            mid_event: None,
        },
        Scenario {
            name: "RESIZE_CHURN",
            label: "Lattice under resize churn",
            category: "resize",
            width: 1280.0,
            height: 720.0,
            frame_ms: 1000.0 / 60.0,
            tune: resize_lattice,
            mid_event: Some(resize_churn),
        },
        Scenario {
            name: "SLOW_FRAMES",
            label: "15 fps host with resets",
            category: "resize",
            width: 1280.0,
            height: 720.0,
            frame_ms: 1000.0 / 15.0,
            tune: scatter_drift,
            mid_event: Some(periodic_reset),
        },
    ]
}
