// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Graph Builder

//! Node placement and edge generation.
//!
//! Two layouts exist:
//! 1. Scatter: rejection-sampled positions with a minimum spacing, then
//!    rescaled to fill the canvas inside the margin. Edges connect nearest
//!    neighbours greedily and never cross an existing edge.
//! 2. Lattice: a row/column grid matched to the canvas aspect ratio, one
//!    node per cell with bounded jitter. Edges connect nearest neighbours
//!    with de-duplication only.
//!
//! Node ids are indices into the node vector and never change.

use std::collections::HashSet;

use rand::Rng;

use crate::config::{EdgeConfig, LayoutConfig, LayoutStrategy};
use crate::geometry::{distance2, fit_axis, normalize, segments_cross, usable_extent, Point, EPSILON};
use crate::types::{Color, Edge, LayoutSlot, Node, NodeId};

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Lay out nodes and connect them according to `layout.strategy`.
pub fn build<R: Rng + ?Sized>(
    width: f64,
    height: f64,
    layout: &LayoutConfig,
    edge_config: &EdgeConfig,
    rng: &mut R,
) -> Graph {
    let mut nodes = match layout.strategy {
        LayoutStrategy::Scatter => scatter_nodes(width, height, layout, rng),
        LayoutStrategy::Lattice => lattice_nodes(width, height, layout, rng),
    };
    let planar = layout.strategy == LayoutStrategy::Scatter;
    let edges = connect_nearest(&mut nodes, edge_config, planar, rng);
    log::debug!(
        "built {:?} graph: {} nodes, {} edges on {}x{}",
        layout.strategy,
        nodes.len(),
        edges.len(),
        width,
        height
    );
    Graph { nodes, edges }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Draw up to `retries + 1` samples and return the first one at least
/// `min_spacing` away from every placed point.
///
/// When every attempt is too close the last sample is accepted anyway. The
/// flag reports whether the spacing constraint was met.
pub fn place_with_spacing<F>(
    placed: &[Point],
    min_spacing: f64,
    retries: u32,
    mut sample: F,
) -> (Point, bool)
where
    F: FnMut() -> Point,
{
    let min2 = min_spacing * min_spacing;
    let mut candidate = sample();
    for attempt in 0..=retries {
        if placed.iter().all(|p| distance2(*p, candidate) >= min2) {
            return (candidate, true);
        }
        if attempt < retries {
            candidate = sample();
        }
    }
    (candidate, false)
}

fn scatter_nodes<R: Rng + ?Sized>(
    width: f64,
    height: f64,
    layout: &LayoutConfig,
    rng: &mut R,
) -> Vec<Node> {
    let count = layout.node_count as usize;
    let usable_w = usable_extent(width, layout.margin);
    let usable_h = usable_extent(height, layout.margin);

    let mut placed: Vec<Point> = Vec::with_capacity(count);
    let mut crowded = 0usize;
    for _ in 0..count {
        let (point, spaced) =
            place_with_spacing(&placed, layout.min_spacing, layout.placement_retries, || {
                Point::new(
                    layout.margin + rng.gen::<f64>() * usable_w,
                    layout.margin + rng.gen::<f64>() * usable_h,
                )
            });
        if !spaced {
            crowded += 1;
        }
        placed.push(point);
    }
    if crowded > 0 {
        log::debug!("{} of {} nodes placed below minimum spacing", crowded, count);
    }

    // Rescale the sampled cloud so it spans the whole margin box.
    let (min_x, max_x) = bounds(placed.iter().map(|p| p.x));
    let (min_y, max_y) = bounds(placed.iter().map(|p| p.y));

    placed
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let slot = LayoutSlot::Scatter {
                u: normalize(p.x, min_x, max_x - min_x),
                v: normalize(p.y, min_y, max_y - min_y),
            };
            let color = Color::pick(&layout.node_palette, rng);
            let position = slot_position(&slot, width, height, layout, rng);
            Node::new(i as NodeId, position, color, slot)
        })
        .collect()
}

/// Rows and columns for roughly `count` cells matching the canvas aspect.
pub fn lattice_dimensions(count: u32, width: f64, height: f64, margin: f64) -> (u32, u32) {
    if count == 0 {
        return (0, 0);
    }
    let usable_w = usable_extent(width, margin);
    let usable_h = usable_extent(height, margin);
    let aspect = if usable_w > EPSILON && usable_h > EPSILON {
        usable_w / usable_h
    } else {
        1.0
    };
    let n = count as f64;
    let cols = ((n * aspect).sqrt().round() as u32).clamp(1, count);
    let rows = ((n / cols as f64).round() as u32).max(1);
    (rows, cols)
}

fn lattice_nodes<R: Rng + ?Sized>(
    width: f64,
    height: f64,
    layout: &LayoutConfig,
    rng: &mut R,
) -> Vec<Node> {
    let (rows, cols) = lattice_dimensions(layout.node_count, width, height, layout.margin);
    let mut nodes = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let slot = LayoutSlot::Lattice { row, col, rows, cols };
            let color = Color::pick(&layout.node_palette, rng);
            let position = slot_position(&slot, width, height, layout, rng);
            nodes.push(Node::new(nodes.len() as NodeId, position, color, slot));
        }
    }
    nodes
}

/// Pixel position of a layout slot on a `width` x `height` canvas.
///
/// Lattice slots get fresh jitter on every call.
pub fn slot_position<R: Rng + ?Sized>(
    slot: &LayoutSlot,
    width: f64,
    height: f64,
    layout: &LayoutConfig,
    rng: &mut R,
) -> Point {
    match *slot {
        LayoutSlot::Scatter { u, v } => {
            Point::new(fit_axis(u, width, layout.margin), fit_axis(v, height, layout.margin))
        }
        LayoutSlot::Lattice { row, col, rows, cols } => {
            let x = lattice_axis(col, cols, width, layout, rng);
            let y = lattice_axis(row, rows, height, layout, rng);
            Point::new(x, y)
        }
    }
}

fn lattice_axis<R: Rng + ?Sized>(
    index: u32,
    cells: u32,
    extent: f64,
    layout: &LayoutConfig,
    rng: &mut R,
) -> f64 {
    let cells = cells.max(1) as f64;
    let center = (index as f64 + 0.5) / cells;
    let half_cell = 0.5 / cells;
    let jitter = (rng.gen::<f64>() * 2.0 - 1.0) * layout.lattice_jitter * half_cell;
    fit_axis(center + jitter, extent, layout.margin)
}

/// Re-place every node for a new canvas size and make that its new origin.
pub fn relayout<R: Rng + ?Sized>(
    nodes: &mut [Node],
    width: f64,
    height: f64,
    layout: &LayoutConfig,
    rng: &mut R,
) {
    for node in nodes.iter_mut() {
        let position = slot_position(&node.slot, width, height, layout, rng);
        node.reanchor(position);
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Greedily connect each node to its nearest neighbours.
///
/// Each node creates between `min_edges_per_node` and `max_edges_per_node`
/// edges (fewer if candidates run out). A pair already connected in either
/// direction is skipped. With `planar`, a candidate whose segment would
/// cross an existing edge is skipped too.
pub fn connect_nearest<R: Rng + ?Sized>(
    nodes: &mut [Node],
    config: &EdgeConfig,
    planar: bool,
    rng: &mut R,
) -> Vec<Edge> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut connected: HashSet<(NodeId, NodeId)> = HashSet::new();

    for i in 0..nodes.len() {
        let cap = rng.gen_range(config.min_edges_per_node..=config.max_edges_per_node);
        if cap == 0 {
            continue;
        }
        let source = nodes[i].id;
        let origin = nodes[i].position();

        let mut candidates: Vec<usize> = (0..nodes.len()).filter(|&j| j != i).collect();
        candidates.sort_by(|&a, &b| {
            distance2(origin, nodes[a].position()).total_cmp(&distance2(origin, nodes[b].position()))
        });

        let mut made = 0;
        for j in candidates {
            if made >= cap {
                break;
            }
            let edge = Edge { source, target: nodes[j].id };
            if connected.contains(&edge.unordered_key()) {
                continue;
            }
            if planar && crosses_any(nodes, &edges, &edge) {
                continue;
            }
            connected.insert(edge.unordered_key());
            edges.push(edge);
            nodes[i].outgoing.push(edge.target);
            made += 1;
        }
    }
    edges
}

/// True when `candidate` properly crosses an existing edge. Edges sharing an
/// endpoint with the candidate are never considered crossing.
fn crosses_any(nodes: &[Node], edges: &[Edge], candidate: &Edge) -> bool {
    let a = nodes[candidate.source as usize].position();
    let b = nodes[candidate.target as usize].position();
    edges.iter().any(|e| {
        let shares_endpoint = e.source == candidate.source
            || e.source == candidate.target
            || e.target == candidate.source
            || e.target == candidate.target;
        !shares_endpoint
            && segments_cross(
                a,
                b,
                nodes[e.source as usize].position(),
                nodes[e.target as usize].position(),
            )
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scatter_layout(count: u32) -> LayoutConfig {
        LayoutConfig { node_count: count, ..LayoutConfig::default() }
    }

    fn lattice_layout(count: u32) -> LayoutConfig {
        LayoutConfig {
            strategy: LayoutStrategy::Lattice,
            node_count: count,
            ..LayoutConfig::default()
        }
    }

    fn assert_no_duplicate_pairs(edges: &[Edge]) {
        let mut seen = HashSet::new();
        for e in edges {
            assert_ne!(e.source, e.target, "self loop {:?}", e);
            assert!(seen.insert(e.unordered_key()), "duplicate edge {:?}", e);
        }
    }

    #[test]
    fn test_place_with_spacing_accepts_last_sample_when_crowded() {
        let placed = vec![Point::new(0.0, 0.0)];
        let mut calls = 0;
        let (point, spaced) = place_with_spacing(&placed, 10.0, 3, || {
            calls += 1;
            Point::new(calls as f64, 0.0)
        });
        assert!(!spaced);
        assert_eq!(calls, 4);
        assert_eq!(point, Point::new(4.0, 0.0));
    }

    #[test]
    fn test_place_with_spacing_stops_at_first_fit() {
        let placed = vec![Point::new(0.0, 0.0)];
        let mut calls = 0;
        let (point, spaced) = place_with_spacing(&placed, 10.0, 30, || {
            calls += 1;
            Point::new(calls as f64 * 6.0, 0.0)
        });
        assert!(spaced);
        assert_eq!(calls, 2);
        assert_eq!(point, Point::new(12.0, 0.0));
    }

    #[test]
    fn test_scatter_fills_margin_box() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let layout = scatter_layout(30);
        let graph = build(800.0, 600.0, &layout, &EdgeConfig::default(), &mut rng);
        assert_eq!(graph.nodes.len(), 30);

        let (min_x, max_x) = bounds(graph.nodes.iter().map(|n| n.x));
        let (min_y, max_y) = bounds(graph.nodes.iter().map(|n| n.y));
        assert!((min_x - 40.0).abs() < 1e-6);
        assert!((max_x - 760.0).abs() < 1e-6);
        assert!((min_y - 40.0).abs() < 1e-6);
        assert!((max_y - 560.0).abs() < 1e-6);
        for (i, node) in graph.nodes.iter().enumerate() {
            assert_eq!(node.id as usize, i);
            assert_eq!(node.origin(), node.position());
        }
    }

    #[test]
    fn test_single_scatter_node_is_centered() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let graph = build(400.0, 200.0, &scatter_layout(1), &EdgeConfig::default(), &mut rng);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes[0].position(), Point::new(200.0, 100.0));
    }

    #[test]
    fn test_empty_layout() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let graph = build(400.0, 200.0, &scatter_layout(0), &EdgeConfig::default(), &mut rng);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        let graph = build(400.0, 200.0, &lattice_layout(0), &EdgeConfig::default(), &mut rng);
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn test_planar_edges_never_cross() {
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let edge_config = EdgeConfig { min_edges_per_node: 2, max_edges_per_node: 5 };
            let graph = build(1000.0, 700.0, &scatter_layout(35), &edge_config, &mut rng);
            assert_no_duplicate_pairs(&graph.edges);
            for (i, a) in graph.edges.iter().enumerate() {
                for b in &graph.edges[i + 1..] {
                    if a.source == b.source
                        || a.source == b.target
                        || a.target == b.source
                        || a.target == b.target
                    {
                        continue;
                    }
                    let n = &graph.nodes;
                    assert!(
                        !segments_cross(
                            n[a.source as usize].position(),
                            n[a.target as usize].position(),
                            n[b.source as usize].position(),
                            n[b.target as usize].position(),
                        ),
                        "seed {}: {:?} crosses {:?}",
                        seed,
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_outgoing_lists_match_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let graph = build(900.0, 600.0, &scatter_layout(25), &EdgeConfig::default(), &mut rng);
        let from_nodes: usize = graph.nodes.iter().map(|n| n.outgoing.len()).sum();
        assert_eq!(from_nodes, graph.edges.len());
        for e in &graph.edges {
            assert!(graph.nodes[e.source as usize].outgoing.contains(&e.target));
        }
        for node in &graph.nodes {
            assert!(node.outgoing.len() <= EdgeConfig::default().max_edges_per_node as usize);
        }
    }

    #[test]
    fn test_lattice_dimensions_follow_aspect() {
        assert_eq!(lattice_dimensions(0, 800.0, 600.0, 0.0), (0, 0));
        let (rows, cols) = lattice_dimensions(48, 1200.0, 400.0, 0.0);
        assert!(cols > rows);
        assert!((rows * cols) as i64 - 48 <= 12);
        let (rows, cols) = lattice_dimensions(36, 500.0, 500.0, 0.0);
        assert_eq!((rows, cols), (6, 6));
        // degenerate canvas falls back to a square grid
        assert_eq!(lattice_dimensions(16, 0.0, 0.0, 40.0), (4, 4));
    }

    #[test]
    fn test_lattice_nodes_stay_in_their_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let layout = lattice_layout(36);
        let graph = build(640.0, 640.0, &layout, &EdgeConfig::default(), &mut rng);
        assert_eq!(graph.nodes.len(), 36);
        // 6x6 grid over a 560px box: cells are ~93px, jitter stays within 30% of half a cell
        let cell = 560.0 / 6.0;
        for node in &graph.nodes {
            let LayoutSlot::Lattice { row, col, .. } = node.slot else {
                panic!("expected lattice slot");
            };
            let cx = 40.0 + (col as f64 + 0.5) * cell;
            let cy = 40.0 + (row as f64 + 0.5) * cell;
            assert!((node.x - cx).abs() <= 0.3 * cell / 2.0 + 1e-9);
            assert!((node.y - cy).abs() <= 0.3 * cell / 2.0 + 1e-9);
        }
        assert_no_duplicate_pairs(&graph.edges);
    }

    #[test]
    fn test_lattice_edge_caps_respected() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let edge_config = EdgeConfig { min_edges_per_node: 2, max_edges_per_node: 2 };
        let graph = build(800.0, 800.0, &lattice_layout(25), &edge_config, &mut rng);
        for node in &graph.nodes {
            assert!(node.outgoing.len() <= 2);
        }
        // with 25 nodes at least the first node always finds two fresh partners
        assert_eq!(graph.nodes[0].outgoing.len(), 2);
        assert_no_duplicate_pairs(&graph.edges);
    }

    #[test]
    fn test_zero_edge_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let edge_config = EdgeConfig { min_edges_per_node: 0, max_edges_per_node: 0 };
        let graph = build(800.0, 800.0, &scatter_layout(10), &edge_config, &mut rng);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_relayout_scales_scatter_and_resets_motion() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let layout = scatter_layout(12);
        let mut graph = build(800.0, 600.0, &layout, &EdgeConfig::default(), &mut rng);
        for node in graph.nodes.iter_mut() {
            node.vx = 5.0;
            node.x += 3.0;
        }
        relayout(&mut graph.nodes, 1600.0, 1200.0, &layout, &mut rng);
        for node in &graph.nodes {
            let LayoutSlot::Scatter { u, v } = node.slot else {
                panic!("expected scatter slot");
            };
            assert!((node.x - (40.0 + u * 1520.0)).abs() < 1e-9);
            assert!((node.y - (40.0 + v * 1120.0)).abs() < 1e-9);
            assert_eq!(node.origin(), node.position());
            assert_eq!(node.speed(), 0.0);
        }
    }

    #[test]
    fn test_tiny_canvas_keeps_positions_finite() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for layout in [scatter_layout(10), lattice_layout(10)] {
            let graph = build(0.0, 0.0, &layout, &EdgeConfig::default(), &mut rng);
            for node in &graph.nodes {
                assert!(node.position().is_finite());
                assert_eq!(node.position(), Point::new(0.0, 0.0));
            }
        }
    }
}
