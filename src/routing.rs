// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Hop-by-Hop Packet Routing

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{DestinationPolicy, PacketConfig};
use crate::effects::{EffectScheduler, PulseRole};
use crate::types::{Color, Node, NodeId, Packet, PacketId, PacketState};

/// Per-tick routing outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    pub delivered: u32,
    /// Sum of hop counts of the packets delivered this tick.
    pub delivered_hops: u64,
    pub dropped_hop_limit: u32,
    pub dropped_no_route: u32,
}

/// Move every active packet along its edge and resolve arrivals.
///
/// Progress grows by `speed * dt` and is clamped to 1. A packet handles at
/// most one arrival per tick; any overshoot is discarded when it departs on
/// the next edge.
pub fn advance_packets<R: Rng + ?Sized>(
    packets: &mut [Packet],
    nodes: &[Node],
    config: &PacketConfig,
    dt: f64,
    effects: &mut EffectScheduler,
    rng: &mut R,
) -> AdvanceReport {
    let mut report = AdvanceReport::default();
    for packet in packets.iter_mut().filter(|p| p.is_active()) {
        packet.progress = (packet.progress + config.speed * dt).min(1.0);
        if packet.progress < 1.0 {
            continue;
        }
        match arrive(packet, nodes, config, effects, rng) {
            PacketState::Traveling => {}
            PacketState::ArrivedFinal => {
                report.delivered += 1;
                report.delivered_hops += packet.hops as u64;
            }
            PacketState::DroppedHopLimit => report.dropped_hop_limit += 1,
            PacketState::DroppedNoRoute => report.dropped_no_route += 1,
        }
    }
    report
}

/// Handle a packet reaching its current target and return its new state.
pub fn arrive<R: Rng + ?Sized>(
    packet: &mut Packet,
    nodes: &[Node],
    config: &PacketConfig,
    effects: &mut EffectScheduler,
    rng: &mut R,
) -> PacketState {
    let arrived = packet.target;

    if arrived == packet.final_target {
        packet.state = PacketState::ArrivedFinal;
        effects.pulse(arrived, PulseRole::ReceiveFinal);
        effects.processing_flash(arrived);
        if effects.ripple_on_delivery() {
            effects.ripple(arrived);
        }
        log::trace!("packet {} delivered at {} after {} hops", packet.id, arrived, packet.hops);
        return packet.state;
    }

    packet.hops += 1;
    if packet.hops > config.max_hops {
        packet.state = PacketState::DroppedHopLimit;
        log::trace!("packet {} dropped at {}: hop limit", packet.id, arrived);
        return packet.state;
    }

    let next = nodes
        .get(arrived as usize)
        .and_then(|node| select_next_hop(node, packet.source, &packet.path, rng));
    match next {
        Some(next) => {
            packet.path.push(arrived);
            packet.source = arrived;
            packet.target = next;
            packet.progress = 0.0;
            effects.pulse(arrived, PulseRole::Route);
            effects.processing_flash(arrived);
        }
        None => {
            packet.state = PacketState::DroppedNoRoute;
            log::trace!("packet {} dropped at {}: no route", packet.id, arrived);
        }
    }
    packet.state
}

/// Forwarding candidates from `node`, loosening the rules until one fits.
///
/// 1. Targets that are neither `previous` nor already on `path`.
/// 2. Targets other than `previous`.
/// 3. Any outgoing target.
pub fn next_hop_candidates(node: &Node, previous: NodeId, path: &[NodeId]) -> Vec<NodeId> {
    let fresh: Vec<NodeId> = node
        .outgoing
        .iter()
        .copied()
        .filter(|t| *t != previous && !path.contains(t))
        .collect();
    if !fresh.is_empty() {
        return fresh;
    }
    let not_back: Vec<NodeId> = node.outgoing.iter().copied().filter(|t| *t != previous).collect();
    if !not_back.is_empty() {
        return not_back;
    }
    node.outgoing.clone()
}

pub fn select_next_hop<R: Rng + ?Sized>(
    node: &Node,
    previous: NodeId,
    path: &[NodeId],
    rng: &mut R,
) -> Option<NodeId> {
    next_hop_candidates(node, previous, path).choose(rng).copied()
}

/// Remove inactive packets, scheduling a blink where each dropped one died.
/// Returns the number of packets removed.
pub fn sweep_inactive(packets: &mut Vec<Packet>, effects: &mut EffectScheduler) -> usize {
    let before = packets.len();
    packets.retain(|p| {
        if p.is_active() {
            return true;
        }
        if p.state.is_dropped() {
            effects.blink(p.target);
        }
        false
    });
    before - packets.len()
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// First hop and final destination chosen for a new packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePlan {
    pub origin: NodeId,
    pub first_hop: NodeId,
    pub final_target: NodeId,
}

/// Pick a node with at least one outgoing edge.
///
/// Up to `retries + 1` uniform picks are tried; after that the routable nodes
/// are scanned and one of them is chosen. `None` only when no node in the
/// network has an outgoing edge.
pub fn pick_source<R: Rng + ?Sized>(nodes: &[Node], retries: u32, rng: &mut R) -> Option<NodeId> {
    if nodes.is_empty() {
        return None;
    }
    for _ in 0..=retries {
        let node = &nodes[rng.gen_range(0..nodes.len())];
        if !node.outgoing.is_empty() {
            return Some(node.id);
        }
    }
    let routable: Vec<NodeId> =
        nodes.iter().filter(|n| !n.outgoing.is_empty()).map(|n| n.id).collect();
    routable.choose(rng).copied()
}

/// Choose the first hop from `origin` and, depending on the destination
/// policy, walk further ahead to pick the final destination.
///
/// The planning walk never revisits a node, takes at most `max_hops - 1`
/// extra steps, and stops after each step with `stop_probability`.
pub fn plan_route<R: Rng + ?Sized>(
    nodes: &[Node],
    origin: NodeId,
    config: &PacketConfig,
    rng: &mut R,
) -> Option<RoutePlan> {
    let first_hop = *nodes.get(origin as usize)?.outgoing.choose(rng)?;
    let mut final_target = first_hop;

    if config.destination == DestinationPolicy::MultiHopChain
        && rng.gen_bool(config.extend_probability)
    {
        let mut visited = vec![origin, first_hop];
        for _ in 0..config.max_hops.saturating_sub(1) {
            let Some(node) = nodes.get(final_target as usize) else {
                break;
            };
            let onward: Vec<NodeId> =
                node.outgoing.iter().copied().filter(|n| !visited.contains(n)).collect();
            let Some(&next) = onward.choose(rng) else {
                break;
            };
            visited.push(next);
            final_target = next;
            if rng.gen_bool(config.stop_probability) {
                break;
            }
        }
    }

    Some(RoutePlan { origin, first_hop, final_target })
}

/// Create a packet from a random routable node and pulse its origin.
pub fn spawn_packet<R: Rng + ?Sized>(
    id: PacketId,
    nodes: &[Node],
    config: &PacketConfig,
    effects: &mut EffectScheduler,
    rng: &mut R,
) -> Option<Packet> {
    let origin = pick_source(nodes, config.source_retries, rng)?;
    let plan = plan_route(nodes, origin, config, rng)?;
    effects.pulse(origin, PulseRole::Send);
    log::trace!(
        "packet {} emitted {} -> {} (final {})",
        id,
        plan.origin,
        plan.first_hop,
        plan.final_target
    );
    Some(Packet {
        id,
        source: plan.origin,
        target: plan.first_hop,
        progress: 0.0,
        hops: 0,
        final_target: plan.final_target,
        path: vec![plan.origin],
        color: Color::pick(&config.packet_palette, rng),
        state: PacketState::Traveling,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
