// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Effect Scheduler

//! Time-bounded visual events attached to nodes.
//!
//! The scheduler only tracks liveness. Radius, alpha and blur are derived by
//! the renderer from `elapsed / duration`.

use serde::{Deserialize, Serialize};

use crate::config::{EffectConfig, EffectKindConfig};
use crate::types::{Color, EffectView, NodeId};

/// Why a pulse was emitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PulseRole {
    Send,
    ReceiveFinal,
    Route,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Pulse,
    ProcessingFlash,
    Blink,
    Ripple,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] =
        [EffectKind::Pulse, EffectKind::ProcessingFlash, EffectKind::Blink, EffectKind::Ripple];
}

/// Effect payload; only pulses carry extra data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EffectTag {
    Pulse { role: PulseRole },
    ProcessingFlash,
    Blink,
    Ripple,
}

impl EffectTag {
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Pulse { .. } => EffectKind::Pulse,
            Self::ProcessingFlash => EffectKind::ProcessingFlash,
            Self::Blink => EffectKind::Blink,
            Self::Ripple => EffectKind::Ripple,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Effect {
    pub tag: EffectTag,
    pub node: NodeId,
    /// Seconds since the effect was scheduled.
    pub elapsed: f64,
    pub color: Color,
}

// ---------------------------------------------------------------------------
// EffectScheduler
// ---------------------------------------------------------------------------

/// One queue per effect kind, each with its own configured lifetime.
#[derive(Debug, Clone)]
pub struct EffectScheduler {
    config: EffectConfig,
    pulses: Vec<Effect>,
    flashes: Vec<Effect>,
    blinks: Vec<Effect>,
    ripples: Vec<Effect>,
}

impl EffectScheduler {
    pub fn new(config: EffectConfig) -> Self {
        Self {
            config,
            pulses: Vec::new(),
            flashes: Vec::new(),
            blinks: Vec::new(),
            ripples: Vec::new(),
        }
    }

    pub fn kind_config(&self, kind: EffectKind) -> &EffectKindConfig {
        match kind {
            EffectKind::Pulse => &self.config.pulse,
            EffectKind::ProcessingFlash => &self.config.processing,
            EffectKind::Blink => &self.config.blink,
            EffectKind::Ripple => &self.config.ripple,
        }
    }

    pub fn duration(&self, kind: EffectKind) -> f64 {
        self.kind_config(kind).duration
    }

    pub fn ripple_on_delivery(&self) -> bool {
        self.config.ripple_on_delivery
    }

    /// Live effects of one kind, in insertion order.
    pub fn queue(&self, kind: EffectKind) -> &[Effect] {
        match kind {
            EffectKind::Pulse => &self.pulses,
            EffectKind::ProcessingFlash => &self.flashes,
            EffectKind::Blink => &self.blinks,
            EffectKind::Ripple => &self.ripples,
        }
    }

    fn queue_mut(&mut self, kind: EffectKind) -> &mut Vec<Effect> {
        match kind {
            EffectKind::Pulse => &mut self.pulses,
            EffectKind::ProcessingFlash => &mut self.flashes,
            EffectKind::Blink => &mut self.blinks,
            EffectKind::Ripple => &mut self.ripples,
        }
    }

    /// Schedule a new effect at `node` using its kind's configured color.
    pub fn schedule(&mut self, tag: EffectTag, node: NodeId) {
        let kind = tag.kind();
        let color = self.kind_config(kind).color;
        self.queue_mut(kind).push(Effect { tag, node, elapsed: 0.0, color });
    }

    pub fn pulse(&mut self, node: NodeId, role: PulseRole) {
        self.schedule(EffectTag::Pulse { role }, node);
    }

    pub fn processing_flash(&mut self, node: NodeId) {
        self.schedule(EffectTag::ProcessingFlash, node);
    }

    pub fn blink(&mut self, node: NodeId) {
        self.schedule(EffectTag::Blink, node);
    }

    pub fn ripple(&mut self, node: NodeId) {
        self.schedule(EffectTag::Ripple, node);
    }

    /// Age every effect by `dt` seconds and drop the expired ones.
    ///
    /// An effect is expired once `elapsed >= duration` of its kind.
    pub fn advance(&mut self, dt: f64) {
        for kind in EffectKind::ALL {
            let duration = self.duration(kind);
            let queue = self.queue_mut(kind);
            for effect in queue.iter_mut() {
                effect.elapsed += dt;
            }
            queue.retain(|e| e.elapsed < duration);
        }
    }

    pub fn len(&self) -> usize {
        self.pulses.len() + self.flashes.len() + self.blinks.len() + self.ripples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        for kind in EffectKind::ALL {
            self.queue_mut(kind).clear();
        }
    }

    /// All live effects across kinds, flattened for the renderer.
    pub fn views(&self) -> Vec<EffectView> {
        EffectKind::ALL
            .iter()
            .flat_map(|&kind| {
                let duration = self.duration(kind);
                self.queue(kind).iter().map(move |e| EffectView {
                    kind,
                    role: match e.tag {
                        EffectTag::Pulse { role } => Some(role),
                        _ => None,
                    },
                    node: e.node,
                    elapsed: e.elapsed,
                    duration,
                    color: e.color,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
