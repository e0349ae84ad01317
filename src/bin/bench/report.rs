// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Bench Report Types

use serde::Serialize;

use meshfield_engine::NetworkStats;

// ─── Property Audit ─────────────────────────────────────────────────────────

/// Per-property violation counters, accumulated over every frame of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Violations {
    pub duplicate_edges: u32,
    pub progress_out_of_range: u32,
    pub hop_limit_exceeded: u32,
    pub stale_effects: u32,
    pub static_node_moved: u32,
    pub off_canvas: u32,
    pub non_finite_state: u32,
    pub single_hop_chained: u32,
    pub accounting_mismatch: u32,
}

impl Violations {
    pub fn total(&self) -> u32 {
        self.duplicate_edges
            + self.progress_out_of_range
            + self.hop_limit_exceeded
            + self.stale_effects
            + self.static_node_moved
            + self.off_canvas
            + self.non_finite_state
            + self.single_hop_chained
            + self.accounting_mismatch
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub label: String,
    pub category: String,
    pub seed: u64,
    pub frames: u64,
    pub pass: bool,
    pub violations: Violations,
    pub stats: NetworkStats,
    pub delivery_rate: f64,
    pub avg_hops: f64,
    pub peak_active_packets: u32,
    pub peak_live_effects: u32,
    pub elapsed_ms: u128,
    pub frames_per_sec: f64,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub frames_per_scenario: u64,
    pub seed: u64,
    pub summary: Summary,
    pub scenarios: Vec<BenchResult>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
