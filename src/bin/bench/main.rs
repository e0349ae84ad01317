// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Bench Runner
//
// Drives the engine through named scenarios at a fixed host frame rate and
// audits the simulation properties after every frame.
//
// Usage:
//   cargo run --release --bin bench                        # All scenarios, 3600 frames each
//   cargo run --release --bin bench -- --ticks 600         # Quick mode
//   cargo run --release --bin bench -- lattice             # Filter by name, label or category
//   cargo run --release --bin bench -- --seed 42           # Custom seed
//   cargo run --release --bin bench -- --config mesh.json  # Base config from a JSON file
//   RUST_LOG=debug cargo run --bin bench                   # Engine debug logging

mod report;
mod scenarios;

use std::collections::HashSet;
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use env_logger::Builder;
use log::{info, warn, LevelFilter};
use meshfield_engine::config::{BoundaryPolicy, DestinationPolicy};
use meshfield_engine::{EffectKind, Network, NetworkConfig};

use report::*;
use scenarios::*;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    ticks: u64,
    seed: u64,
    config: Option<String>,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        ticks: 3600,
        seed: 0,
        config: None,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--ticks" => {
                i += 1;
                if i < args.len() {
                    cli.ticks = args[i].parse().unwrap_or(3600);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(args[i].clone());
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn load_base_config(path: Option<&str>) -> Result<NetworkConfig, String> {
    let Some(path) = path else {
        return Ok(NetworkConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path, e))
}

// ─── Property Audit ─────────────────────────────────────────────────────────

fn audit_edges(net: &Network, violations: &mut Violations) {
    let mut seen = HashSet::new();
    for edge in net.edges() {
        if !seen.insert(edge.unordered_key()) {
            violations.duplicate_edges += 1;
        }
    }
}

fn audit_frame(net: &Network, before: &[(f64, f64)], violations: &mut Violations) {
    let config = net.config();

    for p in net.packets() {
        if !(0.0..=1.0).contains(&p.progress) {
            violations.progress_out_of_range += 1;
        }
        if p.hops > config.packets.max_hops {
            violations.hop_limit_exceeded += 1;
        }
        if config.packets.destination == DestinationPolicy::SingleHop
            && (p.hops > 0 || p.final_target != p.target)
        {
            violations.single_hop_chained += 1;
        }
    }

    for kind in EffectKind::ALL {
        let duration = net.effects().duration(kind);
        violations.stale_effects +=
            net.effects().queue(kind).iter().filter(|e| e.elapsed >= duration).count() as u32;
    }

    for node in net.nodes() {
        if !(node.position().is_finite() && node.vx.is_finite() && node.vy.is_finite()) {
            violations.non_finite_state += 1;
        }
        if config.motion.boundary == BoundaryPolicy::CanvasEdge
            && (node.x < 0.0 || node.x > net.width() || node.y < 0.0 || node.y > net.height())
        {
            violations.off_canvas += 1;
        }
    }

    if config.motion.is_stationary() {
        let moved = net
            .nodes()
            .iter()
            .zip(before)
            .filter(|&(n, &(x, y))| n.x != x || n.y != y)
            .count();
        violations.static_node_moved += moved as u32;
    }

    let stats = net.stats();
    let settled = stats.delivered
        + stats.dropped_hop_limit
        + stats.dropped_no_route
        + stats.active_packets as u64;
    if stats.emitted != settled {
        violations.accounting_mismatch += 1;
    }
}

// ─── Scenario Runner ────────────────────────────────────────────────────────

fn run_scenario(scenario: &Scenario, base: &NetworkConfig, frames: u64, seed: u64) -> Option<BenchResult> {
    let mut config = base.clone();
    (scenario.tune)(&mut config);

    let mut net = match Network::with_seed(scenario.width, scenario.height, config, seed) {
        Ok(net) => net,
        Err(err) => {
            warn!("{}: config rejected: {}", scenario.name, err);
            return None;
        }
    };

    let mut violations = Violations::default();
    audit_edges(&net, &mut violations);

    let mut peak_active_packets = 0;
    let mut peak_live_effects = 0;
    let start = Instant::now();

    for frame in 0..frames {
        if let Some(event) = scenario.mid_event {
            event(&mut net, frame);
            audit_edges(&net, &mut violations);
        }

        // Captured after the event so only the frame itself is audited.
        let before: Vec<(f64, f64)> = net.nodes().iter().map(|n| (n.x, n.y)).collect();
        net.frame(frame as f64 * scenario.frame_ms);
        audit_frame(&net, &before, &mut violations);

        let stats = net.stats();
        peak_active_packets = peak_active_packets.max(stats.active_packets);
        peak_live_effects = peak_live_effects.max(stats.live_effects);
    }

    let elapsed = start.elapsed();
    let stats = net.stats();
    let delivery_rate = if stats.emitted == 0 {
        0.0
    } else {
        stats.delivered as f64 / stats.emitted as f64
    };

    Some(BenchResult {
        scenario: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        seed,
        frames,
        pass: violations.total() == 0,
        violations,
        delivery_rate,
        avg_hops: stats.avg_hops(),
        peak_active_packets,
        peak_live_effects,
        stats,
        elapsed_ms: elapsed.as_millis(),
        frames_per_sec: frames as f64 / elapsed.as_secs_f64().max(1e-9),
    })
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = parse_args();
    let base = match load_base_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Could not load config: {}", err);
            std::process::exit(1);
        }
    };

    let all_scenarios = scenarios();
    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    info!("running {} scenario(s), {} frames each, seed {}", to_run.len(), cli.ticks, cli.seed);

    println!("\n  Meshfield Bench Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Frames/scenario: {} | Seed: {}", cli.ticks, cli.seed);
    println!("  {:<32} {:>8} {:>9} {:>8} {:>6} {:>7} {:>6} {:>8}",
        "Scenario", "Emitted", "Delivered", "Dropped", "Hops", "Peak", "Viol", "Time");
    println!("  {}", "-".repeat(92));

    let suite_start = Instant::now();
    let mut results = Vec::new();
    let mut rejected = 0;

    for scenario in &to_run {
        let Some(result) = run_scenario(scenario, &base, cli.ticks, cli.seed) else {
            rejected += 1;
            continue;
        };
        let s = &result.stats;
        println!("  {:<32} {:>8} {:>8.1}% {:>8} {:>6.2} {:>7} {:>6} {:>6}ms  {}",
            result.label,
            s.emitted,
            result.delivery_rate * 100.0,
            s.dropped_hop_limit + s.dropped_no_route,
            result.avg_hops,
            result.peak_active_packets,
            result.violations.total(),
            result.elapsed_ms,
            if result.pass { "PASS" } else { "FAIL" },
        );
        results.push(result);
    }

    // ─── Summary ────────────────────────────────────────────────────────

    let total = results.len() + rejected;
    let passed = results.iter().filter(|r| r.pass).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(92));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_start.elapsed().as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        frames_per_scenario: cli.ticks,
        seed: cli.seed,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: if total == 0 { 0.0 } else { passed as f64 / total as f64 },
        },
        scenarios: results,
    };

    let dir = Path::new("benchmark-results");
    let path = dir.join(format!("bench-{}.json", timestamp));
    let written = std::fs::create_dir_all(dir)
        .map_err(|e| e.to_string())
        .and_then(|_| serde_json::to_string_pretty(&report).map_err(|e| e.to_string()))
        .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
    match written {
        Ok(()) => println!("  Results saved to: {}\n", path.display()),
        Err(err) => eprintln!("  Could not write report: {}\n", err),
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
