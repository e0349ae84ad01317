// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Node Kinematics

use rand::Rng;

use crate::config::{BoundaryPolicy, MotionConfig, RestoringForce};
use crate::geometry::{distance, EPSILON};
use crate::types::Node;

/// Advance every node by `dt` seconds.
///
/// Per node, in order: random acceleration, damping, speed clamp, restoring
/// force toward the origin, position integration, boundary handling.
pub fn update_nodes<R: Rng + ?Sized>(
    nodes: &mut [Node],
    config: &MotionConfig,
    width: f64,
    height: f64,
    dt: f64,
    rng: &mut R,
) {
    for node in nodes.iter_mut() {
        step_node(node, config, width, height, dt, rng);
    }
}

pub fn step_node<R: Rng + ?Sized>(
    node: &mut Node,
    config: &MotionConfig,
    width: f64,
    height: f64,
    dt: f64,
    rng: &mut R,
) {
    if config.acceleration > 0.0 {
        node.vx += (rng.gen::<f64>() * 2.0 - 1.0) * config.acceleration * dt;
        node.vy += (rng.gen::<f64>() * 2.0 - 1.0) * config.acceleration * dt;
    }

    node.vx *= config.damping;
    node.vy *= config.damping;

    clamp_speed(node, config.max_speed);
    apply_restoring_force(node, config, dt);

    node.x += node.vx * dt;
    node.y += node.vy * dt;

    match config.boundary {
        BoundaryPolicy::DriftRadius => confine_to_drift_radius(node, config),
        BoundaryPolicy::CanvasEdge => confine_to_canvas(node, width, height, config.bounce),
    }
}

fn clamp_speed(node: &mut Node, max_speed: f64) {
    let speed = node.speed();
    if speed > max_speed && speed > EPSILON {
        let scale = max_speed / speed;
        node.vx *= scale;
        node.vy *= scale;
    }
}

fn apply_restoring_force(node: &mut Node, config: &MotionConfig, dt: f64) {
    if config.return_strength == 0.0 {
        return;
    }
    let dx = node.origin_x - node.x;
    let dy = node.origin_y - node.y;
    let gain = match config.restoring {
        RestoringForce::Linear => config.return_strength,
        RestoringForce::Power { exponent } => {
            let ratio = distance(node.position(), node.origin()) / config.drift_radius.max(EPSILON);
            let scaled = config.return_strength * ratio.powf(exponent);
            // 0^negative blows up; treat a node sitting on its origin as unpulled
            if scaled.is_finite() { scaled } else { 0.0 }
        }
    };
    node.vx += dx * gain * dt;
    node.vy += dy * gain * dt;
}

/// Keep the node within `drift_radius` of its origin, bouncing inward.
fn confine_to_drift_radius(node: &mut Node, config: &MotionConfig) {
    let dx = node.x - node.origin_x;
    let dy = node.y - node.origin_y;
    let drift = distance(node.position(), node.origin());
    if drift <= config.drift_radius {
        return;
    }
    if drift < EPSILON {
        // Zero drift radius pins the node to its origin.
        node.x = node.origin_x;
        node.y = node.origin_y;
    } else {
        let scale = config.drift_radius / drift;
        node.x = node.origin_x + dx * scale;
        node.y = node.origin_y + dy * scale;
    }
    node.vx = -node.vx * config.bounce;
    node.vy = -node.vy * config.bounce;
}

fn confine_to_canvas(node: &mut Node, width: f64, height: f64, bounce: f64) {
    let max_x = width.max(0.0);
    let max_y = height.max(0.0);
    if node.x < 0.0 || node.x > max_x {
        node.x = node.x.clamp(0.0, max_x);
        node.vx = -node.vx * bounce;
    }
    if node.y < 0.0 || node.y > max_y {
        node.y = node.y.clamp(0.0, max_y);
        node.vy = -node.vy * bounce;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::types::{Color, LayoutSlot};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn node_at(x: f64, y: f64) -> Node {
        Node::new(0, Point::new(x, y), Color::WHITE, LayoutSlot::Scatter { u: 0.5, v: 0.5 })
    }

    #[test]
    fn test_stationary_motion_only_damps() {
        let config = MotionConfig::stationary();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut node = node_at(100.0, 100.0);
        node.vx = 4.0;
        node.vy = -2.0;

        for _ in 0..60 {
            step_node(&mut node, &config, 800.0, 600.0, 1.0 / 60.0, &mut rng);
        }
        // 0.85^60 is far below 1e-3
        assert!(node.speed() < 1e-3);
        assert!((node.x - 100.0).abs() < 1.0);
        assert!((node.y - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_stationary_node_at_rest_never_moves() {
        let config = MotionConfig::stationary();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut node = node_at(50.0, 70.0);
        for _ in 0..100 {
            step_node(&mut node, &config, 800.0, 600.0, 0.016, &mut rng);
        }
        assert_eq!(node.position(), Point::new(50.0, 70.0));
    }

    #[test]
    fn test_speed_clamped() {
        let config = MotionConfig {
            acceleration: 0.0,
            return_strength: 0.0,
            damping: 1.0,
            max_speed: 10.0,
            drift_radius: 1000.0,
            ..MotionConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut node = node_at(0.0, 0.0);
        node.vx = 300.0;
        node.vy = 400.0;
        step_node(&mut node, &config, 800.0, 600.0, 0.01, &mut rng);
        assert!((node.speed() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_drift_radius_clamps_and_bounces() {
        let config = MotionConfig {
            acceleration: 0.0,
            return_strength: 0.0,
            damping: 1.0,
            max_speed: 1000.0,
            drift_radius: 10.0,
            bounce: 0.5,
            ..MotionConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut node = node_at(100.0, 100.0);
        node.vx = 500.0;
        step_node(&mut node, &config, 800.0, 600.0, 0.1, &mut rng);
        assert!((node.x - 110.0).abs() < 1e-9);
        assert_eq!(node.y, 100.0);
        assert!((node.vx + 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_drift_radius_projects_diagonal_overshoot() {
        let config = MotionConfig {
            acceleration: 0.0,
            return_strength: 0.0,
            damping: 1.0,
            max_speed: 1000.0,
            drift_radius: 5.0,
            ..MotionConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut node = node_at(0.0, 0.0);
        node.vx = 30.0;
        node.vy = 40.0;
        step_node(&mut node, &config, 800.0, 600.0, 1.0, &mut rng);
        assert!((node.x - 3.0).abs() < 1e-9);
        assert!((node.y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_canvas_edge_clamps_and_bounces() {
        let config = MotionConfig {
            acceleration: 0.0,
            return_strength: 0.0,
            damping: 1.0,
            max_speed: 1000.0,
            boundary: BoundaryPolicy::CanvasEdge,
            bounce: 0.5,
            ..MotionConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut node = node_at(5.0, 595.0);
        node.vx = -100.0;
        node.vy = 100.0;
        step_node(&mut node, &config, 800.0, 600.0, 0.1, &mut rng);
        assert_eq!(node.x, 0.0);
        assert_eq!(node.y, 600.0);
        assert!((node.vx - 50.0).abs() < 1e-9);
        assert!((node.vy + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_restoring_pulls_toward_origin() {
        let config = MotionConfig {
            acceleration: 0.0,
            return_strength: 1.0,
            damping: 1.0,
            max_speed: 1000.0,
            drift_radius: 1000.0,
            ..MotionConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut node = node_at(0.0, 0.0);
        node.x = 20.0;
        step_node(&mut node, &config, 800.0, 600.0, 0.1, &mut rng);
        assert!(node.vx < 0.0);
        assert!(node.x < 20.0);
    }

    #[test]
    fn test_power_restoring_grows_with_distance() {
        let config = MotionConfig {
            acceleration: 0.0,
            return_strength: 1.0,
            damping: 1.0,
            max_speed: 1000.0,
            drift_radius: 10.0,
            restoring: RestoringForce::Power { exponent: 2.0 },
            ..MotionConfig::default()
        };
        let mut near = node_at(0.0, 0.0);
        near.x = 5.0;
        let mut far = node_at(0.0, 0.0);
        far.x = 10.0;
        apply_restoring_force(&mut near, &config, 0.1);
        apply_restoring_force(&mut far, &config, 0.1);
        // gain ~ (d / r)^2, so pull ~ d^3: doubling distance gives 8x the pull
        assert!((far.vx / near.vx - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_restoring_at_origin_is_finite() {
        let config = MotionConfig {
            restoring: RestoringForce::Power { exponent: -1.0 },
            drift_radius: 0.0,
            ..MotionConfig::default()
        };
        let mut node = node_at(3.0, 3.0);
        apply_restoring_force(&mut node, &config, 0.1);
        assert!(node.vx.is_finite() && node.vy.is_finite());
        assert_eq!(node.speed(), 0.0);
    }

    #[test]
    fn test_default_motion_stays_within_drift_radius() {
        let config = MotionConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut nodes: Vec<Node> = (0..20).map(|i| node_at(40.0 * i as f64, 200.0)).collect();
        for _ in 0..2000 {
            update_nodes(&mut nodes, &config, 800.0, 600.0, 1.0 / 60.0, &mut rng);
        }
        for node in &nodes {
            let drift = ((node.x - node.origin_x).powi(2) + (node.y - node.origin_y).powi(2)).sqrt();
            assert!(drift <= config.drift_radius + 1e-9);
            assert!(node.speed() <= config.max_speed * 2.0);
            assert!(node.position().is_finite());
        }
    }
}
