// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop ("The Mesh") - Animated Network Background Engine

pub mod types;
pub mod config;
pub mod geometry;
pub mod graph;
pub mod kinematics;
pub mod routing;
pub mod effects;
pub mod simulation;
pub mod logging;

pub use types::*;
pub use config::{ConfigError, NetworkConfig};
pub use effects::{Effect, EffectKind, EffectScheduler, EffectTag, PulseRole};
pub use simulation::Network;

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Install the console logger. `level` is a name like `"info"` or `"debug"`.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    logging::init_console_logger(logging::parse_level(level));
}

#[wasm_bindgen]
impl Network {
    /// `config` is a (possibly partial) config object or `undefined`. A config
    /// that fails to parse or validate is logged and replaced by defaults, so
    /// construction never throws. `seed` is used unless the config sets one.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config: JsValue, seed: f64) -> Network {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = parse_config(config);
        let seed = config.seed.unwrap_or_else(|| simulation::host_seed(seed));
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };

        match Network::with_seed(width, height, config, seed) {
            Ok(network) => network,
            Err(err) => {
                log::warn!("network config rejected ({}), using defaults", err);
                Network::assemble(width, height, NetworkConfig::default(), seed)
            }
        }
    }

    #[wasm_bindgen(js_name = tick)]
    pub fn tick_js(&mut self, dt: f64) {
        self.tick(dt);
    }

    /// Returns the new packet id, or `undefined` when nothing was emitted.
    #[wasm_bindgen(js_name = emitPacket)]
    pub fn emit_packet_js(&mut self) -> Option<f64> {
        self.emit_packet().map(|id| id as f64)
    }

    #[wasm_bindgen(js_name = resize)]
    pub fn resize_js(&mut self, width: f64, height: f64) {
        self.resize(width, height);
    }

    /// Drive one `requestAnimationFrame` callback.
    #[wasm_bindgen(js_name = frame)]
    pub fn frame_js(&mut self, timestamp_ms: f64) -> JsValue {
        let report = self.frame(timestamp_ms);
        serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.snapshot()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = stats)]
    pub fn stats_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = reset)]
    pub fn reset_js(&mut self) {
        self.reset();
    }
}

fn parse_config(value: JsValue) -> NetworkConfig {
    if value.is_undefined() || value.is_null() {
        return NetworkConfig::default();
    }
    match serde_wasm_bindgen::from_value::<NetworkConfig>(value) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("unreadable network config ({}), using defaults", err);
            NetworkConfig::default()
        }
    }
}
