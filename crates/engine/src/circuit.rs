// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-operation circuit breakers.
//!
//! A circuit counts consecutive exhausted operations. At the failure
//! threshold it opens and calls fail immediately; once the recovery
//! timeout has passed since the last failure it is half-open and lets a
//! call through. Any success closes it again. State lives in memory only.

use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use sv_core::CircuitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Circuit {
    consecutive_failures: u32,
    last_failure: Option<Instant>,
    open: bool,
}

/// Point-in-time view of one circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitStatus {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
}

/// Registry of circuits keyed by operation name
#[derive(Debug)]
pub struct CircuitRegistry {
    circuits: DashMap<String, Circuit>,
    failure_threshold: u32,
    recovery_timeout: Duration,
}

impl CircuitRegistry {
    pub fn new(config: &CircuitConfig) -> Self {
        Self {
            circuits: DashMap::new(),
            failure_threshold: config.failure_threshold,
            recovery_timeout: config.recovery_timeout,
        }
    }

    fn state_of(&self, circuit: &Circuit, now: Instant) -> CircuitState {
        if !circuit.open && circuit.consecutive_failures < self.failure_threshold {
            return CircuitState::Closed;
        }
        match circuit.last_failure {
            Some(last) if now.saturating_duration_since(last) < self.recovery_timeout => {
                CircuitState::Open
            }
            _ => CircuitState::HalfOpen,
        }
    }

    pub fn state(&self, name: &str, now: Instant) -> CircuitState {
        self.circuits
            .get(name)
            .map(|c| self.state_of(&c, now))
            .unwrap_or(CircuitState::Closed)
    }

    /// Whether a call may proceed. Registers the circuit on first use.
    pub fn allow(&self, name: &str, now: Instant) -> bool {
        let circuit = self.circuits.entry(name.to_string()).or_default();
        self.state_of(&circuit, now) != CircuitState::Open
    }

    pub fn record_success(&self, name: &str) {
        let mut circuit = self.circuits.entry(name.to_string()).or_default();
        if circuit.open {
            tracing::info!(circuit = name, "circuit closed");
        }
        *circuit = Circuit::default();
    }

    /// Count one exhausted operation; returns the resulting state.
    pub fn record_failure(&self, name: &str, now: Instant) -> CircuitState {
        let mut circuit = self.circuits.entry(name.to_string()).or_default();
        circuit.consecutive_failures = circuit.consecutive_failures.saturating_add(1);
        circuit.last_failure = Some(now);
        if circuit.consecutive_failures >= self.failure_threshold && !circuit.open {
            circuit.open = true;
            tracing::warn!(
                circuit = name,
                failures = circuit.consecutive_failures,
                recovery_secs = self.recovery_timeout.as_secs(),
                "circuit opened"
            );
        }
        self.state_of(&circuit, now)
    }

    pub fn failures(&self, name: &str) -> u32 {
        self.circuits
            .get(name)
            .map(|c| c.consecutive_failures)
            .unwrap_or(0)
    }

    /// All known circuits, sorted by name
    pub fn snapshot(&self, now: Instant) -> Vec<CircuitStatus> {
        let mut out: Vec<_> = self
            .circuits
            .iter()
            .map(|entry| CircuitStatus {
                name: entry.key().clone(),
                state: self.state_of(entry.value(), now),
                consecutive_failures: entry.value().consecutive_failures,
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self::new(&CircuitConfig::default())
    }
}

#[cfg(test)]
#[path = "circuit_tests.rs"]
mod tests;
