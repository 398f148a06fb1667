//! Run statistics tracking and persistence.
//!
//! Tracks battle outcomes and search cost over a run. Snapshots are written
//! to `agent_stats.json` in the data directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// Score sums are kept in fixed point so they fit an atomic.
const SCORE_SCALE: f64 = 1_000_000.0;

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    /// Turn limit reached with both sides standing
    Timeout,
}

/// Aggregated run statistics, designed for lock-free updates.
#[derive(Debug)]
pub struct RunStats {
    battles: AtomicU32,
    wins: AtomicU32,
    losses: AtomicU32,
    timeouts: AtomicU32,
    /// Battles that hit the decision limit or failed
    abandoned: AtomicU32,
    /// Sum of scores, scaled by `SCORE_SCALE`
    score_sum: AtomicU64,
    total_turns: AtomicU64,
    total_decisions: AtomicU64,
    searches: AtomicU64,
    search_time_us: AtomicU64,
    start_time: Instant,
    scenario: String,
    policy: String,
}

/// Serializable stats for JSON output.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunStatsSnapshot {
    pub scenario: String,
    pub policy: String,
    pub battles: u32,
    pub wins: u32,
    pub losses: u32,
    pub timeouts: u32,
    pub abandoned: u32,
    pub win_rate: f64,
    pub avg_score: f64,
    pub avg_turns: f64,
    pub avg_decisions: f64,
    pub searches: u64,
    pub avg_search_us: f64,
    pub runtime_seconds: f64,
    pub timestamp: u64,
}

impl RunStats {
    pub fn new(scenario: &str, policy: &str) -> Self {
        Self {
            battles: AtomicU32::new(0),
            wins: AtomicU32::new(0),
            losses: AtomicU32::new(0),
            timeouts: AtomicU32::new(0),
            abandoned: AtomicU32::new(0),
            score_sum: AtomicU64::new(0),
            total_turns: AtomicU64::new(0),
            total_decisions: AtomicU64::new(0),
            searches: AtomicU64::new(0),
            search_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
            scenario: scenario.to_string(),
            policy: policy.to_string(),
        }
    }

    /// Record a finished battle.
    pub fn record_battle(&self, outcome: Outcome, score: f32, turns: u32, decisions: u32) {
        self.battles.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Outcome::Win => self.wins.fetch_add(1, Ordering::Relaxed),
            Outcome::Loss => self.losses.fetch_add(1, Ordering::Relaxed),
            Outcome::Timeout => self.timeouts.fetch_add(1, Ordering::Relaxed),
        };
        let scaled = (score.max(0.0) as f64 * SCORE_SCALE).round() as u64;
        self.score_sum.fetch_add(scaled, Ordering::Relaxed);
        self.total_turns.fetch_add(turns as u64, Ordering::Relaxed);
        self.total_decisions
            .fetch_add(decisions as u64, Ordering::Relaxed);
    }

    /// Record a battle that did not finish.
    pub fn record_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    /// Record search cost for a battle.
    pub fn record_searches(&self, searches: u32, time_us: u64) {
        self.searches.fetch_add(searches as u64, Ordering::Relaxed);
        self.search_time_us.fetch_add(time_us, Ordering::Relaxed);
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> RunStatsSnapshot {
        let battles = self.battles.load(Ordering::Relaxed);
        let wins = self.wins.load(Ordering::Relaxed);
        let searches = self.searches.load(Ordering::Relaxed);
        let search_time_us = self.search_time_us.load(Ordering::Relaxed);

        let per_battle = |total: f64| {
            if battles > 0 {
                total / battles as f64
            } else {
                0.0
            }
        };

        let avg_search_us = if searches > 0 {
            search_time_us as f64 / searches as f64
        } else {
            0.0
        };

        RunStatsSnapshot {
            scenario: self.scenario.clone(),
            policy: self.policy.clone(),
            battles,
            wins,
            losses: self.losses.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            win_rate: per_battle(wins as f64),
            avg_score: per_battle(self.score_sum.load(Ordering::Relaxed) as f64 / SCORE_SCALE),
            avg_turns: per_battle(self.total_turns.load(Ordering::Relaxed) as f64),
            avg_decisions: per_battle(self.total_decisions.load(Ordering::Relaxed) as f64),
            searches,
            avg_search_us,
            runtime_seconds: self.start_time.elapsed().as_secs_f64(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write stats to `{data_dir}/agent_stats.json` (atomic write-then-rename).
    ///
    /// Failures are logged and otherwise ignored.
    pub fn write_stats(&self, path: &str) {
        if let Some(dir) = std::path::Path::new(path).parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("Failed to create data directory: {}", e);
            }
        }

        let json = match serde_json::to_string_pretty(&self.snapshot()) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize run stats: {}", e);
                return;
            }
        };

        // Write to temp file then rename (atomic on most filesystems)
        let temp_path = format!("{}.tmp", path);
        match fs::File::create(&temp_path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(json.as_bytes()) {
                    warn!("Failed to write run stats: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to create temp stats file: {}", e);
                return;
            }
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            warn!("Failed to rename stats file: {}", e);
            let _ = fs::remove_file(&temp_path);
            return;
        }

        debug!("Wrote run stats to {}", path);
    }
}
