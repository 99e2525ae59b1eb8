use serde::*;
use std::fs;
use std::path::Path;
use crate::error::{RankingError, Result};

// Tuning knobs for a ranking run. Passed by reference into every stage, never global.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingContext {
    pub alpha_decay: f64,       // Recency decay per week of age
    pub k: f64,                 // Margin-of-victory sensitivity

    pub smoothing_alpha: f64,   // Pseudo-wins
    pub smoothing_beta: f64,    // Pseudo-losses
}

impl Default for RankingContext {
    fn default() -> Self {
        Self {
            alpha_decay: 0.125,
            k: 0.085,

            smoothing_alpha: 0.5,
            smoothing_beta: 0.5,
        }
    }
}

impl RankingContext {
    /// Reads a JSON object of overrides. Keys left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let ranking_context: RankingContext = serde_json::from_str(&data)?;
        ranking_context.validate()?;
        Ok(ranking_context)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("alpha_decay", self.alpha_decay),
            ("k", self.k),
            ("smoothing_alpha", self.smoothing_alpha),
            ("smoothing_beta", self.smoothing_beta),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(RankingError::InvalidConfig(format!("{name} must be finite, got {value}")));
            }
        }

        if self.alpha_decay < 0.0 {
            return Err(RankingError::InvalidConfig(format!("alpha_decay must be non-negative, got {}", self.alpha_decay)));
        }
        if self.smoothing_alpha < 0.0 || self.smoothing_beta < 0.0 {
            return Err(RankingError::InvalidConfig("smoothing priors must be non-negative".to_string()));
        }
        if self.smoothing_alpha + self.smoothing_beta <= 0.0 {
            return Err(RankingError::InvalidConfig("smoothing_alpha + smoothing_beta must be positive".to_string()));
        }

        Ok(())
    }

    // Beta-prior smoothing. Wins and games may be weighted sums, so both are floats.
    pub fn smoothed_win_pct(&self, wins: f64, games: f64) -> f64 {
        (wins + self.smoothing_alpha) / (games + self.smoothing_alpha + self.smoothing_beta)
    }

    // 1.0 for a game in max_week, decaying exponentially for older weeks
    pub fn recency_weight(&self, week: u32, max_week: u32) -> f64 {
        let age = max_week as f64 - week as f64;
        (-self.alpha_decay * age).exp()
    }

    // Logistic in the score differential. 0.5 at a tie
    pub fn mov_weight(&self, score_diff: f64) -> f64 {
        1.0 / (1.0 + (-self.k * score_diff).exp())
    }
}
