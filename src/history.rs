use serde::*;
use tracing::{info, warn};
use crate::data_loader::{available_weeks, filter_through_week, Game};
use crate::error::{RankingError, Result};
use crate::ranking::{gen_rankings, RankedRow};
use crate::ranking_context::RankingContext;

/// Rankings as they stood at the end of each week of a season.
///
/// Week `w` is ranked from the games played in weeks `1..=w`, with `w` as the recency
/// horizon, so each entry only knows what was known at the time.
pub fn gen_history(games: &[Game], ranking_context: &RankingContext) -> Result<History> {
    if games.is_empty() { return Err(RankingError::EmptySchedule); }

    let mut seasons: Vec<u32> = games.iter().map(|g| g.season).collect();
    seasons.sort_unstable();
    seasons.dedup();
    if seasons.len() > 1 {
        warn!(?seasons, "history spans several seasons; weeks from different seasons are pooled");
    }

    let weeks = available_weeks(games);

    let mut history = Vec::with_capacity(weeks.len());
    for week in weeks.into_iter().rev() {
        let played = filter_through_week(games, week);
        let table = gen_rankings(&played, week, ranking_context)?;
        history.push(WeeklyRankings { week, rankings: table.ranked() });
    }

    info!(weeks = history.len(), "computed weekly history");
    Ok(History { weeks: history })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRankings {
    pub week: u32,
    pub rankings: Vec<RankedRow>,
}

// Slim per-week line for charting a team's movement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRow {
    pub week: u32,
    pub team: String,
    pub rank: usize,
    pub composite_rpi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    weeks: Vec<WeeklyRankings>,
}

impl History {
    pub fn week(&self, week: u32) -> Result<&WeeklyRankings> {
        self.weeks
            .iter()
            .find(|w| w.week == week)
            .ok_or(RankingError::UnknownWeek(week))
    }

    // Ordered by week, then rank. An empty team list means every team.
    pub fn rows(&self, teams: &[String]) -> Vec<HistoricalRow> {
        let mut rows = Vec::new();
        for w in &self.weeks {
            for r in &w.rankings {
                if !teams.is_empty() && !teams.contains(&r.row.team) { continue; }

                rows.push(HistoricalRow {
                    week: w.week,
                    team: r.row.team.clone(),
                    rank: r.rank,
                    composite_rpi: r.row.composite_rpi,
                });
            }
        }
        rows
    }
}
