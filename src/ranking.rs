use std::collections::HashMap;
use serde::*;
use tracing::{debug, info, warn};
use crate::data_loader::Game;
use crate::error::Result;
use crate::ranking_context::RankingContext;
use crate::util::*;

const RPI_WEIGHTS: [f64; 3] = [0.25, 0.50, 0.25];       // own win%, opponents', opponents' opponents'
const COMPOSITE_WEIGHTS: [f64; 3] = [0.35, 0.15, 0.50];  // raw, recency, margin of victory

/// Ranks every team appearing in `games`, with recency measured back from `max_week`.
///
/// Rows come out in the order teams first appear in the schedule. The run is pure: the same
/// games and context always give the same table.
pub fn gen_rankings(games: &[Game], max_week: u32, ranking_context: &RankingContext) -> Result<RankingTable> {
    ranking_context.validate()?;
    for (idx, g) in games.iter().enumerate() {
        g.validate(idx + 1)?;
    }

    // Stage 1: one row per team per game
    let records = expand_schedule(games, max_week, ranking_context);
    let teams = TeamRecords::new(records);
    debug!(teams = teams.len(), records = games.len() * 2, "expanded schedule");

    // Stage 2: own win percentages
    let stats: Vec<TeamStats> = teams.records.iter()
        .map(|r| TeamStats::from_records(r.iter(), ranking_context))
        .collect();

    // Stage 3: strength of schedule, one hop then two
    let owp: Vec<Option<Variants>> = (0..teams.len())
        .map(|idx| opponents_win_pct(&teams, idx, ranking_context))
        .collect();
    let oowp: Vec<Option<Variants>> = (0..teams.len())
        .map(|idx| opponents_opponents_win_pct(&teams, idx, &owp))
        .collect();

    for (idx, name) in teams.names.iter().enumerate() {
        if owp[idx].is_none() {
            debug!(team = %name, "no opponent has games outside the head-to-head; opponents' win% undefined");
        }
    }

    // Stage 4: blend, then standardize across the pool
    let mut rows: Vec<RankingRow> = teams.names.iter().enumerate()
        .map(|(idx, name)| RankingRow::new(name.clone(), &stats[idx], owp[idx], oowp[idx]))
        .collect();
    standardize(&mut rows);

    info!(games = games.len(), teams = rows.len(), max_week, "computed rankings");
    Ok(RankingTable { rows })
}

pub fn expand_schedule(games: &[Game], max_week: u32, ranking_context: &RankingContext) -> Vec<TeamGameRecord> {
    let mut records = Vec::with_capacity(games.len() * 2);

    for g in games {
        let recency_weight = ranking_context.recency_weight(g.week, max_week);

        for is_home in [true, false] {
            let (team, opponent, team_score, opponent_score) = if is_home {
                (&g.home_team, &g.away_team, g.home_score, g.away_score)
            } else {
                (&g.away_team, &g.home_team, g.away_score, g.home_score)
            };

            records.push(TeamGameRecord {
                team: team.clone(),
                opponent: opponent.clone(),
                team_score,
                opponent_score,
                week: g.week,
                is_home,
                won: team_score > opponent_score, // Ties are a non-win for both sides
                recency_weight,
                mov_weight: ranking_context.mov_weight(team_score - opponent_score),
            });
        }
    }

    records
}

// Team-perspective view of a single game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamGameRecord {
    pub team: String,
    pub opponent: String,
    pub team_score: f64,
    pub opponent_score: f64,
    pub week: u32,
    pub is_home: bool,
    pub won: bool,
    pub recency_weight: f64,
    pub mov_weight: f64,
}

// Records grouped per team. Team ids are indices into these vectors, assigned in order of first appearance.
struct TeamRecords {
    names: Vec<String>,
    records: Vec<Vec<TeamGameRecord>>,
    opponents: Vec<Vec<usize>>, // Distinct, in the order first played
}

impl TeamRecords {
    fn new(all_records: Vec<TeamGameRecord>) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut names = Vec::new();
        let mut records: Vec<Vec<TeamGameRecord>> = Vec::new();

        for r in all_records {
            let idx = *index.entry(r.team.clone()).or_insert_with(|| {
                names.push(r.team.clone());
                records.push(Vec::new());
                names.len() - 1
            });
            records[idx].push(r);
        }

        let opponents = records.iter()
            .map(|team_records| {
                let mut opps: Vec<usize> = Vec::new();
                for r in team_records {
                    // Every opponent is also a team, since both sides of a game get a record
                    let opp_idx = index[&r.opponent];
                    if !opps.contains(&opp_idx) { opps.push(opp_idx); }
                }
                opps
            })
            .collect();

        Self { names, records, opponents }
    }

    fn len(&self) -> usize {
        self.names.len()
    }
}

// The three flavours every percentage comes in
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Variants {
    pub raw: f64,
    pub recency: f64,
    pub mov: f64,
}

impl Variants {
    pub fn mean(values: &[Variants]) -> Option<Variants> {
        let raw: Vec<f64> = values.iter().map(|v| v.raw).collect();
        let recency: Vec<f64> = values.iter().map(|v| v.recency).collect();
        let mov: Vec<f64> = values.iter().map(|v| v.mov).collect();

        Some(Variants {
            raw: mean(&raw)?,
            recency: mean(&recency)?,
            mov: mean(&mov)?,
        })
    }

    fn blend(own: f64, opp: f64, opp_opp: f64) -> f64 {
        RPI_WEIGHTS[0] * own + RPI_WEIGHTS[1] * opp + RPI_WEIGHTS[2] * opp_opp
    }

    pub fn rpi(win_pct: Variants, owp: Variants, oowp: Variants) -> Variants {
        Variants {
            raw: Self::blend(win_pct.raw, owp.raw, oowp.raw),
            recency: Self::blend(win_pct.recency, owp.recency, oowp.recency),
            mov: Self::blend(win_pct.mov, owp.mov, oowp.mov),
        }
    }

    pub fn composite(&self) -> f64 {
        COMPOSITE_WEIGHTS[0] * self.raw + COMPOSITE_WEIGHTS[1] * self.recency + COMPOSITE_WEIGHTS[2] * self.mov
    }

    fn undefined() -> Self {
        Self { raw: f64::NAN, recency: f64::NAN, mov: f64::NAN }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamStats {
    pub win_pct: f64,
    pub win_pct_recency: f64,
    pub win_pct_mov: f64,
    pub games_played: u32,

    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl TeamStats {
    // With no records this collapses to alpha / (alpha + beta) for all three percentages.
    pub fn from_records<'a>(records: impl Iterator<Item = &'a TeamGameRecord>, ranking_context: &RankingContext) -> Self {
        let mut wins = 0.0;
        let mut games = 0.0;
        let mut wins_r = 0.0;
        let mut games_r = 0.0;
        let mut wins_m = 0.0;
        let mut games_m = 0.0;
        let mut losses = 0;
        let mut ties = 0;

        for r in records {
            let won = if r.won { 1.0 } else { 0.0 };

            wins += won;
            games += 1.0;
            wins_r += won * r.recency_weight;
            games_r += r.recency_weight;
            wins_m += won * r.mov_weight;
            games_m += r.mov_weight;

            if r.team_score < r.opponent_score { losses += 1; }
            if r.team_score == r.opponent_score { ties += 1; }
        }

        Self {
            win_pct: ranking_context.smoothed_win_pct(wins, games),
            win_pct_recency: ranking_context.smoothed_win_pct(wins_r, games_r),
            win_pct_mov: ranking_context.smoothed_win_pct(wins_m, games_m),
            games_played: games as u32,

            wins: wins as u32,
            losses,
            ties,
        }
    }

    pub fn variants(&self) -> Variants {
        Variants { raw: self.win_pct, recency: self.win_pct_recency, mov: self.win_pct_mov }
    }
}

// Average win% of each distinct opponent, leaving out that opponent's games against this team.
// Opponents with nothing left after the exclusion are skipped.
fn opponents_win_pct(teams: &TeamRecords, idx: usize, ranking_context: &RankingContext) -> Option<Variants> {
    let team = &teams.names[idx];
    let mut opp_values = Vec::new();

    for &opp_idx in &teams.opponents[idx] {
        let mut opp_games = teams.records[opp_idx].iter().filter(|r| &r.opponent != team).peekable();
        if opp_games.peek().is_none() { continue; }

        opp_values.push(TeamStats::from_records(opp_games, ranking_context).variants());
    }

    Variants::mean(&opp_values)
}

// Average of the opponents' already computed one-hop values. No further exclusion here.
fn opponents_opponents_win_pct(teams: &TeamRecords, idx: usize, owp: &[Option<Variants>]) -> Option<Variants> {
    let opp_values: Vec<Variants> = teams.opponents[idx].iter()
        .filter_map(|&opp_idx| owp[opp_idx])
        .collect();

    Variants::mean(&opp_values)
}

fn standardize(rows: &mut [RankingRow]) {
    for field in [RankingField::Rpi, RankingField::RpiRecency, RankingField::RpiMov, RankingField::CompositeRpi] {
        let values: Vec<f64> = rows.iter().map(|r| field.value(r)).collect();

        if let Some(stats) = pool_stats(&values) {
            if stats.stdev == 0.0 {
                warn!(?field, mean = stats.mean, teams = stats.count, "zero spread across teams; z-scores are undefined");
            }
        }

        for (row, z) in rows.iter_mut().zip(z_scores(&values)) {
            match field {
                RankingField::Rpi => row.rpi_z = z,
                RankingField::RpiRecency => row.rpi_recency_z = z,
                RankingField::RpiMov => row.rpi_mov_z = z,
                _ => row.composite_rpi_z = z,
            }
        }
    }
}

/// One team's line in the ranking. Undefined values (no usable opponents) are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub team: String,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,

    pub win_pct: f64,
    pub opp_win_pct: f64,
    pub opp_opp_win_pct: f64,

    pub rpi: f64,
    pub rpi_recency: f64,
    pub rpi_mov: f64,
    pub composite_rpi: f64,

    pub rpi_z: f64,
    pub rpi_recency_z: f64,
    pub rpi_mov_z: f64,
    pub composite_rpi_z: f64,
}

impl RankingRow {
    fn new(team: String, stats: &TeamStats, owp: Option<Variants>, oowp: Option<Variants>) -> Self {
        let owp = owp.unwrap_or_else(Variants::undefined);
        let oowp = oowp.unwrap_or_else(Variants::undefined);
        let rpi = Variants::rpi(stats.variants(), owp, oowp);

        Self {
            team,
            games_played: stats.games_played,
            wins: stats.wins,
            losses: stats.losses,
            ties: stats.ties,

            win_pct: stats.win_pct,
            opp_win_pct: owp.raw,
            opp_opp_win_pct: oowp.raw,

            rpi: rpi.raw,
            rpi_recency: rpi.recency,
            rpi_mov: rpi.mov,
            composite_rpi: rpi.composite(),

            // Filled in once the whole pool is known
            rpi_z: f64::NAN,
            rpi_recency_z: f64::NAN,
            rpi_mov_z: f64::NAN,
            composite_rpi_z: f64::NAN,
        }
    }
}

/// Numeric columns a table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingField {
    GamesPlayed,
    Wins,
    WinPct,
    OppWinPct,
    OppOppWinPct,
    Rpi,
    RpiRecency,
    RpiMov,
    CompositeRpi,
    RpiZ,
    RpiRecencyZ,
    RpiMovZ,
    CompositeRpiZ,
}

impl RankingField {
    pub fn value(&self, row: &RankingRow) -> f64 {
        match self {
            RankingField::GamesPlayed => row.games_played as f64,
            RankingField::Wins => row.wins as f64,
            RankingField::WinPct => row.win_pct,
            RankingField::OppWinPct => row.opp_win_pct,
            RankingField::OppOppWinPct => row.opp_opp_win_pct,
            RankingField::Rpi => row.rpi,
            RankingField::RpiRecency => row.rpi_recency,
            RankingField::RpiMov => row.rpi_mov,
            RankingField::CompositeRpi => row.composite_rpi,
            RankingField::RpiZ => row.rpi_z,
            RankingField::RpiRecencyZ => row.rpi_recency_z,
            RankingField::RpiMovZ => row.rpi_mov_z,
            RankingField::CompositeRpiZ => row.composite_rpi_z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingTable {
    rows: Vec<RankingRow>,
}

impl RankingTable {
    pub fn rows(&self) -> &[RankingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, team: &str) -> Option<&RankingRow> {
        self.rows.iter().find(|r| r.team == team)
    }

    pub fn to_map(&self) -> HashMap<String, RankingRow> {
        self.rows.iter().map(|r| (r.team.clone(), r.clone())).collect()
    }

    // Highest first. NaN goes to the bottom; equal values keep schedule order.
    pub fn sorted_by(&self, field: RankingField) -> Vec<&RankingRow> {
        let mut sorted: Vec<&RankingRow> = self.rows.iter().collect();
        sorted.sort_by(|a, b| {
            let (a, b) = (field.value(a), field.value(b));
            match (a.is_nan(), b.is_nan()) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                (false, false) => b.total_cmp(&a),
            }
        });
        sorted
    }

    // Power ranking order: composite RPI, best first, starting at 1
    pub fn ranked(&self) -> Vec<RankedRow> {
        self.sorted_by(RankingField::CompositeRpi)
            .into_iter()
            .enumerate()
            .map(|(idx, row)| RankedRow { rank: idx + 1, row: row.clone() })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub rank: usize,
    #[serde(flatten)]
    pub row: RankingRow,
}
