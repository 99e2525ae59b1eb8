use serde::*;
use std::fs;
use std::io::Read;
use std::path::Path;
use serde_aux::field_attributes::{deserialize_number_from_string, deserialize_option_number_from_string};
use tracing::{debug, info};
use crate::error::{RankingError, Result};

// Loads a schedule from CSV or JSON, picked by file extension.
// Every row is validated before anything is returned; one bad row rejects the whole file.
pub fn load_schedule(path: &Path) -> Result<Vec<Game>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let games = match extension.as_deref() {
        Some("csv") => read_csv(fs::File::open(path)?)?,
        Some("json") => read_json(&fs::read_to_string(path)?)?,
        _ => return Err(RankingError::UnknownFormat(path.display().to_string())),
    };

    info!(path = %path.display(), games = games.len(), "loaded schedule");
    Ok(games)
}

// Extra columns (game_id, gameday, ...) are ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Game>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut raw_games = Vec::new();
    for record in rdr.deserialize() {
        let raw: RawGame = record?;
        raw_games.push(raw);
    }

    validate_games(raw_games)
}

// Accepts a bare array of games or an object with a "games" array.
pub fn read_json(data: &str) -> Result<Vec<Game>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScheduleFile {
        Bare(Vec<RawGame>),
        Wrapped { games: Vec<RawGame> },
    }

    let raw_games = match serde_json::from_str(data)? {
        ScheduleFile::Bare(games) => games,
        ScheduleFile::Wrapped { games } => games,
    };

    validate_games(raw_games)
}

pub fn validate_games(raw_games: Vec<RawGame>) -> Result<Vec<Game>> {
    raw_games
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| raw.validate(idx + 1))
        .collect()
}

pub fn filter_season(games: &[Game], season: u32) -> Vec<Game> {
    games.iter().filter(|g| g.season == season).cloned().collect()
}

// Games played up to and including week
pub fn filter_through_week(games: &[Game], week: u32) -> Vec<Game> {
    games.iter().filter(|g| g.week <= week).cloned().collect()
}

pub fn latest_week(games: &[Game]) -> Option<u32> {
    games.iter().map(|g| g.week).max()
}

// Distinct weeks with results, most recent first
pub fn available_weeks(games: &[Game]) -> Vec<u32> {
    let mut weeks: Vec<u32> = games.iter().map(|g| g.week).collect();
    weeks.sort_unstable_by(|a, b| b.cmp(a));
    weeks.dedup();
    weeks
}

pub fn latest_season(games: &[Game]) -> Option<u32> {
    games.iter().map(|g| g.season).max()
}

// Row as it arrives from a file. Scores are optional here so a missing score can be
// reported as a validation error instead of a generic parse failure.
#[derive(Deserialize, Debug, Clone)]
pub struct RawGame {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub season: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub home_score: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub away_score: Option<f64>,
}

impl RawGame {
    fn validate(self, row: usize) -> Result<Game> {
        let invalid = |reason: String| RankingError::InvalidGame { row, reason };

        let home_score = self.home_score.ok_or_else(|| invalid("home_score is missing".to_string()))?;
        let away_score = self.away_score.ok_or_else(|| invalid("away_score is missing".to_string()))?;

        let game = Game {
            season: self.season,
            week: self.week,
            home_team: self.home_team.trim().to_string(),
            away_team: self.away_team.trim().to_string(),
            home_score,
            away_score,
        };
        game.validate(row)?;

        debug!(row, home_team = %game.home_team, away_team = %game.away_team, "validated game");
        Ok(game)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Game {
    pub season: u32,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    pub home_score: f64,
    pub away_score: f64,
}

impl Game {
    pub fn new(season: u32, week: u32, home_team: &str, away_team: &str, home_score: f64, away_score: f64) -> Self {
        Self {
            season,
            week,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_score,
            away_score,
        }
    }

    // Checks everything the engine relies on. Games built in code go through this too.
    pub fn validate(&self, row: usize) -> Result<()> {
        let invalid = |reason: String| RankingError::InvalidGame { row, reason };

        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            return Err(invalid("team name is empty".to_string()));
        }
        if self.home_team.trim() == self.away_team.trim() {
            return Err(invalid(format!("{} is listed as both home and away team", self.home_team)));
        }

        for (name, score) in [("home_score", self.home_score), ("away_score", self.away_score)] {
            if !score.is_finite() || score < 0.0 {
                return Err(invalid(format!("{name} must be a non-negative number, got {score}")));
            }
        }

        Ok(())
    }
}
