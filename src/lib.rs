//! Rating Percentage Index power rankings from game-by-game results.
//!
//! A schedule of [`Game`]s goes in; [`gen_rankings`] returns one [`RankingRow`] per team with
//! smoothed win percentages, one- and two-hop strength of schedule, recency and margin-of-victory
//! variants, a composite RPI, and z-scores across the team pool.

pub mod data_loader;
pub mod error;
pub mod history;
pub mod ranking;
pub mod ranking_context;
pub mod report;
pub mod util;

pub use data_loader::{load_schedule, Game};
pub use error::{RankingError, Result};
pub use history::{gen_history, History};
pub use ranking::{gen_rankings, RankedRow, RankingField, RankingRow, RankingTable};
pub use ranking_context::RankingContext;
