use serde::*;
use std::io::Write;
use crate::error::Result;
use crate::history::HistoricalRow;
use crate::ranking::RankedRow;

pub fn output_report(week: u32, rows: &[RankedRow]) {
    println!("Power rankings through week {week}");
    println!("|{0:>4} | {1:20} | {2:>2}-{3:<2}-{4:<2} | {5:>6} | {6:>6} | {7:>6} | {8:>7} | {9:>6}",
        "Rank", "Team", "W", "L", "T", "WP", "OWP", "OOWP", "RPI", "Z");

    for r in rows {
        let t = &r.row;
        println!("|{0:>3}. | {1:20} | {2:>2}-{3:<2}-{4:<2} | {5:6.3} | {6:6.3} | {7:6.3} | {8:7.3} | {9:6.2}",
            r.rank,
            t.team,
            t.wins,
            t.losses,
            t.ties,
            t.win_pct,
            t.opp_win_pct,
            t.opp_opp_win_pct,
            t.composite_rpi * 100.0,
            t.composite_rpi_z,
        )
    }
}

pub fn output_history(rows: &[HistoricalRow]) {
    for r in rows {
        println!("| Week {0:>2} | {1:>3}. | {2:20} | {3:7.3}", r.week, r.rank, r.team, r.composite_rpi * 100.0);
    }
}

// CSV can't flatten nested structs, so rankings go out through this flat line
#[derive(Serialize)]
struct ReportLine<'a> {
    rank: usize,
    team: &'a str,
    games_played: u32,
    wins: u32,
    losses: u32,
    ties: u32,
    win_pct: f64,
    opp_win_pct: f64,
    opp_opp_win_pct: f64,
    rpi: f64,
    rpi_recency: f64,
    rpi_mov: f64,
    composite_rpi: f64,
    rpi_z: f64,
    rpi_recency_z: f64,
    rpi_mov_z: f64,
    composite_rpi_z: f64,
}

impl<'a> From<&'a RankedRow> for ReportLine<'a> {
    fn from(r: &'a RankedRow) -> Self {
        let t = &r.row;
        Self {
            rank: r.rank,
            team: &t.team,
            games_played: t.games_played,
            wins: t.wins,
            losses: t.losses,
            ties: t.ties,
            win_pct: t.win_pct,
            opp_win_pct: t.opp_win_pct,
            opp_opp_win_pct: t.opp_opp_win_pct,
            rpi: t.rpi,
            rpi_recency: t.rpi_recency,
            rpi_mov: t.rpi_mov,
            composite_rpi: t.composite_rpi,
            rpi_z: t.rpi_z,
            rpi_recency_z: t.rpi_recency_z,
            rpi_mov_z: t.rpi_mov_z,
            composite_rpi_z: t.composite_rpi_z,
        }
    }
}

pub fn write_rankings_csv<W: Write>(rows: &[RankedRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in rows {
        wtr.serialize(ReportLine::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_history_csv<W: Write>(rows: &[HistoricalRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

// Undefined values come out as null
pub fn write_json<W: Write, T: Serialize + ?Sized>(value: &T, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::Game;
    use crate::history::gen_history;
    use crate::ranking::gen_rankings;
    use crate::ranking_context::RankingContext;

    fn three_cycle() -> Vec<Game> {
        vec![
            Game::new(2024, 1, "A", "B", 20.0, 10.0),
            Game::new(2024, 2, "B", "C", 14.0, 13.0),
            Game::new(2024, 3, "C", "A", 7.0, 3.0),
        ]
    }

    #[test]
    fn rankings_csv_has_header_and_one_line_per_team() {
        let ranked = gen_rankings(&three_cycle(), 3, &RankingContext::default()).unwrap().ranked();

        let mut out = Vec::new();
        write_rankings_csv(&ranked, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("rank,team,games_played,wins,losses,ties,win_pct"));
        assert!(lines[1].starts_with(&format!("1,{},2,1,1,0,0.5", ranked[0].row.team)));
        // All three raw RPIs tie, so their z-score is undefined
        assert!(lines[1].contains("NaN"));
    }

    #[test]
    fn rankings_json_flattens_rows() {
        let ranked = gen_rankings(&three_cycle(), 3, &RankingContext::default()).unwrap().ranked();

        let mut out = Vec::new();
        write_json(&ranked, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value[0]["rank"], 1);
        assert_eq!(value[0]["games_played"], 2);
        assert!(value[0]["rpi_z"].is_null());
        assert!(value[0]["composite_rpi"].is_f64());
    }

    #[test]
    fn history_csv() {
        let history = gen_history(&three_cycle(), &RankingContext::default()).unwrap();

        let mut out = Vec::new();
        write_history_csv(&history.rows(&["A".to_string()]), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "week,team,rank,composite_rpi");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("1,A,"));
    }
}
