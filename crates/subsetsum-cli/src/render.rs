use crate::app::Summary;
use crate::theme::Theme;
use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::{Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use serde::Serialize;
use std::io::{self, Write};
use subsetsum_core::{BatchRecord, Combination, FindOneResult, SessionState, Status};

/// Width of the progress bar in cells
const BAR_WIDTH: usize = 30;

/// `[0, 3]  1 + 4 = 5`
pub fn format_combination(combination: &Combination) -> String {
    let terms: Vec<String> = combination.values.iter().map(|v| v.to_string()).collect();
    format!(
        "{:?}  {} = {}",
        combination.indices,
        terms.join(" + "),
        combination.sum
    )
}

/// Filled and empty cells of a bar for `progress` in `0.0..=1.0`
pub fn bar_cells(progress: f64, width: usize) -> (usize, usize) {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).floor() as usize).min(width);
    (filled, width - filled)
}

pub fn summary_line(summary: &Summary) -> String {
    let outcome = match summary.state {
        SessionState::Cancelled => "cancelled",
        _ if summary.capped => "stopped at max results",
        _ => "search complete",
    };
    format!(
        "{}: {} combination{} in {} nodes ({} ms)",
        outcome,
        summary.total_found,
        if summary.total_found == 1 { "" } else { "s" },
        summary.nodes_explored,
        summary.elapsed_ms
    )
}

fn json<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string(value).map_err(io::Error::from)
}

/// Writes results to stdout and the progress line to stderr
pub struct Renderer {
    theme: Theme,
    json: bool,
    show_progress: bool,
    /// Raw mode does not translate `\n` into a carriage return
    line_end: &'static str,
    progress_drawn: bool,
}

impl Renderer {
    pub fn new(theme: Theme, json: bool, show_progress: bool, raw_terminal: bool) -> Self {
        Self {
            theme,
            json,
            show_progress,
            line_end: if raw_terminal { "\r\n" } else { "\n" },
            progress_drawn: false,
        }
    }

    pub fn find_one(&mut self, out: &mut impl Write, result: &FindOneResult) -> io::Result<()> {
        if self.json {
            return write!(out, "{}{}", json(result)?, self.line_end);
        }
        match (&result.status, &result.combination) {
            (Status::Found, Some(combination)) => {
                write!(out, "{}{}", format_combination(combination), self.line_end)
            }
            (Status::Cancelled, _) => write!(out, "search cancelled{}", self.line_end),
            _ => write!(out, "no combination found{}", self.line_end),
        }
    }

    /// Print the combinations a batch found, one per line
    pub fn batch(&mut self, out: &mut impl Write, err: &mut impl Write, record: &BatchRecord) -> io::Result<()> {
        if !record.new_results.is_empty() {
            self.clear_progress(err)?;
            for combination in &record.new_results {
                let line = if self.json {
                    json(combination)?
                } else {
                    format_combination(combination)
                };
                write!(out, "{}{}", line, self.line_end)?;
            }
            out.flush()?;
        }
        if self.show_progress && !record.finished {
            self.progress(err, record)?;
        }
        Ok(())
    }

    fn progress(&mut self, err: &mut impl Write, record: &BatchRecord) -> io::Result<()> {
        let (filled, empty) = bar_cells(record.progress, BAR_WIDTH);
        queue!(
            err,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(self.theme.bar),
            Print("█".repeat(filled)),
            SetForegroundColor(self.theme.track),
            Print("░".repeat(empty)),
            SetForegroundColor(self.theme.info),
            Print(format!(
                " {:5.1}%  {} found  {} nodes",
                record.progress * 100.0,
                record.total_found,
                record.nodes_explored
            )),
            ResetColor
        )?;
        err.flush()?;
        self.progress_drawn = true;
        Ok(())
    }

    pub fn clear_progress(&mut self, err: &mut impl Write) -> io::Result<()> {
        if self.progress_drawn {
            queue!(err, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            err.flush()?;
            self.progress_drawn = false;
        }
        Ok(())
    }

    /// Final line: a JSON object on stdout, or a colored note on stderr
    pub fn summary(&mut self, out: &mut impl Write, err: &mut impl Write, summary: &Summary) -> io::Result<()> {
        self.clear_progress(err)?;
        if self.json {
            return write!(out, "{}{}", json(summary)?, self.line_end);
        }
        let color = if summary.state == SessionState::Cancelled || summary.capped {
            self.theme.warning
        } else {
            self.theme.success
        };
        queue!(
            err,
            SetForegroundColor(color),
            Print(summary_line(summary)),
            ResetColor,
            Print(self.line_end)
        )?;
        err.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsetsum_core::{Problem, SearchParams, Solver};

    fn combination(values: &[u64], target: i64) -> Combination {
        let problem = Problem::from_values(values, SearchParams::any_size(target, values.len())).unwrap();
        Solver::new().find_one_in(&problem).combination.unwrap()
    }

    fn summary(state: SessionState, total_found: usize, capped: bool) -> Summary {
        Summary {
            state,
            total_found,
            nodes_explored: 42,
            capped,
            elapsed_ms: 7,
        }
    }

    #[test]
    fn test_format_combination() {
        let combo = combination(&[7, 1, 4], 5);
        assert_eq!(format_combination(&combo), "[1, 2]  1 + 4 = 5");
    }

    #[test]
    fn test_bar_cells() {
        assert_eq!(bar_cells(0.0, 10), (0, 10));
        assert_eq!(bar_cells(0.55, 10), (5, 5));
        assert_eq!(bar_cells(1.0, 10), (10, 0));
        assert_eq!(bar_cells(3.0, 10), (10, 0));
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(&summary(SessionState::Finished, 1, false)),
            "search complete: 1 combination in 42 nodes (7 ms)"
        );
        assert_eq!(
            summary_line(&summary(SessionState::Cancelled, 3, false)),
            "cancelled: 3 combinations in 42 nodes (7 ms)"
        );
        assert_eq!(
            summary_line(&summary(SessionState::Finished, 5, true)),
            "stopped at max results: 5 combinations in 42 nodes (7 ms)"
        );
    }

    #[test]
    fn test_json_lines() {
        let mut renderer = Renderer::new(Theme::default(), true, false, false);
        let record = BatchRecord {
            new_results: vec![combination(&[2, 3], 5)],
            total_found: 1,
            nodes_explored: 3,
            finished: true,
            progress: 1.0,
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        renderer.batch(&mut out, &mut err, &record).unwrap();
        renderer
            .summary(&mut out, &mut err, &summary(SessionState::Finished, 1, false))
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["indices"], serde_json::json!([0, 1]));
        assert_eq!(lines[1]["state"], "finished");
        assert_eq!(lines[1]["total_found"], 1);
        assert!(err.is_empty());
    }

    #[test]
    fn test_find_one_text() {
        let mut renderer = Renderer::new(Theme::default(), false, false, true);
        let mut out = Vec::new();
        renderer.find_one(&mut out, &FindOneResult::not_found()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "no combination found\r\n");

        let mut out = Vec::new();
        renderer.find_one(&mut out, &FindOneResult::cancelled()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "search cancelled\r\n");
    }

    #[test]
    fn test_find_one_cancelled_json() {
        let mut renderer = Renderer::new(Theme::default(), true, false, false);
        let mut out = Vec::new();
        renderer.find_one(&mut out, &FindOneResult::cancelled()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"status\":\"cancelled\"}\n");
    }

    #[test]
    fn test_progress_only_while_running() {
        let mut renderer = Renderer::new(Theme::default(), false, true, false);
        let mut record = BatchRecord {
            new_results: Vec::new(),
            total_found: 0,
            nodes_explored: 10,
            finished: false,
            progress: 0.5,
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        renderer.batch(&mut out, &mut err, &record).unwrap();
        assert!(String::from_utf8_lossy(&err).contains("50.0%"));

        err.clear();
        record.finished = true;
        renderer.batch(&mut out, &mut err, &record).unwrap();
        assert!(!String::from_utf8_lossy(&err).contains('%'));
        assert!(out.is_empty());
    }
}
