//! Plain-text path-coordinate export
//!
//! The external planner tooling consumes a record per robot: one line of
//! comma-separated x coordinates, one line of y coordinates, then a blank
//! line. Records follow robot insertion order and cover the remaining path.

use crate::model::Model;
use fleetgrid_core::{SimError, SimResult};
use std::path::Path;

/// Render every robot's remaining path in the export format
pub fn export_path_coordinates(model: &Model) -> String {
    let mut out = String::new();
    for robot in &model.robots {
        let xs: Vec<String> = robot.path.iter().map(|c| c.x.to_string()).collect();
        let ys: Vec<String> = robot.path.iter().map(|c| c.y.to_string()).collect();
        out.push_str(&xs.join(","));
        out.push('\n');
        out.push_str(&ys.join(","));
        out.push('\n');
        out.push('\n');
    }
    out
}

/// Write the export to a file
pub fn write_path_coordinates(model: &Model, path: &Path) -> SimResult<()> {
    std::fs::write(path, export_path_coordinates(model))?;
    Ok(())
}

/// Parse an export back into per-robot (x-series, y-series) pairs
///
/// Each record is exactly three lines: x-series, y-series, blank. Empty
/// series (an idle robot) parse to empty vectors.
pub fn parse_path_coordinates(content: &str) -> SimResult<Vec<(Vec<i32>, Vec<i32>)>> {
    let mut records = Vec::new();
    let mut lines = content.lines();
    loop {
        let Some(x_line) = lines.next() else {
            break;
        };
        let Some(y_line) = lines.next() else {
            return Err(SimError::Validation(
                "truncated export: x-series without y-series".to_string(),
            ));
        };
        let _blank = lines.next();

        let xs = parse_series(x_line)?;
        let ys = parse_series(y_line)?;
        if xs.len() != ys.len() {
            return Err(SimError::Validation(format!(
                "series length mismatch: {} x values vs {} y values",
                xs.len(),
                ys.len()
            )));
        }
        records.push((xs, ys));
    }
    Ok(records)
}

fn parse_series(line: &str) -> SimResult<Vec<i32>> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(|v| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| SimError::Validation(format!("invalid coordinate: {:?}", v)))
        })
        .collect()
}
