use std::{fs, io::Read, path::Path};

use crate::{Error, Point, Result, constants::STDIO_PATH};

const NODE_COORD_SECTION: &str = "NODE_COORD_SECTION";
const EOF_MARKER: &str = "EOF";
const DIMENSION_KEY: &str = "DIMENSION";

/// Reads coordinates from `path`, or from stdin when `path` is `-`.
pub fn read_points(path: &Path) -> Result<Vec<Point>> {
    let text = if path.as_os_str() == STDIO_PATH {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("failed to read coordinate file {}: {e}", path.display()))
        })?
    };
    parse_points(&text)
}

/// Parses a TSPLIB `NODE_COORD_SECTION` file (`id x y` rows; ids give the
/// row order only) or, without that section, plain `x y` / `x,y` rows.
pub fn parse_points(text: &str) -> Result<Vec<Point>> {
    let points = if text.lines().any(|l| l.trim() == NODE_COORD_SECTION) {
        parse_tsplib(text)?
    } else {
        parse_plain(text)?
    };

    if points.is_empty() {
        return Err(Error::invalid_input("No points provided."));
    }
    Ok(points)
}

fn parse_tsplib(text: &str) -> Result<Vec<Point>> {
    let mut dimension: Option<usize> = None;
    let mut lines = text.lines().enumerate();

    for (_, line) in lines.by_ref() {
        let line = line.trim();
        if line == NODE_COORD_SECTION {
            break;
        }
        if let Some((key, value)) = line.split_once(':')
            && key.trim() == DIMENSION_KEY
        {
            dimension = Some(value.trim().parse().map_err(|_| {
                Error::invalid_data(format!("invalid DIMENSION value: {}", value.trim()))
            })?);
        }
    }

    let mut points = Vec::with_capacity(dimension.unwrap_or(0));
    for (idx, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == EOF_MARKER || line.starts_with(|c: char| c.is_ascii_alphabetic()) {
            break;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[_, x, y] = fields.as_slice() else {
            return Err(Error::invalid_data(format!(
                "Line {}: expected 'id x y' but got: {line}",
                idx + 1
            )));
        };
        points.push(parse_point(idx + 1, x, y)?);
    }

    if let Some(dimension) = dimension
        && dimension != points.len()
    {
        return Err(Error::invalid_data(format!(
            "DIMENSION is {dimension} but NODE_COORD_SECTION holds {} points",
            points.len()
        )));
    }
    Ok(points)
}

fn parse_plain(text: &str) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let &[x, y] = fields.as_slice() else {
            return Err(Error::invalid_data(format!(
                "Line {}: expected 'x y' but got: {line}",
                idx + 1
            )));
        };
        points.push(parse_point(idx + 1, x, y)?);
    }
    Ok(points)
}

fn parse_point(line_no: usize, x_s: &str, y_s: &str) -> Result<Point> {
    let x: f64 = x_s
        .parse()
        .map_err(|_| Error::invalid_data(format!("Line {line_no}: invalid x: {x_s}")))?;
    let y: f64 = y_s
        .parse()
        .map_err(|_| Error::invalid_data(format!("Line {line_no}: invalid y: {y_s}")))?;
    let point = Point::new(x, y);
    if !point.is_valid() {
        return Err(Error::invalid_data(format!(
            "Line {line_no}: coordinates must be finite: {x_s} {y_s}"
        )));
    }
    Ok(point)
}
