//! Matrix-Market text format.
//!
//! Matrices are written in `coordinate` form (1-indexed `row col value`
//! lines, nonzeros only, row-major order); vectors are written in `array`
//! form (one value per line). The reader accepts both forms with `real` or
//! `integer` fields and `general` or `symmetric` symmetry, which covers what
//! the solver writes back. A coordinate entry may appear only once.
//!
//! Format:
//! ```text
//! %%MatrixMarket matrix coordinate real general
//! 3 3 2
//! 1 1 4
//! 3 2 1
//! ```

use crate::error::{HarnessError, Result};
use crate::matrix::Matrix;
use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

const BANNER: &str = "%%MatrixMarket";

/// Largest entry count a parsed size line may declare (2^28 values, 2 GiB).
const MAX_ENTRIES: usize = 1 << 28;

/// Write `m` as a coordinate matrix.
pub fn write_mtx<W: Write>(m: &Matrix<f64>, writer: &mut W) -> Result<()> {
    writeln!(writer, "{} matrix coordinate real general", BANNER)?;
    writeln!(writer, "{} {} {}", m.nrows(), m.ncols(), m.nnz())?;
    for (i, j, v) in m.nonzeros() {
        writeln!(writer, "{} {} {}", i + 1, j + 1, v)?;
    }
    Ok(())
}

/// Write a column vector in array form.
///
/// Array form is positional, so zero entries are written too.
pub fn write_vector<W: Write>(v: &Matrix<f64>, writer: &mut W) -> Result<()> {
    if v.ncols() != 1 {
        return Err(HarnessError::PreconditionViolation(format!(
            "expected a column vector, got {} columns",
            v.ncols()
        )));
    }
    writeln!(writer, "{} matrix array real general", BANNER)?;
    writeln!(writer, "{} 1", v.nrows())?;
    for value in v.as_slice() {
        writeln!(writer, "{}", value)?;
    }
    Ok(())
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> Result<()>,
{
    let mut w = BufWriter::new(fs::File::create(path)?);
    write(&mut w)?;
    w.flush()?;
    Ok(())
}

/// Write `m` to `path` in coordinate form, replacing any existing file.
pub fn write_mtx_file(m: &Matrix<f64>, path: &Path) -> Result<()> {
    write_file(path, |w| write_mtx(m, w))
}

/// Write the column vector `v` to `path` in array form.
pub fn write_vector_file(v: &Matrix<f64>, path: &Path) -> Result<()> {
    write_file(path, |w| write_vector(v, w))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Coordinate,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
}

fn parse_err(line: usize, msg: impl Into<String>) -> HarnessError {
    HarnessError::Parse { line, msg: msg.into() }
}

fn parse_header(line_no: usize, line: &str) -> Result<(Layout, Symmetry)> {
    let tokens: Vec<String> = line.split_whitespace().map(str::to_ascii_lowercase).collect();
    if tokens.len() != 5 || tokens[0] != BANNER.to_ascii_lowercase() || tokens[1] != "matrix" {
        return Err(parse_err(line_no, format!("bad header '{}'", line)));
    }
    let layout = match tokens[2].as_str() {
        "coordinate" => Layout::Coordinate,
        "array" => Layout::Array,
        other => return Err(parse_err(line_no, format!("unsupported format '{}'", other))),
    };
    match tokens[3].as_str() {
        "real" | "integer" | "double" => {}
        other => return Err(parse_err(line_no, format!("unsupported field '{}'", other))),
    }
    let symmetry = match tokens[4].as_str() {
        "general" => Symmetry::General,
        "symmetric" => Symmetry::Symmetric,
        other => return Err(parse_err(line_no, format!("unsupported symmetry '{}'", other))),
    };
    Ok((layout, symmetry))
}

fn parse_usize(line_no: usize, tok: &str) -> Result<usize> {
    tok.parse().map_err(|_| parse_err(line_no, format!("'{}' is not a non-negative integer", tok)))
}

fn parse_value(line_no: usize, tok: &str) -> Result<f64> {
    tok.parse().map_err(|_| parse_err(line_no, format!("'{}' is not a number", tok)))
}

/// Parse Matrix-Market text.
pub fn parse_mtx(text: &str) -> Result<Matrix<f64>> {
    // 1-based line numbers, comments and blank lines skipped after the header
    let mut lines = text.lines().enumerate().map(|(k, l)| (k + 1, l.trim()));
    let (header_no, header) = lines.next().ok_or_else(|| parse_err(1, "empty input"))?;
    let (layout, symmetry) = parse_header(header_no, header)?;
    let mut body = lines.filter(|(_, l)| !l.is_empty() && !l.starts_with('%'));

    let (size_no, size_line) = body.next().ok_or_else(|| parse_err(header_no, "missing size line"))?;
    let size: Vec<&str> = size_line.split_whitespace().collect();
    let expected_fields = if layout == Layout::Coordinate { 3 } else { 2 };
    if size.len() != expected_fields {
        return Err(parse_err(size_no, format!("expected {} size fields", expected_fields)));
    }
    let nrows = parse_usize(size_no, size[0])?;
    let ncols = parse_usize(size_no, size[1])?;
    match nrows.checked_mul(ncols) {
        Some(n) if n <= MAX_ENTRIES => {}
        _ => return Err(parse_err(size_no, format!("size {}x{} is too large", nrows, ncols))),
    }
    let mut m = Matrix::zeros(nrows, ncols);

    match layout {
        Layout::Coordinate => {
            let nnz = parse_usize(size_no, size[2])?;
            let mut seen = HashSet::new();
            for (line_no, line) in body {
                let f: Vec<&str> = line.split_whitespace().collect();
                if f.len() != 3 {
                    return Err(parse_err(line_no, "expected 'row col value'"));
                }
                let (i, j) = (parse_usize(line_no, f[0])?, parse_usize(line_no, f[1])?);
                if i == 0 || j == 0 || i > nrows || j > ncols {
                    return Err(parse_err(line_no, format!("entry ({}, {}) out of range", i, j)));
                }
                let v = parse_value(line_no, f[2])?;
                // a symmetric file names each off-diagonal pair once
                let key = if symmetry == Symmetry::Symmetric { (i.max(j), i.min(j)) } else { (i, j) };
                if !seen.insert(key) {
                    return Err(parse_err(line_no, format!("duplicate entry ({}, {})", i, j)));
                }
                m[(i - 1, j - 1)] = v;
                if symmetry == Symmetry::Symmetric && i != j {
                    m[(j - 1, i - 1)] = v;
                }
            }
            if seen.len() != nnz {
                return Err(parse_err(size_no, format!("declared {} entries, found {}", nnz, seen.len())));
            }
        }
        Layout::Array => {
            // column-major; symmetric arrays store the lower triangle only
            let mut cells = (0..ncols).flat_map(|j| {
                let start = if symmetry == Symmetry::Symmetric { j } else { 0 };
                (start..nrows).map(move |i| (i, j))
            });
            let mut last_line = size_no;
            for (line_no, line) in body {
                last_line = line_no;
                let (i, j) = cells
                    .next()
                    .ok_or_else(|| parse_err(line_no, "more values than the size line declares"))?;
                let v = parse_value(line_no, line)?;
                m[(i, j)] = v;
                if symmetry == Symmetry::Symmetric {
                    m[(j, i)] = v;
                }
            }
            if cells.next().is_some() {
                return Err(parse_err(last_line, "fewer values than the size line declares"));
            }
        }
    }
    Ok(m)
}

/// Read and parse a Matrix-Market file.
pub fn read_mtx_file(path: &Path) -> Result<Matrix<f64>> {
    let text = fs::read_to_string(path)?;
    parse_mtx(&text)
}
