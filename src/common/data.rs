use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use polars::{
    frame::DataFrame,
    io::{SerReader, SerWriter},
    prelude::{CsvReader, CsvWriter},
};

use crate::raster::RasterGrid;

/// Reads a CSV file from `path` into a Polars DataFrame.
pub fn read_from_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let df = CsvReader::new(file)
        .finish()
        .with_context(|| format!("Failed to read CSV from {}", path.display()))?;
    Ok(df)
}

/// Writes a Polars DataFrame to a CSV file at `path`.
pub fn write_to_csv(mut df: DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let writer: BufWriter<File> = BufWriter::new(file);
    CsvWriter::new(writer)
        .finish(&mut df)?;
    Ok(())
}

/// Reads an ESRI ASCII grid (`.asc`) from `path` into a RasterGrid.
///
/// Header keys accepted in any case: ncols, nrows, xllcorner, yllcorner,
/// cellsize, nodata_value. A malformed header or short value block is a
/// structural failure for that data source.
pub fn read_ascii_grid(path: &Path) -> Result<RasterGrid> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open raster: {}", path.display()))?;

    let mut tokens = text.split_whitespace().peekable();
    let mut ncols = None;
    let mut nrows = None;
    let mut xll = None;
    let mut yll = None;
    let mut cell_size = None;
    let mut nodata = -9999.0;

    // Header: key/value pairs until the first bare number.
    while let Some(tok) = tokens.peek() {
        if tok.parse::<f64>().is_ok() { break; }
        let key = tokens.next().unwrap().to_ascii_lowercase();
        let value = tokens.next()
            .with_context(|| format!("Raster header key '{key}' has no value: {}", path.display()))?;
        let value: f64 = value.parse()
            .with_context(|| format!("Raster header key '{key}' has non-numeric value '{value}'"))?;
        match key.as_str() {
            "ncols" => ncols = Some(value as usize),
            "nrows" => nrows = Some(value as usize),
            "xllcorner" => xll = Some(value),
            "yllcorner" => yll = Some(value),
            "cellsize" => cell_size = Some(value),
            "nodata_value" => nodata = value,
            _ => bail!("Unknown raster header key '{key}' in {}", path.display()),
        }
    }

    let (Some(cols), Some(rows), Some(xll), Some(yll), Some(cell_size)) =
        (ncols, nrows, xll, yll, cell_size)
    else {
        bail!("Incomplete raster header in {}", path.display());
    };

    let values = tokens
        .map(|tok| tok.parse::<f64>()
            .with_context(|| format!("Non-numeric raster value '{tok}' in {}", path.display())))
        .collect::<Result<Vec<f64>>>()?;
    ensure!(
        values.len() == rows * cols,
        "Raster {} declares {rows}x{cols} cells but holds {} values",
        path.display(), values.len()
    );

    RasterGrid::new(rows, cols, xll, yll, cell_size, nodata, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ascii_grid_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ncols 3").unwrap();
        writeln!(file, "nrows 2").unwrap();
        writeln!(file, "xllcorner 10.5").unwrap();
        writeln!(file, "yllcorner -20.0").unwrap();
        writeln!(file, "cellsize 500").unwrap();
        writeln!(file, "NODATA_value -9999").unwrap();
        writeln!(file, "1 2 3").unwrap();
        writeln!(file, "4 -9999 6").unwrap();

        let grid = read_ascii_grid(file.path()).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.cell_size(), 500.0);
        assert_eq!(grid.value(0, 2), Some(3.0));
        assert_eq!(grid.value(1, 1), None);
    }

    #[test]
    fn ascii_grid_with_short_value_block_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1").unwrap();
        writeln!(file, "1 2 3").unwrap();
        assert!(read_ascii_grid(file.path()).is_err());
    }

    #[test]
    fn ascii_grid_with_missing_header_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ncols 2\nnrows 2").unwrap();
        writeln!(file, "1 2 3 4").unwrap();
        assert!(read_ascii_grid(file.path()).is_err());
    }
}
