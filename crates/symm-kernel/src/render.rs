use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::DMatrix;
use symm_core::SymmError;

/// Formats `value` with at most `max_fraction_digits` digits after the point,
/// dropping trailing zeros.
pub fn format_decimal(value: f64, max_fraction_digits: usize) -> String {
    let mut text = format!("{value:.max_fraction_digits$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_owned();
    }
    text
}

/// Bracketed, comma-separated rendering with five fraction digits.
pub fn vector_to_string(vector: &[f64]) -> String {
    let parts: Vec<String> = vector.iter().map(|v| format_decimal(*v, 5)).collect();
    format!("[{}]", parts.join(", "))
}

/// Tab-separated values on a single line.
pub fn vector_to_tsv(vector: &[f64], fraction_digits: usize) -> String {
    vector
        .iter()
        .map(|v| format_decimal(*v, fraction_digits))
        .collect::<Vec<_>>()
        .join("\t")
}

/// One tab-separated line per matrix row.
pub fn matrix_to_tsv(matrix: &DMatrix<f64>, fraction_digits: usize) -> String {
    matrix
        .row_iter()
        .map(|row| {
            row.iter()
                .map(|v| format_decimal(*v, fraction_digits))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes the matrix as TSV to `path`.
pub fn write_matrix_tsv(
    path: &Path,
    matrix: &DMatrix<f64>,
    fraction_digits: usize,
) -> Result<(), SymmError> {
    write_text(path, &matrix_to_tsv(matrix, fraction_digits))
}

/// Writes the vector as a single TSV line to `path`.
pub fn write_vector_tsv(
    path: &Path,
    vector: &[f64],
    fraction_digits: usize,
) -> Result<(), SymmError> {
    write_text(path, &vector_to_tsv(vector, fraction_digits))
}

fn write_text(path: &Path, text: &str) -> Result<(), SymmError> {
    let file = File::create(path).map_err(|err| SymmError::io("tsv-create", path, &err))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{text}").map_err(|err| SymmError::io("tsv-write", path, &err))?;
    writer
        .flush()
        .map_err(|err| SymmError::io("tsv-flush", path, &err))
}
