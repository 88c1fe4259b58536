//! CSV input/output at the process boundary. The core never sees a path or
//! a `csv::Reader`; this module is the only place that touches either.

use std::fs::File;
use std::io::{stdin, BufReader, Read, Write};

use anyhow::{bail, Context, Result};
use edm_core::Dataset;

/// Read a CSV table: first column is `time`, remaining columns are named
/// observations. `path == "-"` reads from stdin.
pub fn read_dataset(path: &str) -> Result<Dataset> {
    let rdr: Box<dyn Read> = if path == "-" { Box::new(stdin()) } else { Box::new(File::open(path)?) };
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(BufReader::new(rdr));

    let headers = reader.headers().context("reading CSV header")?.clone();
    if headers.len() < 2 {
        bail!("CSV must have a time column plus at least one observation column");
    }
    let column_names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut time = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); column_names.len()];

    for record in reader.records() {
        let record = record.context("reading CSV row")?;
        let mut fields = record.iter();
        let time_field = fields.next().context("missing time field")?;
        time.push(time_field.parse::<f64>().with_context(|| format!("parsing time value '{time_field}'"))?);

        for (col, field) in columns.iter_mut().zip(fields) {
            col.push(field.parse::<f64>().unwrap_or(f64::NAN));
        }
    }

    let named_columns: Vec<(String, Vec<f64>)> = column_names.into_iter().zip(columns).collect();
    Ok(Dataset::new(time, named_columns)?)
}

/// Write a `[header...]` + row table as CSV. `path == "-"` writes to stdout.
pub fn write_table(path: &str, header: &[String], rows: &[Vec<f64>]) -> Result<()> {
    let out: Box<dyn Write> = if path == "-" {
        Box::new(std::io::stdout())
    } else {
        Box::new(File::create(path).with_context(|| format!("creating {path}"))?)
    };
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header)?;
    for row in rows {
        let fields: Vec<String> = row.iter().map(|v| format!("{v:.6}")).collect();
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}
