//! Columnar sample table loaded from the comma-separated trace resource
//!
//! The resource holds one row per line with five decimal fields and no
//! header: `time,heart_rate,blood_pressure,blood_volume,oxygenation`.

use crate::ecg_types::EcgSample;
use crate::error::{EcgError, EcgResult};
use std::io::BufRead;

/// Number of fields in every resource row
pub const FIELDS_PER_ROW: usize = 5;

/// Five parallel columns of equal length, fixed after loading
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTable {
    time: Vec<f64>,
    heart_rate: Vec<f64>,
    blood_pressure: Vec<f64>,
    blood_volume: Vec<f64>,
    oxygenation: Vec<f64>,
}

/// Outcome of a load that keeps the rows read before the first failure
#[derive(Debug, Clone)]
pub struct PartialLoad {
    /// Rows successfully parsed before the failure (all rows on success)
    pub table: SampleTable,
    /// The failure that stopped the load, if any
    pub error: Option<EcgError>,
}

impl PartialLoad {
    /// Convert into a strict result, discarding partial rows on failure
    pub fn into_result(self) -> EcgResult<SampleTable> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.table),
        }
    }
}

impl SampleTable {
    /// Parse a resource strictly: the first bad row fails the whole load
    pub fn parse<R: BufRead>(reader: R) -> EcgResult<Self> {
        Self::parse_partial(reader).into_result()
    }

    /// Parse a resource, stopping at the first bad row but keeping the
    /// rows that were read before it
    pub fn parse_partial<R: BufRead>(reader: R) -> PartialLoad {
        let mut table = SampleTable::default();
        let mut blank_line = None;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    return PartialLoad {
                        table,
                        error: Some(err.into()),
                    }
                }
            };

            // Blank lines are only allowed at the end of the data
            if line.trim().is_empty() {
                if blank_line.is_none() {
                    blank_line = Some(line_no);
                }
                continue;
            }
            if let Some(blank) = blank_line {
                return PartialLoad {
                    table,
                    error: Some(EcgError::MalformedRow {
                        line: blank,
                        reason: "blank line before end of data".to_string(),
                    }),
                };
            }

            match parse_row(&line, line_no) {
                Ok(sample) => table.push(sample),
                Err(err) => {
                    return PartialLoad {
                        table,
                        error: Some(err),
                    }
                }
            }
        }

        PartialLoad { table, error: None }
    }

    /// Parse an in-memory resource strictly
    pub fn from_csv_str(data: &str) -> EcgResult<Self> {
        Self::parse(data.as_bytes())
    }

    fn push(&mut self, sample: EcgSample) {
        self.time.push(sample.time);
        self.heart_rate.push(sample.heart_rate);
        self.blood_pressure.push(sample.blood_pressure);
        self.blood_volume.push(sample.blood_volume);
        self.oxygenation.push(sample.oxygenation);
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Row at `index`, or `None` when out of range
    pub fn row(&self, index: usize) -> Option<EcgSample> {
        (index < self.len()).then(|| self.sample(index))
    }

    /// Row at `index`
    ///
    /// Panics if `index` is out of range, like slice indexing.
    pub fn sample(&self, index: usize) -> EcgSample {
        EcgSample {
            time: self.time[index],
            heart_rate: self.heart_rate[index],
            blood_pressure: self.blood_pressure[index],
            blood_volume: self.blood_volume[index],
            oxygenation: self.oxygenation[index],
        }
    }

    /// Iterate over rows in resource order
    pub fn rows(&self) -> impl Iterator<Item = EcgSample> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn heart_rate(&self) -> &[f64] {
        &self.heart_rate
    }

    pub fn blood_pressure(&self) -> &[f64] {
        &self.blood_pressure
    }

    pub fn blood_volume(&self) -> &[f64] {
        &self.blood_volume
    }

    pub fn oxygenation(&self) -> &[f64] {
        &self.oxygenation
    }
}

fn parse_row(line: &str, line_no: usize) -> EcgResult<EcgSample> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELDS_PER_ROW {
        return Err(EcgError::MalformedRow {
            line: line_no,
            reason: format!(
                "expected {} fields, found {}",
                FIELDS_PER_ROW,
                fields.len()
            ),
        });
    }

    let mut values = [0.0f64; FIELDS_PER_ROW];
    for (field, (slot, raw)) in values.iter_mut().zip(&fields).enumerate() {
        *slot = raw.parse::<f64>().map_err(|_| EcgError::InvalidNumber {
            line: line_no,
            field,
            value: raw.to_string(),
        })?;
    }

    let [time, heart_rate, blood_pressure, blood_volume, oxygenation] = values;
    Ok(EcgSample {
        time,
        heart_rate,
        blood_pressure,
        blood_volume,
        oxygenation,
    })
}
