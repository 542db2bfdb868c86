/*!
Line-oriented, whitespace-separated diagnostic traces.

The theta trace has the header `t <label_1> … <label_n> AcceptanceRate` and
one row `<iteration> <theta_1> … <theta_n> <acceptanceRate>` per record; the
dzA trace has the header `t <label_1> … <label_n>` and rows
`<iteration> <dzA_1> … <dzA_n>`. Files are truncated when opened and every
row is flushed as it is written, so a trace can be watched while a run is in
progress. Writers flush once more when dropped, which covers early exits.

```rust
use mini_alaam::trace::TraceWriter;
use ndarray::array;

let labels = vec!["Density".to_string(), "Contagion".to_string()];
let mut trace = TraceWriter::theta(Vec::new(), &labels)?;
trace.write_theta(100, &array![-1.5, 0.25], 0.4)?;
let text = String::from_utf8(trace.into_inner()?).unwrap();
assert_eq!(text, "t Density Contagion AcceptanceRate\n100 -1.5 0.25 0.4\n");
# Ok::<(), mini_alaam::error::AlaamError>(())
```
*/

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Writer, WriterBuilder};
use ndarray::Array1;

use crate::error::{AlaamError, Result};

/// Filename prefix of theta traces.
pub const THETA_PREFIX: &str = "theta_values_";
/// Filename prefix of dzA traces.
pub const DZA_PREFIX: &str = "dzA_values_";

pub struct TraceWriter<W: Write> {
    inner: Writer<W>,
    n_params: usize,
    with_acceptance: bool,
}

impl<W: Write> TraceWriter<W> {
    fn new(writer: W, labels: &[String], with_acceptance: bool) -> Result<Self> {
        let mut inner = WriterBuilder::new()
            .delimiter(b' ')
            .quote_style(QuoteStyle::Necessary)
            .has_headers(false)
            .from_writer(writer);

        let mut header = vec!["t".to_string()];
        header.extend(labels.iter().cloned());
        if with_acceptance {
            header.push("AcceptanceRate".to_string());
        }
        inner.write_record(&header)?;
        inner.flush()?;

        Ok(Self {
            inner,
            n_params: labels.len(),
            with_acceptance,
        })
    }

    /// A theta trace: iteration, theta vector, acceptance rate.
    pub fn theta(writer: W, labels: &[String]) -> Result<Self> {
        Self::new(writer, labels, true)
    }

    /// A discrepancy trace: iteration, dzA vector.
    pub fn dza(writer: W, labels: &[String]) -> Result<Self> {
        Self::new(writer, labels, false)
    }

    pub fn write_theta(&mut self, t: i64, theta: &Array1<f64>, acceptance_rate: f64) -> Result<()> {
        if !self.with_acceptance {
            return Err(AlaamError::Configuration(
                "acceptance rate written to a dzA trace".to_string(),
            ));
        }
        self.write_row(t, theta, Some(acceptance_rate))
    }

    pub fn write_dza(&mut self, t: i64, dza: &Array1<f64>) -> Result<()> {
        if self.with_acceptance {
            return Err(AlaamError::Configuration(
                "dzA row written to a theta trace".to_string(),
            ));
        }
        self.write_row(t, dza, None)
    }

    fn write_row(&mut self, t: i64, values: &Array1<f64>, acceptance: Option<f64>) -> Result<()> {
        if values.len() != self.n_params {
            return Err(AlaamError::DimensionMismatch {
                what: "trace row",
                expected: self.n_params,
                found: values.len(),
            });
        }
        let mut row = Vec::with_capacity(values.len() + 2);
        row.push(t.to_string());
        row.extend(values.iter().map(|v| v.to_string()));
        if let Some(rate) = acceptance {
            row.push(rate.to_string());
        }
        self.inner.write_record(&row)?;
        self.inner.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| AlaamError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
    }
}

impl TraceWriter<File> {
    /// Creates (truncating) a theta trace file.
    pub fn create_theta<P: AsRef<Path>>(path: P, labels: &[String]) -> Result<Self> {
        Self::theta(File::create(path)?, labels)
    }

    /// Creates (truncating) a dzA trace file.
    pub fn create_dza<P: AsRef<Path>>(path: P, labels: &[String]) -> Result<Self> {
        Self::dza(File::create(path)?, labels)
    }
}

/// The pair of traces written by an Equilibrium Expectation run.
pub struct Traces<W: Write> {
    pub theta: TraceWriter<W>,
    pub dza: TraceWriter<W>,
}

impl<W: Write> Traces<W> {
    pub fn new(theta: W, dza: W, labels: &[String]) -> Result<Self> {
        Ok(Self {
            theta: TraceWriter::theta(theta, labels)?,
            dza: TraceWriter::dza(dza, labels)?,
        })
    }
}

impl Traces<File> {
    /// Opens `theta_values_<basename>.txt` and `dzA_values_<basename>.txt`
    /// in `dir`, overwriting any earlier run.
    pub fn create<P: AsRef<Path>>(dir: P, basename: &str, labels: &[String]) -> Result<Self> {
        let (theta_path, dza_path) = trace_paths(dir, basename);
        Ok(Self {
            theta: TraceWriter::create_theta(theta_path, labels)?,
            dza: TraceWriter::create_dza(dza_path, labels)?,
        })
    }
}

/// Destination of per-iteration diagnostics. Estimators write through this
/// trait so a run can go to files, to memory, or nowhere.
pub trait TraceSink {
    fn record_theta(&mut self, t: i64, theta: &Array1<f64>, acceptance_rate: f64) -> Result<()>;
    fn record_dza(&mut self, t: i64, dza: &Array1<f64>) -> Result<()>;
}

impl<W: Write> TraceSink for Traces<W> {
    fn record_theta(&mut self, t: i64, theta: &Array1<f64>, acceptance_rate: f64) -> Result<()> {
        self.theta.write_theta(t, theta, acceptance_rate)
    }

    fn record_dza(&mut self, t: i64, dza: &Array1<f64>) -> Result<()> {
        self.dza.write_dza(t, dza)
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn record_theta(&mut self, _t: i64, _theta: &Array1<f64>, _acceptance_rate: f64) -> Result<()> {
        Ok(())
    }

    fn record_dza(&mut self, _t: i64, _dza: &Array1<f64>) -> Result<()> {
        Ok(())
    }
}

/// Keeps every record in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTrace {
    pub theta: Vec<(i64, Array1<f64>, f64)>,
    pub dza: Vec<(i64, Array1<f64>)>,
}

impl TraceSink for MemoryTrace {
    fn record_theta(&mut self, t: i64, theta: &Array1<f64>, acceptance_rate: f64) -> Result<()> {
        self.theta.push((t, theta.clone(), acceptance_rate));
        Ok(())
    }

    fn record_dza(&mut self, t: i64, dza: &Array1<f64>) -> Result<()> {
        self.dza.push((t, dza.clone()));
        Ok(())
    }
}

pub fn trace_paths<P: AsRef<Path>>(dir: P, basename: &str) -> (PathBuf, PathBuf) {
    let dir = dir.as_ref();
    (
        dir.join(format!("{THETA_PREFIX}{basename}.txt")),
        dir.join(format!("{DZA_PREFIX}{basename}.txt")),
    )
}
