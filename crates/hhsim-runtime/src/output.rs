//! Result sinks
//!
//! A sink receives the finished [`SimulationResult`]; nothing is streamed
//! while the simulation runs.

use std::io::Write;

use crate::{error::*, simulation::SimulationResult};

/// Consumer of finished simulation results
pub trait ResultsSink {
    /// Write the time axis and every voltage trace
    fn write_results(&mut self, result: &SimulationResult) -> Result<()>;
}

/// Comma-separated output, one row per time point
///
/// Each row is `time,v0,v1,…` with neuron columns in registration order.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
    header: bool,
}

impl<W: Write> CsvSink<W> {
    /// Create a sink writing rows without a header
    pub fn new(writer: W) -> Self {
        Self { writer, header: false }
    }

    /// Emit a `time,N0,N1,…` header row first
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultsSink for CsvSink<W> {
    fn write_results(&mut self, result: &SimulationResult) -> Result<()> {
        for trace in &result.traces {
            if trace.voltages.len() != result.time_axis.len() {
                return Err(RuntimeError::out_of_range(
                    trace.neuron_id,
                    result.time_axis.len(),
                    trace.voltages.len(),
                ));
            }
        }

        if self.header {
            write!(self.writer, "time")?;
            for trace in &result.traces {
                write!(self.writer, ",{}", trace.neuron_id)?;
            }
            writeln!(self.writer)?;
        }

        for (row, time) in result.time_axis.iter().enumerate() {
            write!(self.writer, "{}", time)?;
            for trace in &result.traces {
                write!(self.writer, ",{}", trace.voltages[row])?;
            }
            writeln!(self.writer)?;
        }

        self.writer.flush()?;
        Ok(())
    }
}
