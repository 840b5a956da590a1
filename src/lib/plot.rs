use crate::error::Result;
use csv::WriterBuilder;
use log::info;
use std::io::Write;

/// Receives a curve of one variable over a closed range.
pub trait PlotSink {
    fn plot(&mut self, f: &dyn Fn(f64) -> f64, x_range: (f64, f64), title: &str) -> Result<()>;
}

/// Evaluate `f` at `resolution + 1` evenly spaced points of `x_range`.
pub fn sample_curve(f: &dyn Fn(f64) -> f64, x_range: (f64, f64), resolution: usize) -> Vec<(f64, f64)> {
    let (lo, hi) = x_range;
    if resolution == 0 {
        return vec![(lo, f(lo))];
    }
    let step = (hi - lo) / resolution as f64;
    (0..=resolution)
        .map(|i| {
            let x = if i == resolution { hi } else { lo + step * i as f64 };
            (x, f(x))
        })
        .collect()
}

/// Writes the sampled curve as tab separated `x`, `y` columns, preceded by the
/// title as `#` comment lines.
pub struct CsvPlotSink<W: Write> {
    writer: W,
    resolution: usize,
}

impl<W: Write> CsvPlotSink<W> {
    pub fn new(writer: W, resolution: usize) -> Self {
        Self { writer, resolution }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PlotSink for CsvPlotSink<W> {
    fn plot(&mut self, f: &dyn Fn(f64) -> f64, x_range: (f64, f64), title: &str) -> Result<()> {
        for line in title.lines() {
            writeln!(self.writer, "# {}", line)?;
        }
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(&mut self.writer);
        writer.write_record(["x", "y"])?;
        let points = sample_curve(f, x_range, self.resolution);
        for (x, y) in &points {
            writer.write_record([format!("{:.6}", x), format!("{:.8e}", y)])?;
        }
        writer.flush()?;
        info!("Wrote {} curve points for '{}'", points.len(), title.replace('\n', " | "));
        Ok(())
    }
}

/// A rendered curve held in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub title: String,
    pub x_range: (f64, f64),
    pub points: Vec<(f64, f64)>,
}

/// Keeps every curve it is handed.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub resolution: usize,
    pub curves: Vec<Curve>,
}

impl RecordingSink {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            curves: Vec::new(),
        }
    }
}

impl PlotSink for RecordingSink {
    fn plot(&mut self, f: &dyn Fn(f64) -> f64, x_range: (f64, f64), title: &str) -> Result<()> {
        self.curves.push(Curve {
            title: title.to_string(),
            x_range,
            points: sample_curve(f, x_range, self.resolution),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_curve_endpoints() {
        let points = sample_curve(&|x| 2.0 * x, (0.0, 10.0), 4);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], (0.0, 0.0));
        assert_eq!(points[2], (5.0, 10.0));
        assert_eq!(points[4], (10.0, 20.0));
    }

    #[test]
    fn test_sample_curve_zero_resolution() {
        let points = sample_curve(&|x| x + 1.0, (3.0, 4.0), 0);
        assert_eq!(points, vec![(3.0, 4.0)]);
    }

    #[test]
    fn test_csv_sink_output() {
        let mut sink = CsvPlotSink::new(Vec::new(), 2);
        sink.plot(&|x| x, (0.0, 1.0), "line\nsecond").unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "# line");
        assert_eq!(lines[1], "# second");
        assert_eq!(lines[2], "x\ty");
        assert_eq!(lines.len(), 6);
        assert!(lines[5].starts_with("1.000000\t"));
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::new(10);
        sink.plot(&|_| 0.5, (0.0, 10.0), "flat").unwrap();
        assert_eq!(sink.curves.len(), 1);
        assert_eq!(sink.curves[0].title, "flat");
        assert_eq!(sink.curves[0].points.len(), 11);
    }
}
