use std::{
    fs::{self, File},
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::Serialize;

/// File name of the scalar log inside a summary directory
pub static SCALARS_FILE: &str = "scalars.csv";

#[derive(Serialize)]
struct Scalar<'a> {
    step: usize,
    wall_time: f64,
    tag: &'a str,
    value: f64,
}

/// Appends scalar summaries (loss, accuracy, ...) for one phase of training
pub struct SummaryWriter {
    writer: csv::Writer<File>,
}

impl SummaryWriter {
    /// Create the summary directory and start a fresh scalar log in it
    pub fn create<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        fs::create_dir_all(dir.as_ref())?;

        let writer = csv::Writer::from_path(dir.as_ref().join(SCALARS_FILE))
            .map_err(|e| anyhow!("Unable to create summary writer in {:?}: {}", dir.as_ref(), e))?;

        Ok(Self { writer })
    }

    /// Record a scalar value for a global step
    pub fn add_scalar(&mut self, step: usize, tag: &str, value: f64) -> anyhow::Result<()> {
        let wall_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();

        self.writer.serialize(Scalar {
            step,
            wall_time,
            tag,
            value,
        })?;
        self.writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_are_written_with_a_header() {
        let dir = std::env::temp_dir().join("burn-text-cnn-summary-test");
        let _ = fs::remove_dir_all(&dir);

        let mut writer = SummaryWriter::create(&dir).unwrap();
        writer.add_scalar(1, "loss", 0.5).unwrap();
        writer.add_scalar(1, "accuracy", 0.75).unwrap();

        let mut reader = csv::Reader::from_path(dir.join(SCALARS_FILE)).unwrap();
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(String::from)
            .collect();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(headers, vec!["step", "wall_time", "tag", "value"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][2], "accuracy");
        assert_eq!(&rows[1][3], "0.75");
    }
}
