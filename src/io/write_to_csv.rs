use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::geometry::BoundaryId;

/// One evaluated boundary value. Rows are in long format: one row per
/// point, time and field.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BoundarySample {
    pub time: f64,
    pub boundary: BoundaryId,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub component: usize,
    pub composition: f64,
}

impl BoundarySample {
    pub fn new(
        time: f64,
        boundary: BoundaryId,
        position: &[f64],
        component: usize,
        composition: f64,
    ) -> Self {
        Self {
            time,
            boundary,
            x: position.first().copied().unwrap_or(0.0),
            y: position.get(1).copied().unwrap_or(0.0),
            z: position.get(2).copied(),
            component,
            composition,
        }
    }
}

pub fn write_samples<W: Write>(writer: W, samples: &[BoundarySample]) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(writer);
    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_to_csv<P: AsRef<Path>>(samples: &[BoundarySample], filename: P) -> Result<(), csv::Error> {
    write_samples(File::create(filename)?, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_format_rows() {
        let samples = vec![
            BoundarySample::new(0.0, 3, &[0.5, 1.0], 0, 0.25),
            BoundarySample::new(1.5, 5, &[0.5, 1.0, 2.0], 1, 1.0),
        ];
        let mut buffer = Vec::new();
        write_samples(&mut buffer, &samples).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,boundary,x,y,z,component,composition");
        assert_eq!(lines[1], "0.0,3,0.5,1.0,,0,0.25");
        assert_eq!(lines[2], "1.5,5,0.5,1.0,2.0,1,1.0");
    }
}
