// src/output.rs
use crate::analytics::convergence::ConvergencePoint;
use crate::error::SdeResult;
use crate::mc::paths::PricePathMatrix;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One row per step, one column per path.
pub fn write_paths_to_csv<P: AsRef<Path>>(filename: P, paths: &PricePathMatrix) -> SdeResult<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    write!(file, "step")?;
    for n in 0..paths.paths() {
        write!(file, ",path_{}", n)?;
    }
    writeln!(file)?;

    for (step, row) in paths.view().outer_iter().enumerate() {
        write!(file, "{}", step + 1)?;
        for s in row.iter() {
            write!(file, ",{}", s)?;
        }
        writeln!(file)?;
    }
    file.flush()?;
    Ok(())
}

pub fn write_mean_path_to_csv<P: AsRef<Path>>(filename: P, paths: &PricePathMatrix) -> SdeResult<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "step,time,mean_price")?;
    for (i, mean) in paths.mean_path().iter().enumerate() {
        let step = i + 1;
        writeln!(file, "{},{},{}", step, step as f64 * paths.dt(), mean)?;
    }
    file.flush()?;
    Ok(())
}

pub fn write_convergence_to_csv<P: AsRef<Path>>(filename: P, points: &[ConvergencePoint]) -> SdeResult<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    write_convergence(&mut file, points)?;
    file.flush()?;
    Ok(())
}

/// Convergence table as CSV, header included.
pub fn write_convergence<W: Write>(out: &mut W, points: &[ConvergencePoint]) -> SdeResult<()> {
    writeln!(out, "paths,mc_price,std_error,analytic_price,abs_error,z_score,elapsed_ms")?;
    for p in points {
        // empty z_score when the standard error is zero
        let z = p.z_score().map(|z| format!("{:.4}", z)).unwrap_or_default();
        writeln!(
            out,
            "{},{:.8},{:.8},{:.8},{:.8},{},{:.3}",
            p.paths, p.mc_price, p.std_error, p.analytic_price, p.abs_error, z, p.elapsed_ms
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdeError;
    use crate::mc::paths::simulate;
    use crate::models::gbm::SimulationParams;
    use crate::rng::seed_rng_from_u64;

    fn temp_file(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mc_pricer_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_paths_csv_layout() {
        let params = SimulationParams::new(1.0, 4, 3, 0.2, 0.0, 100.0).unwrap();
        let matrix = simulate(&params, &mut seed_rng_from_u64(1)).unwrap();
        let file = temp_file("paths.csv");

        write_paths_to_csv(&file, &matrix).unwrap();
        let content = std::fs::read_to_string(&file).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "step,path_0,path_1,path_2");
        assert_eq!(lines.len(), 5);
        assert!(lines[4].starts_with("4,"));
        std::fs::remove_file(&file).ok();
    }

    #[test]
    fn test_mean_path_csv() {
        let params = SimulationParams::new(1.0, 2, 2, 0.0, 0.0, 50.0).unwrap();
        let matrix = simulate(&params, &mut seed_rng_from_u64(1)).unwrap();
        let file = temp_file("mean.csv");

        write_mean_path_to_csv(&file, &matrix).unwrap();
        let content = std::fs::read_to_string(&file).unwrap();
        assert_eq!(content.lines().next(), Some("step,time,mean_price"));
        let last: Vec<f64> = content
            .lines()
            .nth(2)
            .unwrap()
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(last[0], 2.0);
        assert!((last[1] - 1.0).abs() < 1e-12);
        assert!((last[2] - 50.0).abs() < 1e-9);
        std::fs::remove_file(&file).ok();
    }

    #[test]
    fn test_convergence_csv() {
        let points = [ConvergencePoint {
            paths: 100,
            mc_price: 3.5,
            std_error: 0.4,
            analytic_price: 3.6,
            abs_error: 0.1,
            elapsed_ms: 1.25,
        }];
        let file = temp_file("convergence.csv");

        write_convergence_to_csv(&file, &points).unwrap();
        let content = std::fs::read_to_string(&file).unwrap();
        assert_eq!(content.lines().count(), 2);
        let row: Vec<&str> = content.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(row[0], "100");
        assert_eq!(row[1], "3.50000000");
        assert_eq!(row[5], "-0.2500");
        std::fs::remove_file(&file).ok();
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let params = SimulationParams::new(1.0, 1, 1, 0.2, 0.0, 100.0).unwrap();
        let matrix = simulate(&params, &mut seed_rng_from_u64(1)).unwrap();
        let file = temp_file("missing_dir").join("paths.csv");

        assert!(matches!(
            write_paths_to_csv(&file, &matrix),
            Err(SdeError::Io(_))
        ));
    }
}
