use crate::cli::Command;
use anyhow::{anyhow, Result};
use betabinomial_utils::engine::StatrsEngine;
use betabinomial_utils::plot::{CsvPlotSink, RecordingSink};
use betabinomial_utils::{BetaBinomialModel, SampleMatrix};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

pub fn run(command: &Command) -> Result<()> {
    match command {
        Command::Simulate { n, r, a, b, seed, out } => {
            simulate(*n, *r, *a, *b, *seed, out.as_deref())
        }
        Command::Estimate { samples } => estimate(samples),
        Command::Update { model, samples, out } => {
            update(model, samples, out.as_deref().unwrap_or(model))
        }
        Command::Pmf { a, b, n, resolution, out } => pmf(*a, *b, *n, *resolution, out.as_deref()),
        Command::Demo { seed, out } => demo(*seed, out.as_deref()),
    }
}

fn engine(seed: Option<u64>) -> StatrsEngine {
    match seed {
        Some(seed) => {
            debug!("Seeding random number generator with {}", seed);
            StatrsEngine::from_seed(seed)
        }
        None => StatrsEngine::from_entropy(),
    }
}

fn read_samples(path: &str) -> Result<SampleMatrix> {
    let file = File::open(path)
        .map_err(|e| anyhow!("Could not open sample file: {} ({})", path, e))?;
    let samples = SampleMatrix::from_reader(BufReader::new(file))
        .map_err(|e| anyhow!("Error reading sample file {}: {}", path, e))?;
    info!("Loaded {} units of {} trials from {}", samples.n_units(), samples.n_trials(), path);
    Ok(samples)
}

fn simulate(n: usize, r: usize, a: f64, b: f64, seed: Option<u64>, out: Option<&str>) -> Result<()> {
    let timer = Instant::now();
    let model = BetaBinomialModel::new(a, b)?;
    let samples = model.gen_samples(n, r, None, None, &mut engine(seed))?;
    info!("Drew {} units in {:?}", samples.n_units(), timer.elapsed());

    match out {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow!("Could not create output file: {} ({})", path, e))?;
            samples.to_writer(BufWriter::new(file))?;
            info!("Wrote samples to {}", path);
        }
        None => samples.to_writer(io::stdout().lock())?,
    }
    Ok(())
}

fn estimate(path: &str) -> Result<()> {
    let samples = read_samples(path)?;
    let estimate = BetaBinomialModel::default()
        .estimate_priors(&samples)
        .map_err(|e| anyhow!("Could not estimate priors from {}: {}", path, e))?;
    println!("Estimated parameters: a={:.2}, b={:.2}", estimate.a_hat, estimate.b_hat);
    Ok(())
}

fn update(model_path: &str, samples_path: &str, out: &str) -> Result<()> {
    let mut model = if Path::new(model_path).exists() {
        BetaBinomialModel::load(Path::new(model_path))
            .map_err(|e| anyhow!("Error reading model {}: {}", model_path, e))?
    } else {
        warn!("Model {} does not exist, starting from Beta(1, 1)", model_path);
        BetaBinomialModel::default()
    };
    let samples = read_samples(samples_path)?;
    model.update_model(&samples)?;
    model
        .save(Path::new(out))
        .map_err(|e| anyhow!("Could not write model {}: {}", out, e))?;
    println!("Updated priors: a={}, b={}", model.a(), model.b());
    Ok(())
}

fn pmf(a: f64, b: f64, n: u64, resolution: usize, out: Option<&str>) -> Result<()> {
    let model = BetaBinomialModel::new(a, b)?;
    let dist = model.calc_compound_distribution(n);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "k\tpmf")?;
    for (k, p) in dist.table() {
        writeln!(handle, "{}\t{:.8e}", k, p)?;
    }
    writeln!(handle, "# mean={:.4}, variance={:.4}", dist.mean(), dist.variance())?;

    if let Some(path) = out {
        write_curve(&model, n, resolution, path)?;
    }
    Ok(())
}

fn write_curve(model: &BetaBinomialModel, n: u64, resolution: usize, path: &str) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| anyhow!("Could not create output file: {} ({})", path, e))?;
    let mut sink = CsvPlotSink::new(BufWriter::new(file), resolution);
    model.plot_posterior_pmf(n, &mut sink)?;
    sink.into_inner().flush()?;
    Ok(())
}

fn demo(seed: Option<u64>, out: Option<&str>) -> Result<()> {
    let mut engine = engine(seed);

    // create a model
    let (a, b) = (10.0, 20.0);
    let mut model = BetaBinomialModel::new(a, b)?;

    // draw samples from the model
    let samples = model.gen_samples(30, 30, None, None, &mut engine)?;
    println!("Samples drawn from a={}, b={} beta binomial model:", a, b);
    samples.to_writer(io::stdout().lock())?;

    // estimate underlying hyper-params of the samples
    match model.estimate_priors(&samples) {
        Ok(estimate) => println!(
            "Estimated parameters: a={:.2}, b={:.2}",
            estimate.a_hat, estimate.b_hat
        ),
        Err(e) => warn!("Could not estimate parameters: {}", e),
    }

    // learn from differently modelled data
    let new_samples = model.gen_samples(40, 30, Some(50.0), Some(10.0), &mut engine)?;
    model.update_model(&new_samples)?;
    println!("Updated priors: a={}, b={}", model.a(), model.b());

    // summarise the resulting pmf
    let mut sink = RecordingSink::new(10);
    model.plot_posterior_pmf(10, &mut sink)?;
    for curve in &sink.curves {
        println!("{}", curve.title);
        for (x, y) in &curve.points {
            println!("{:>5.1}\t{:.4}", x, y);
        }
    }
    if let Some(path) = out {
        write_curve(&model, 10, 200, path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_then_estimate_and_update() {
        let dir = tempfile::tempdir().unwrap();
        let samples_path = dir.path().join("samples.tsv");
        let model_path = dir.path().join("model.json");
        let samples_path = samples_path.to_str().unwrap();
        let model_path = model_path.to_str().unwrap();

        simulate(50, 20, 4.0, 6.0, Some(1), Some(samples_path)).unwrap();
        let samples = read_samples(samples_path).unwrap();
        assert_eq!(samples.shape(), (50, 20));

        estimate(samples_path).unwrap();

        update(model_path, samples_path, model_path).unwrap();
        let model = BetaBinomialModel::load(Path::new(model_path)).unwrap();
        let successes = samples.total_successes() as f64;
        assert_eq!(model.a(), 1.0 + successes);
        assert_eq!(model.b(), 1.0 + 1000.0 - successes);
    }

    #[test]
    fn test_write_curve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.tsv");
        let model = BetaBinomialModel::new(2.0, 2.0).unwrap();
        write_curve(&model, 4, 8, path.to_str().unwrap()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# BetaBinomial pmf\n# n=4, a=2, b=2, mean=2.00\n"));
        assert_eq!(content.lines().count(), 2 + 1 + 9);
    }

    #[test]
    fn test_read_samples_missing_file() {
        assert!(read_samples("/nonexistent/samples.tsv").is_err());
    }
}
