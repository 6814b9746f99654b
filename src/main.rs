use std::env;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use fecon_rs::optimize::optimize_holt;
use fecon_rs::stats::gm2_gem_rate;
use fecon_rs::timeseries::forecast;
use fecon_rs::Series;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const USAGE: &str = "usage: fecon <prices.txt> [horizon=12] [grids=20] [yearly=256]";

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer())
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fecon=info,fecon_rs=info".into()),
    )
    .init();

  let args: Vec<String> = env::args().skip(1).collect();
  let Some(path) = args.first() else {
    bail!(USAGE);
  };
  let horizon: usize = parse_arg(&args, 1, 12)?;
  let grids: usize = parse_arg(&args, 2, 20)?;
  let yearly: f64 = parse_arg(&args, 3, 256.0)?;

  let data = read_vector_from_file(path)?;
  let series = Series::from_values(data);
  println!("{path}: {} observations", series.len());

  let fit = optimize_holt(&series, grids, (0.0, 1.0), (0.0, 1.0))?;
  println!("Holt-Winters fit");
  println!("  alpha: {:.4}", fit.alpha);
  println!("  beta: {:.4}", fit.beta);
  println!("  loss: {:.4} ({:.3}% of last value)", fit.loss, fit.loss_percent);

  let projection = forecast(&series, horizon, fit.params())?;
  println!("Forecast (+/- {:.4})", fit.band());
  for (k, value) in projection.iter().enumerate() {
    println!("  {k:>3}: {value:.4}");
  }

  match gm2_gem_rate(&series, yearly, 2.0) {
    Ok(g) => {
      println!("Geometric mean rate");
      println!("  rate: {:.4}%", 100.0 * g.gem.rate);
      println!("  mu: {:.4}%", 100.0 * g.gem.mu);
      println!("  sigma: {:.4}%", 100.0 * g.gem.sigma);
      println!("  kurtosis: {:.4}", g.gem.kurtosis);
      println!("GM(2), b = {}", g.mix.b);
      println!("  p: {:.4}, sigma1: {:.4}%", g.mix.p, 100.0 * g.mix.sigma1);
      println!("  q: {:.4}, sigma2: {:.4}%", g.mix.q, 100.0 * g.mix.sigma2);
    }
    Err(err) => println!("GM(2) unavailable: {err}"),
  }

  Ok(())
}

fn parse_arg<T>(args: &[String], index: usize, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match args.get(index) {
    Some(raw) => raw
      .parse()
      .with_context(|| format!("argument {index} ('{raw}'): {USAGE}")),
    None => Ok(default),
  }
}

fn read_vector_from_file(filename: &str) -> Result<Vec<f64>> {
  let file = File::open(filename).with_context(|| format!("cannot open {filename}"))?;
  let reader = BufReader::new(file);
  let mut data = Vec::new();

  for (n, line) in reader.lines().enumerate() {
    let line = line?;
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let value: f64 = line
      .parse()
      .with_context(|| format!("{filename}:{}: not a number: '{line}'", n + 1))?;
    data.push(value);
  }

  Ok(data)
}
