use clap::{Parser, Subcommand, ValueEnum};

/// Simulate, estimate and update a Bayesian Beta-Binomial model.
#[derive(Parser, Debug)]
#[command(name = "betabinomial", version, about = "Bayesian Beta-Binomial model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(
        value_enum,
        long,
        global = true,
        default_value = "normal",
        value_name = "VERBOSITY",
        help = "Verbosity level"
    )]
    pub verbosity: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Draw a sample matrix from a Beta-Binomial generative process
    Simulate {
        #[arg(long, short, help = "Number of units (rows)")]
        n: usize,

        #[arg(long, short, help = "Number of trials per unit (columns)")]
        r: usize,

        #[arg(long, default_value = "1.0", help = "Beta prior shape a")]
        a: f64,

        #[arg(long, default_value = "1.0", help = "Beta prior shape b")]
        b: f64,

        #[arg(long, help = "Seed for the random number generator")]
        seed: Option<u64>,

        #[arg(long, short, value_name = "OUT", help = "Output file path, stdout if omitted")]
        out: Option<String>,
    },

    /// Method-of-moments estimate of the prior behind a sample matrix
    Estimate {
        #[arg(value_name = "SAMPLES", help = "Tab separated sample matrix")]
        samples: String,
    },

    /// Apply the conjugate update to a stored model
    Update {
        #[arg(long, short, value_name = "MODEL", help = "Model state (JSON); Beta(1, 1) if missing")]
        model: String,

        #[arg(value_name = "SAMPLES", help = "Tab separated sample matrix")]
        samples: String,

        #[arg(long, short, value_name = "OUT", help = "Where to write the updated model, defaults to MODEL")]
        out: Option<String>,
    },

    /// Write the Beta-Binomial pmf
    Pmf {
        #[arg(long, default_value = "1.0")]
        a: f64,

        #[arg(long, default_value = "1.0")]
        b: f64,

        #[arg(long, short, default_value = "10", help = "Number of trials")]
        n: u64,

        #[arg(long, default_value = "200", help = "Points on the continuous curve")]
        resolution: usize,

        #[arg(long, short, value_name = "OUT", help = "Write the continuous curve to this file")]
        out: Option<String>,
    },

    /// Walk through simulation, estimation and updating
    Demo {
        #[arg(long, help = "Seed for the random number generator")]
        seed: Option<u64>,

        #[arg(long, short, value_name = "OUT", help = "Write the posterior curve to this file")]
        out: Option<String>,
    },
}

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Verbose,
    Normal,
    Silent,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Verbose => write!(f, "verbose"),
            LogLevel::Normal => write!(f, "normal"),
            LogLevel::Silent => write!(f, "silent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::parse_from([
            "betabinomial", "simulate", "-n", "30", "-r", "20", "--a", "10", "--b", "20", "--seed", "4",
        ]);
        match cli.command {
            Command::Simulate { n, r, a, b, seed, out } => {
                assert_eq!((n, r, a, b, seed), (30, 20, 10.0, 20.0, Some(4)));
                assert!(out.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.verbosity, LogLevel::Normal);
    }

    #[test]
    fn test_parse_update_with_global_verbosity() {
        let cli = Cli::parse_from([
            "betabinomial", "update", "--model", "m.json", "s.tsv", "--verbosity", "silent",
        ]);
        assert_eq!(cli.verbosity, LogLevel::Silent);
        assert!(matches!(cli.command, Command::Update { ref model, ref samples, out: None }
            if model == "m.json" && samples == "s.tsv"));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
