use std::path::PathBuf;

use binroute_core::simulate::DEFAULT_SEED;
use clap::Parser;

/// Terminal dashboard for smart waste collection.
#[derive(Parser, Debug)]
#[command(name = "binroute", version)]
pub(crate) struct Cli {
    /// Seed for the simulated bins, vans, and waste history
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
    /// Number of simulated bins
    #[arg(long, default_value_t = 10)]
    pub bins: usize,
    /// Number of simulated vans
    #[arg(long, default_value_t = 4)]
    pub vans: usize,
    /// Read bin readings from a CSV file instead of simulating them
    #[arg(long, requires = "vans_csv")]
    pub bins_csv: Option<PathBuf>,
    /// Read van positions from a CSV file instead of simulating them
    #[arg(long, requires = "bins_csv")]
    pub vans_csv: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_batch() {
        let cli = Cli::try_parse_from(["binroute"]).expect("no flags needed");

        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.bins, 10);
        assert_eq!(cli.vans, 4);
        assert!(cli.bins_csv.is_none());
    }

    #[test]
    fn csv_inputs_come_in_pairs() {
        assert!(Cli::try_parse_from(["binroute", "--bins-csv", "bins.csv"]).is_err());

        let cli = Cli::try_parse_from([
            "binroute",
            "--bins-csv",
            "bins.csv",
            "--vans-csv",
            "vans.csv",
        ])
        .expect("both files given");
        assert_eq!(cli.vans_csv, Some(PathBuf::from("vans.csv")));
    }
}
