//! Command-line argument definitions for the mapnorm CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the reference
//! calibration, optional passes, configuration file selection, and logging
//! verbosity.

use clap::Parser;

/// Command-line arguments for the mapnorm floor plan tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input SVG map
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file [default: <input>.transformed.svg next to the input]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Reference segment length, used instead of measuring the `meter` element
    #[arg(short, long, value_name = "LENGTH")]
    pub meter: Option<f64>,

    /// Output length of one reference segment (overrides the configuration)
    #[arg(long, value_name = "LENGTH")]
    pub unit: Option<f64>,

    /// Create an HTML preview page next to the output file
    #[arg(long)]
    pub preview: bool,

    /// Treat the input as a root map and link transition views to buildings
    #[arg(long)]
    pub root: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["mapnorm", "plan.svg"]);

        assert_eq!(args.input, "plan.svg");
        assert_eq!(args.output, None);
        assert_eq!(args.meter, None);
        assert!(!args.preview);
        assert!(!args.root);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "mapnorm", "plan.svg", "-o", "out.svg", "-m", "42.5", "--unit", "2", "--preview",
            "--root", "-c", "mapnorm.toml", "--log-level", "debug",
        ]);

        assert_eq!(args.output.as_deref(), Some("out.svg"));
        assert_eq!(args.meter, Some(42.5));
        assert_eq!(args.unit, Some(2.0));
        assert!(args.preview);
        assert!(args.root);
        assert_eq!(args.config.as_deref(), Some("mapnorm.toml"));
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn test_invalid_meter_rejected() {
        assert!(Args::try_parse_from(["mapnorm", "plan.svg", "--meter", "wide"]).is_err());
    }
}
