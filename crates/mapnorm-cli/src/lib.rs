//! CLI logic for the mapnorm floor plan tool.
//!
//! This module contains the core CLI logic: it resolves paths, loads the
//! configuration, runs the map through the [`MapProcessor`] pipeline and
//! writes the result.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{LevelFilter, error, info};

use mapnorm::{MapError, MapProcessor, ProcessOptions};

/// Printed after the output file has been written.
pub const DONE_MESSAGE: &str = "Готово!";
/// Printed when the input file does not exist.
pub const NOT_FOUND_MESSAGE: &str = "Указанный файл не найден";
/// Printed, followed by the directory, after a preview was created.
pub const PREVIEW_MESSAGE: &str = "Превью создано:";
/// Printed when the preview could not be created.
pub const PREVIEW_FAILED_MESSAGE: &str = "Ошибка при создании превью";

const OUTPUT_SUFFIX: &str = ".transformed.svg";

/// Returns the default output path for `input`:
/// `<input dir>/<input name without .svg>.transformed.svg`.
///
/// # Examples
///
/// ```
/// # use std::path::Path;
/// # use mapnorm_cli::default_output_path;
/// assert_eq!(
///     default_output_path(Path::new("maps/floor1.svg")),
///     Path::new("maps/floor1.transformed.svg"),
/// );
/// ```
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(".svg").unwrap_or(&name);
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Whether a failure report logged at `level` reaches the user.
///
/// When it does not, the report is written to stderr directly.
pub fn errors_are_logged(level: LevelFilter) -> bool {
    level >= LevelFilter::Error
}

/// Run the mapnorm CLI application
///
/// This function processes the input map through the mapnorm pipeline,
/// writes the normalized SVG to the output file and, when requested,
/// creates the preview page. A failed preview is reported but does not
/// fail the run.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `MapError` for:
/// - A missing input file
/// - File I/O errors
/// - Configuration loading errors
/// - Markup errors
/// - Reference measurement errors
pub fn run(args: &Args) -> Result<(), MapError> {
    let input = Path::new(&args.input);
    if !input.is_file() {
        return Err(MapError::InputNotFound(input.to_path_buf()));
    }
    let output = args
        .output
        .as_ref()
        .map_or_else(|| default_output_path(input), PathBuf::from);

    info!(
        input_path = args.input,
        output_path = output.display().to_string();
        "Processing map"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;

    // Read input file
    let source = fs::read_to_string(input)?;

    // Normalize the whole map in memory before touching the output file
    let processor = MapProcessor::new(app_config);
    let mut document = processor.parse(&source)?;
    let options = ProcessOptions {
        meter: args.meter,
        unit: args.unit,
        root: args.root,
    };
    processor.normalize(&mut document, &options)?;
    let svg = processor.render(&document)?;

    fs::write(&output, svg)?;

    info!(output_file = output.display().to_string(); "Map written successfully");
    println!("{DONE_MESSAGE}");

    if args.preview {
        match processor.create_preview(&document, &output) {
            Ok(dir) => println!("{PREVIEW_MESSAGE} {}", dir.display()),
            Err(err) => {
                error!(err:%; "Preview generation failed");
                println!("{PREVIEW_FAILED_MESSAGE}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_strips_svg_extension() {
        assert_eq!(
            default_output_path(Path::new("/maps/floor1.svg")),
            Path::new("/maps/floor1.transformed.svg")
        );
    }

    #[test]
    fn test_errors_bypass_disabled_logger() {
        assert!(!errors_are_logged(LevelFilter::Off));
        assert!(errors_are_logged(LevelFilter::Error));
        assert!(errors_are_logged(LevelFilter::Warn));
    }

    #[test]
    fn test_default_output_path_keeps_other_extensions() {
        assert_eq!(
            default_output_path(Path::new("plan.xml")),
            Path::new("plan.xml.transformed.svg")
        );
        assert_eq!(
            default_output_path(Path::new("plan")),
            Path::new("plan.transformed.svg")
        );
    }
}
