//! Error adapter for converting MapError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use mapnorm::{CoreError, MapError, markup::MarkupError};

/// Adapter for a markup error with its source text.
///
/// Shows the offending position as a labeled span.
pub struct MarkupAdapter<'a> {
    err: &'a MarkupError,
    src: &'a str,
}

impl<'a> MarkupAdapter<'a> {
    /// Create a new markup adapter.
    pub fn new(err: &'a MarkupError, src: &'a str) -> Self {
        Self { err, src }
    }

    /// The span covering the character at the error offset.
    fn span(&self) -> SourceSpan {
        let offset = self.err.offset().min(self.src.len());
        let length = self
            .src
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        SourceSpan::new(offset.into(), length)
    }
}

impl fmt::Debug for MarkupAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for MarkupAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.err.message())
    }
}

impl std::error::Error for MarkupAdapter<'_> {}

impl MietteDiagnostic for MarkupAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("mapnorm::markup"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("the input must be well-formed SVG markup"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some("here".to_string()), self.span()),
        )))
    }
}

/// Adapter for [`MapError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a MapError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            MapError::InputNotFound(_) => "mapnorm::input",
            MapError::Io(_) => "mapnorm::io",
            MapError::Markup { .. } => "mapnorm::markup",
            MapError::Transform(_) => "mapnorm::transform",
            MapError::Config(_) => "mapnorm::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            MapError::InputNotFound(_) => "check the path of the input map",
            MapError::Transform(CoreError::MissingReference) => {
                "add a line with id=\"meter\" that is one meter long, or pass --meter <LENGTH>"
            }
            MapError::Transform(CoreError::InvalidReference(_)) => {
                "the `meter` element must be a non-zero line or a group whose first child is one"
            }
            MapError::Transform(CoreError::InvalidUnit(_)) => "pass a positive --unit",
            MapError::Transform(CoreError::MissingViewport) => {
                "the map must contain an <svg> element"
            }
            MapError::Config(_) => "check the configuration file or pass another one with --config",
            MapError::Io(_) | MapError::Markup { .. } => return None,
        };
        Some(Box::new(help))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A markup error with source location information.
    Markup(MarkupAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Markup(m) => fmt::Display::fmt(m, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Markup(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Markup(m) => m.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Markup(m) => m.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Markup(m) => m.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Markup(m) => m.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`MapError`] into a reportable error.
pub fn to_reportable(err: &MapError) -> Reportable<'_> {
    match err {
        MapError::Markup { err, src } => Reportable::Markup(MarkupAdapter::new(err, src)),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

/// Render `err` as a miette report, falling back to its plain message.
pub fn render_report(err: &MapError) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    match reporter.render_report(&mut writer, &to_reportable(err)) {
        Ok(()) => writer,
        Err(_) => err.to_string(),
    }
}
