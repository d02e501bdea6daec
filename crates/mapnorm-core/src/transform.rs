//! Parser for the `transform` attribute mini-language.
//!
//! A transform list is a sequence of operations `name(args)` separated by
//! whitespace and/or commas. Only `translate` is interpreted; every other
//! operation (`rotate`, `scale`, `matrix`, `skewX`, `skewY`, ...) is kept as
//! its exact source text so it can be written back unchanged.
//!
//! # Example
//!
//! ```
//! # use mapnorm_core::transform::TransformChain;
//! let chain: TransformChain = "translate(10 20) rotate(45)".parse().unwrap();
//! assert_eq!(chain.scale_translations(0.1).to_string(), "translate(1 2) rotate(45)");
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;
use winnow::{
    Parser as _,
    ascii::{float, multispace0},
    combinator::{delimited, eof, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode},
    token::{take_till, take_while},
};

use crate::geometry::{format_number, scale};

type Input<'src> = &'src str;
type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// Error returned for a transform list that does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transform list `{0}`")]
pub struct TransformError(String);

/// A single operation of a transform list.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOp {
    /// `translate(tx ty)`; a missing `ty` is `0`.
    Translate { tx: f64, ty: f64 },
    /// Any other operation, kept as its exact source text.
    Opaque(String),
}

impl TransformOp {
    /// Scales the components of a translation; other operations are
    /// returned unchanged.
    pub fn scaled(&self, ratio: f64) -> Self {
        match self {
            TransformOp::Translate { tx, ty } => TransformOp::Translate {
                tx: scale(*tx, ratio),
                ty: scale(*ty, ratio),
            },
            TransformOp::Opaque(raw) => TransformOp::Opaque(raw.clone()),
        }
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformOp::Translate { tx, ty } => {
                write!(f, "translate({} {})", format_number(*tx), format_number(*ty))
            }
            TransformOp::Opaque(raw) => f.write_str(raw),
        }
    }
}

/// An ordered list of transform operations.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformChain {
    ops: Vec<TransformOp>,
}

impl TransformChain {
    /// Parses a transform attribute value.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the value is empty, an operation is
    /// not closed, or a `translate` has anything but one or two numbers.
    pub fn parse(source: &str) -> Result<Self, TransformError> {
        let mut input = source;
        chain
            .parse_next(&mut input)
            .map(|ops| Self { ops })
            .map_err(|_| TransformError(source.to_string()))
    }

    /// Returns the operations in order.
    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    /// Returns `true` if at least one operation is a translation.
    pub fn has_translation(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, TransformOp::Translate { .. }))
    }

    /// Returns a chain with every translation scaled by `ratio`.
    pub fn scale_translations(&self, ratio: f64) -> Self {
        Self {
            ops: self.ops.iter().map(|op| op.scaled(ratio)).collect(),
        }
    }
}

impl FromStr for TransformChain {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

/// Whitespace with at most one comma in it.
fn comma_wsp(input: &mut Input<'_>) -> IResult<()> {
    (multispace0, opt(','), multispace0)
        .void()
        .parse_next(input)
}

fn operation_name<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)
}

/// Parenthesized argument text, without the parentheses.
fn arguments<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    delimited('(', take_till(0.., ')'), ')').parse_next(input)
}

fn translate_arguments(input: &mut Input<'_>) -> IResult<(f64, Option<f64>)> {
    delimited(
        multispace0,
        (float, opt(preceded(comma_wsp, float))),
        multispace0,
    )
    .parse_next(input)
}

fn operation(input: &mut Input<'_>) -> IResult<TransformOp> {
    let ((name, args), raw) = (terminated(operation_name, multispace0), arguments)
        .with_taken()
        .parse_next(input)?;

    if name != "translate" {
        return Ok(TransformOp::Opaque(raw.to_string()));
    }

    let mut args = args;
    let (tx, ty) = terminated(translate_arguments, eof).parse_next(&mut args)?;
    Ok(TransformOp::Translate {
        tx,
        ty: ty.unwrap_or(0.0),
    })
}

fn chain(input: &mut Input<'_>) -> IResult<Vec<TransformOp>> {
    delimited(
        multispace0,
        repeat(1.., terminated(operation, comma_wsp)),
        eof,
    )
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> TransformChain {
        TransformChain::parse(source).unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn test_single_translate() {
        let chain = parse("translate(10 20)");
        assert_eq!(chain.ops(), &[TransformOp::Translate { tx: 10.0, ty: 20.0 }]);
        assert_eq!(chain.to_string(), "translate(10 20)");
    }

    #[test]
    fn test_single_opaque_round_trips() {
        for source in ["rotate(45)", "rotate(45 10 10)", "matrix(1 0 0 1 0 0)", "skewX(30)"] {
            assert_eq!(parse(source).to_string(), source);
        }
    }

    #[test]
    fn test_translate_then_rotate_scaled() {
        let chain = parse("translate(10 20) rotate(45)");
        assert_eq!(
            chain.scale_translations(0.1).to_string(),
            "translate(1 2) rotate(45)"
        );
    }

    #[test]
    fn test_opaque_ops_keep_inner_spacing() {
        let chain = parse("rotate(-90 120.5 40)  translate(100 50),scale(2)");
        assert_eq!(chain.ops().len(), 3);
        assert_eq!(
            chain.scale_translations(0.5).to_string(),
            "rotate(-90 120.5 40) translate(50 25) scale(2)"
        );
    }

    #[test]
    fn test_translate_argument_forms() {
        let expected = TransformOp::Translate { tx: 10.0, ty: -20.0 };
        assert_eq!(parse("translate(10,-20)").ops(), &[expected.clone()]);
        assert_eq!(parse("translate( 10 , -20 )").ops(), &[expected.clone()]);
        assert_eq!(parse("translate(10-20)").ops(), &[expected.clone()]);
        assert_eq!(parse("translate (10 -20)").ops(), &[expected]);
        assert_eq!(
            parse("translate(1e2 2.5)").ops(),
            &[TransformOp::Translate { tx: 100.0, ty: 2.5 }]
        );
    }

    #[test]
    fn test_translate_without_y() {
        let chain = parse("translate(10)");
        assert_eq!(chain.ops(), &[TransformOp::Translate { tx: 10.0, ty: 0.0 }]);
        assert_eq!(chain.scale_translations(0.1).to_string(), "translate(1 0)");
    }

    #[test]
    fn test_adjacent_ops_without_separator() {
        let chain = parse("scale(2)translate(10 20)");
        assert_eq!(
            chain.scale_translations(0.1).to_string(),
            "scale(2) translate(1 2)"
        );
    }

    #[test]
    fn test_surrounding_whitespace() {
        let chain = parse("  translate(4 8)\n");
        assert_eq!(chain.scale_translations(0.25).to_string(), "translate(1 2)");
    }

    #[test]
    fn test_has_translation() {
        assert!(parse("rotate(1) translate(1 1)").has_translation());
        assert!(!parse("rotate(1) scale(2)").has_translation());
    }

    #[test]
    fn test_invalid_chains() {
        for source in [
            "",
            "   ",
            "translate(10 20",
            "translate(a b)",
            "translate(1 2 3)",
            "translate()",
            "(1 2)",
            "rotate(45) garbage",
        ] {
            assert!(
                TransformChain::parse(source).is_err(),
                "`{source}` should not parse"
            );
        }
    }

    #[test]
    fn test_error_message_quotes_source() {
        let err = TransformChain::parse("translate(").unwrap_err();
        assert_eq!(err.to_string(), "invalid transform list `translate(`");
    }
}
