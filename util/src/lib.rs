use std::path::PathBuf;

use clap::Parser;
use nom::{
    character::complete::{digit1, one_of},
    combinator::{map, map_res, opt},
    error::{FromExternalError, ParseError},
    sequence::pair,
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};
use num::{bigint::ParseBigIntError, BigInt};
use tracing_subscriber::EnvFilter;

// Thanks to FasterThanLime! https://fasterthanli.me/series/advent-of-code-2022/part-11

pub type Span<'a> = LocatedSpan<&'a str>;

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("bad input on line {line}")]
#[diagnostic(code(util::bad_input))]
pub struct BadInput {
    pub line: usize,

    #[source_code]
    src: String,

    #[label("{kind}")]
    bad_bit: miette::SourceSpan,

    kind: String,
}

impl BadInput {
    fn from_tree(line: usize, src: &str, tree: ErrorTree<Span>) -> Self {
        let (offset, kind) =
            first_base(tree).unwrap_or_else(|| (0, "unparsable input".to_string()));

        BadInput {
            line,
            src: src.to_string(),
            bad_bit: miette::SourceSpan::new(offset.into(), 0.into()),
            kind,
        }
    }

    /// Byte offset within the line where parsing gave up.
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

fn first_base(tree: ErrorTree<Span>) -> Option<(usize, String)> {
    match tree {
        GenericErrorTree::Base { location, kind } => {
            Some((location.location_offset(), kind.to_string()))
        }
        GenericErrorTree::Stack { base, .. } => first_base(*base),
        GenericErrorTree::Alt(alts) => alts.into_iter().find_map(first_base),
    }
}

/// Decimal integer of any length with an optional `+` or `-` sign.
pub fn parse_number<'a, E>(i: Span<'a>) -> IResult<Span<'a>, BigInt, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, ParseBigIntError>,
{
    map(
        pair(
            opt(one_of("+-")),
            map_res(digit1, |d: Span<'a>| d.fragment().parse::<BigInt>()),
        ),
        |(sign, n)| if sign == Some('-') { -n } else { n },
    )(i)
}

/// Runs `parse_fun` over the whole of `l`, which must be consumed entirely.
/// `line` is the 1-based line number reported on failure.
pub fn parse_line<'a, T, F>(line: usize, l: &'a str, parse_fun: F) -> Result<T, BadInput>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line_span = Span::new(l);
    let parsed: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(line_span);
    parsed.map_err(|e| BadInput::from_tree(line, l, e))
}

#[derive(Parser, Debug)]
#[command(version, about = "Solves one part of a puzzle from its input file")]
pub struct InputArgs {
    /// Puzzle input file
    pub path: PathBuf,
}

/// Logs go to stderr so stdout only ever carries the answer.
/// Filtered by `RUST_LOG`, `warn` when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("1000", 1000)]
    #[case("+42", 42)]
    #[case("-17", -17)]
    #[case("007", 7)]
    fn parse_number_ok(#[case] input: &str, #[case] expected: i64) {
        let res = parse_line(1, input, parse_number::<ErrorTree<Span>>);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), BigInt::from(expected));
    }

    #[rstest]
    #[case("abc", 0)]
    #[case("-", 1)]
    #[case("12a", 2)]
    #[case("1 2", 1)]
    #[case("+-3", 1)]
    fn parse_number_bad(#[case] input: &str, #[case] offset: usize) {
        let err = parse_line(7, input, parse_number::<ErrorTree<Span>>).unwrap_err();
        assert_eq!(err.line, 7);
        assert_eq!(err.offset(), offset);
    }

    #[test]
    fn parse_number_wider_than_i64() {
        let res = parse_line(3, "-100000000000000000000", parse_number::<ErrorTree<Span>>);
        assert!(res.is_ok());
        assert_eq!(
            res.unwrap(),
            "-100000000000000000000".parse::<BigInt>().unwrap()
        );
    }

    #[test]
    fn bad_input_message_names_line() {
        let err = parse_line(12, "x", parse_number::<ErrorTree<Span>>).unwrap_err();
        assert_eq!(err.to_string(), "bad input on line 12");
    }

    #[test]
    fn input_args_takes_one_path() {
        let args = InputArgs::try_parse_from(["part1", "data/input"]).unwrap();
        assert_eq!(args.path, PathBuf::from("data/input"));

        assert!(InputArgs::try_parse_from(["part1"]).is_err());
        assert!(InputArgs::try_parse_from(["part1", "a", "b"]).is_err());
    }
}
