use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use nom::{
    branch::alt,
    character::complete::char,
    combinator::{map, value},
    error::ParseError,
    sequence::separated_pair,
    IResult,
};
use nom_supreme::error::ErrorTree;
use thiserror::Error;
use tracing::{debug, info};
use util::{parse_line, BadInput, Span};

#[derive(Error, Debug, miette::Diagnostic)]
pub enum RoundError {
    #[error("Unable to read {}", path.display())]
    #[diagnostic(code(day2::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] BadInput),
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Shape {
    Rock,
    Paper,
    Scissors,
}

impl Shape {
    fn value(&self) -> u64 {
        match self {
            Self::Rock => 1,
            Self::Paper => 2,
            Self::Scissors => 3,
        }
    }

    /// The shape this one defeats.
    fn beats(&self) -> Self {
        match self {
            Self::Rock => Self::Scissors,
            Self::Paper => Self::Rock,
            Self::Scissors => Self::Paper,
        }
    }

    /// The shape that defeats this one.
    fn beaten_by(&self) -> Self {
        match self {
            Self::Rock => Self::Paper,
            Self::Paper => Self::Scissors,
            Self::Scissors => Self::Rock,
        }
    }

    /// What to play against `opponent` to get `outcome`.
    fn for_outcome(opponent: Self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Lose => opponent.beats(),
            Outcome::Draw => opponent,
            Outcome::Win => opponent.beaten_by(),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Outcome {
    Lose,
    Draw,
    Win,
}

impl Outcome {
    fn of(mine: Shape, opponent: Shape) -> Self {
        if mine == opponent {
            Self::Draw
        } else if mine.beats() == opponent {
            Self::Win
        } else {
            Self::Lose
        }
    }

    fn value(&self) -> u64 {
        match self {
            Self::Lose => 0,
            Self::Draw => 3,
            Self::Win => 6,
        }
    }
}

/// Second column of the guide, meaning depends on the strategy.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Code {
    X,
    Y,
    Z,
}

/// How the second column is read.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Strategy {
    /// X, Y, Z are the shape to play.
    Shape,
    /// X, Y, Z are the outcome to aim for.
    Outcome,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Round {
    pub opponent: Shape,
    pub code: Code,
}

impl Round {
    fn my_shape(&self, strategy: Strategy) -> Shape {
        match (strategy, self.code) {
            (Strategy::Shape, Code::X) => Shape::Rock,
            (Strategy::Shape, Code::Y) => Shape::Paper,
            (Strategy::Shape, Code::Z) => Shape::Scissors,
            (Strategy::Outcome, Code::X) => Shape::for_outcome(self.opponent, Outcome::Lose),
            (Strategy::Outcome, Code::Y) => Shape::for_outcome(self.opponent, Outcome::Draw),
            (Strategy::Outcome, Code::Z) => Shape::for_outcome(self.opponent, Outcome::Win),
        }
    }

    pub fn score(&self, strategy: Strategy) -> u64 {
        let mine = self.my_shape(strategy);
        mine.value() + Outcome::of(mine, self.opponent).value()
    }
}

fn parse_shape<'a, E: ParseError<Span<'a>>>(i: Span<'a>) -> IResult<Span<'a>, Shape, E> {
    alt((
        value(Shape::Rock, char('A')),
        value(Shape::Paper, char('B')),
        value(Shape::Scissors, char('C')),
    ))(i)
}

fn parse_code<'a, E: ParseError<Span<'a>>>(i: Span<'a>) -> IResult<Span<'a>, Code, E> {
    alt((
        value(Code::X, char('X')),
        value(Code::Y, char('Y')),
        value(Code::Z, char('Z')),
    ))(i)
}

/// `"A X"`: opponent's shape, a single space, then the code.
pub fn parse_round<'a, E: ParseError<Span<'a>>>(i: Span<'a>) -> IResult<Span<'a>, Round, E> {
    map(
        separated_pair(parse_shape, char(' '), parse_code),
        |(opponent, code)| Round { opponent, code },
    )(i)
}

/// Scores rounds one line at a time, keeping only the running total.
#[derive(Debug, Clone)]
pub struct Scorer {
    strategy: Strategy,
    total: u64,
    line: usize,
}

impl Scorer {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            total: 0,
            line: 0,
        }
    }

    pub fn push_line(&mut self, raw: &str) -> Result<(), RoundError> {
        self.line += 1;

        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let round = parse_line(self.line, line, parse_round::<ErrorTree<Span>>)?;
        let score = round.score(self.strategy);
        debug!(line = self.line, ?round, score, "scored round");
        self.total += score;

        Ok(())
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

pub fn total_score(
    input: impl Iterator<Item = impl Into<String>>,
    strategy: Strategy,
) -> Result<u64, RoundError> {
    let mut scorer = Scorer::new(strategy);
    for line in input {
        let line: String = line.into();
        scorer.push_line(&line)?;
    }

    Ok(scorer.total())
}

/// Streams `path` line by line; the file is closed on every return path.
pub fn run(path: impl AsRef<Path>, strategy: Strategy) -> Result<u64, RoundError> {
    let path = path.as_ref();
    let io_error = |source: io::Error| RoundError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    info!(path = %path.display(), ?strategy, "scoring strategy guide");

    let mut scorer = Scorer::new(strategy);
    for line in BufReader::new(file).lines() {
        scorer.push_line(&line.map_err(io_error)?)?;
    }

    Ok(scorer.total())
}
