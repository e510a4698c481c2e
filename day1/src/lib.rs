use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use nom_supreme::error::ErrorTree;
use num::{BigInt, Zero};
use thiserror::Error;
use tracing::{debug, info, warn};
use util::{parse_line, parse_number, BadInput, Span};

mod top;

pub use top::TopN;

#[derive(Error, Debug, miette::Diagnostic)]
pub enum BlockError {
    #[error("Unable to read {}", path.display())]
    #[diagnostic(code(day1::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] BadInput),
}

/// How the sequence of group sums is reduced to the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Largest group sum.
    Max,
    /// Sum of the three largest group sums.
    TopThree,
}

/// What happens to a group that is still pending when the input ends without
/// a blank line after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingGroup {
    /// Groups are only flushed by blank lines; a trailing one is discarded.
    #[default]
    Drop,
    /// Flush a pending trailing group once at the end of input.
    Flush,
}

#[derive(Debug, Clone)]
enum Reduction {
    Max(BigInt),
    TopThree(TopN<BigInt, 3>),
}

impl From<Strategy> for Reduction {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            // Starts at zero, so input where every group is negative gives 0.
            Strategy::Max => Reduction::Max(BigInt::zero()),
            Strategy::TopThree => Reduction::TopThree(TopN::new()),
        }
    }
}

impl Reduction {
    fn fold(&mut self, group_sum: BigInt) {
        match self {
            Reduction::Max(max) => {
                if group_sum > *max {
                    *max = group_sum;
                }
            }
            Reduction::TopThree(top) => top.push(group_sum),
        }
    }

    fn finish(self) -> BigInt {
        match self {
            Reduction::Max(max) => max,
            Reduction::TopThree(top) => top.iter().sum(),
        }
    }
}

/// Single pass fold over lines: numbers accumulate into the current group,
/// blank lines flush it into the reduction.
#[derive(Debug, Clone)]
pub struct BlockSummer {
    reduction: Reduction,
    current: BigInt,
    pending: bool,
    line: usize,
    groups: usize,
}

impl BlockSummer {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            reduction: strategy.into(),
            current: BigInt::zero(),
            pending: false,
            line: 0,
            groups: 0,
        }
    }

    /// A lone `\r` inside `raw` also ends a line, so old Mac line endings
    /// split the same way `\n` does.
    pub fn push_line(&mut self, raw: &str) -> Result<(), BlockError> {
        if raw.is_empty() {
            return self.push_single(raw);
        }

        for line in raw.split_terminator('\r') {
            self.push_single(line)?;
        }

        Ok(())
    }

    fn push_single(&mut self, raw: &str) -> Result<(), BlockError> {
        self.line += 1;

        let line = raw.trim();
        if line.is_empty() {
            self.flush();
            return Ok(());
        }

        let n = parse_line(self.line, line, parse_number::<ErrorTree<Span>>)?;
        self.current += n;
        self.pending = true;

        Ok(())
    }

    fn flush(&mut self) {
        debug!(group = self.groups, sum = %self.current, "flushed group");
        let group_sum = std::mem::take(&mut self.current);
        self.reduction.fold(group_sum);
        self.pending = false;
        self.groups += 1;
    }

    pub fn finish(mut self, trailing: TrailingGroup) -> BigInt {
        if self.pending {
            match trailing {
                TrailingGroup::Flush => self.flush(),
                TrailingGroup::Drop => warn!(
                    sum = %self.current,
                    line = self.line,
                    "input does not end with a blank line, dropping last group"
                ),
            }
        }

        self.reduction.finish()
    }
}

pub fn sum_blocks(
    input: impl Iterator<Item = impl Into<String>>,
    strategy: Strategy,
    trailing: TrailingGroup,
) -> Result<BigInt, BlockError> {
    let mut summer = BlockSummer::new(strategy);
    for line in input {
        let line: String = line.into();
        summer.push_line(&line)?;
    }

    Ok(summer.finish(trailing))
}

pub fn max_group_sum(
    input: impl Iterator<Item = impl Into<String>>,
) -> Result<BigInt, BlockError> {
    sum_blocks(input, Strategy::Max, TrailingGroup::Drop)
}

pub fn top_three_sum(
    input: impl Iterator<Item = impl Into<String>>,
) -> Result<BigInt, BlockError> {
    sum_blocks(input, Strategy::TopThree, TrailingGroup::Drop)
}

/// Streams `path` line by line; the file is closed on every return path.
pub fn sum_file(
    path: &Path,
    strategy: Strategy,
    trailing: TrailingGroup,
) -> Result<BigInt, BlockError> {
    let io_error = |source: io::Error| BlockError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    info!(path = %path.display(), ?strategy, ?trailing, "summing groups");

    let mut summer = BlockSummer::new(strategy);
    for line in BufReader::new(file).lines() {
        summer.push_line(&line.map_err(io_error)?)?;
    }

    Ok(summer.finish(trailing))
}

pub fn run(path: impl AsRef<Path>, strategy: Strategy) -> Result<BigInt, BlockError> {
    sum_file(path.as_ref(), strategy, TrailingGroup::Drop)
}
