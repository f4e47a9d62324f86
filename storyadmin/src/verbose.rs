//! `-v`/`-q` counting in the manner of clap-verbosity-flag, producing tracing levels

use std::{fmt, marker::PhantomData};

use tracing::{level_filters::LevelFilter, Level};

#[derive(clap::Args, Debug, Clone)]
pub struct Verbosity<L: LogLevel = WarnLevel> {
    #[clap(
        long,
        short = 'v',
        parse(from_occurrences),
        global = true,
        help = L::verbose_help(),
    )]
    verbose: i8,

    #[clap(
        long,
        short = 'q',
        parse(from_occurrences),
        global = true,
        help = L::quiet_help(),
        conflicts_with = "verbose",
    )]
    quiet: i8,

    /// Render spans as an indented tree instead of flat lines
    #[clap(long, global = true)]
    tree: bool,

    #[clap(skip)]
    phantom: PhantomData<L>,
}

impl<L: LogLevel> Verbosity<L> {
    pub fn log_level_filter(&self) -> LevelFilter {
        level_enum(self.verbosity())
            .map(LevelFilter::from_level)
            .unwrap_or(LevelFilter::OFF)
    }

    pub fn tree(&self) -> bool {
        self.tree
    }

    fn verbosity(&self) -> i8 {
        level_value(L::default())
            .saturating_sub(self.quiet)
            .saturating_add(self.verbose)
    }
}

fn level_value(level: Option<Level>) -> i8 {
    match level {
        None => -1,
        Some(Level::ERROR) => 0,
        Some(Level::WARN) => 1,
        Some(Level::INFO) => 2,
        Some(Level::DEBUG) => 3,
        Some(Level::TRACE) => 4,
    }
}

fn level_enum(verbosity: i8) -> Option<Level> {
    match verbosity {
        i8::MIN..=-1 => None,
        0 => Some(Level::ERROR),
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        4..=i8::MAX => Some(Level::TRACE),
    }
}

impl<L: LogLevel> fmt::Display for Verbosity<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verbosity())
    }
}

pub trait LogLevel {
    fn default() -> Option<Level>;

    fn verbose_help() -> Option<&'static str> {
        Some("More output per occurrence")
    }

    fn quiet_help() -> Option<&'static str> {
        Some("Less output per occurrence")
    }
}

/// Warnings by default, the client logs stale answers and odd dates there
#[derive(Copy, Clone, Debug, Default)]
pub struct WarnLevel;

impl LogLevel for WarnLevel {
    fn default() -> Option<Level> {
        Some(Level::WARN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verbosity(verbose: i8, quiet: i8) -> Verbosity {
        Verbosity {
            verbose,
            quiet,
            tree: false,
            phantom: PhantomData,
        }
    }

    #[test]
    fn counts_move_around_the_default() {
        assert_eq!(verbosity(0, 0).log_level_filter(), LevelFilter::WARN);
        assert_eq!(verbosity(2, 0).log_level_filter(), LevelFilter::DEBUG);
        assert_eq!(verbosity(9, 0).log_level_filter(), LevelFilter::TRACE);
        assert_eq!(verbosity(0, 1).log_level_filter(), LevelFilter::ERROR);
        assert_eq!(verbosity(0, 3).log_level_filter(), LevelFilter::OFF);
    }
}
