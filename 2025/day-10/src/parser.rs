use std::fmt::Display;
use std::str::FromStr;

use chumsky::prelude::*;
use itertools::Itertools;
use miette::{miette, Result};

use crate::model::{Button, Puzzle, Row};

type Extra<'a> = extra::Err<Rich<'a, char>>;

/// Decimal integer that reports overflow as a parse error instead of panicking.
fn number<'a, T>() -> impl Parser<'a, &'a str, T, Extra<'a>> + Clone
where
    T: FromStr,
    T::Err: Display,
{
    text::int(10).try_map(|s: &str, span| s.parse::<T>().map_err(|e| Rich::custom(span, e)))
}

fn parser<'a>() -> impl Parser<'a, &'a str, Vec<Puzzle>, Extra<'a>> {
    // Custom whitespace parser that excludes newlines
    let hspace = one_of(" \t").repeated();

    let light = choice((just('.').to(false), just('#').to(true)));

    // [.##.]
    let diagram = light
        .repeated()
        .collect::<Vec<bool>>()
        .map(|v| v.into_iter().collect::<Row>())
        .delimited_by(just('['), just(']'));

    // (0,2,3) or ()
    let button = number::<usize>()
        .padded_by(hspace.clone())
        .separated_by(just(','))
        .collect::<Vec<usize>>()
        .delimited_by(just('('), just(')'))
        .map(Button::new);

    let buttons = button
        .padded_by(hspace.clone())
        .repeated()
        .collect::<Vec<_>>();

    // {3,5,4,7}
    let joltage = number::<u64>()
        .padded_by(hspace.clone())
        .separated_by(just(','))
        .collect::<Vec<u64>>()
        .delimited_by(just('{'), just('}'));

    let machine = diagram
        .then_ignore(hspace.clone())
        .then(buttons)
        .then(joltage.padded_by(hspace.clone()).or_not())
        .then_ignore(hspace)
        .map(|((lights, buttons), joltage)| Puzzle {
            lights,
            buttons,
            joltage,
        });

    machine
        .separated_by(text::newline().repeated().at_least(1))
        .allow_trailing()
        .collect::<Vec<_>>()
        .padded()
}

/// Parses one machine per line.
#[tracing::instrument(skip(input), fields(bytes = input.len()))]
pub fn parse(input: &str) -> Result<Vec<Puzzle>> {
    let puzzles = parser().parse(input).into_result().map_err(|errs| {
        miette!(
            "Parse failed: {}",
            errs.iter().map(|e| format!("{e} at {:?}", e.span())).join("; ")
        )
    })?;
    tracing::debug!(machines = puzzles.len(), "parsed");
    Ok(puzzles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    const SAMPLE: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";

    #[test]
    fn parses_the_sample() -> Result<()> {
        let puzzles = parse(SAMPLE)?;
        assert_eq!(puzzles.len(), 3);

        let first = &puzzles[0];
        assert_eq!(first.lights, bitvec![usize, Lsb0; 0, 1, 1, 0]);
        assert_eq!(first.num_buttons(), 6);
        assert_eq!(first.buttons[1].positions(), &[1, 3]);
        assert_eq!(first.joltage.as_deref(), Some(&[3, 5, 4, 7][..]));

        assert_eq!(puzzles[2].num_positions(), 6);
        Ok(())
    }

    #[test]
    fn joltage_is_optional() -> Result<()> {
        let puzzles = parse("[#.] (0) (0,1)\n")?;
        assert_eq!(puzzles.len(), 1);
        assert_eq!(puzzles[0].joltage, None);
        Ok(())
    }

    #[test]
    fn tolerates_blank_lines_and_spacing() -> Result<()> {
        let puzzles = parse("\n[#]   ( 0 )\t{ 1, 2 }  \r\n\n[.] () \n\n")?;
        assert_eq!(puzzles.len(), 2);
        assert_eq!(puzzles[0].joltage, Some(vec![1, 2]));
        assert!(puzzles[1].buttons[0].positions().is_empty());
        Ok(())
    }

    #[test]
    fn keeps_out_of_range_positions_for_the_solvers_to_drop() -> Result<()> {
        let puzzles = parse("[..] (0,5)")?;
        assert_eq!(puzzles[0].buttons[0].positions(), &[0, 5]);
        Ok(())
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("[.x.] (0)").is_err());
        assert!(parse("[..] (0,").is_err());
    }

    #[test]
    fn rejects_overflowing_numbers() {
        assert!(parse("[.] {99999999999999999999999}").is_err());
    }
}
