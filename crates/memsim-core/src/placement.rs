//! Placement strategies.
//!
//! A strategy looks at the free blocks of a [`BlockTable`] and picks the one
//! that should satisfy a request. Strategies never mutate the table; the
//! engine decides what to do with the result.
//!
//! | Strategy    | Picks                                   | Ties           |
//! |-------------|-----------------------------------------|----------------|
//! | `FirstFit`  | lowest address that fits                | n/a            |
//! | `BestFit`   | smallest leftover (`size - requested`)  | lowest address |
//! | `WorstFit`  | largest leftover                        | lowest address |

use core::{cmp::Reverse, str::FromStr};

use crate::{
    error::{EngineError, UnknownAlgorithmSnafu},
    table::{BlockRef, BlockTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Placement {
    #[display("first-fit")]
    FirstFit,
    #[display("best-fit")]
    BestFit,
    #[display("worst-fit")]
    WorstFit,
}

impl Placement {
    pub const ALL: [Self; 3] = [Self::FirstFit, Self::BestFit, Self::WorstFit];

    /// Short name accepted on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstFit => "first",
            Self::BestFit => "best",
            Self::WorstFit => "worst",
        }
    }

    /// Picks a free block of at least `size` units, or `None` if no free
    /// block is large enough.
    #[must_use]
    pub fn choose(self, table: &BlockTable, size: usize) -> Option<BlockRef> {
        let mut candidates = table.candidates(size);
        match self {
            Self::FirstFit => candidates.next(),
            // `min_by_key` keeps the first of equal elements.
            Self::BestFit => candidates.min_by_key(|c| c.block().size() - size),
            // `max_by_key` keeps the last maximum, so `Reverse(start)` makes
            // the lowest address win ties.
            Self::WorstFit => {
                candidates.max_by_key(|c| (c.block().size() - size, Reverse(c.block().start())))
            }
        }
    }
}

impl FromStr for Placement {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let placement = match s.to_ascii_lowercase().as_str() {
            "first" | "first-fit" | "firstfit" => Self::FirstFit,
            "best" | "best-fit" | "bestfit" => Self::BestFit,
            "worst" | "worst-fit" | "worstfit" => Self::WorstFit,
            _ => return UnknownAlgorithmSnafu { name: s }.fail(),
        };
        Ok(placement)
    }
}

impl TryFrom<&str> for Placement {
    type Error = EngineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{block::BlockId, error::ErrorKind};

    /// Builds a table whose free blocks have the given sizes, separated by
    /// one-unit allocated blocks.
    fn table_with_free_sizes(sizes: &[usize]) -> BlockTable {
        let capacity = sizes.iter().sum::<usize>() + sizes.len() - 1;
        let mut table = BlockTable::new(capacity);
        let mut holes = vec![];
        let mut id = BlockId::FIRST;
        for &size in &sizes[..sizes.len() - 1] {
            let index = table.len() - 1;
            table.split_allocate(index, size, id);
            holes.push(id);
            table.split_allocate(index + 1, 1, id.next());
            id = id.next().next();
        }
        for hole in holes {
            let index = table.find_allocated(hole).unwrap();
            table.release(index);
        }
        assert_eq!(table.coalesce(), 0);
        assert_eq!(table.validate(), Ok(()));
        table
    }

    fn chosen_start(placement: Placement, table: &BlockTable, size: usize) -> Option<usize> {
        placement.choose(table, size).map(|c| c.block().start())
    }

    #[test]
    fn test_fixture_layout() {
        let table = table_with_free_sizes(&[10, 4, 20]);
        let free: Vec<_> = table
            .iter()
            .filter(|b| b.is_free())
            .map(|b| (b.start(), b.size()))
            .collect();
        assert_eq!(free, [(0, 10), (11, 4), (16, 20)]);
    }

    #[test]
    fn test_choose_from_mixed_sizes() {
        let table = table_with_free_sizes(&[10, 4, 20]);
        assert_eq!(chosen_start(Placement::FirstFit, &table, 5), Some(0));
        assert_eq!(chosen_start(Placement::BestFit, &table, 5), Some(0));
        assert_eq!(chosen_start(Placement::WorstFit, &table, 5), Some(16));
    }

    #[test]
    fn test_best_fit_prefers_tight_block() {
        let table = table_with_free_sizes(&[10, 4, 20]);
        assert_eq!(chosen_start(Placement::FirstFit, &table, 4), Some(0));
        assert_eq!(chosen_start(Placement::BestFit, &table, 4), Some(11));
        assert_eq!(chosen_start(Placement::WorstFit, &table, 4), Some(16));
    }

    #[test]
    fn test_ties_go_to_lowest_address() {
        let table = table_with_free_sizes(&[8, 8, 8]);
        for placement in Placement::ALL {
            assert_eq!(chosen_start(placement, &table, 3), Some(0), "{placement}");
        }
    }

    #[test]
    fn test_no_candidate() {
        let table = table_with_free_sizes(&[10, 4, 20]);
        for placement in Placement::ALL {
            assert_eq!(chosen_start(placement, &table, 21), None);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("first".parse::<Placement>().unwrap(), Placement::FirstFit);
        assert_eq!("BEST".parse::<Placement>().unwrap(), Placement::BestFit);
        assert_eq!(Placement::try_from("worst-fit").unwrap(), Placement::WorstFit);
        for placement in Placement::ALL {
            assert_eq!(placement.name().parse::<Placement>().unwrap(), placement);
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = "median".parse::<Placement>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAlgorithm);
        assert!(err.to_string().contains("`median`"));
    }
}
