use core::{fmt, iter};

use crate::{block::BlockState, table::BlockTable};

/// Two parallel renderings of the arena, one character per unit.
///
/// `occupancy` shows `#` for allocated units and `.` for free ones. `ids`
/// repeats the decimal block id across each allocated block, so ids of two
/// or more digits make that row wider than the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryView {
    occupancy: String,
    ids: String,
}

impl MemoryView {
    pub(crate) fn of(table: &BlockTable) -> Self {
        let mut occupancy = String::with_capacity(table.capacity());
        let mut ids = String::with_capacity(table.capacity());
        for block in table {
            match block.state() {
                BlockState::Free => {
                    occupancy.extend(iter::repeat_n('.', block.size()));
                    ids.extend(iter::repeat_n('.', block.size()));
                }
                BlockState::Allocated(id) => {
                    occupancy.extend(iter::repeat_n('#', block.size()));
                    ids.push_str(&id.to_string().repeat(block.size()));
                }
            }
        }
        Self { occupancy, ids }
    }

    #[must_use]
    pub fn occupancy(&self) -> &str {
        &self.occupancy
    }

    #[must_use]
    pub fn ids(&self) -> &str {
        &self.ids
    }
}

impl fmt::Display for MemoryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.occupancy)?;
        write!(f, "[{}]", self.ids)
    }
}
