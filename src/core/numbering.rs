//! Year-scoped ticket numbers
//!
//! Numbers look like `OFF-2025-0042`. The sequence is zero-padded to four
//! digits and widens past 9999 (`OFF-2025-10000`). Each calendar year starts
//! again at 1.

use crate::error::{OfficeTicketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed prefix shared by every ticket number
pub const TICKET_PREFIX: &str = "OFF";

/// Minimum width of the sequence part
const SEQUENCE_WIDTH: usize = 4;

/// A ticket number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketNo {
    year: i32,
    sequence: u32,
}

impl TicketNo {
    pub const fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Prefix shared by all numbers of `year`, e.g. `OFF-2025-`
    pub fn year_prefix(year: i32) -> String {
        format!("{TICKET_PREFIX}-{year:04}-")
    }
}

impl fmt::Display for TicketNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            Self::year_prefix(self.year),
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for TicketNo {
    type Err = OfficeTicketError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || OfficeTicketError::InvalidTicketNo(s.to_string());
        let mut parts = s.trim().split('-');
        let (Some(prefix), Some(year), Some(sequence), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if !prefix.eq_ignore_ascii_case(TICKET_PREFIX)
            || year.len() != 4
            || sequence.len() < SEQUENCE_WIDTH
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !sequence.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self {
            year: year.parse().map_err(|_| invalid())?,
            sequence: sequence.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for TicketNo {
    type Error = OfficeTicketError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TicketNo> for String {
    fn from(value: TicketNo) -> Self {
        value.to_string()
    }
}

/// Number following `latest` within `year`
///
/// `latest` is the greatest number already stored for `year`, if any. A value
/// from a different year is ignored, so the first ticket of a new year is
/// always sequence 1.
pub fn next_ticket_no(latest: Option<&TicketNo>, year: i32) -> TicketNo {
    let sequence = latest
        .filter(|last| last.year == year)
        .map_or(1, |last| last.sequence.saturating_add(1));
    TicketNo::new(year, sequence)
}
