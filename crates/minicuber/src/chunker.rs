//! Splitting of a requested interval into month-aligned chunks.

use chrono::{Datelike, Duration, Months, NaiveDate};
use cube_common::TimeChunk;

/// Splits intervals into chunks that end on month boundaries.
///
/// A chunk normally runs to the end of the month it starts in. When that
/// would leave it shorter than `min_days` it also takes the next month,
/// and when the rest of the interval would be shorter than `min_days` the
/// chunk absorbs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeChunker {
    min_days: i64,
}

impl Default for TimeChunker {
    fn default() -> Self {
        Self { min_days: 15 }
    }
}

impl TimeChunker {
    pub fn new(min_days: i64) -> Self {
        Self {
            min_days: min_days.max(1),
        }
    }

    pub fn min_days(&self) -> i64 {
        self.min_days
    }

    /// Chunks covering `[start, end]`, inclusive.
    ///
    /// The iterator is lazy and can be cloned to restart from the
    /// current position. `start > end` yields nothing.
    pub fn split(&self, start: NaiveDate, end: NaiveDate) -> TimeChunks {
        TimeChunks {
            cursor: (start <= end).then_some(start),
            end,
            min_days: self.min_days,
        }
    }
}

/// Iterator over the chunks of one interval.
#[derive(Debug, Clone)]
pub struct TimeChunks {
    cursor: Option<NaiveDate>,
    end: NaiveDate,
    min_days: i64,
}

fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?.checked_add_months(Months::new(1))
}

impl Iterator for TimeChunks {
    type Item = TimeChunk;

    fn next(&mut self) -> Option<TimeChunk> {
        let start = self.cursor?;
        let end = self.end;

        let mut boundary = next_month_start(start);
        if let Some(b) = boundary {
            if (b - start).num_days() < self.min_days {
                boundary = next_month_start(b);
            }
        }

        let chunk_end = match boundary {
            Some(b) if b <= end && (end - b).num_days() + 1 >= self.min_days => {
                self.cursor = Some(b);
                b - Duration::days(1)
            }
            _ => {
                self.cursor = None;
                end
            }
        };

        Some(TimeChunk::new(start, chunk_end))
    }
}

impl std::iter::FusedIterator for TimeChunks {}
