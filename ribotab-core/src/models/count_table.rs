use std::fmt::{self, Display};
use std::io::{self, Write};

///
/// One line of a count table: a single-base interval [start, end) and its read count
///
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CountRow<'a> {
    pub reference: &'a str,
    pub start: u64,
    pub end: u64,
    pub count: u64,
}

impl Display for CountRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.reference, self.start, self.end, self.count
        )
    }
}

///
/// Per-position counts of one reference sequence, strictly ascending by position.
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CountTable {
    reference: String,
    counts: Vec<(u64, u64)>,
}

impl CountTable {
    pub fn empty(reference: impl Into<String>) -> Self {
        CountTable {
            reference: reference.into(),
            counts: Vec::new(),
        }
    }

    ///
    /// Build a table from unordered (position, count) pairs. Pairs are sorted by position and
    /// repeated positions are summed, so the table never holds duplicate rows.
    ///
    pub fn from_counts(
        reference: impl Into<String>,
        counts: impl IntoIterator<Item = (u64, u64)>,
    ) -> Self {
        let mut counts: Vec<(u64, u64)> = counts.into_iter().collect();
        counts.sort_unstable_by_key(|(position, _)| *position);

        let mut merged: Vec<(u64, u64)> = Vec::with_capacity(counts.len());
        for (position, count) in counts {
            let repeated = merged.last().is_some_and(|(last, _)| *last == position);
            if repeated {
                let index = merged.len() - 1;
                merged[index].1 += count;
            } else {
                merged.push((position, count));
            }
        }

        CountTable {
            reference: reference.into(),
            counts: merged,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts in the table
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn count_at(&self, position: u64) -> u64 {
        self.counts
            .binary_search_by_key(&position, |(p, _)| *p)
            .map(|index| self.counts[index].1)
            .unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = CountRow<'_>> {
        self.counts.iter().map(|(position, count)| CountRow {
            reference: &self.reference,
            start: *position,
            end: *position + 1,
            count: *count,
        })
    }

    ///
    /// Write the table as tab separated rows, one per line, no header.
    ///
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for row in self.rows() {
            writeln!(writer, "{}", row)?;
        }
        Ok(())
    }
}
