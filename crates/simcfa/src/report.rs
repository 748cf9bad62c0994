//! Tabulation of a recorded run
//!
//! Every recorded day becomes one [`ReportRow`] holding the quantity and value
//! of each ledger category plus the net worth. The printed table is sampled;
//! the CSV export always has every day.

use std::fmt::Write as _;
use std::path::Path;

use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr};
use jiff::civil::Date;
use simcfa_core::strategies::recorder::{DaySnapshot, format_minor_units};

use crate::util::io::atomic_write;

/// Which recorded days the printed table shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Sampling {
    Day,
    /// Last simulated day of each month
    #[default]
    Month,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    pub quantity: i64,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub n_day: i32,
    pub date: Date,
    /// One entry per report category, in [`Report::categories`] order
    pub totals: Vec<CategoryTotals>,
    pub net_worth: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Every category seen during the run, in order of first appearance
    pub categories: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn from_history(history: &[DaySnapshot]) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for snapshot in history {
            for category in snapshot.ledger.categories() {
                if !categories.contains(&category.key) {
                    categories.push(category.key.clone());
                }
            }
        }

        let rows = history
            .iter()
            .map(|snapshot| {
                let totals = categories
                    .iter()
                    .map(|key| CategoryTotals {
                        quantity: snapshot.ledger.total_quantity(key),
                        value: snapshot.ledger.category_value(key, snapshot.n_day),
                    })
                    .collect();
                ReportRow {
                    n_day: snapshot.n_day,
                    date: snapshot.day_date,
                    totals,
                    net_worth: snapshot.ledger.net_worth(snapshot.n_day),
                }
            })
            .collect();

        Self { categories, rows }
    }

    pub fn sampled(&self, sampling: Sampling) -> Vec<&ReportRow> {
        match sampling {
            Sampling::Day => self.rows.iter().collect(),
            Sampling::Month => self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, row)| {
                    self.rows
                        .get(i + 1)
                        .is_none_or(|next| (next.date.year(), next.date.month()) != (row.date.year(), row.date.month()))
                })
                .map(|(_, row)| row)
                .collect(),
        }
    }

    /// Fixed-width table of category values and net worth.
    pub fn render_table(&self, sampling: Sampling) -> String {
        const WIDTH: usize = 16;
        let mut out = String::new();

        let _ = write!(out, "{:>6} {:<10}", "day", "date");
        for key in &self.categories {
            let _ = write!(out, " {key:>WIDTH$}");
        }
        let _ = writeln!(out, " {:>WIDTH$}", "net worth");

        for row in self.sampled(sampling) {
            let _ = write!(out, "{:>6} {:<10}", row.n_day, row.date);
            for totals in &row.totals {
                let _ = write!(out, " {:>WIDTH$}", format_minor_units(totals.value));
            }
            let _ = writeln!(out, " {:>WIDTH$}", format_minor_units(row.net_worth));
        }
        out
    }

    /// Every day as CSV: `n_day`, `date`, a count and a value column per category, `net_worth`.
    pub fn to_csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        let mut header = vec!["n_day".to_string(), "date".to_string()];
        for key in &self.categories {
            header.push(format!("{key} - count"));
            header.push(format!("{key} - value"));
        }
        header.push("net_worth".to_string());
        wtr.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.n_day.to_string(), row.date.to_string()];
            for totals in &row.totals {
                record.push(totals.quantity.to_string());
                record.push(format_minor_units(totals.value));
            }
            record.push(format_minor_units(row.net_worth));
            wtr.write_record(&record)?;
        }

        let data = wtr.into_inner().wrap_err("failed to flush CSV writer")?;
        String::from_utf8(data).wrap_err("CSV output is not valid UTF-8")
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let csv = self.to_csv()?;
        atomic_write(path, &csv).wrap_err_with(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "history exported");
        Ok(())
    }
}
