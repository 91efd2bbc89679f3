//! Catalog query filters.
//!
//! A [`QueryFilter`] carries up to two predicates: country-code membership and
//! a minimum advertised speed. [`QueryFilter::push_where`] appends them to a
//! `QueryBuilder` as bound parameters; values are never formatted into SQL.

use std::collections::BTreeSet;
use std::fmt;

use sqlx::{QueryBuilder, Sqlite};

use crate::config::BITS_PER_MBIT;

/// Which catalog records a query should return.
///
/// An empty country set and a missing speed threshold both mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    countries: BTreeSet<String>,
    min_speed_mbps: Option<u32>,
}

impl QueryFilter {
    /// A filter that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to the given country codes (matched case-insensitively).
    ///
    /// Blank codes are ignored.
    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.countries.extend(
            countries
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .filter(|c| !c.is_empty()),
        );
        self
    }

    /// Restricts results to records whose speed exceeds `mbps` megabits per second.
    pub fn with_min_speed_mbps(mut self, mbps: u32) -> Self {
        self.min_speed_mbps = Some(mbps);
        self
    }

    /// Normalized (uppercase) country codes.
    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    /// Speed threshold in bits per second, if any.
    pub fn min_speed_bps(&self) -> Option<i64> {
        self.min_speed_mbps
            .map(|mbps| i64::from(mbps) * BITS_PER_MBIT)
    }

    /// True when the filter restricts nothing.
    pub fn is_unrestricted(&self) -> bool {
        self.countries.is_empty() && self.min_speed_mbps.is_none()
    }

    /// Appends a `WHERE` clause for the active predicates, if any.
    pub(crate) fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        let mut has_where = false;

        if !self.countries.is_empty() {
            builder.push(" WHERE country_short IN (");
            let mut separated = builder.separated(", ");
            for country in &self.countries {
                separated.push_bind(country.clone());
            }
            separated.push_unseparated(")");
            has_where = true;
        }

        if let Some(min_speed) = self.min_speed_bps() {
            builder.push(if has_where { " AND " } else { " WHERE " });
            builder.push("speed > ");
            builder.push_bind(min_speed);
        }
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unrestricted() {
            return f.write_str("any");
        }
        let mut parts = Vec::new();
        if !self.countries.is_empty() {
            parts.push(format!(
                "country in {}",
                self.countries.iter().cloned().collect::<Vec<_>>().join(",")
            ));
        }
        if let Some(mbps) = self.min_speed_mbps {
            parts.push(format!("speed > {mbps} Mbps"));
        }
        f.write_str(&parts.join(", "))
    }
}
