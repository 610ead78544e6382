use super::{millis_at, parsed_at, to_millis};
use crate::libs::summary::{ProductivitySummary, SummaryKind};
use crate::libs::task::OwnerId;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

const UPSERT_SUMMARY: &str = "INSERT INTO productivity_summaries (owner, kind, period_start, period_end, \
     total_productive_time, average_productivity, most_productive_category, least_productive_category, \
     category_breakdown, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
     ON CONFLICT (owner, kind, period_start) DO UPDATE SET period_end = excluded.period_end, \
     total_productive_time = excluded.total_productive_time, average_productivity = excluded.average_productivity, \
     most_productive_category = excluded.most_productive_category, \
     least_productive_category = excluded.least_productive_category, \
     category_breakdown = excluded.category_breakdown, updated_at = excluded.updated_at";

const SUMMARY_COLUMNS: &str = "id, owner, kind, period_start, period_end, total_productive_time, average_productivity, \
     most_productive_category, least_productive_category, category_breakdown, updated_at";

pub struct Summaries<'a> {
    conn: &'a Connection,
}

impl<'a> Summaries<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Stores `summary`, replacing the existing row for the same owner, kind and period start.
    pub fn upsert(&self, summary: &ProductivitySummary, now: DateTime<Utc>) -> Result<ProductivitySummary> {
        let breakdown =
            serde_json::to_string(&summary.category_breakdown).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.conn.execute(
            UPSERT_SUMMARY,
            params![
                summary.owner,
                summary.kind.as_str(),
                summary.period_start,
                summary.period_end,
                summary.total_productive_time,
                summary.average_productivity,
                summary.most_productive_category,
                summary.least_productive_category,
                breakdown,
                to_millis(now),
            ],
        )?;

        self.find_one(summary.owner, summary.kind, summary.period_start)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn find_one(&self, owner: OwnerId, kind: SummaryKind, period_start: NaiveDate) -> Result<Option<ProductivitySummary>> {
        let sql = format!(
            "SELECT {} FROM productivity_summaries WHERE owner = ?1 AND kind = ?2 AND period_start = ?3",
            SUMMARY_COLUMNS
        );
        self.conn
            .query_row(&sql, params![owner, kind.as_str(), period_start], summary_from_row)
            .optional()
    }

    pub fn list(&self, owner: OwnerId, kind: SummaryKind) -> Result<Vec<ProductivitySummary>> {
        let sql = format!(
            "SELECT {} FROM productivity_summaries WHERE owner = ?1 AND kind = ?2 ORDER BY period_start ASC",
            SUMMARY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let summaries = stmt
            .query_map(params![owner, kind.as_str()], summary_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(summaries)
    }

    pub fn count(&self, owner: OwnerId) -> Result<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM productivity_summaries WHERE owner = ?1",
            params![owner],
            |row| row.get(0),
        )
    }
}

fn summary_from_row(row: &Row) -> Result<ProductivitySummary> {
    let breakdown: String = row.get(9)?;
    let category_breakdown = serde_json::from_str(&breakdown)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(ProductivitySummary {
        id: row.get(0)?,
        owner: row.get(1)?,
        kind: parsed_at(row, 2)?,
        period_start: row.get(3)?,
        period_end: row.get(4)?,
        total_productive_time: row.get(5)?,
        average_productivity: row.get(6)?,
        most_productive_category: row.get(7)?,
        least_productive_category: row.get(8)?,
        category_breakdown,
        updated_at: millis_at(row, 10)?,
    })
}
