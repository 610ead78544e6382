//! Task storage.
//!
//! Every lookup is scoped by owner. A task id that belongs to another owner
//! behaves exactly like an id that does not exist.

use super::{millis_at, optional_millis_at, parsed_at, to_millis};
use crate::libs::calendar::day_bounds;
use crate::libs::task::{OwnerId, RecurrencePattern, Task, TaskDraft, TaskFilter, TaskId, TaskStatus};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result, Row};

const TASK_COLUMNS: &str = "id, owner, title, description, category, scheduled_start, scheduled_end, \
     actual_start, actual_end, duration_minutes, actual_duration_minutes, status, is_recurring, \
     recurrence_pattern, template_id, notes, reminder_type, productivity_score, created_at, updated_at";

const INSERT_TASK: &str = "INSERT INTO tasks (owner, title, description, category, scheduled_start, scheduled_end, \
     actual_start, actual_end, duration_minutes, actual_duration_minutes, status, is_recurring, \
     recurrence_pattern, template_id, notes, reminder_type, productivity_score, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18)";

const UPDATE_TASK: &str = "UPDATE tasks SET title = ?3, description = ?4, category = ?5, scheduled_start = ?6, \
     scheduled_end = ?7, actual_start = ?8, actual_end = ?9, duration_minutes = ?10, actual_duration_minutes = ?11, \
     status = ?12, is_recurring = ?13, recurrence_pattern = ?14, notes = ?15, reminder_type = ?16, \
     productivity_score = ?17, updated_at = ?18 WHERE id = ?1 AND owner = ?2";

const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1 AND owner = ?2";

const SELECT_OCCURRENCE: &str = "SELECT 1 FROM tasks WHERE owner = ?1 AND title = ?2 AND scheduled_start = ?3 \
     AND is_recurring = TRUE AND recurrence_pattern = ?4 LIMIT 1";

const CATEGORY_TOTALS: &str = "SELECT category, COUNT(*), \
     SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), SUM(duration_minutes), \
     COALESCE(SUM(actual_duration_minutes), 0), AVG(productivity_score) \
     FROM tasks WHERE owner = ?1 AND scheduled_start >= ?2 AND scheduled_start <= ?3 \
     GROUP BY category ORDER BY COUNT(*) DESC, category IS NULL, category ASC";

/// Per-category sums over a task set; `category` is `None` for uncategorized tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotals {
    pub category: Option<String>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub scheduled_minutes: i64,
    pub actual_minutes: i64,
    pub avg_productivity_score: Option<f64>,
}

/// Identity of a recurring occurrence, used to avoid generating it twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    pub owner: OwnerId,
    pub title: String,
    pub scheduled_start: DateTime<Utc>,
    pub pattern: RecurrencePattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter, sort and paging for task queries.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub owner: OwnerId,
    pub filter: TaskFilter,
    pub ids: Option<Vec<TaskId>>,
    pub statuses: Option<Vec<TaskStatus>>,
    /// Only user-created recurring tasks with a pattern.
    pub templates_only: bool,
    pub scheduled_end_before: Option<DateTime<Utc>>,
    pub require_reminder: bool,
    pub order: SortOrder,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

impl TaskQuery {
    pub fn for_owner(owner: OwnerId) -> Self {
        Self { owner, ..Default::default() }
    }

    pub fn with_filter(owner: OwnerId, filter: TaskFilter) -> Self {
        Self {
            owner,
            filter,
            ..Default::default()
        }
    }

    /// Tasks whose scheduled start lies in `[from, to]`.
    pub fn scheduled_between(owner: OwnerId, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self::with_filter(
            owner,
            TaskFilter {
                scheduled_from: Some(from),
                scheduled_to: Some(to),
                ..Default::default()
            },
        )
    }

    /// Tasks whose scheduled start lies in the half-open `[start, end)`.
    pub fn scheduled_within(owner: OwnerId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::scheduled_between(owner, start, end - Duration::milliseconds(1))
    }

    /// Tasks scheduled to start on `day`.
    pub fn on_day(owner: OwnerId, day: NaiveDate) -> Self {
        let (start, end) = day_bounds(day);
        Self::scheduled_within(owner, start, end)
    }

    pub fn by_ids(owner: OwnerId, ids: Vec<TaskId>) -> Self {
        Self {
            owner,
            ids: Some(ids),
            ..Default::default()
        }
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses = vec!["owner = ?".to_string()];
        let mut values = vec![Value::Integer(self.owner)];

        if let Some(status) = self.filter.status {
            clauses.push("status = ?".to_string());
            values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(category) = &self.filter.category {
            clauses.push("category = ?".to_string());
            values.push(Value::Text(category.clone()));
        }
        if let Some(is_recurring) = self.filter.is_recurring {
            clauses.push("is_recurring = ?".to_string());
            values.push(Value::Integer(is_recurring as i64));
        }
        if let Some(from) = self.filter.scheduled_from {
            clauses.push("scheduled_start >= ?".to_string());
            values.push(Value::Integer(to_millis(from)));
        }
        if let Some(to) = self.filter.scheduled_to {
            clauses.push("scheduled_start <= ?".to_string());
            values.push(Value::Integer(to_millis(to)));
        }
        if let Some(before) = self.scheduled_end_before {
            clauses.push("scheduled_end < ?".to_string());
            values.push(Value::Integer(to_millis(before)));
        }
        if let Some(ids) = &self.ids {
            clauses.push(format!("id IN ({})", vec!["?"; ids.len().max(1)].join(", ")));
            if ids.is_empty() {
                values.push(Value::Null);
            }
            values.extend(ids.iter().map(|id| Value::Integer(*id)));
        }
        if let Some(statuses) = &self.statuses {
            clauses.push(format!("status IN ({})", vec!["?"; statuses.len().max(1)].join(", ")));
            if statuses.is_empty() {
                values.push(Value::Null);
            }
            values.extend(statuses.iter().map(|s| Value::Text(s.as_str().to_string())));
        }
        if self.templates_only {
            clauses.push("is_recurring = TRUE AND recurrence_pattern != 'none' AND template_id IS NULL".to_string());
        }
        if self.require_reminder {
            clauses.push("reminder_type IS NOT NULL".to_string());
        }

        (clauses.join(" AND "), values)
    }
}

pub struct Tasks<'a> {
    conn: &'a Connection,
}

impl<'a> Tasks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Stores a draft and returns the persisted task.
    pub fn insert(&self, draft: &TaskDraft, now: DateTime<Utc>) -> Result<Task> {
        self.conn.execute(
            INSERT_TASK,
            params![
                draft.owner,
                draft.title,
                draft.description,
                draft.category,
                to_millis(draft.scheduled_start),
                to_millis(draft.scheduled_end),
                draft.actual_start.map(to_millis),
                draft.actual_end.map(to_millis),
                draft.duration_minutes,
                draft.actual_duration_minutes,
                draft.status.as_str(),
                draft.is_recurring,
                draft.recurrence_pattern.as_str(),
                draft.template_id,
                draft.notes,
                draft.reminder_type.map(|r| r.as_str()),
                draft.productivity_score,
                to_millis(now),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        self.find_one(draft.owner, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn find_one(&self, owner: OwnerId, id: TaskId) -> Result<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = ?1 AND owner = ?2", TASK_COLUMNS);
        self.conn.query_row(&sql, params![id, owner], task_from_row).optional()
    }

    pub fn find(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let (clause, values) = query.where_clause();
        let direction = match query.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let mut sql = format!(
            "SELECT {} FROM tasks WHERE {} ORDER BY scheduled_start {}, id {}",
            TASK_COLUMNS, clause, direction, direction
        );
        match (query.limit, query.skip) {
            (Some(limit), skip) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, skip.unwrap_or(0))),
            (None, Some(skip)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", skip)),
            (None, None) => {}
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let task_iter = stmt.query_map(params_from_iter(values.iter()), task_from_row)?;
        let mut tasks = Vec::new();
        for task in task_iter {
            tasks.push(task?);
        }

        Ok(tasks)
    }

    pub fn count(&self, query: &TaskQuery) -> Result<i64> {
        let (clause, values) = query.where_clause();
        let sql = format!("SELECT COUNT(*) FROM tasks WHERE {}", clause);
        self.conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))
    }

    /// Groups tasks scheduled in `[from, to]` by category, largest group first.
    /// Equal counts fall back to ascending category with the uncategorized bucket last.
    pub fn category_totals(&self, owner: OwnerId, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<CategoryTotals>> {
        let mut stmt = self.conn.prepare(CATEGORY_TOTALS)?;
        let totals = stmt
            .query_map(params![owner, to_millis(from), to_millis(to)], |row| {
                Ok(CategoryTotals {
                    category: row.get(0)?,
                    total_tasks: row.get(1)?,
                    completed_tasks: row.get(2)?,
                    scheduled_minutes: row.get(3)?,
                    actual_minutes: row.get(4)?,
                    avg_productivity_score: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(totals)
    }

    pub fn occurrence_exists(&self, key: &OccurrenceKey) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                SELECT_OCCURRENCE,
                params![key.owner, key.title, to_millis(key.scheduled_start), key.pattern.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Writes every mutable column of `task`; returns the number of rows changed.
    pub fn update(&self, task: &Task, now: DateTime<Utc>) -> Result<usize> {
        self.conn.execute(
            UPDATE_TASK,
            params![
                task.id,
                task.owner,
                task.title,
                task.description,
                task.category,
                to_millis(task.scheduled_start),
                to_millis(task.scheduled_end),
                task.actual_start.map(to_millis),
                task.actual_end.map(to_millis),
                task.duration_minutes,
                task.actual_duration_minutes,
                task.status.as_str(),
                task.is_recurring,
                task.recurrence_pattern.as_str(),
                task.notes,
                task.reminder_type.map(|r| r.as_str()),
                task.productivity_score,
                to_millis(now),
            ],
        )
    }

    pub fn delete(&self, owner: OwnerId, id: TaskId) -> Result<usize> {
        self.conn.execute(DELETE_TASK, params![id, owner])
    }
}

fn task_from_row(row: &Row) -> Result<Task> {
    let reminder_type: Option<String> = row.get(16)?;
    let reminder_type = match reminder_type {
        Some(raw) => Some(
            raw.parse()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(16, rusqlite::types::Type::Text, Box::new(e)))?,
        ),
        None => None,
    };

    Ok(Task {
        id: row.get(0)?,
        owner: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        scheduled_start: millis_at(row, 5)?,
        scheduled_end: millis_at(row, 6)?,
        actual_start: optional_millis_at(row, 7)?,
        actual_end: optional_millis_at(row, 8)?,
        duration_minutes: row.get(9)?,
        actual_duration_minutes: row.get(10)?,
        status: parsed_at(row, 11)?,
        is_recurring: row.get(12)?,
        recurrence_pattern: parsed_at(row, 13)?,
        template_id: row.get(14)?,
        notes: row.get(15)?,
        reminder_type,
        productivity_score: row.get(17)?,
        created_at: millis_at(row, 18)?,
        updated_at: millis_at(row, 19)?,
    })
}
