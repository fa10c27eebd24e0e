use sqlparser::ast::{self, Expr, FromTable, ObjectNamePart, SetExpr, Statement, TableFactor, TableObject, Value, ValueWithSpan};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::limits::MAX_BATCH_ROWS;
use crate::model::*;

/// Parsed command from SQL input.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// One reservation attempt per VALUES row, in order.
    InsertReservations {
        rows: Vec<(String, Ms)>, // (name, slot)
    },
    DeleteReservation {
        name: String,
        slot: Ms,
    },
    SelectReservation {
        name: String,
        slot: Ms,
    },
    SelectFreeTables {
        slot: Ms,
    },
    SelectReservationCounts,
    SelectAvailability {
        now: Option<Ms>,
    },
}

pub fn parse_sql(sql: &str) -> Result<Command, SqlError> {
    let dialect = PostgreSqlDialect {};
    let stmts = Parser::parse_sql(&dialect, sql).map_err(|e| SqlError::Parse(e.to_string()))?;
    if stmts.is_empty() {
        return Err(SqlError::Empty);
    }

    match &stmts[0] {
        Statement::Insert(insert) => parse_insert(insert),
        Statement::Delete(delete) => parse_delete(delete),
        Statement::Query(query) => parse_select(query),
        other => Err(SqlError::Unsupported(format!("{other}"))),
    }
}

fn parse_insert(insert: &ast::Insert) -> Result<Command, SqlError> {
    let table = insert_table_name(insert)?;
    if table != "reservations" {
        return Err(SqlError::UnknownTable(table));
    }

    let columns: Vec<String> = if insert.columns.is_empty() {
        vec!["name".into(), "slot".into()]
    } else {
        insert.columns.iter().map(|c| c.value.to_lowercase()).collect()
    };
    let name_idx = column_index(&columns, "name")?;
    let slot_idx = column_index(&columns, "slot")?;

    let all_rows = extract_all_insert_rows(insert)?;
    if all_rows.len() > MAX_BATCH_ROWS {
        return Err(SqlError::TooManyRows(all_rows.len()));
    }

    let mut rows = Vec::with_capacity(all_rows.len());
    for (i, row) in all_rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(SqlError::WrongArity("reservations", columns.len(), row.len()));
        }
        let name = parse_string_expr(&row[name_idx])
            .map_err(|e| SqlError::Parse(format!("row {i}: {e}")))?;
        let slot = parse_slot_expr(&row[slot_idx])
            .map_err(|e| SqlError::Parse(format!("row {i}: {e}")))?;
        rows.push((name, slot));
    }
    Ok(Command::InsertReservations { rows })
}

fn parse_delete(delete: &ast::Delete) -> Result<Command, SqlError> {
    let table = delete_table_name(delete)?;
    if table != "reservations" {
        return Err(SqlError::UnknownTable(table));
    }
    let filters = Filters::from_selection(delete.selection.as_ref())?;
    Ok(Command::DeleteReservation {
        name: filters.name.ok_or(SqlError::MissingFilter("name"))?,
        slot: filters.slot.ok_or(SqlError::MissingFilter("slot"))?,
    })
}

fn parse_select(query: &ast::Query) -> Result<Command, SqlError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(s) => s,
        _ => return Err(SqlError::Unsupported("non-SELECT query".into())),
    };

    if select.from.is_empty() {
        return Err(SqlError::Parse("SELECT without FROM".into()));
    }
    let table = table_factor_name(&select.from[0].relation)?;
    let filters = Filters::from_selection(select.selection.as_ref())?;

    match table.as_str() {
        "reservations" => Ok(Command::SelectReservation {
            name: filters.name.ok_or(SqlError::MissingFilter("name"))?,
            slot: filters.slot.ok_or(SqlError::MissingFilter("slot"))?,
        }),
        "free_tables" => Ok(Command::SelectFreeTables {
            slot: filters.slot.ok_or(SqlError::MissingFilter("slot"))?,
        }),
        "reservation_counts" => Ok(Command::SelectReservationCounts),
        "availability" => Ok(Command::SelectAvailability { now: filters.now }),
        _ => Err(SqlError::UnknownTable(table)),
    }
}

/// Equality filters pulled out of an AND-chain. Other predicates are ignored.
#[derive(Debug, Default)]
struct Filters {
    name: Option<String>,
    slot: Option<Ms>,
    now: Option<Ms>,
}

impl Filters {
    fn from_selection(selection: Option<&Expr>) -> Result<Self, SqlError> {
        let mut filters = Filters::default();
        if let Some(expr) = selection {
            filters.collect(expr)?;
        }
        Ok(filters)
    }

    fn collect(&mut self, expr: &Expr) -> Result<(), SqlError> {
        match expr {
            Expr::BinaryOp {
                left,
                op: ast::BinaryOperator::And,
                right,
            } => {
                self.collect(left)?;
                self.collect(right)?;
            }
            Expr::BinaryOp {
                left,
                op: ast::BinaryOperator::Eq,
                right,
            } => match expr_column_name(left).as_deref() {
                Some("name") => self.name = Some(parse_string_expr(right)?),
                Some("slot") => self.slot = Some(parse_slot_expr(right)?),
                Some("now") => self.now = Some(parse_slot_expr(right)?),
                _ => {}
            },
            Expr::Nested(inner) => self.collect(inner)?,
            _ => {}
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn column_index(columns: &[String], name: &'static str) -> Result<usize, SqlError> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or(SqlError::MissingColumn(name))
}

fn object_name_last(name: &ast::ObjectName) -> Option<String> {
    name.0.last().and_then(|part| match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.to_lowercase()),
        _ => None,
    })
}

fn insert_table_name(insert: &ast::Insert) -> Result<String, SqlError> {
    match &insert.table {
        TableObject::TableName(name) => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("unsupported table object in INSERT".into())),
    }
}

fn delete_table_name(delete: &ast::Delete) -> Result<String, SqlError> {
    let tables_with_joins = match &delete.from {
        FromTable::WithFromKeyword(t) | FromTable::WithoutKeyword(t) => t,
    };
    if let Some(first) = tables_with_joins.first() {
        table_factor_name(&first.relation)
    } else {
        Err(SqlError::Parse("DELETE without table".into()))
    }
}

fn table_factor_name(tf: &TableFactor) -> Result<String, SqlError> {
    match tf {
        TableFactor::Table { name, .. } => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("complex table expression".into())),
    }
}

fn extract_all_insert_rows(insert: &ast::Insert) -> Result<Vec<Vec<Expr>>, SqlError> {
    let body = insert
        .source
        .as_ref()
        .ok_or(SqlError::Parse("no VALUES".into()))?;
    match body.body.as_ref() {
        SetExpr::Values(values) => {
            if values.rows.is_empty() {
                return Err(SqlError::Parse("empty VALUES".into()));
            }
            Ok(values.rows.clone())
        }
        _ => Err(SqlError::Parse("expected VALUES".into())),
    }
}

fn expr_column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_lowercase()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|i| i.value.to_lowercase()),
        _ => None,
    }
}

fn extract_value(expr: &Expr) -> Option<&Value> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => Some(value),
        _ => None,
    }
}

fn parse_string_expr(expr: &Expr) -> Result<String, SqlError> {
    match extract_value(expr) {
        Some(Value::SingleQuotedString(s)) => Ok(s.clone()),
        Some(value) => Err(SqlError::Parse(format!("expected string, got {value:?}"))),
        None => Err(SqlError::Parse(format!("expected value, got {expr:?}"))),
    }
}

/// A slot is either Unix ms or a quoted `yyyy-MM-dd HH:mm[:ss]` wall-clock time.
fn parse_slot_expr(expr: &Expr) -> Result<Ms, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Number(s, _) => s
                .parse()
                .map_err(|e| SqlError::Parse(format!("bad timestamp: {e}"))),
            Value::SingleQuotedString(s) => s
                .trim()
                .parse::<Ms>()
                .ok()
                .or_else(|| parse_wall_clock(s))
                .ok_or_else(|| SqlError::Parse(format!("bad timestamp: {s}"))),
            _ => Err(SqlError::Parse(format!("expected timestamp, got {value:?}"))),
        }
    } else if let Expr::UnaryOp {
        op: ast::UnaryOperator::Minus,
        expr,
    } = expr
    {
        parse_slot_expr(expr)?
            .checked_neg()
            .ok_or_else(|| SqlError::Parse("bad timestamp: out of range".into()))
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SqlError {
    Parse(String),
    Empty,
    Unsupported(String),
    UnknownTable(String),
    WrongArity(&'static str, usize, usize),
    MissingColumn(&'static str),
    MissingFilter(&'static str),
    TooManyRows(usize),
}

impl std::fmt::Display for SqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlError::Parse(s) => write!(f, "parse error: {s}"),
            SqlError::Empty => write!(f, "empty query"),
            SqlError::Unsupported(s) => write!(f, "unsupported: {s}"),
            SqlError::UnknownTable(t) => write!(f, "unknown table: {t}"),
            SqlError::WrongArity(t, expected, got) => {
                write!(f, "{t}: expected {expected} values, got {got}")
            }
            SqlError::MissingColumn(col) => write!(f, "missing column: {col}"),
            SqlError::MissingFilter(col) => write!(f, "missing filter: {col}"),
            SqlError::TooManyRows(n) => {
                write!(f, "{n} rows in one INSERT, limit is {MAX_BATCH_ROWS}")
            }
        }
    }
}

impl std::error::Error for SqlError {}
