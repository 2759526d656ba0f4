//! In-memory table API server used by integration tests.
//!
//! Implements the subset of the table protocol the client exercises: CRUD at
//! `/api/now/table/{table}[/{sys_id}]`, `sysparm_fields` projection,
//! `sysparm_query` equality filtering, and the `result` response envelope.
//! Requests naming an unknown table get a 404, as do reads and writes of an
//! unknown `sys_id`. The `incident` table exists from the start; POSTing to
//! any other table name registers it.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// One table: sys_id to stored record.
pub type Table = HashMap<String, Map<String, Value>>;

/// All tables, keyed by table name.
pub type Db = Arc<RwLock<HashMap<String, Table>>>;

/// Query parameters the server honors.
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub sysparm_fields: Option<String>,
    pub sysparm_query: Option<String>,
}

type ApiError = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let mut tables = HashMap::new();
    tables.insert("incident".to_string(), Table::new());
    let db: Db = Arc::new(RwLock::new(tables));
    Router::new()
        .route("/api/now/table/{table}", get(list_records).post(create_record))
        .route(
            "/api/now/table/{table}/{sys_id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({"error": message})))
}

/// Keep only the comma-separated fields named in `sysparm_fields`; without
/// it the whole record is returned.
fn project(record: &Map<String, Value>, fields: Option<&str>) -> Map<String, Value> {
    match fields {
        None => record.clone(),
        Some(fields) => fields
            .split(',')
            .filter_map(|field| {
                let field = field.trim();
                record.get(field).map(|v| (field.to_string(), v.clone()))
            })
            .collect(),
    }
}

/// True when the record satisfies every `field=value` term of a
/// `^`-separated `sysparm_query`. Terms without `=` never match.
fn matches_query(record: &Map<String, Value>, query: Option<&str>) -> bool {
    let Some(query) = query else { return true };
    query.split('^').all(|term| match term.split_once('=') {
        Some((field, expected)) => match record.get(field) {
            Some(Value::String(s)) => s == expected,
            Some(other) => other.to_string() == expected,
            None => false,
        },
        None => false,
    })
}

async fn list_records(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Value>, ApiError> {
    let tables = db.read().await;
    let records = tables
        .get(&table)
        .ok_or_else(|| not_found("no such table"))?;

    let matches: Vec<Value> = records
        .values()
        .filter(|record| matches_query(record, query.sysparm_query.as_deref()))
        .map(|record| Value::Object(project(record, query.sysparm_fields.as_deref())))
        .collect();
    Ok(Json(json!({"result": matches})))
}

async fn create_record(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(query): Query<TableQuery>,
    Json(mut record): Json<Map<String, Value>>,
) -> (StatusCode, Json<Value>) {
    let sys_id = Uuid::new_v4().simple().to_string();
    record.insert("sys_id".to_string(), Value::String(sys_id.clone()));

    let mut tables = db.write().await;
    tables
        .entry(table)
        .or_default()
        .insert(sys_id, record.clone());
    (
        StatusCode::CREATED,
        Json(json!({"result": project(&record, query.sysparm_fields.as_deref())})),
    )
}

async fn get_record(
    State(db): State<Db>,
    Path((table, sys_id)): Path<(String, String)>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Value>, ApiError> {
    let tables = db.read().await;
    let record = tables
        .get(&table)
        .ok_or_else(|| not_found("no such table"))?
        .get(&sys_id)
        .ok_or_else(|| not_found("no record found"))?;
    Ok(Json(
        json!({"result": project(record, query.sysparm_fields.as_deref())}),
    ))
}

async fn update_record(
    State(db): State<Db>,
    Path((table, sys_id)): Path<(String, String)>,
    Query(query): Query<TableQuery>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let mut tables = db.write().await;
    let record = tables
        .get_mut(&table)
        .ok_or_else(|| not_found("no such table"))?
        .get_mut(&sys_id)
        .ok_or_else(|| not_found("no record found"))?;

    for (field, value) in input {
        if field != "sys_id" {
            record.insert(field, value);
        }
    }
    Ok(Json(
        json!({"result": project(record, query.sysparm_fields.as_deref())}),
    ))
}

async fn delete_record(
    State(db): State<Db>,
    Path((table, sys_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let mut tables = db.write().await;
    tables
        .get_mut(&table)
        .ok_or_else(|| not_found("no such table"))?
        .remove(&sys_id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found("no record found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(f, v)| (f.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn project_keeps_only_named_fields() {
        let rec = record(&[
            ("sys_id", json!("abc")),
            ("name", json!("foo")),
            ("state", json!("1")),
        ]);
        let projected = project(&rec, Some("sys_id,name"));
        assert_eq!(projected.len(), 2);
        assert_eq!(projected["sys_id"], "abc");
        assert!(!projected.contains_key("state"));
    }

    #[test]
    fn project_without_fields_returns_everything() {
        let rec = record(&[("sys_id", json!("abc")), ("name", json!("foo"))]);
        assert_eq!(project(&rec, None), rec);
    }

    #[test]
    fn project_ignores_unknown_fields() {
        let rec = record(&[("sys_id", json!("abc"))]);
        let projected = project(&rec, Some("sys_id,nope"));
        assert_eq!(projected.len(), 1);
    }

    #[test]
    fn matches_query_requires_all_terms() {
        let rec = record(&[("name", json!("foo")), ("state", json!("1"))]);
        assert!(matches_query(&rec, None));
        assert!(matches_query(&rec, Some("name=foo")));
        assert!(matches_query(&rec, Some("name=foo^state=1")));
        assert!(!matches_query(&rec, Some("name=foo^state=2")));
        assert!(!matches_query(&rec, Some("missing=x")));
    }

    #[test]
    fn matches_query_compares_non_string_scalars_textually() {
        let rec = record(&[("priority", json!(3))]);
        assert!(matches_query(&rec, Some("priority=3")));
        assert!(!matches_query(&rec, Some("priority=4")));
    }
}
