//! CRUD and query operations over one remote table.
//!
//! # Design
//! `TableClient` composes a transport, a base URL plus table path, and an
//! immutable field selector. Each operation builds exactly one
//! `HttpRequest`, hands it to the transport, and interprets the
//! `HttpResponse` (update is the one exception: a PUT followed by a fresh
//! GET). Nothing is cached or retained between calls, so a single client is
//! shareable across threads whenever its transport is.
//!
//! Status interpretation is deliberately asymmetric: `find_many` translates
//! a 404 into an empty result set because the collection endpoint answers
//! "no matches" that way, while `get` lets a 404 surface as an error because
//! the caller named a specific record that should exist.

use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};
use crate::http::{check_status, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::params::{Params, SYSPARM_FIELDS};
use crate::record::{Record, SYS_ID};

/// Path prefix used when none is given at construction.
pub const DEFAULT_PATH: &str = "/api/now/table";

/// Top-level key under which the server nests every record payload.
pub const RESULT_KEY: &str = "result";

/// Synchronous client for one table of a record-oriented HTTP API.
#[derive(Debug, Clone)]
pub struct TableClient<T> {
    transport: T,
    base_url: String,
    path: String,
    table: String,
    fields: Vec<String>,
}

impl<T: Transport> TableClient<T> {
    /// Client for `table` under [`DEFAULT_PATH`], requesting server-default
    /// fields.
    pub fn new(transport: T, base_url: &str, table: &str) -> Result<Self> {
        Self::with_path_and_fields(transport, base_url, DEFAULT_PATH, table, std::iter::empty::<&str>())
    }

    /// Client for `table` under [`DEFAULT_PATH`] with a field selector.
    pub fn with_fields<I, S>(transport: T, base_url: &str, table: &str, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_path_and_fields(transport, base_url, DEFAULT_PATH, table, fields)
    }

    /// Client for `table` under a custom path prefix.
    pub fn with_path(transport: T, base_url: &str, path: &str, table: &str) -> Result<Self> {
        Self::with_path_and_fields(transport, base_url, path, table, std::iter::empty::<&str>())
    }

    /// Fully explicit constructor; the other three differ only in defaults.
    pub fn with_path_and_fields<I, S>(
        transport: T,
        base_url: &str,
        path: &str,
        table: &str,
        fields: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if is_blank(table) {
            return Err(Error::InvalidArgument("table name must not be blank".to_string()));
        }
        let trimmed = path.trim_matches('/');
        let path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Ok(Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            path,
            table: table.trim().to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Create when the record has no usable `sys_id`, update otherwise.
    pub fn save(&self, record: &Record) -> Result<Record> {
        match record.sys_id() {
            Some(sys_id) if !is_blank(&sys_id) => self.update(record),
            _ => self.create(record),
        }
    }

    /// POST the record to the collection endpoint and return the created
    /// record as the server stored it.
    pub fn create(&self, record: &Record) -> Result<Record> {
        let mut params = Params::new();
        self.apply_field_selector(&mut params);
        let url = self.collection_url(&params);
        trace!(table = %self.table, %url, "create");

        let response = self.execute(HttpMethod::Post, url, Some(serialize(record)?))?;
        check_status(&response)?;
        unwrap_record(&response.body)
    }

    /// PUT the record at its `sys_id`, then fetch and return the result of a
    /// fresh [`get`](Self::get).
    pub fn update(&self, record: &Record) -> Result<Record> {
        let sys_id = record
            .sys_id()
            .filter(|sys_id| !is_blank(sys_id))
            .ok_or_else(|| {
                Error::InvalidArgument("record needs a sys_id to be updated".to_string())
            })?;

        // The PUT response body is discarded in favor of the get() below, so
        // only sys_id is requested back regardless of the field selector.
        let mut params = Params::new();
        params.set(SYSPARM_FIELDS, SYS_ID);
        let url = self.record_url(&sys_id, &params);
        trace!(table = %self.table, %sys_id, %url, "update");

        let response = self.execute(HttpMethod::Put, url, Some(serialize(record)?))?;
        check_status(&response)?;
        self.get(&sys_id)
    }

    /// Fetch one record by `sys_id`.
    ///
    /// A 404 surfaces as [`Error::Http`] here, unlike
    /// [`find_many`](Self::find_many).
    pub fn get(&self, sys_id: &str) -> Result<Record> {
        if is_blank(sys_id) {
            return Err(Error::InvalidArgument("need a sys_id to retrieve".to_string()));
        }
        let mut params = Params::new();
        self.apply_field_selector(&mut params);
        let url = self.record_url(sys_id, &params);
        trace!(table = %self.table, sys_id, %url, "get");

        let response = self.execute(HttpMethod::Get, url, None)?;
        check_status(&response)?;
        unwrap_record(&response.body)
    }

    /// Query the collection endpoint, returning matches in server order.
    ///
    /// The caller's `sysparm_fields` is overridden by the client's selector.
    /// A 404 means "no matches" on this endpoint and yields an empty vec;
    /// every other non-2xx status propagates.
    pub fn find_many(&self, params: &Params) -> Result<Vec<Record>> {
        let mut params = params.clone();
        self.apply_field_selector(&mut params);
        let url = self.collection_url(&params);
        trace!(table = %self.table, %params, %url, "find_many");

        let response = self.execute(HttpMethod::Get, url, None)?;
        if response.status == 404 {
            return Ok(Vec::new());
        }
        check_status(&response)?;
        unwrap_records(&response.body)
    }

    /// Like [`find_many`](Self::find_many) but an empty result is an error.
    pub fn get_many(&self, params: &Params) -> Result<Vec<Record>> {
        let records = self.find_many(params)?;
        if records.is_empty() {
            return Err(Error::IncorrectResultSize {
                expected: 1,
                actual: 0,
            });
        }
        Ok(records)
    }

    /// Query expecting at most one match; two or more is an error.
    pub fn find_one(&self, params: &Params) -> Result<Option<Record>> {
        let mut records = self.find_many(params)?;
        match records.len() {
            0 => Ok(None),
            1 => Ok(records.pop()),
            actual => Err(Error::IncorrectResultSize {
                expected: 1,
                actual,
            }),
        }
    }

    /// Query expecting exactly one match.
    pub fn get_one(&self, params: &Params) -> Result<Record> {
        self.find_one(params)?.ok_or(Error::IncorrectResultSize {
            expected: 1,
            actual: 0,
        })
    }

    /// Delete by the record's `sys_id`; a record without one is a no-op.
    pub fn delete_record(&self, record: &Record) -> Result<()> {
        self.delete(record.sys_id().as_deref().unwrap_or(""))
    }

    /// Delete by `sys_id`. A blank id is a logged no-op, not an error.
    pub fn delete(&self, sys_id: &str) -> Result<()> {
        if is_blank(sys_id) {
            trace!(table = %self.table, "delete received a blank sys_id, nothing to do");
            return Ok(());
        }
        let url = self.record_url(sys_id, &Params::new());
        trace!(table = %self.table, sys_id, %url, "delete");

        let response = self.execute(HttpMethod::Delete, url, None)?;
        check_status(&response)
    }

    fn execute(&self, method: HttpMethod, url: String, body: Option<String>) -> Result<HttpResponse> {
        self.transport.execute(HttpRequest { method, url, body })
    }

    /// Override `sysparm_fields` with the selector; no-op when the selector
    /// is empty so the server falls back to its default field set.
    fn apply_field_selector(&self, params: &mut Params) {
        if !self.fields.is_empty() {
            params.set(SYSPARM_FIELDS, self.fields.join(","));
        }
    }

    fn collection_url(&self, params: &Params) -> String {
        let mut url = format!("{}{}/{}", self.base_url, self.path, self.table);
        append_query(&mut url, params);
        url
    }

    fn record_url(&self, sys_id: &str, params: &Params) -> String {
        let mut url = format!("{}{}/{}/{}", self.base_url, self.path, self.table, sys_id);
        append_query(&mut url, params);
        url
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn append_query(url: &mut String, params: &Params) {
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.query_string());
    }
}

fn serialize(record: &Record) -> Result<String> {
    serde_json::to_string(record).map_err(|e| Error::Serialization(e.to_string()))
}

/// Take the value under [`RESULT_KEY`] out of a JSON response body.
fn parse_envelope(body: &str) -> Result<Value> {
    let mut value: Value = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("response is not valid JSON: {e}")))?;
    match value.get_mut(RESULT_KEY) {
        Some(result) => Ok(result.take()),
        None => Err(Error::MalformedResponse(format!(
            "response has no `{RESULT_KEY}` key"
        ))),
    }
}

fn unwrap_record(body: &str) -> Result<Record> {
    Record::try_from(parse_envelope(body)?).map_err(|other| {
        Error::MalformedResponse(format!("`{RESULT_KEY}` is not an object: {other}"))
    })
}

fn unwrap_records(body: &str) -> Result<Vec<Record>> {
    match parse_envelope(body)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                Record::try_from(item).map_err(|other| {
                    Error::MalformedResponse(format!(
                        "`{RESULT_KEY}` element is not an object: {other}"
                    ))
                })
            })
            .collect(),
        other => Err(Error::MalformedResponse(format!(
            "`{RESULT_KEY}` is not an array: {other}"
        ))),
    }
}
