//! Synchronous client for a record-oriented HTTP table API.
//!
//! # Overview
//! A remote "table" is a collection of schema-less JSON records reachable at
//! `{base_url}{path}/{table}`, each addressed by its `sys_id` field. Every
//! response nests its payload under a top-level `result` key.
//! [`TableClient`] maps that protocol into typed CRUD and query operations:
//! `save`/`create`/`update`/`get`, `find_many`/`find_one` and their
//! must-exist variants `get_many`/`get_one`, and `delete`.
//!
//! # Design
//! - `TableClient` holds only immutable configuration (base URL, path, table
//!   name, field selector) plus a [`Transport`]; it keeps no per-call state.
//! - The transport executes one HTTP round-trip and reports every status as
//!   data; all status interpretation lives in the client, which is what lets
//!   `find_many` treat a 404 as "no matches" while `get` reports it.
//! - Records are ordered field→value maps ([`Record`]) with no compiled-in
//!   schema; field names are opaque strings.
//!
//! ```no_run
//! use table_core::{Params, TableClient};
//! # fn run(transport: impl table_core::Transport) -> table_core::Result<()> {
//! let client = TableClient::with_fields(
//!     transport,
//!     "https://example.service.com",
//!     "incident",
//!     ["sys_id", "number", "short_description"],
//! )?;
//!
//! let mut params = Params::new();
//! params.append(table_core::SYSPARM_QUERY, "active=true");
//! for incident in client.find_many(&params)? {
//!     println!("{:?}", incident.text("number"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod params;
pub mod record;

pub use client::{TableClient, DEFAULT_PATH, RESULT_KEY};
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use params::{Params, SYSPARM_FIELDS, SYSPARM_QUERY};
pub use record::{Record, SYS_ID};
