//! Full record lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every client
//! operation over real HTTP through a ureq-backed `Transport`. Validates the
//! client's URL building, envelope unwrapping, and status handling
//! end-to-end against an actual server.

use table_core::{
    Error, HttpMethod, HttpRequest, HttpResponse, Params, Record, TableClient, Transport,
    SYSPARM_QUERY,
};

/// Executes requests with ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses come back as data, letting the client interpret statuses
/// itself.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> table_core::Result<HttpResponse> {
        let HttpRequest { method, url, body } = request;
        let mut response = match (method, body) {
            (HttpMethod::Get, _) => self.agent.get(&url).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&url).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&url).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&url).send_empty(),
        }
        .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Ok(HttpResponse { status, body })
    }
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn record_lifecycle() {
    let base_url = start_server();
    let transport = UreqTransport::new();
    let client = TableClient::with_fields(
        &transport,
        &base_url,
        "incident",
        ["sys_id", "short_description", "state"],
    )
    .unwrap();

    // Step 1: empty table, every query operation agrees.
    let params = Params::new();
    assert!(client.find_many(&params).unwrap().is_empty());
    assert!(client.find_one(&params).unwrap().is_none());
    assert!(matches!(
        client.get_one(&params).unwrap_err(),
        Error::IncorrectResultSize {
            expected: 1,
            actual: 0
        }
    ));
    assert!(matches!(
        client.get_many(&params).unwrap_err(),
        Error::IncorrectResultSize { .. }
    ));

    // Step 2: save without sys_id dispatches to create.
    let mut input = Record::new();
    input.set("short_description", "one").set("state", "1");
    let created = client.save(&input).unwrap();
    let sys_id = created.sys_id().expect("server assigns a sys_id");
    assert_eq!(created.text("short_description").as_deref(), Some("one"));

    // Step 3: get returns the same selected fields create returned.
    let fetched = client.get(&sys_id).unwrap();
    assert_eq!(fetched, created);

    // Step 4: save with sys_id dispatches to update; the result comes from a
    // fresh get and reflects the new state.
    let mut changed = fetched.clone();
    changed.set("state", "2");
    let updated = client.save(&changed).unwrap();
    assert_eq!(updated.sys_id().as_deref(), Some(sys_id.as_str()));
    assert_eq!(updated.text("state").as_deref(), Some("2"));

    // Step 5: queries see exactly one match.
    let mut params = Params::new();
    params.append(SYSPARM_QUERY, "state=2");
    assert_eq!(client.find_many(&params).unwrap().len(), 1);
    assert_eq!(
        client.get_one(&params).unwrap().sys_id().as_deref(),
        Some(sys_id.as_str())
    );
    assert_eq!(client.get_many(&params).unwrap().len(), 1);

    // Step 6: a query matching nothing is empty, not an error.
    let mut none_match_params = Params::new();
    none_match_params.append(SYSPARM_QUERY, "state=999");
    assert!(client.find_many(&none_match_params).unwrap().is_empty());
    assert!(client.find_one(&none_match_params).unwrap().is_none());

    // Step 7: a second record makes single-record queries ambiguous.
    let mut second = Record::new();
    second.set("short_description", "two").set("state", "2");
    client.create(&second).unwrap();
    let err = client.find_one(&params).unwrap_err();
    assert!(matches!(
        err,
        Error::IncorrectResultSize {
            expected: 1,
            actual: 2
        }
    ));

    // Step 8: delete by record, then get reports the 404.
    client.delete_record(&updated).unwrap();
    let err = client.get(&sys_id).unwrap_err();
    assert!(err.is_status(404));

    // Step 9: blank-id deletes are silent no-ops.
    client.delete("").unwrap();

    // Step 10: a collection query against an unknown table is "no matches".
    let missing_table = TableClient::new(&transport, &base_url, "no_such_table").unwrap();
    assert!(missing_table.find_many(&Params::new()).unwrap().is_empty());
}
