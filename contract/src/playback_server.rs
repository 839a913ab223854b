use crate::{
    data::{InteractionData, RequestData, ResponseData},
    error::Error,
    forwarder::HttpForwarder,
    markdown,
    playback_configuration::PlaybackConfiguration,
    util,
};
use futures::channel::oneshot;
use hyper::{
    body,
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use serde_json::Value;
use std::{
    convert::Infallible,
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};
use tokio::runtime::Runtime;
use tracing::{debug, error, warn};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InteractionMode {
    Playback,
    Record,
}

/// A local stand-in for the remote service.
///
/// In playback mode it answers with the interactions of a conversation
/// markdown, in the recorded order. In record mode it forwards every request
/// to the configured domain and writes the conversation out on
/// [`PlaybackServer::finish`]. Every server listens on its own ephemeral
/// port, so test cases can run side by side.
#[derive(Debug)]
pub struct PlaybackServer {
    address: SocketAddr,
    state: Arc<SharedState>,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct SharedState {
    configuration: PlaybackConfiguration,
    forwarder: Arc<dyn HttpForwarder + Send + Sync>,
    session: Mutex<Session>,
}

#[derive(Debug, Default)]
struct Session {
    markdown_data: Vec<InteractionData>,
    interaction_number: usize,
    interactions: Vec<InteractionData>,
    error: Option<Error>,
}

impl PlaybackServer {
    pub fn start(configuration: PlaybackConfiguration) -> Result<Self, Error> {
        let markdown_data = match configuration.interaction_mode() {
            InteractionMode::Playback => markdown::load_markdown(configuration.markdown_path())?,
            InteractionMode::Record => {
                if configuration.domain_name().is_none() {
                    return Err(Error::Playback(String::from(
                        "record mode needs the domain name of the real service",
                    )));
                }
                Vec::new()
            }
        };

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))?;
        listener.set_nonblocking(true)?;
        let address = listener.local_addr()?;

        let state = Arc::new(SharedState {
            forwarder: configuration.forwarder(),
            configuration,
            session: Mutex::new(Session {
                markdown_data,
                ..Session::default()
            }),
        });

        let (shutdown, shutdown_signal) = oneshot::channel();
        let runtime = Runtime::new()?;
        let server_state = state.clone();
        let join_handle = thread::Builder::new()
            .name(format!("playback-server-{}", address.port()))
            .spawn(move || runtime.block_on(serve(listener, server_state, shutdown_signal)))?;

        debug!(
            "Playback server ({:?}) listening on {} for {}",
            state.configuration.interaction_mode(),
            address,
            state.configuration.markdown_path().display()
        );

        Ok(Self {
            address,
            state,
            shutdown: Some(shutdown),
            join_handle: Some(join_handle),
        })
    }

    /// Base address to build a `RequestSpec` from.
    pub fn base_address(&self) -> String {
        format!("http://{}/", self.address)
    }

    /// Stops the server and reports the first problem it ran into. In
    /// record mode the conversation is written to the markdown file; in
    /// playback mode every recorded interaction must have been replayed.
    pub fn finish(mut self) -> Result<(), Error> {
        self.stop();

        let mut session = self.state.session.lock()?;
        if let Some(error) = session.error.take() {
            return Err(error);
        }

        match self.state.configuration.interaction_mode() {
            InteractionMode::Record => {
                markdown::save_interactions(
                    self.state.configuration.markdown_path(),
                    &session.interactions,
                )?;
                debug!(
                    "Recorded {} interactions to {}",
                    session.interactions.len(),
                    self.state.configuration.markdown_path().display()
                );
            }
            InteractionMode::Playback => {
                if session.interaction_number < session.markdown_data.len() {
                    return Err(Error::Playback(format!(
                        "only {} of {} recorded interactions were requested",
                        session.interaction_number,
                        session.markdown_data.len()
                    )));
                }
            }
        }

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                error!("Couldn't gracefully shutdown the playback server thread");
            }
        }
    }
}

impl Drop for PlaybackServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn serve(
    listener: TcpListener,
    state: Arc<SharedState>,
    shutdown_signal: oneshot::Receiver<()>,
) {
    let builder = match Server::from_tcp(listener) {
        Ok(builder) => builder,
        Err(e) => {
            error!("Playback server couldn't start: {}", e);
            state.record_error(e.into());
            return;
        }
    };

    let make_service = make_service_fn(move |_| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                handle_request(state.clone(), request)
            }))
        }
    });

    let server = builder
        .http1_keepalive(false)
        .serve(make_service)
        .with_graceful_shutdown(async {
            let _ = shutdown_signal.await;
        });

    if let Err(e) = server.await {
        error!("Playback server error: {}", e);
    }
}

async fn handle_request(
    state: Arc<SharedState>,
    request: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let result = match state.configuration.interaction_mode() {
        InteractionMode::Playback => handle_playback(&state, request).await,
        InteractionMode::Record => handle_record(&state, request).await,
    };

    Ok(match result {
        Ok(response) => response,
        Err(error) => {
            warn!("Playback server answers 500: {}", error);
            state.record_error(error);

            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    })
}

async fn handle_playback(state: &SharedState, request: Request<Body>) -> Result<Response<Body>, Error> {
    let request_data = read_request_data(request).await?;
    let interaction = state.next_recorded_interaction()?;

    let expected = &interaction.request_data;
    if expected.method != request_data.method || expected.uri != request_data.uri {
        return Err(Error::Playback(format!(
            "interaction {} was recorded for {} {}, but got {} {}",
            interaction.interaction_number,
            expected.method,
            expected.uri,
            request_data.method,
            request_data.uri
        )));
    }

    if !same_body(&expected.body, &request_data.body) {
        return Err(Error::Playback(format!(
            "interaction {} was recorded with body {}, but got {}",
            interaction.interaction_number, expected.body, request_data.body
        )));
    }

    let mut response_data = interaction.response_data;
    state
        .configuration
        .playback_response_mutations()
        .apply_to_response(&mut response_data);

    to_response(&response_data)
}

// JSON bodies compare as values, so key order and whitespace don't matter
fn same_body(recorded: &str, received: &str) -> bool {
    match (
        serde_json::from_str::<Value>(recorded),
        serde_json::from_str::<Value>(received),
    ) {
        (Ok(recorded), Ok(received)) => recorded == received,
        _ => recorded.trim() == received.trim(),
    }
}

async fn handle_record(state: &SharedState, request: Request<Body>) -> Result<Response<Body>, Error> {
    let domain_name = state
        .configuration
        .domain_name()
        .ok_or_else(|| Error::Playback(String::from("no domain name to record from")))?;

    let mut request_data = read_request_data(request).await?;
    let response = state.forwarder.forward(domain_name, &request_data).await?;
    let reply = to_response(&response)?;

    let mut response_data = response;
    state
        .configuration
        .record_request_mutations()
        .apply_to_request(&mut request_data);
    state
        .configuration
        .record_response_mutations()
        .apply_to_response(&mut response_data);

    state.push_interaction(request_data, response_data)?;

    Ok(reply)
}

async fn read_request_data(request: Request<Body>) -> Result<RequestData, Error> {
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let headers = util::extract_headers(request.headers());

    let body = body::to_bytes(request.into_body()).await?;

    Ok(RequestData {
        method,
        uri,
        headers,
        body: String::from_utf8_lossy(&body).into(),
    })
}

fn to_response(response_data: &ResponseData) -> Result<Response<Body>, Error> {
    let mut response_builder = Response::builder().status(response_data.status_code);

    if let Some(headers_mut) = response_builder.headers_mut() {
        util::put_headers(headers_mut, util::replayable_headers(&response_data.headers))?;
    }

    Ok(response_builder.body(response_data.body.clone().into())?)
}

impl SharedState {
    fn next_recorded_interaction(&self) -> Result<InteractionData, Error> {
        let mut session = self.session.lock()?;
        let interaction = session
            .markdown_data
            .get(session.interaction_number)
            .cloned()
            .ok_or_else(|| {
                Error::Playback(format!(
                    "all {} recorded interactions were already replayed",
                    session.markdown_data.len()
                ))
            })?;
        session.interaction_number += 1;

        Ok(interaction)
    }

    fn push_interaction(&self, request_data: RequestData, response_data: ResponseData) -> Result<(), Error> {
        let mut session = self.session.lock()?;
        let interaction_number = session.interactions.len();
        session.interactions.push(InteractionData {
            interaction_number,
            request_data,
            response_data,
        });

        Ok(())
    }

    // keeps the first error; later ones are usually its consequences
    fn record_error(&self, error: Error) {
        if let Ok(mut session) = self.session.lock() {
            if session.error.is_none() {
                session.error = Some(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        invoker::{HttpInvoker, ReqwestInvoker},
        request::ContractRequest,
        request_spec::{LogLevel, RequestSpec},
        verifier::{ContentType, Verify},
        Payload,
    };
    use async_trait::async_trait;
    use std::{collections::BTreeMap, fs};

    const USERS_PAGE: &str = "\
## Interaction 0: GET /api/users?page=2

### Request headers recorded for playback:

```
accept: application/json
```

### Request body recorded for playback ():

```
```

### Response headers recorded for playback:

```
content-type: application/json; charset=utf-8
content-length: 64
```

### Response body recorded for playback (200: application/json; charset=utf-8):

```
{\"page\":2,\"data\":[{\"id\":7,\"email\":\"michael.lawson@reqres.in\"}]}
```
";

    const REGISTER: &str = "\
## Interaction 0: POST /api/register

### Request headers recorded for playback:

```
accept: application/json
content-type: application/json
```

### Request body recorded for playback (application/json):

```
{\"email\":\"eve.holt@reqres.in\",\"password\":\"482913057\"}
```

### Response headers recorded for playback:

```
content-type: application/json; charset=utf-8
```

### Response body recorded for playback (200: application/json; charset=utf-8):

```
{\"id\":4,\"token\":\"QpwL5tke4Pnpja7X4\"}
```
";

    #[derive(Debug)]
    struct CannedForwarder;

    #[async_trait]
    impl HttpForwarder for CannedForwarder {
        async fn forward(&self, _domain_name: &str, request_data: &RequestData) -> Result<ResponseData, Error> {
            let mut headers = BTreeMap::new();
            headers.insert(
                String::from("content-type"),
                String::from("application/json; charset=utf-8"),
            );
            headers.insert(String::from("date"), String::from("Wed, 14 Oct 2026 09:00:00 GMT"));

            Ok(ResponseData {
                status_code: 201,
                headers,
                body: request_data.body.replace('}', ",\"id\":\"219\"}"),
            })
        }
    }

    fn write_markdown(contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("conversation.md"), contents).unwrap();
        dir
    }

    fn spec_for(server: &PlaybackServer) -> RequestSpec {
        RequestSpec::build(server.base_address(), LogLevel::None)
    }

    #[test]
    fn replays_recorded_response() {
        let dir = write_markdown(USERS_PAGE);
        let server = PlaybackServer::start(PlaybackConfiguration::playback(dir.path().join("conversation.md"))).unwrap();

        let request = ContractRequest::get("api/users").with_query("page", 2);
        let response = ReqwestInvoker::new().send(&spec_for(&server), &request).unwrap();

        response
            .assert_status(200)
            .and_then(|r| r.assert_content_type(ContentType::Json))
            .and_then(|r| r.assert_field_equals("data.email", vec!["michael.lawson@reqres.in"]))
            .unwrap();
        server.finish().unwrap();
    }

    #[test]
    fn unexpected_request_fails_the_session() {
        let dir = write_markdown(USERS_PAGE);
        let server = PlaybackServer::start(PlaybackConfiguration::playback(dir.path().join("conversation.md"))).unwrap();

        let response = ReqwestInvoker::new()
            .send(&spec_for(&server), &ContractRequest::get("api/users"))
            .unwrap();

        assert_eq!(response.status_code(), 500);
        assert!(matches!(server.finish(), Err(Error::Playback(_))));
    }

    #[test]
    fn unreplayed_interactions_fail_the_session() {
        let dir = write_markdown(USERS_PAGE);
        let server = PlaybackServer::start(PlaybackConfiguration::playback(dir.path().join("conversation.md"))).unwrap();

        assert!(matches!(server.finish(), Err(Error::Playback(_))));
    }

    #[test]
    fn missing_markdown_fails_to_start() {
        let dir = tempfile::tempdir().unwrap();

        let result = PlaybackServer::start(PlaybackConfiguration::playback(dir.path().join("absent.md")));

        assert!(matches!(result, Err(Error::Markdown(_))));
    }

    #[test]
    fn record_mode_needs_a_domain() {
        let dir = tempfile::tempdir().unwrap();
        let configuration = PlaybackConfiguration::new(InteractionMode::Record, dir.path().join("new.md"));

        assert!(matches!(PlaybackServer::start(configuration), Err(Error::Playback(_))));
    }

    #[test]
    fn records_forwarded_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let markdown_path = dir.path().join("recorded").join("create_user.md");
        let mut configuration = PlaybackConfiguration::record(&markdown_path, "https://reqres.in");
        configuration.set_forwarder(Arc::new(CannedForwarder));
        configuration.add_record_response_mutations(|m| m.remove_headers(vec!["date"]));
        let server = PlaybackServer::start(configuration).unwrap();

        let body = Payload::builder()
            .field("name", "Hugh Jass")
            .field("job", "Lead Tactics Liaison")
            .build();
        let response = ReqwestInvoker::new()
            .send(&spec_for(&server), &ContractRequest::post("api/users").with_body(body))
            .unwrap();

        // the caller sees the real answer, mutations only touch the recording
        assert_eq!(response.status_code(), 201);
        assert!(response.header("date").is_some());
        server.finish().unwrap();

        let recorded = markdown::load_markdown(&markdown_path).unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].request_data.method, "POST");
        assert_eq!(recorded[0].request_data.uri, "/api/users");
        assert_eq!(
            recorded[0].request_data.body,
            r#"{"name":"Hugh Jass","job":"Lead Tactics Liaison"}"#
        );
        assert_eq!(recorded[0].response_data.status_code, 201);
        assert!(!recorded[0].response_data.headers.contains_key("date"));
    }

    fn register_with(fields: &[(&str, &str)]) -> ContractRequest {
        let body = Payload::from_fields(fields.iter().copied());
        ContractRequest::post("api/register").with_body(body)
    }

    #[test]
    fn replays_when_body_matches() {
        let dir = write_markdown(REGISTER);
        let server = PlaybackServer::start(PlaybackConfiguration::playback(dir.path().join("conversation.md"))).unwrap();

        let response = ReqwestInvoker::new()
            .send(
                &spec_for(&server),
                &register_with(&[("email", "eve.holt@reqres.in"), ("password", "482913057")]),
            )
            .unwrap();

        assert_eq!(response.status_code(), 200);
        server.finish().unwrap();
    }

    #[test]
    fn different_body_fails_the_session() {
        let dir = write_markdown(REGISTER);
        let server = PlaybackServer::start(PlaybackConfiguration::playback(dir.path().join("conversation.md"))).unwrap();

        let response = ReqwestInvoker::new()
            .send(
                &spec_for(&server),
                &register_with(&[("email", "someone@else.com"), ("password", "482913057")]),
            )
            .unwrap();

        assert_eq!(response.status_code(), 500);
        match server.finish() {
            Err(Error::Playback(message)) => assert!(message.contains("someone@else.com")),
            other => panic!("expected a playback error, got {:?}", other),
        }
    }

    #[test]
    fn extra_body_field_fails_the_session() {
        let dir = write_markdown(REGISTER);
        let server = PlaybackServer::start(PlaybackConfiguration::playback(dir.path().join("conversation.md"))).unwrap();

        let response = ReqwestInvoker::new()
            .send(
                &spec_for(&server),
                &register_with(&[
                    ("email", "eve.holt@reqres.in"),
                    ("password", "482913057"),
                    ("extra", "true"),
                ]),
            )
            .unwrap();

        assert_eq!(response.status_code(), 500);
        assert!(matches!(server.finish(), Err(Error::Playback(_))));
    }

    #[test]
    fn json_bodies_compare_as_values() {
        assert!(same_body(
            r#"{"email":"eve.holt@reqres.in","password":"482913057"}"#,
            r#"{ "password": "482913057", "email": "eve.holt@reqres.in" }"#
        ));
        assert!(!same_body(r#"{"email":"eve.holt@reqres.in"}"#, r#"{"email":"eve.holt@reqres.in","password":"1"}"#));
        assert!(same_body("", "\n"));
        assert!(!same_body("", r#"{"email":"eve.holt@reqres.in"}"#));
    }

    #[test]
    fn records_through_the_hyper_forwarder() {
        let upstream_dir = write_markdown(REGISTER);
        let upstream = PlaybackServer::start(PlaybackConfiguration::playback(upstream_dir.path().join("conversation.md"))).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let markdown_path = dir.path().join("register.md");
        let mut configuration = PlaybackConfiguration::record(&markdown_path, upstream.base_address());
        configuration.add_record_request_mutations(|m| m.remove_headers(vec!["host"]));
        let recorder = PlaybackServer::start(configuration).unwrap();

        let token = ReqwestInvoker::new()
            .send(
                &spec_for(&recorder),
                &register_with(&[("email", "eve.holt@reqres.in"), ("password", "482913057")]),
            )
            .and_then(|response| response.extract("token"))
            .unwrap();

        assert_eq!(token.as_str(), Some("QpwL5tke4Pnpja7X4"));
        recorder.finish().unwrap();
        upstream.finish().unwrap();

        let recorded = markdown::load_markdown(&markdown_path).unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].request_data.uri, "/api/register");
        assert!(!recorded[0].request_data.headers.contains_key("host"));
        assert_eq!(recorded[0].response_data.status_code, 200);
        assert_eq!(recorded[0].response_data.body, r#"{"id":4,"token":"QpwL5tke4Pnpja7X4"}"#);
    }
}
