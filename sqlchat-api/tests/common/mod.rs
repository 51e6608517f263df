#![allow(dead_code)]

use actix_web::{test, web, App};
use async_trait::async_trait;
use rusqlite::Connection;
use sqlchat_agents::config::SqlAgentSettings;
use sqlchat_agents::factory::{create_sql_agent, AgentFactory};
use sqlchat_agents::orchestrator::{Credential, DatabaseHandle};
use sqlchat_agents::storage::InMemoryStorage;
use sqlchat_agents::Agent;
use sqlchat_api::AppState;
use sqlchat_llm_sdk::client::LlmClient;
use sqlchat_llm_sdk::error::LlmError;
use sqlchat_llm_sdk::tools::ToolCall;
use sqlchat_llm_sdk::types::{CompletionRequest, CompletionResponse, ContentBlock, Role, Usage};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub struct TestApp<S> {
    pub app: S,
    pub state: web::Data<AppState>,
    pub factory: Arc<CountingFactory>,
    pub mock_llm_client: Arc<MockLlmClient>,
    pub db_dir: TempDir,
}

/// Replays queued responses in order, then answers with a fixed text
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    call_count: AtomicUsize,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn push_response(&self, response: CompletionResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn get_call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(create_completion_response_with_text("There are 3 tracks.")),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Builds real SQL agents over the mock client and counts the builds
pub struct CountingFactory {
    client: Arc<MockLlmClient>,
    builds: AtomicUsize,
    credentials: Mutex<Vec<String>>,
}

impl CountingFactory {
    pub fn new(client: Arc<MockLlmClient>) -> Self {
        Self {
            client,
            builds: AtomicUsize::new(0),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Keys the factory was handed, in build order
    pub fn credentials(&self) -> Vec<String> {
        self.credentials.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentFactory for CountingFactory {
    async fn create_agent(
        &self,
        credential: &Credential,
        database: &DatabaseHandle,
    ) -> anyhow::Result<Arc<dyn Agent>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.credentials
            .lock()
            .unwrap()
            .push(credential.expose().to_string());

        let client = self.client.clone() as Arc<dyn LlmClient>;
        let agent = create_sql_agent(
            client,
            Arc::new(InMemoryStorage::new()),
            database.clone(),
            &SqlAgentSettings::default(),
        )
        .await?;
        Ok(Arc::new(agent) as Arc<dyn Agent>)
    }
}

/// Writes a small Chinook-shaped database into `dir`
pub fn setup_chinook_db(dir: &TempDir) -> anyhow::Result<PathBuf> {
    let path = dir.path().join("Chinook.db");
    let conn = Connection::open(&path)?;

    conn.execute_batch(
        r#"
        CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name TEXT);
        CREATE TABLE Track (
            TrackId INTEGER PRIMARY KEY,
            Name TEXT NOT NULL,
            Composer TEXT,
            Milliseconds INTEGER NOT NULL
        );
        INSERT INTO Artist (Name) VALUES ('AC/DC'), ('Accept');
        INSERT INTO Track (Name, Composer, Milliseconds) VALUES
            ('For Those About To Rock', 'Angus Young', 343719),
            ('Balls to the Wall', NULL, 342562),
            ('Fast As a Shark', 'F. Baltes', 230619);
        "#,
    )?;

    Ok(path)
}

pub async fn setup_test_app(
    with_database: bool,
) -> anyhow::Result<
    TestApp<
        impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    >,
> {
    let db_dir = TempDir::new()?;
    let db_path = if with_database {
        setup_chinook_db(&db_dir)?
    } else {
        db_dir.path().join("Chinook.db")
    };

    let mock_llm_client = Arc::new(MockLlmClient::new());
    let factory = Arc::new(CountingFactory::new(mock_llm_client.clone()));
    let state = web::Data::new(AppState::new(
        db_path,
        factory.clone() as Arc<dyn AgentFactory>,
    ));

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(sqlchat_api::configure),
    )
    .await;

    Ok(TestApp {
        app,
        state,
        factory,
        mock_llm_client,
        db_dir,
    })
}

pub fn create_completion_response_with_tool_call(
    tool_name: &str,
    tool_args: serde_json::Value,
) -> CompletionResponse {
    CompletionResponse {
        content: vec![],
        role: Role::Assistant,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
        stop_reason: Some("tool_calls".to_string()),
        tool_calls: Some(vec![ToolCall::new(
            "call_123".to_string(),
            tool_name.to_string(),
            tool_args,
        )]),
    }
}

pub fn create_completion_response_with_text(text: &str) -> CompletionResponse {
    CompletionResponse {
        content: vec![ContentBlock::Text {
            text: text.to_string(),
        }],
        role: Role::Assistant,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
        stop_reason: Some("stop".to_string()),
        tool_calls: None,
    }
}

/// Id of a freshly created session of `variant`
pub async fn create_session<S>(app: &S, variant: &str) -> String
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let req = test::TestRequest::post()
        .uri("/api/sessions")
        .set_json(serde_json::json!({ "variant": variant }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(app, req).await;
    body["session_id"].as_str().unwrap().to_string()
}

pub async fn set_credential<S>(app: &S, session_id: &str, api_key: &str)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let req = test::TestRequest::put()
        .uri(&format!("/api/sessions/{}/credential", session_id))
        .set_json(serde_json::json!({ "api_key": api_key }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success());
}

/// The session cookie a page response set, if any
pub fn session_cookie(
    resp: &actix_web::dev::ServiceResponse,
) -> Option<actix_web::cookie::Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == sqlchat_api::handlers::pages::SESSION_COOKIE)
        .map(|c| c.into_owned())
}

pub async fn read_text(resp: actix_web::dev::ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}
