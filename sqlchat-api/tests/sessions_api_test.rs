mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::test::TestRequest;
use common::{
    create_completion_response_with_text, create_completion_response_with_tool_call,
    create_session, set_credential, setup_test_app,
};
use serde_json::{json, Value};
use sqlchat_llm_sdk::error::LlmError;

#[actix_rt::test]
async fn test_create_session_reports_state() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;

    let req = TestRequest::post()
        .uri("/api/sessions")
        .set_json(json!({"variant": "query"}))
        .to_request();
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["variant"], "query");
    assert_eq!(body["state"], "idle");
    assert_eq!(body["has_credential"], false);
    assert!(body["database_error"].is_null());
    assert_eq!(test_app.state.sessions.len(), 1);
    Ok(())
}

#[actix_rt::test]
async fn test_ask_without_credential_builds_no_agent() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    let session_id = create_session(&test_app.app, "query").await;

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/ask", session_id))
        .set_json(json!({"question": "anything"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;

    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "missing_credential");
    assert_eq!(body["text"], "Please enter your OpenAI API key.");
    assert_eq!(test_app.factory.builds(), 0);
    assert_eq!(test_app.mock_llm_client.get_call_count(), 0);
    Ok(())
}

#[actix_rt::test]
async fn test_ask_returns_agent_answer_verbatim() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    test_app
        .mock_llm_client
        .push_response(create_completion_response_with_tool_call(
            "sqlite3_reader",
            json!({"mode": {"mode": "query", "query": "SELECT COUNT(*) AS total FROM Track"}}),
        ));
    test_app
        .mock_llm_client
        .push_response(create_completion_response_with_text("3503"));

    let session_id = create_session(&test_app.app, "query").await;
    set_credential(&test_app.app, &session_id, "sk-test").await;

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/ask", session_id))
        .set_json(json!({"question": "How many tracks are there?"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["text"], "3503");
    assert!(body.get("kind").is_none());
    assert_eq!(test_app.mock_llm_client.get_call_count(), 2);

    // The key travels as a value, not through the environment
    assert_eq!(test_app.factory.credentials(), vec!["sk-test".to_string()]);
    assert_ne!(std::env::var("OPENAI_API_KEY").ok().as_deref(), Some("sk-test"));
    Ok(())
}

#[actix_rt::test]
async fn test_agent_is_built_once_per_session() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    let session_id = create_session(&test_app.app, "query").await;
    set_credential(&test_app.app, &session_id, "sk-test").await;

    let req = TestRequest::get()
        .uri(&format!("/api/sessions/{}", session_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    assert_eq!(body["state"], "ready");
    assert_eq!(body["has_credential"], true);
    assert_eq!(test_app.factory.builds(), 0);

    for question in ["How many tracks?", "How many artists?", "Longest track?"] {
        let req = TestRequest::post()
            .uri(&format!("/api/sessions/{}/ask", session_id))
            .set_json(json!({ "question": question }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
        assert_eq!(body["status"], "success");
    }

    assert_eq!(test_app.factory.builds(), 1);

    let req = TestRequest::get()
        .uri(&format!("/api/sessions/{}", session_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    assert_eq!(body["state"], "active");
    Ok(())
}

#[actix_rt::test]
async fn test_sessions_build_their_own_agents() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    let first = create_session(&test_app.app, "query").await;
    let second = create_session(&test_app.app, "query").await;
    set_credential(&test_app.app, &first, "sk-first").await;
    set_credential(&test_app.app, &second, "sk-second").await;

    for session_id in [&first, &second, &first] {
        let req = TestRequest::post()
            .uri(&format!("/api/sessions/{}/ask", session_id))
            .set_json(json!({"question": "How many tracks?"}))
            .to_request();
        test::call_service(&test_app.app, req).await;
    }

    assert_eq!(test_app.factory.builds(), 2);
    assert_eq!(
        test_app.factory.credentials(),
        vec!["sk-first".to_string(), "sk-second".to_string()]
    );
    Ok(())
}

#[actix_rt::test]
async fn test_empty_question_is_a_warning() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    let session_id = create_session(&test_app.app, "query").await;
    set_credential(&test_app.app, &session_id, "sk-test").await;

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/ask", session_id))
        .set_json(json!({"question": "   "}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;

    assert_eq!(body["status"], "warning");
    assert_eq!(body["kind"], "empty_question");
    assert_eq!(body["text"], "Please enter a question.");
    assert_eq!(test_app.mock_llm_client.get_call_count(), 0);
    Ok(())
}

#[actix_rt::test]
async fn test_agent_failure_is_reported_and_session_continues() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    test_app
        .mock_llm_client
        .push_error(LlmError::authentication("Incorrect API key provided"));
    test_app
        .mock_llm_client
        .push_response(create_completion_response_with_text("There are 3 tracks."));

    let session_id = create_session(&test_app.app, "query").await;
    set_credential(&test_app.app, &session_id, "sk-wrong").await;

    let ask = |question: &'static str| {
        TestRequest::post()
            .uri(&format!("/api/sessions/{}/ask", session_id))
            .set_json(json!({ "question": question }))
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&test_app.app, ask("How many tracks?")).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "agent_invocation");
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("Error: "), "unexpected text: {}", text);
    assert!(text.contains("Incorrect API key provided"));

    let body: Value = test::call_and_read_body_json(&test_app.app, ask("How many tracks?")).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["text"], "There are 3 tracks.");
    assert_eq!(test_app.factory.builds(), 1);
    Ok(())
}

#[actix_rt::test]
async fn test_missing_database_blocks_query_session() -> anyhow::Result<()> {
    let test_app = setup_test_app(false).await?;
    let session_id = create_session(&test_app.app, "query").await;

    let req = TestRequest::get()
        .uri(&format!("/api/sessions/{}", session_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    assert!(body["database_error"]
        .as_str()
        .unwrap()
        .ends_with("Chinook.db not found in this directory."));
    assert_eq!(body["state"], "idle");

    set_credential(&test_app.app, &session_id, "sk-test").await;

    for _ in 0..2 {
        let req = TestRequest::post()
            .uri(&format!("/api/sessions/{}/ask", session_id))
            .set_json(json!({"question": "How many tracks are there?"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "database_not_found");
    }

    assert_eq!(test_app.factory.builds(), 0);
    Ok(())
}

#[actix_rt::test]
async fn test_missing_credential_precedes_missing_database() -> anyhow::Result<()> {
    let test_app = setup_test_app(false).await?;
    let session_id = create_session(&test_app.app, "query").await;

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/ask", session_id))
        .set_json(json!({"question": "How many tracks are there?"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    assert_eq!(body["kind"], "missing_credential");

    set_credential(&test_app.app, &session_id, "sk-test").await;

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/ask", session_id))
        .set_json(json!({"question": "  "}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    assert_eq!(body["kind"], "empty_question");

    assert_eq!(test_app.factory.builds(), 0);
    Ok(())
}

#[actix_rt::test]
async fn test_missing_database_halts_chat_session() -> anyhow::Result<()> {
    let test_app = setup_test_app(false).await?;
    let session_id = create_session(&test_app.app, "chat").await;

    let req = TestRequest::get()
        .uri(&format!("/api/sessions/{}", session_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    assert_eq!(body["state"], "halted");

    let req = TestRequest::put()
        .uri(&format!("/api/sessions/{}/credential", session_id))
        .set_json(json!({"api_key": "sk-test"}))
        .to_request();
    let resp = test::call_service(&test_app.app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/messages", session_id))
        .set_json(json!({"content": "How many tracks?"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    assert_eq!(body["outcome"]["kind"], "database_not_found");
    assert_eq!(body["appended"].as_array().unwrap().len(), 0);
    assert_eq!(test_app.factory.builds(), 0);
    Ok(())
}

#[actix_rt::test]
async fn test_chat_transcript_replays_in_order() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    test_app
        .mock_llm_client
        .push_response(create_completion_response_with_text("A1"));
    test_app
        .mock_llm_client
        .push_error(LlmError::internal("model overloaded"));

    let session_id = create_session(&test_app.app, "chat").await;
    set_credential(&test_app.app, &session_id, "sk-test").await;

    let send = |content: &'static str| {
        TestRequest::post()
            .uri(&format!("/api/sessions/{}/messages", session_id))
            .set_json(json!({ "content": content }))
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&test_app.app, send("U1")).await;
    assert_eq!(body["outcome"]["status"], "success");
    assert_eq!(
        body["appended"],
        json!([{"role": "user", "content": "U1"}, {"role": "assistant", "content": "A1"}])
    );

    let body: Value = test::call_and_read_body_json(&test_app.app, send("U2")).await;
    assert_eq!(body["outcome"]["status"], "error");

    // Blank messages are warned about and not recorded
    let body: Value = test::call_and_read_body_json(&test_app.app, send("  ")).await;
    assert_eq!(body["outcome"]["status"], "warning");
    assert_eq!(body["appended"], json!([]));

    let req = TestRequest::get()
        .uri(&format!("/api/sessions/{}/transcript", session_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    let messages = body["messages"].as_array().unwrap();

    let replay: Vec<(&str, &str)> = messages
        .iter()
        .map(|m| (m["role"].as_str().unwrap(), m["content"].as_str().unwrap()))
        .collect();
    assert_eq!(replay.len(), 4);
    assert_eq!(replay[0], ("user", "U1"));
    assert_eq!(replay[1], ("assistant", "A1"));
    assert_eq!(replay[2], ("user", "U2"));
    assert_eq!(replay[3].0, "assistant");
    assert!(replay[3].1.starts_with("Error: "));
    assert!(replay[3].1.contains("model overloaded"));
    Ok(())
}

#[actix_rt::test]
async fn test_chat_without_credential_appends_nothing() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    let session_id = create_session(&test_app.app, "chat").await;

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/messages", session_id))
        .set_json(json!({"content": "How many tracks?"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;

    assert_eq!(body["outcome"]["kind"], "missing_credential");
    assert_eq!(body["appended"], json!([]));
    assert_eq!(test_app.mock_llm_client.get_call_count(), 0);
    Ok(())
}

#[actix_rt::test]
async fn test_runs_record_tool_calls() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    test_app
        .mock_llm_client
        .push_response(create_completion_response_with_tool_call(
            "sqlite3_reader",
            json!({"mode": {"mode": "query", "query": "SELECT COUNT(*) AS total FROM Track"}}),
        ));
    test_app
        .mock_llm_client
        .push_response(create_completion_response_with_text("There are 3 tracks."));

    let session_id = create_session(&test_app.app, "query").await;

    let req = TestRequest::get()
        .uri(&format!("/api/sessions/{}/runs", session_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;
    assert_eq!(body["runs"], json!([]));

    set_credential(&test_app.app, &session_id, "sk-test").await;
    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/ask", session_id))
        .set_json(json!({"question": "How many tracks are there?"}))
        .to_request();
    test::call_service(&test_app.app, req).await;

    let req = TestRequest::get()
        .uri(&format!("/api/sessions/{}/runs", session_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&test_app.app, req).await;

    let runs = body["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert_eq!(run["agent_name"], "sql-agent");
    assert_eq!(run["provider"], "mock");
    assert_eq!(run["user_prompt"], "How many tracks are there?");
    assert_eq!(run["status"], "completed");
    assert_eq!(run["result"], "There are 3 tracks.");

    let roles: Vec<&str> = run["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["user", "assistant", "tool", "assistant"]);

    let tool_calls = run["tool_calls"].as_array().unwrap();
    assert_eq!(tool_calls.len(), 1);
    assert_eq!(tool_calls[0]["tool_name"], "sqlite3_reader");
    assert_eq!(tool_calls[0]["status"], "completed");
    assert!(tool_calls[0]["request"]["mode"]["query"]
        .as_str()
        .unwrap()
        .contains("COUNT(*)"));
    Ok(())
}

#[actix_rt::test]
async fn test_variant_mismatch_is_rejected() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;
    let chat = create_session(&test_app.app, "chat").await;
    let query = create_session(&test_app.app, "query").await;

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/ask", chat))
        .set_json(json!({"question": "How many tracks?"}))
        .to_request();
    assert_eq!(
        test::call_service(&test_app.app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = TestRequest::post()
        .uri(&format!("/api/sessions/{}/messages", query))
        .set_json(json!({"content": "How many tracks?"}))
        .to_request();
    assert_eq!(
        test::call_service(&test_app.app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
    Ok(())
}

#[actix_rt::test]
async fn test_unknown_and_deleted_sessions_are_not_found() -> anyhow::Result<()> {
    let test_app = setup_test_app(true).await?;

    for uri in ["/api/sessions/not-a-uuid", "/api/sessions/00000000-0000-0000-0000-000000000000"] {
        let resp = test::call_service(&test_app.app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    let session_id = create_session(&test_app.app, "chat").await;
    let req = TestRequest::delete()
        .uri(&format!("/api/sessions/{}", session_id))
        .to_request();
    assert_eq!(
        test::call_service(&test_app.app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = TestRequest::get()
        .uri(&format!("/api/sessions/{}/transcript", session_id))
        .to_request();
    assert_eq!(
        test::call_service(&test_app.app, req).await.status(),
        StatusCode::NOT_FOUND
    );
    assert!(test_app.state.sessions.is_empty());
    Ok(())
}

#[actix_rt::test]
async fn test_health_reports_database() -> anyhow::Result<()> {
    let present = setup_test_app(true).await?;
    let body: Value = test::call_and_read_body_json(
        &present.app,
        TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database_present"], true);

    let missing = setup_test_app(false).await?;
    let body: Value = test::call_and_read_body_json(
        &missing.app,
        TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert_eq!(body["database_present"], false);
    Ok(())
}
