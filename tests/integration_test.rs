use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use physics_question_gen::clients::{CompletionClient, RawGenerationClient, RefinementClient};
use physics_question_gen::config::{Config, EndpointConfig};
use physics_question_gen::logger;
use physics_question_gen::models::{AnswerLetter, Difficulty};
use physics_question_gen::workflow::{
    GenerationRequest, NoProgress, PipelineMode, PipelineStage, QuestionPipeline, RefinementOutcome,
};
use physics_question_gen::GenerationError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_test::{assert_err, assert_ok};

const VELOCITY_TEXT: &str =
    "What is velocity?\nA) Speed\nB) Speed with direction\nC) Acceleration\nD) Force\nANSWER: B";

/// 本地端口上没有服务在监听
const CLOSED_ENDPOINT: &str = "http://127.0.0.1:9/v1";

/// 启动只会返回固定响应的本地 HTTP 服务，返回其地址
async fn spawn_responder(status_line: &'static str, body: String) -> String {
    spawn_counting_responder(status_line, body).await.0
}

/// 同 `spawn_responder`，另外返回收到的请求数
async fn spawn_counting_responder(
    status_line: &'static str,
    body: String,
) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            let counter = counter.clone();
            tokio::spawn(async move {
                read_request(&mut socket).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
                     Connection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), hits)
}

/// 接受连接但从不回复的本地服务
async fn spawn_silent_responder() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}", addr)
}

/// 读完请求头和请求体
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            return;
        }
    }
}

fn velocity_request() -> GenerationRequest {
    GenerationRequest::new("kinematics", Difficulty::Standard).expect("known topic")
}

#[tokio::test]
async fn test_stage1_over_http_falls_back_when_stage2_unreachable() {
    logger::init(false);

    let body = serde_json::json!({ "generated_text": VELOCITY_TEXT }).to_string();
    let stage1_url = spawn_responder("200 OK", body).await;

    let pipeline = QuestionPipeline::with_clients(
        Arc::new(RawGenerationClient::new()),
        Arc::new(RefinementClient::new("deepseek/deepseek-v3")),
        EndpointConfig::new(format!("{}/generate", stage1_url), Some("hf-token".into()), 5_000),
        EndpointConfig::new(CLOSED_ENDPOINT, Some("sk-test".into()), 2_000),
        PipelineMode::TwoStage,
    );

    let report = pipeline.generate(&velocity_request(), &NoProgress).await;

    let question = assert_ok!(report.outcome.clone());
    assert_eq!(question.question_text, "What is velocity?");
    assert_eq!(
        question.options,
        ["Speed", "Speed with direction", "Acceleration", "Force"].map(String::from)
    );
    assert_eq!(question.correct_answer, AnswerLetter::B);
    assert_eq!(report.refinement, RefinementOutcome::FellBack);
    assert_eq!(report.progress.stage, PipelineStage::Complete);
    assert!(!report.advisories.is_empty());
    assert!(report.raw_candidate.is_some());
}

#[tokio::test]
async fn test_stage1_non_success_status_is_remote_error() {
    let body = r#"{"error":"model is loading"}"#.to_string();
    let url = spawn_responder("503 Service Unavailable", body).await;
    let endpoint = EndpointConfig::new(url, None, 5_000);

    let err = assert_err!(RawGenerationClient::new().invoke("prompt", &endpoint).await);
    match err {
        GenerationError::RemoteError { status, message, .. } => {
            assert_eq!(status, Some(503));
            assert!(message.contains("model is loading"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_stage2_server_error_is_not_retried() {
    let body = r#"{"error":{"message":"upstream overloaded"}}"#.to_string();
    let (base_url, hits) = spawn_counting_responder("503 Service Unavailable", body).await;
    let endpoint = EndpointConfig::new(format!("{}/v1", base_url), Some("sk-test".into()), 10_000);

    let started = Instant::now();
    let err = assert_err!(
        RefinementClient::new("deepseek/deepseek-v3")
            .invoke("prompt", &endpoint)
            .await
    );

    assert!(
        matches!(err, GenerationError::RemoteError { .. }),
        "{:?}",
        err
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_stage1_silent_server_times_out_as_unreachable() {
    let url = spawn_silent_responder().await;
    let endpoint = EndpointConfig::new(url, None, 300);

    let err = assert_err!(RawGenerationClient::new().invoke("prompt", &endpoint).await);
    match err {
        GenerationError::Unreachable { message, .. } => assert!(message.contains("请求超时")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_stage2_silent_server_times_out_as_unreachable() {
    let base_url = spawn_silent_responder().await;
    let endpoint = EndpointConfig::new(format!("{}/v1", base_url), Some("sk-test".into()), 300);

    let started = Instant::now();
    let err = assert_err!(
        RefinementClient::new("deepseek/deepseek-v3")
            .invoke("prompt", &endpoint)
            .await
    );

    match err {
        GenerationError::Unreachable { message, .. } => assert!(message.contains("请求超时")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_stage1_closed_port_is_unreachable_and_fatal() {
    let pipeline = QuestionPipeline::with_clients(
        Arc::new(RawGenerationClient::new()),
        Arc::new(RefinementClient::new("deepseek/deepseek-v3")),
        EndpointConfig::new(CLOSED_ENDPOINT, None, 2_000),
        EndpointConfig::new(CLOSED_ENDPOINT, None, 2_000),
        PipelineMode::TwoStage,
    );

    let report = pipeline.generate(&velocity_request(), &NoProgress).await;

    let err = assert_err!(report.outcome);
    assert!(matches!(err, GenerationError::Unreachable { .. }), "{:?}", err);
    assert_eq!(report.progress.stage, PipelineStage::Error);
}

#[tokio::test]
async fn test_direct_mode_over_chat_completion_api() {
    let content = r#"Here you go: {"question":"A ball is dropped from rest. What is its speed after 2 s? (g = 10 m/s^2)","options":["5 m/s","10 m/s","20 m/s","40 m/s"],"correct_answer":"C","explanation":"v = gt = 20 m/s"}"#;
    let body = serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000u64,
        "model": "deepseek/deepseek-v3",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop",
            "logprobs": null
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30 }
    })
    .to_string();
    let base_url = spawn_responder("200 OK", body).await;

    let pipeline = QuestionPipeline::with_clients(
        Arc::new(RawGenerationClient::new()),
        Arc::new(RefinementClient::direct("deepseek/deepseek-v3")),
        EndpointConfig::new(CLOSED_ENDPOINT, None, 2_000),
        EndpointConfig::new(format!("{}/v1", base_url), Some("sk-test".into()), 5_000),
        PipelineMode::DirectOnly,
    );

    let report = pipeline.generate(&velocity_request(), &NoProgress).await;

    let question = assert_ok!(report.outcome.clone());
    assert_eq!(question.correct_answer, AnswerLetter::C);
    assert_eq!(question.correct_option(), "20 m/s");
    assert_eq!(question.explanation.as_deref(), Some("v = gt = 20 m/s"));
    assert_eq!(report.refinement, RefinementOutcome::Skipped);
    assert!(report.raw_candidate.is_none());
}

#[tokio::test]
#[ignore] // 默认忽略，需要真实端点：cargo test -- --ignored
async fn test_live_generation() {
    let config = Config::load().await.expect("加载配置失败");
    logger::init(config.verbose_logging);

    let pipeline = QuestionPipeline::new(&config);
    let report = pipeline.generate(&velocity_request(), &NoProgress).await;

    let question = report.outcome.expect("生成失败");
    println!("{}", question);
    assert_eq!(question.options.len(), 4);
}
