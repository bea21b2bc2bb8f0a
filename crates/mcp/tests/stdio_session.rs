// End-to-end stdio session against a mock Reddit

use reddit_mcp::{McpServer, ToolDispatcher};
use reddit_mcp_core::{RedditClient, RedditConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post(id: &str) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "title": format!("Post {}", id),
            "author": "pythonista",
            "score": 321,
            "subreddit": "python",
            "permalink": format!("/r/python/comments/{}/post/", id),
            "created_utc": 1_715_000_000.0,
            "num_comments": 12,
            "is_self": true,
            "selftext": "text"
        }
    })
}

async fn mock_reddit() -> MockServer {
    let server = MockServer::start().await;

    let children: Vec<Value> = (0..3).map(|i| post(&format!("p{}", i))).collect();
    Mock::given(method("GET"))
        .and(path("/r/python/hot.json"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {"children": children}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

/// Send each message, in order, through a live stdio loop and collect the
/// responses.
async fn run_session(reddit: &MockServer, messages: &[Value]) -> Vec<Value> {
    let lines: Vec<Vec<u8>> = messages
        .iter()
        .map(|message| serde_json::to_vec(message).unwrap())
        .collect();
    run_raw_session(reddit, &lines).await
}

/// Like `run_session`, but each input line is written as given.
async fn run_raw_session(reddit: &MockServer, input: &[Vec<u8>]) -> Vec<Value> {
    let client = RedditClient::new(&RedditConfig::with_base_url(reddit.uri())).unwrap();
    let server = McpServer::new(ToolDispatcher::new(Arc::new(client)));

    let (client_side, server_side) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let handle = tokio::spawn(async move {
        server
            .serve(BufReader::new(server_read), server_write)
            .await
    });

    let (client_read, mut client_write) = tokio::io::split(client_side);
    for line in input {
        client_write.write_all(line).await.unwrap();
        client_write.write_all(b"\n").await.unwrap();
    }
    client_write.shutdown().await.unwrap();

    let mut responses = Vec::new();
    let mut lines = BufReader::new(client_read).lines();
    while let Some(line) = lines.next_line().await.unwrap() {
        responses.push(serde_json::from_str(&line).unwrap());
    }

    handle.await.unwrap().unwrap();
    responses
}

#[tokio::test]
async fn test_full_session() {
    let reddit = mock_reddit().await;

    let responses = run_session(
        &reddit,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": {"name": "it", "version": "0"}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "get_subreddit_hot_posts",
                "arguments": {"subreddit_name": "python", "limit": 3}
            }}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {
                "name": "get_post_comments",
                "arguments": {"post_id": "missing", "limit": 10}
            }}),
        ],
    )
    .await;

    // The notification produces no output.
    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2025-06-18");

    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 8);

    let posts = responses[2]["result"]["structuredContent"]["result"]
        .as_array()
        .unwrap();
    assert_eq!(posts.len(), 3);
    for post in posts {
        assert!(post["title"].is_string());
        assert_eq!(post["author"], "pythonista");
        assert_eq!(post["score"], 321);
        assert!(post["url"]
            .as_str()
            .unwrap()
            .starts_with("https://www.reddit.com/r/python/comments/"));
    }

    let failed = &responses[3]["result"];
    assert_eq!(failed["isError"], true);
    assert_eq!(
        failed["content"][0]["text"],
        "Error: Failed to fetch comments for post 'missing': subreddit or post not found"
    );
}

#[tokio::test]
async fn test_validation_error_makes_no_request() {
    let reddit = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&reddit)
        .await;

    let responses = run_session(
        &reddit,
        &[json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {
            "name": "get_subreddit_top_posts",
            "arguments": {"subreddit_name": "python", "time_filter": "century"}
        }})],
    )
    .await;

    assert_eq!(responses[0]["result"]["isError"], true);
    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("time_filter"), "{}", text);
}

#[tokio::test]
async fn test_invalid_utf8_line_does_not_end_session() {
    let reddit = MockServer::start().await;

    let responses = run_raw_session(
        &reddit,
        &[
            b"\xff\xfe garbage".to_vec(),
            br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_vec(),
        ],
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[1]["id"], 1);
    assert_eq!(responses[1]["result"], json!({}));
}
