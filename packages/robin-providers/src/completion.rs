use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{Error, Result};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Sends one system + user exchange to an OpenAI-compatible chat completions endpoint and returns
/// the assistant text.
pub async fn complete(
	cfg: &robin_config::LlmProviderConfig,
	system_instructions: &str,
	user_content: &str,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "system", "content": system_instructions },
			{ "role": "user", "content": user_content },
		],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		let text = res.text().await.unwrap_or_default();

		return Err(status_error(status, &text));
	}

	let json: Value = res.json().await?;

	parse_completion_response(json)
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> Error {
	let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();

	if status == StatusCode::TOO_MANY_REQUESTS {
		return Error::RateLimited { message };
	}

	Error::Status { status: status.as_u16(), message }
}

fn parse_completion_response(json: Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing message content.".to_string(),
		})?;

	if let Some(text) = content.as_str() {
		return Ok(text.to_string());
	}

	// Some servers return content as an array of typed parts.
	if let Some(parts) = content.as_array() {
		let text: String =
			parts.iter().filter_map(|part| part.get("text").and_then(|t| t.as_str())).collect();

		return Ok(text);
	}

	Err(Error::InvalidResponse { message: "Completion content is not text.".to_string() })
}

#[cfg(test)]
mod tests {
	use serde_json::Map;
	use tokio::{
		io::{AsyncReadExt, AsyncWriteExt},
		net::TcpListener,
	};

	use super::*;

	fn provider_config(api_base: String) -> robin_config::LlmProviderConfig {
		robin_config::LlmProviderConfig {
			provider_id: "test".to_string(),
			api_base,
			api_key: "key".to_string(),
			path: "/v1/chat/completions".to_string(),
			model: "m".to_string(),
			temperature: 0.0,
			timeout_ms: 5_000,
			default_headers: Map::new(),
		}
	}

	async fn serve_once(listener: TcpListener, response: String) {
		let (mut socket, _) = listener.accept().await.expect("accept failed");
		let mut buf = Vec::new();
		let mut chunk = [0_u8; 1_024];

		loop {
			let read = socket.read(&mut chunk).await.expect("read failed");

			if read == 0 {
				break;
			}

			buf.extend_from_slice(&chunk[..read]);

			let text = String::from_utf8_lossy(&buf);

			if let Some(header_end) = text.find("\r\n\r\n") {
				let content_length = text[..header_end]
					.lines()
					.find_map(|line| {
						let (name, value) = line.split_once(':')?;

						name.eq_ignore_ascii_case("content-length")
							.then(|| value.trim().parse::<usize>().ok())
							.flatten()
					})
					.unwrap_or(0);

				if buf.len() >= header_end + 4 + content_length {
					break;
				}
			}
		}

		socket.write_all(response.as_bytes()).await.expect("write failed");
		socket.shutdown().await.ok();
	}

	#[test]
	fn parses_string_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "role": "assistant", "content": "1, 4, 2" } }
			]
		});

		assert_eq!(parse_completion_response(json).expect("parse failed"), "1, 4, 2");
	}

	#[test]
	fn joins_content_parts() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": [
					{ "type": "text", "text": "Chunk " },
					{ "type": "text", "text": "analysis" }
				] } }
			]
		});

		assert_eq!(parse_completion_response(json).expect("parse failed"), "Chunk analysis");
	}

	#[test]
	fn missing_choices_is_invalid_response() {
		let err = parse_completion_response(serde_json::json!({ "error": "nope" }))
			.expect_err("Expected invalid response.");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}

	#[test]
	fn maps_too_many_requests_to_rate_limited() {
		assert!(status_error(StatusCode::TOO_MANY_REQUESTS, "quota").is_rate_limited());

		let err = status_error(StatusCode::BAD_GATEWAY, "upstream");

		assert!(!err.is_rate_limited());
		assert!(matches!(err, Error::Status { status: 502, .. }));
	}

	#[tokio::test]
	async fn http_429_surfaces_as_rate_limited() {
		let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
		let addr = listener.local_addr().expect("local addr");
		let response = "HTTP/1.1 429 Too Many Requests\r\ncontent-type: text/plain\r\ncontent-length: 4\r\nconnection: close\r\n\r\nslow"
			.to_string();
		let server = tokio::spawn(serve_once(listener, response));
		let cfg = provider_config(format!("http://{addr}"));
		let err = complete(&cfg, "system", "user").await.expect_err("Expected rate limit.");

		server.await.expect("server task failed");

		assert!(err.is_rate_limited(), "Unexpected error: {err}");
	}

	#[tokio::test]
	async fn successful_response_returns_content() {
		let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
		let addr = listener.local_addr().expect("local addr");
		let body = r#"{"choices":[{"message":{"role":"assistant","content":"refined query"}}]}"#;
		let response = format!(
			"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
			body.len()
		);
		let server = tokio::spawn(serve_once(listener, response));
		let cfg = provider_config(format!("http://{addr}"));
		let text = complete(&cfg, "system", "user").await.expect("completion failed");

		server.await.expect("server task failed");

		assert_eq!(text, "refined query");
	}
}
