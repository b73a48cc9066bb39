//! Walk through the originality server API.
//!
//! Start a server first, e.g. offline with the stub provider:
//! `ORIGINALITY__PROVIDER__MODE=fast cargo run -p originality-server`

use reqwest::Client;
use serde_json::{json, Value};

const SERVER_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();
    let api_key = std::env::var("ORIGINALITY_API_KEY").unwrap_or_default();

    println!("1. Readiness:");
    let resp = client.get(format!("{SERVER_URL}/ready")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    let text = "In today's fast-paced world, it is important to note that \
                effective communication plays a crucial role in success.";

    println!("2. Originality check:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/originality"))
        .header("X-API-Key", &api_key)
        .json(&json!({ "text": text }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    let body: Value = resp.json().await?;
    println!("Body: {}", serde_json::to_string_pretty(&body)?);
    println!();

    println!("3. Paraphrase with re-check:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/paraphrase"))
        .header("X-API-Key", &api_key)
        .json(&json!({ "text": text, "recheck": true }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    let body: Value = resp.json().await?;
    println!("Body: {}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
