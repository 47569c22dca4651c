//! Demo client: plays the widget polling loop against a running gateway.
//! Submits the sample texts concurrently, polls each job every 800ms until it finishes,
//! then prints a summary.
//! Run with gateway up: cargo run --bin demo_client
//! Target defaults to http://127.0.0.1:8010; override with VOICELAB_URL.

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use voicelab_core::SAMPLE_TEXTS;

const DEFAULT_URL: &str = "http://127.0.0.1:8010";
const POLL_INTERVAL: Duration = Duration::from_millis(800);
/// Give up on a job after this many polls (~40s).
const MAX_POLLS: usize = 50;

const VOICES: &[&str] = &["sarah-us-female", "david-us-male", "emma-gb-female"];

enum Outcome {
    Completed(u64),
    Rejected(String),
    Failed(String),
}

#[tokio::main]
async fn main() {
    let base_url = std::env::var("VOICELAB_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    println!(
        "[DEMO CLIENT] Submitting {} sample texts to {} (ensure gateway is running)",
        SAMPLE_TEXTS.len(),
        base_url
    );

    let completed = Arc::new(AtomicU32::new(0));
    let rejected = Arc::new(AtomicU32::new(0));
    let failed = Arc::new(AtomicU32::new(0));
    let latencies: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));

    let client = Client::new();

    let mut handles = Vec::new();
    for (i, text) in SAMPLE_TEXTS.iter().copied().enumerate() {
        let client = client.clone();
        let base_url = base_url.clone();
        let completed = Arc::clone(&completed);
        let rejected = Arc::clone(&rejected);
        let failed = Arc::clone(&failed);
        let latencies = Arc::clone(&latencies);
        let voice = VOICES[i % VOICES.len()];

        let h = tokio::spawn(async move {
            match run_job(&client, &base_url, text, voice).await {
                Outcome::Completed(ms) => {
                    println!("[DEMO CLIENT] #{} completed in {}ms ({})", i, ms, voice);
                    completed.fetch_add(1, Ordering::Relaxed);
                    latencies.lock().await.push(ms);
                }
                Outcome::Rejected(reason) => {
                    println!("[DEMO CLIENT] #{} rejected: {}", i, reason);
                    rejected.fetch_add(1, Ordering::Relaxed);
                }
                Outcome::Failed(reason) => {
                    println!("[DEMO CLIENT] #{} failed: {}", i, reason);
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        });
        handles.push(h);
    }

    for h in handles {
        let _ = h.await;
    }

    let latencies = latencies.lock().await;
    let avg_latency_ms = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<u64>() as f64 / latencies.len() as f64
    };
    println!(
        "[DEMO CLIENT] Completed: {} | Rejected: {} | Failed: {} | Average completion: {:.0}ms",
        completed.load(Ordering::Relaxed),
        rejected.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        avg_latency_ms
    );

    if let Ok(resp) = client.get(format!("{}/api/demo/usage", base_url)).send().await {
        if let Ok(body) = resp.json::<Value>().await {
            let usage = &body["data"]["usage"];
            println!(
                "[DEMO CLIENT] Usage: {} generations, {} characters, limit reached: {}",
                usage["total_generations"], usage["characters_used"], usage["daily_limit_reached"]
            );
        }
    }
}

async fn run_job(client: &Client, base_url: &str, text: &str, voice: &str) -> Outcome {
    let start = Instant::now();
    let body = json!({ "text": text, "voice_id": voice });
    let submitted = match client
        .post(format!("{}/api/demo/generate", base_url))
        .json(&body)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => return Outcome::Failed(e.to_string()),
    };
    let client_error = submitted.status().is_client_error();
    let reply: Value = match submitted.json().await {
        Ok(v) => v,
        Err(e) => return Outcome::Failed(e.to_string()),
    };
    if reply["success"] != true {
        let reason = reply["error"].as_str().unwrap_or("unknown error").to_string();
        return if client_error {
            Outcome::Rejected(reason)
        } else {
            Outcome::Failed(reason)
        };
    }
    let Some(job_id) = reply["data"]["job_id"].as_str().map(str::to_string) else {
        return Outcome::Failed("response carried no job id".to_string());
    };

    let status_url = format!("{}/api/demo/generate", base_url);
    for _ in 0..MAX_POLLS {
        tokio::time::sleep(POLL_INTERVAL).await;
        let resp = match client
            .get(&status_url)
            .query(&[("job_id", job_id.as_str())])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return Outcome::Failed(e.to_string()),
        };
        let status: Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => return Outcome::Failed(e.to_string()),
        };
        match status["data"]["status"].as_str() {
            Some("completed") => return Outcome::Completed(start.elapsed().as_millis() as u64),
            Some("cancelled") => return Outcome::Failed(format!("{} was cancelled", job_id)),
            Some(_) => {}
            None => {
                let reason = status["error"].as_str().unwrap_or("job vanished").to_string();
                return Outcome::Failed(reason);
            }
        }
    }
    Outcome::Failed(format!("{} did not finish in time", job_id))
}
