//! Session replay driver: pumps a recorded pose trace through the coaching
//! engine at its recorded cadence and prints LLM feedback as it arrives.
//!
//! The trace stands in for the browser pose-estimation callback; everything
//! downstream (window, trigger, prompt, LLM call) is the real pipeline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::mpsc;

use reha_coach::config::Config;
use reha_coach::engine::{CoachEngine, FeedbackRequest};
use reha_coach::exercise::ExerciseKind;
use reha_coach::llm::LlmClient;
use reha_coach::pose::PoseModel;
use reha_coach::replay::{self, TraceFrame};

const CONFIG_PATH: &str = "coach.toml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let trace_path = match args.next() {
        Some(path) => path,
        None => bail!("usage: reha-coach <trace.jsonl> [exercise]"),
    };
    let exercise_name = args.next().unwrap_or_else(|| "squat".to_string());

    let config = Config::load_or_default(CONFIG_PATH);
    let model = match PoseModel::parse(&config.pose.model) {
        Some(model) => model,
        None => bail!("unknown pose model: {}", config.pose.model),
    };
    let kind = match ExerciseKind::parse(&exercise_name) {
        Some(kind) => kind,
        None => {
            tracing::warn!(
                "unknown exercise {:?}, falling back to the generic template",
                exercise_name
            );
            ExerciseKind::Generic
        }
    };

    println!("=== Reha Coach - Session Replay ===");
    println!("Trace: {}", trace_path);
    println!("Exercise: {}", kind.name());
    println!("Model: {}", model.name());
    println!(
        "Window: {}ms / min {} frames",
        config.window.window_ms, config.window.min_frames
    );
    println!("Feedback interval: {}s", config.feedback.interval_secs(kind));
    println!();

    let frames = replay::load_trace(&trace_path)?;
    if frames.is_empty() {
        bail!("empty trace: {}", trace_path);
    }
    println!("Loaded {} frames", frames.len());

    let mut engine = CoachEngine::new(model, kind, &config);
    let client = Arc::new(LlmClient::from_config(&config.llm));

    // 再生タスク: 記録時刻の間隔どおりにフレームを流す
    let (frame_tx, mut frame_rx) = mpsc::channel::<TraceFrame>(16);
    tokio::spawn(async move {
        let mut prev_t: Option<f64> = None;
        for frame in frames {
            if let Some(prev) = prev_t {
                let gap_ms = (frame.t_ms - prev).max(0.0);
                tokio::time::sleep(Duration::from_millis(gap_ms as u64)).await;
            }
            prev_t = Some(frame.t_ms);
            if frame_tx.send(frame).await.is_err() {
                break;
            }
        }
    });

    let (done_tx, mut done_rx) = mpsc::channel::<(u64, Result<String>)>(1);
    let mut tick = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            maybe_frame = frame_rx.recv() => {
                let Some(trace_frame) = maybe_frame else { break };
                let Some(pose) = replay::to_pose(model, &trace_frame) else {
                    tracing::debug!(
                        "frame at {}ms does not match the {} schema, skipped",
                        trace_frame.t_ms,
                        model.name()
                    );
                    continue;
                };
                if let Some(FeedbackRequest { generation, prompt }) = engine.on_frame(trace_frame.t_ms, &pose) {
                    let client = Arc::clone(&client);
                    let done_tx = done_tx.clone();
                    tokio::task::spawn_blocking(move || {
                        let result = client.generate_feedback(&prompt);
                        let _ = done_tx.blocking_send((generation, result));
                    });
                }
            }
            Some((generation, result)) = done_rx.recv() => {
                if let Some(text) = engine.on_feedback(generation, result) {
                    println!("[feedback] {}", text);
                }
            }
            _ = tick.tick() => {
                engine.tick_second();
                let remaining = engine.cooldown_remaining_secs();
                if remaining > 0 {
                    eprintln!("cooldown: {}s", remaining);
                }
            }
        }
    }

    // 飛行中の応答を回収してから終了
    drop(done_tx);
    while let Some((generation, result)) = done_rx.recv().await {
        if let Some(text) = engine.on_feedback(generation, result) {
            println!("[feedback] {}", text);
        }
    }

    println!("Replay finished");
    Ok(())
}
