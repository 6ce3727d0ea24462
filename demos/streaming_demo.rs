//! Streaming Demo: Feeds a simulated model response into an in-memory editor.
//!
//! Tokens arrive every few milliseconds as growing snapshots; a
//! `FrameClock` paces `on_frame` at ~60 FPS. Set `RUST_LOG=stream_editor=debug`
//! to watch the fast paths and reveal decisions.

use anyhow::Context;
use futures::executor::block_on;
use std::time::{Duration, Instant};
use stream_editor::surface::memory::{MemoryHighlighterFactory, MemorySurface};
use stream_editor::{
    DarkModeSignal, EditorOptions, FrameClock, StreamEditor, TextModel, UpdateEffects,
};
use tracing_subscriber::EnvFilter;

/// Sample code to stream (simulating a model response).
const SAMPLE_CODE: &str = r#"use std::collections::HashMap;

/// Count word frequencies in `text`.
fn word_counts(text: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for word in text.split_whitespace() {
        *counts.entry(word).or_insert(0) += 1;
    }
    counts
}

fn main() {
    let text = "the quick brown fox jumps over the lazy dog the end";
    let mut counts: Vec<_> = word_counts(text).into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (word, count) in counts {
        println!("{word:>8} {count}");
    }
}
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let signal = DarkModeSignal::new(true);
    let mut editor = StreamEditor::new(
        MemorySurface::new(),
        MemoryHighlighterFactory::new(),
        EditorOptions::default(),
        &signal,
    )?;
    block_on(editor.create_editor("demo".to_owned(), "", "rust"))?;

    let mut clock = FrameClock::new(Duration::from_millis(16));
    let token_interval = Duration::from_millis(4);

    let chars: Vec<char> = SAMPLE_CODE.chars().collect();
    let mut index = 0;
    let mut content = String::new();
    let mut last_token = Instant::now();
    let mut updates = 0u64;
    let mut appends = 0u64;
    let mut skipped = 0u64;
    let mut idle_frames = 0u32;

    // Keep ticking until the stream is done and the view has settled.
    let frames = clock
        .run(|tick| {
            while index < chars.len() && tick.at.duration_since(last_token) >= token_interval {
                // 1-4 chars per "token"
                let size = ((index * 7) % 4) + 1;
                let end = (index + size).min(chars.len());
                content.extend(&chars[index..end]);
                index = end;
                editor.update_code(content.clone(), Some("rust"));
                updates += 1;
                last_token += token_interval;
            }

            let effects = editor.on_frame(tick.at);
            skipped += tick.skipped;
            if effects.contains(UpdateEffects::APPEND_FAST_PATH) {
                appends += 1;
            }
            if index >= chars.len() && effects.is_empty() {
                idle_frames += 1;
            }
            idle_frames < 30
        })
        .context("frame clock stopped")?;

    let view = editor.editor().context("editor was disposed")?;
    let model = editor.model().context("editor has no model")?;
    println!(
        "Streamed {} chars in {updates} updates over {frames} frames ({skipped} skipped)",
        chars.len()
    );
    println!("Edits applied: {} ({appends} via append fast path)", model.edit_log().len());
    println!("Reveals: {}", view.reveals().len());
    println!("Final height: {}px", view.height());
    println!("\n{}", model.value());

    Ok(())
}
