//! Shared fixtures for the nodes integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pipeline::{CompletionClient, CompletionError, CompletionRequest};

/// Completion client that replays scripted replies in order and records every
/// request it receives.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

pub enum Reply {
    Text(String),
    Error(CompletionError),
    /// Sleeps before answering, to exercise deadlines.
    Delayed(Duration, String),
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Arc<Self> {
        Self::new(texts.into_iter().map(|t| Reply::Text(t.into())))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted client ran out of replies");
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Error(err) => Err(err),
            Reply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }
}

pub const DISTINCTIONS: &str = r#"```json
{
  "distinctions": [
    {"name": "Chord Changes", "description": "Moving between chord shapes.", "importance": "Songs depend on it.", "current_level": "Beginner"},
    {"name": "Rhythm", "description": "Keeping steady time.", "importance": "Music needs a pulse.", "current_level": "Beginner"},
    {"name": "Strumming Patterns", "description": "Right-hand motion.", "importance": "Defines the groove.", "current_level": "Beginner"},
    {"name": "Fretting Accuracy", "description": "Clean notes.", "importance": "Avoids buzzing.", "current_level": "Intermediate"},
    {"name": "Ear Training", "description": "Hearing intervals.", "importance": "Lets you play by ear.", "current_level": "Beginner"}
  ]
}
```"#;

pub const INSIGHTS: &str = r#"{"insights": [
  "Practice chord changes slowly before speeding up.",
  "Use a metronome for every rhythm session.",
  "Learn two strumming patterns deeply rather than ten shallowly.",
  "Train your ear by humming before you play."
]}"#;

pub const NEXT_STEPS: &str = r#"Here is your plan:
{"next_steps": [
  {"action": "One-minute chord change drills", "time_commitment": "10 minutes daily", "success_criteria": "60 clean changes per minute", "develops": ["chord changes", "Fretting Accuracy"]},
  {"action": "Strum along with a metronome at 70 bpm", "time_commitment": "15 minutes daily", "success_criteria": "No missed beats for 2 minutes", "develops": ["Rhythm", "Strumming Patterns", "rhythm"]},
  {"action": "Pick out a melody by ear", "time_commitment": "20 minutes, 3 times a week", "success_criteria": "Play one nursery rhyme by ear", "develops": ["Ear Training"]}
]}"#;
