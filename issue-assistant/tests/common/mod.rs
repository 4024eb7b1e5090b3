//! Deterministic collaborators shared by the integration tests.
#![allow(dead_code)]

use futures::future::{BoxFuture, FutureExt};
use issue_assistant::{
    FetchError, GenerationError, GenerationParams, IssueComment, IssueSource, Pipeline,
    PromptLimits, RawIssue, TextGenerator,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const VALID_ANALYSIS: &str = r#"{
  "summary": "useEffect cleanup runs twice in StrictMode during development.",
  "type": "bug",
  "priority_score": "3 - Development-only, but confuses many users",
  "suggested_labels": ["bug", "strict-mode", "hooks"],
  "potential_impact": "Developers add workarounds for intended behaviour."
}"#;

pub fn react_issue() -> RawIssue {
    RawIssue::new(
        "useEffect cleanup called twice in StrictMode",
        Some("After upgrading to React 18 the cleanup runs twice on mount.".to_string()),
        ["Type: Bug".to_string(), "Status: Unconfirmed".to_string()],
        [IssueComment {
            author: "gaearon".to_string(),
            body: "This is expected in development StrictMode.".to_string(),
        }],
    )
}

/// What the fake tracker answers.
pub enum Tracker {
    Issue(RawIssue),
    NotFound,
}

pub struct FakeIssueSource {
    tracker: Tracker,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String, u64)>>,
}

impl FakeIssueSource {
    pub fn new(tracker: Tracker) -> Arc<Self> {
        Arc::new(Self {
            tracker,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, String, u64)> {
        self.last_request.lock().unwrap().clone()
    }
}

impl IssueSource for FakeIssueSource {
    fn fetch<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        number: u64,
    ) -> BoxFuture<'a, Result<RawIssue, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((owner.to_string(), repo.to_string(), number));
        let result = match &self.tracker {
            Tracker::Issue(issue) => Ok(issue.clone()),
            Tracker::NotFound => Err(FetchError::IssueNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                number,
            }),
        };
        async move { result }.boxed()
    }
}

pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        _params: &'a GenerationParams,
    ) -> BoxFuture<'a, Result<String, GenerationError>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GenerationError::Failed("no scripted reply left".into()));
        async move { reply }.boxed()
    }
}

pub fn pipeline(source: &Arc<FakeIssueSource>, generator: &Arc<ScriptedGenerator>) -> Pipeline {
    Pipeline::with_components(
        source.clone(),
        generator.clone(),
        PromptLimits::default(),
        GenerationParams::default(),
    )
    .unwrap()
}
