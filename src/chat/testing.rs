//! Scripted collaborators for handler and session tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Mutex;

use async_trait::async_trait;

use super::display::{Display, Progress};
use crate::completion::{CompletionBackend, CompletionRequest, CompletionResponse};
use crate::context::Message;
use crate::error::ChatError;

pub fn hello_response() -> CompletionResponse {
    CompletionResponse::single(
        Message::new("assistant", "hello"),
        &[
            ("completion_tokens", 1),
            ("prompt_tokens", 1),
            ("total_tokens", 2),
        ],
    )
}

/// Replays canned replies and records what was sent.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<CompletionResponse, ChatError>>>,
    requests: Mutex<Vec<(String, Vec<Message>)>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<CompletionResponse, ChatError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<(String, Vec<Message>)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, ChatError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((request.model.to_string(), request.messages.to_vec()));
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(ChatError::Transport("script exhausted".into())))
    }
}

#[derive(Default)]
struct ProgressLog {
    postfixes: RefCell<Vec<String>>,
    finished: Cell<bool>,
}

struct RecordingProgress(Rc<ProgressLog>);

impl Progress for RecordingProgress {
    fn set_postfix(&self, postfix: &str) {
        self.0.postfixes.borrow_mut().push(postfix.to_string());
    }

    fn finish(&self) {
        self.0.finished.set(true);
    }
}

/// Feeds scripted input lines and prompt answers, records everything shown.
#[derive(Default)]
pub struct ScriptedDisplay {
    inputs: VecDeque<String>,
    answers: VecDeque<String>,
    questions: Vec<String>,
    shown: Vec<Message>,
    clears: usize,
    progress: Rc<ProgressLog>,
}

impl ScriptedDisplay {
    pub fn with_inputs(inputs: Vec<&str>) -> Self {
        Self {
            inputs: inputs.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn with_answers(answers: Vec<&str>) -> Self {
        Self {
            answers: answers.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn shown(&self) -> Vec<Message> {
        self.shown.clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.clone()
    }

    pub const fn clears(&self) -> usize {
        self.clears
    }

    pub fn postfixes(&self) -> Vec<String> {
        self.progress.postfixes.borrow().clone()
    }

    pub fn progress_finished(&self) -> bool {
        self.progress.finished.get()
    }
}

impl Display for ScriptedDisplay {
    fn read_input(&mut self) -> Result<Option<String>, ChatError> {
        Ok(self.inputs.pop_front())
    }

    fn prompt(&mut self, message: &str) -> Result<String, ChatError> {
        self.questions.push(message.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ChatError::Prompt("cancelled".into()))
    }

    fn clear_screen(&mut self) {
        self.clears += 1;
    }

    fn show_message(&mut self, message: &Message) {
        self.shown.push(message.clone());
    }

    fn waiting(&mut self) -> Box<dyn Progress> {
        Box::new(RecordingProgress(Rc::clone(&self.progress)))
    }
}
