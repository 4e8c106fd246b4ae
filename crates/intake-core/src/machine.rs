//! The conversation turn machine.
//!
//! `Interviewer` coordinates one interview conversation: it synthesizes the
//! system prompt, decides when the model may call the structured-update
//! tool, applies requested updates to the snapshot, and suspends to the
//! checkpoint store between human turns. One `go` call runs the machine
//! from the resume point to the next suspend or to completion.

use tracing::{debug, info, warn};

use intake_types::checkpoint::Checkpoint;
use intake_types::config::InterviewerConfig;
use intake_types::error::TurnError;
use intake_types::interview::Interview;
use intake_types::llm::{ChatRequest, Usage};
use intake_types::message::{ToolCall, TranscriptMessage};
use intake_types::thread::ThreadId;

use crate::checkpoint::CheckpointStore;
use crate::interview::InterviewExt;
use crate::llm::{ChatModel, complete_with_retry};
use crate::prompt::build_system_prompt;
use crate::tool::{apply_update, build_tool_spec};

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Processing phase within one driving call.
///
/// `Listen` and `Teardown` both exit the machine; `Listen` suspends an open
/// conversation, `Teardown` finishes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Initialize,
    Think,
    Tools,
    Listen,
    Teardown,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnPhase::Initialize => write!(f, "initialize"),
            TurnPhase::Think => write!(f, "think"),
            TurnPhase::Tools => write!(f, "tools"),
            TurnPhase::Listen => write!(f, "listen"),
            TurnPhase::Teardown => write!(f, "teardown"),
        }
    }
}

/// What one driving call produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Latest natural-language assistant message from this call, if any.
    pub reply: Option<String>,

    /// Whether the interview has reached completion.
    pub done: bool,

    /// Token usage accumulated across this call's model invocations.
    pub usage: Usage,
}

// ---------------------------------------------------------------------------
// Interviewer
// ---------------------------------------------------------------------------

/// Drives interview conversations against a chat model and a checkpoint
/// store.
///
/// Holds the canonical [`Interview`]: collected values merge back into it
/// when a thread completes. Concurrent driving calls for the *same* thread
/// id must be serialized by the caller (see `ThreadLocks` in intake-infra);
/// distinct threads are independent.
pub struct Interviewer<M, S> {
    interview: Interview,
    model: M,
    store: S,
    config: InterviewerConfig,
}

impl<M: ChatModel, S: CheckpointStore> Interviewer<M, S> {
    pub fn new(interview: Interview, model: M, store: S, config: InterviewerConfig) -> Self {
        Self {
            interview,
            model,
            store,
            config,
        }
    }

    /// The canonical interview, including values merged from completed
    /// threads.
    pub fn interview(&self) -> &Interview {
        &self.interview
    }

    /// Run the machine for one thread until it suspends or completes.
    ///
    /// An unknown `thread_id` starts a fresh conversation seeded from the
    /// canonical interview. A known one resumes: the persisted snapshot is
    /// merged over the canonical schema, the utterance (if any) is appended
    /// as a human message, and the machine re-enters at think.
    pub async fn go(
        &mut self,
        thread_id: &ThreadId,
        utterance: Option<&str>,
    ) -> Result<TurnOutcome, TurnError> {
        let (mut checkpoint, mut phase) = match self.store.get(thread_id).await? {
            Some(checkpoint) if checkpoint.completed => {
                debug!(thread_id = %thread_id, "Thread already complete");
                return Ok(TurnOutcome {
                    reply: None,
                    done: true,
                    usage: Usage::default(),
                });
            }
            Some(mut checkpoint) => {
                let mut snapshot = self.interview.clone();
                snapshot.merge_from(&checkpoint.snapshot);
                checkpoint.snapshot = snapshot;
                (checkpoint, TurnPhase::Think)
            }
            None => (
                Checkpoint::new(self.interview.clone()),
                TurnPhase::Initialize,
            ),
        };

        if let Some(text) = utterance {
            checkpoint
                .transcript
                .push(TranscriptMessage::user(text));
        }

        let mut usage = Usage::default();
        let mut reply: Option<String> = None;
        let mut steps = 0u32;

        loop {
            steps += 1;
            if steps > self.config.max_turn_steps {
                return Err(TurnError::StepLimitExceeded {
                    steps: self.config.max_turn_steps,
                });
            }
            debug!(thread_id = %thread_id, phase = %phase, step = steps, "State transition");

            match phase {
                TurnPhase::Initialize => phase = TurnPhase::Think,

                TurnPhase::Think => {
                    let response_text =
                        self.think(&mut checkpoint, &mut usage).await?;
                    if let Some(text) = response_text {
                        reply = Some(text);
                    }

                    let requested_update = matches!(
                        checkpoint.transcript.last(),
                        Some(TranscriptMessage::Assistant {
                            tool_call: Some(_),
                            ..
                        })
                    );
                    phase = if requested_update {
                        TurnPhase::Tools
                    } else if checkpoint.snapshot.done() {
                        TurnPhase::Teardown
                    } else {
                        TurnPhase::Listen
                    };
                }

                TurnPhase::Tools => {
                    self.apply_tools(thread_id, &mut checkpoint).await?;
                    phase = TurnPhase::Think;
                }

                TurnPhase::Listen => {
                    let spoken = checkpoint
                        .transcript
                        .last()
                        .is_some_and(TranscriptMessage::is_spoken_assistant);
                    if !spoken {
                        return Err(TurnError::StructuralInvariant(
                            "suspend requires a spoken assistant message".to_string(),
                        ));
                    }

                    checkpoint.touch();
                    self.store.put(thread_id, &checkpoint).await?;
                    info!(
                        thread_id = %thread_id,
                        pending = checkpoint.snapshot.pending_fields().len(),
                        "Thread suspended"
                    );
                    return Ok(TurnOutcome {
                        reply,
                        done: false,
                        usage,
                    });
                }

                TurnPhase::Teardown => {
                    self.interview.merge_from(&checkpoint.snapshot);
                    checkpoint.completed = true;
                    checkpoint.touch();
                    self.store.put(thread_id, &checkpoint).await?;
                    info!(thread_id = %thread_id, "Interview complete");
                    return Ok(TurnOutcome {
                        reply,
                        done: true,
                        usage,
                    });
                }
            }
        }
    }

    /// One model invocation: synthesize the system prompt when absent,
    /// decide tool capability from transcript position, call the model, and
    /// append its response. Returns the spoken text, if any.
    async fn think(
        &self,
        checkpoint: &mut Checkpoint,
        usage: &mut Usage,
    ) -> Result<Option<String>, TurnError> {
        if !checkpoint.transcript.iter().any(TranscriptMessage::is_system) {
            let prompt = build_system_prompt(&checkpoint.snapshot);
            checkpoint
                .transcript
                .insert(0, TranscriptMessage::system(prompt));
        }

        let tool = tool_allowed(&checkpoint.transcript)
            .then(|| build_tool_spec(&checkpoint.snapshot))
            .flatten();

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: checkpoint.transcript.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tool,
        };

        let response = complete_with_retry(&self.model, &request, &self.config.retry).await?;
        usage.add(&response.usage);

        let spoken = (!response.text.is_empty()).then(|| response.text.clone());
        checkpoint.transcript.push(TranscriptMessage::Assistant {
            content: response.text,
            tool_call: response.tool_call,
        });
        Ok(spoken)
    }

    /// Apply the pending structured update and report the outcome back to
    /// the model as a tool result.
    ///
    /// A failed application increments the offending field's attempt
    /// counter; when the counter reaches the configured budget the thread
    /// is persisted and the failure surfaces to the caller.
    async fn apply_tools(
        &self,
        thread_id: &ThreadId,
        checkpoint: &mut Checkpoint,
    ) -> Result<(), TurnError> {
        let call: ToolCall = match checkpoint.transcript.last() {
            Some(TranscriptMessage::Assistant {
                tool_call: Some(call),
                ..
            }) => call.clone(),
            _ => {
                return Err(TurnError::StructuralInvariant(
                    "tool application requires a pending tool call".to_string(),
                ));
            }
        };

        match apply_update(&mut checkpoint.snapshot, &call) {
            Ok(updated) => {
                info!(thread_id = %thread_id, fields = ?updated, "Update applied");
                let content = if updated.is_empty() {
                    "Nothing recorded.".to_string()
                } else {
                    format!("Recorded {}.", updated.join(", "))
                };
                checkpoint
                    .transcript
                    .push(TranscriptMessage::tool_result(call.id, content));
            }
            Err(err) => {
                // Log the field name only; the message may quote values.
                warn!(
                    thread_id = %thread_id,
                    field = err.field().unwrap_or("-"),
                    "Update rejected"
                );
                checkpoint
                    .transcript
                    .push(TranscriptMessage::tool_error(call.id, err.to_string()));

                if let Some(field) = err.field() {
                    let count = checkpoint.attempts.entry(field.to_string()).or_insert(0);
                    *count += 1;
                    if *count >= self.config.max_field_attempts {
                        let attempts = *count;
                        checkpoint.touch();
                        self.store.put(thread_id, &checkpoint).await?;
                        return Err(TurnError::ValidationExhausted {
                            field: field.to_string(),
                            attempts,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Tool capability for the upcoming invocation, from transcript position.
///
/// Withheld right after the system prompt and right after a successful tool
/// result, forcing a spoken message before and after structured extraction.
/// Offered after a failed tool result so the model can correct itself.
fn tool_allowed(transcript: &[TranscriptMessage]) -> bool {
    match transcript.last() {
        Some(TranscriptMessage::System { .. }) => false,
        Some(TranscriptMessage::ToolResult { is_error, .. }) => *is_error,
        _ => true,
    }
}
