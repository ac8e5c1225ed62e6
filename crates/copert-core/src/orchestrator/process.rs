//! Orchestrator turn loop
//!
//! Contains `run_turn`, the state machine driving one user turn.

use crate::conversation::ConversationState;
use crate::dispatcher::ToolCallRecord;
use crate::error::{Error, Result};
use crate::events::TurnEvent;
use copert_llm::{CompletionRequest, Message, ToolCompletionRequest, ToolDefinition};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::core::Orchestrator;
use super::types::{TurnOutcome, TurnState, TurnStatus};

impl Orchestrator {
    /// Run one user turn to completion
    ///
    /// Appends `user_text` to `conversation` and alternates model calls with
    /// tool dispatch until the model answers without tool calls. Fails with
    /// [`Error::CeilingExceeded`] when the model would be called more than
    /// `max_iterations` times, and with [`Error::Llm`] when the provider
    /// fails. Interrupts end the turn as [`TurnStatus::Cancelled`]; the
    /// history gathered so far stays in `conversation` either way.
    #[instrument(skip_all, fields(max_iterations = self.config.max_iterations))]
    pub async fn run_turn(
        &self,
        conversation: &mut ConversationState,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome> {
        let turn_id = Uuid::new_v4();
        if let Some(prompt) = &self.system_prompt {
            conversation.ensure_system(prompt);
        }
        conversation.push(Message::user(user_text));

        info!(turn_id = %turn_id, provider = %self.provider.name(), "Starting turn");
        self.emit(TurnEvent::TurnStarted { turn_id });

        let tools = self.runner.registry().to_llm_tools();
        let dispatcher = self.dispatcher();

        let mut state = TurnState::AwaitingModel;
        let mut round_trips = 0;
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut reply = None;

        loop {
            match state {
                TurnState::AwaitingModel => {
                    if round_trips >= self.config.max_iterations {
                        warn!(
                            turn_id = %turn_id,
                            limit = self.config.max_iterations,
                            "Iteration ceiling reached"
                        );
                        return Err(Error::CeilingExceeded {
                            limit: self.config.max_iterations,
                        });
                    }
                    round_trips += 1;
                    self.emit(TurnEvent::ModelRequested {
                        turn_id,
                        round_trip: round_trips,
                    });

                    let request = self.build_request(conversation, tools.clone());
                    let response = tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            return Ok(self.cancelled(turn_id, round_trips, records));
                        }
                        response = self.provider.complete_with_tools(request) => response?,
                    };

                    debug!(
                        turn_id = %turn_id,
                        round_trip = round_trips,
                        tool_calls = response.tool_calls.len(),
                        "Model responded"
                    );
                    let message = response.into_message();
                    if message.has_tool_calls() {
                        state = TurnState::AwaitingToolResults;
                    } else {
                        reply = message.text().map(str::to_string);
                        state = TurnState::Terminal;
                    }
                    conversation.push(message);
                }
                TurnState::AwaitingToolResults => {
                    let calls = conversation.pending_tool_calls();
                    let batch = dispatcher.dispatch(turn_id, &calls, cancel).await;
                    for record in &batch {
                        conversation.push(record.to_message());
                    }
                    records.extend(batch);

                    if cancel.is_cancelled() {
                        return Ok(self.cancelled(turn_id, round_trips, records));
                    }
                    state = TurnState::AwaitingModel;
                }
                TurnState::Terminal => {
                    info!(
                        turn_id = %turn_id,
                        round_trips,
                        tool_calls = records.len(),
                        "Turn completed"
                    );
                    self.emit(TurnEvent::TurnCompleted {
                        turn_id,
                        round_trips,
                    });
                    return Ok(TurnOutcome {
                        turn_id,
                        status: TurnStatus::Completed,
                        reply,
                        round_trips,
                        tool_calls: records,
                    });
                }
            }
        }
    }

    fn build_request(
        &self,
        conversation: &ConversationState,
        tools: Vec<ToolDefinition>,
    ) -> ToolCompletionRequest {
        let mut request = CompletionRequest::new(self.config.model.clone())
            .with_messages(conversation.messages().to_vec());
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        ToolCompletionRequest::new(request, tools)
    }

    fn cancelled(
        &self,
        turn_id: Uuid,
        round_trips: usize,
        tool_calls: Vec<ToolCallRecord>,
    ) -> TurnOutcome {
        info!(turn_id = %turn_id, round_trips, "Turn cancelled by user");
        self.emit(TurnEvent::TurnCancelled { turn_id });
        TurnOutcome {
            turn_id,
            status: TurnStatus::Cancelled,
            reply: None,
            round_trips,
            tool_calls,
        }
    }
}
