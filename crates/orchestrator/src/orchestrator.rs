//! `StreamingOrchestrator` — drives one chat turn against a session
//! (spec.md §4.5): append the prompt, ack, run each planned tool call in
//! the session's own workspace, and narrate the whole thing as a
//! `StreamEvent` sequence.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use autosage_core::execution::ToolStatus;
use autosage_core::value::StructuredValue;
use autosage_sessions::{SessionManifold, SessionStatus};
use autosage_tools::ExecutionEngine;

use crate::plan::PlanSource;
use crate::stream::StreamEvent;

pub struct StreamingOrchestrator {
    engine: Arc<ExecutionEngine>,
    sessions: Arc<SessionManifold>,
    plan_source: Arc<dyn PlanSource>,
}

impl StreamingOrchestrator {
    pub fn new(
        engine: Arc<ExecutionEngine>,
        sessions: Arc<SessionManifold>,
        plan_source: Arc<dyn PlanSource>,
    ) -> Self {
        Self { engine, sessions, plan_source }
    }

    /// Run one turn for `session_id`, sending every `StreamEvent` onto
    /// `events` as it happens. Returns once a terminal event (`agent_done`
    /// or `error`) has been sent, or once `cancellation` fires.
    pub async fn run_turn(
        &self,
        session_id: &str,
        prompt: &str,
        events: mpsc::Sender<StreamEvent>,
        cancellation: CancellationToken,
    ) {
        if let Err(e) = self.sessions.append_user_prompt(session_id, prompt).await {
            warn!(session_id, error = %e, "failed to append user prompt");
            let _ = events
                .send(StreamEvent::Error { code: "runtime".into(), message: e.to_string() })
                .await;
            return;
        }

        let ack = self.plan_source.ack(prompt).await;
        if events.send(StreamEvent::TextDelta { delta: ack }).await.is_err() {
            return;
        }
        if cancellation.is_cancelled() {
            self.cancel(session_id, &events).await;
            return;
        }

        let steps = self.plan_source.plan(prompt).await;
        let mut last_stage = "chat".to_string();

        for step in steps {
            if cancellation.is_cancelled() {
                self.cancel(session_id, &events).await;
                return;
            }

            last_stage = step.stage_name.clone();
            if let Err(e) = self
                .sessions
                .apply_transition(
                    session_id,
                    SessionStatus::Processing,
                    &step.stage_name,
                    Some(step.tool_name.clone()),
                    None,
                    &[],
                    &[],
                )
                .await
            {
                warn!(session_id, error = %e, "failed to record stage transition");
            }

            if events
                .send(StreamEvent::ToolCallStart { tool_name: step.tool_name.clone() })
                .await
                .is_err()
            {
                return;
            }

            let job_directory = self.sessions.session_directory_for(session_id);
            let started = Instant::now();
            let result = self
                .engine
                .execute_in_session_workspace(
                    &step.tool_name,
                    step.input,
                    session_id.to_string(),
                    job_directory,
                    None,
                    None,
                    cancellation.clone(),
                )
                .await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let mut new_assets: Vec<String> = result.artifacts.iter().map(|a| a.path.clone()).collect();
            for expected in &step.expected_asset_paths {
                if !new_assets.contains(expected) {
                    new_assets.push(expected.clone());
                }
            }

            let is_error = result.status == ToolStatus::Error;
            let message = if is_error {
                format!("Failed to execute {}: {}", step.tool_name, result.summary)
            } else {
                format!("Executed {}.", step.tool_name)
            };

            let updated = self
                .sessions
                .apply_transition(
                    session_id,
                    SessionStatus::Processing,
                    &step.stage_name,
                    None,
                    Some(message),
                    &new_assets,
                    &[],
                )
                .await;

            match updated {
                Ok(manifest) => {
                    if events.send(StreamEvent::StateUpdate { state: manifest }).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!(session_id, error = %e, "failed to persist stage result");
                }
            }

            if events
                .send(StreamEvent::ToolCallComplete { tool_name: step.tool_name.clone(), duration_ms })
                .await
                .is_err()
            {
                return;
            }

            if is_error {
                let code = result.error_code().unwrap_or("runtime").to_string();
                let _ = self
                    .sessions
                    .apply_transition(session_id, SessionStatus::Error, &step.stage_name, None, None, &[], &[])
                    .await;
                let _ = events
                    .send(StreamEvent::Error { code, message: result.summary })
                    .await;
                return;
            }
        }

        let completion = self
            .sessions
            .apply_transition(
                session_id,
                SessionStatus::Idle,
                &last_stage,
                None,
                Some("Pipeline complete.".into()),
                &[],
                &[],
            )
            .await;
        if let Err(e) = completion {
            warn!(session_id, error = %e, "failed to record completion transition");
        }

        info!(session_id, "turn complete");
        let _ = events.send(StreamEvent::AgentDone { status: "completed".into() }).await;
    }

    async fn cancel(&self, session_id: &str, events: &mpsc::Sender<StreamEvent>) {
        let _ = self
            .sessions
            .apply_transition(
                session_id,
                SessionStatus::Error,
                "cancelled",
                None,
                None,
                &[],
                &[("cancel_reason", StructuredValue::String("client_closed".into()))],
            )
            .await;
        let _ = events
            .send(StreamEvent::Error { code: "cancelled".into(), message: "client closed the stream".into() })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{NullPlanSource, PlannedToolCall, StaticPlanSource};
    use autosage_core::value::StructuredValue;
    use autosage_tools::default_registry;

    async fn drain(mut rx: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn chat_only_turn_emits_ack_then_done() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = Arc::new(SessionManifold::new(dir.path()).unwrap());
        let manifest = sessions.create_from_upload("part.obj", b"v 0 0 0").unwrap();

        let registry = Arc::new(default_registry().unwrap());
        let engine = Arc::new(ExecutionEngine::new(registry, dir.path().to_path_buf(), 2));
        let plan_source = Arc::new(NullPlanSource::new("Hello, how can I help?"));
        let orchestrator = StreamingOrchestrator::new(engine, sessions.clone(), plan_source);

        let (tx, rx) = mpsc::channel(16);
        orchestrator
            .run_turn(&manifest.session_id, "hi", tx, CancellationToken::new())
            .await;
        let events = drain(rx).await;

        assert_eq!(events[0].name(), "text_delta");
        assert_eq!(events.last().unwrap().name(), "agent_done");
    }

    #[tokio::test]
    async fn tool_call_sequence_matches_expected_event_order() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = Arc::new(SessionManifold::new(dir.path()).unwrap());
        let manifest = sessions.create_from_upload("part.obj", b"v 0 0 0").unwrap();

        let registry = Arc::new(default_registry().unwrap());
        let engine = Arc::new(ExecutionEngine::new(registry, dir.path().to_path_buf(), 2));
        let plan_source = Arc::new(StaticPlanSource::new(
            "Analyzing your part.",
            vec![PlannedToolCall {
                tool_name: "echo_json".into(),
                stage_name: "chat".into(),
                expected_asset_paths: vec![],
                input: StructuredValue::object([("message".into(), StructuredValue::String("hi".into()))]),
            }],
        ));
        let orchestrator = StreamingOrchestrator::new(engine, sessions.clone(), plan_source);

        let (tx, rx) = mpsc::channel(16);
        orchestrator
            .run_turn(&manifest.session_id, "please echo hi", tx, CancellationToken::new())
            .await;
        let names: Vec<&str> = drain(rx).await.iter().map(|e| e.name()).collect();

        assert_eq!(
            names,
            vec!["text_delta", "tool_call_start", "state_update", "tool_call_complete", "agent_done"]
        );
    }

    #[tokio::test]
    async fn tool_failure_emits_error_and_skips_agent_done() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = Arc::new(SessionManifold::new(dir.path()).unwrap());
        let manifest = sessions.create_from_upload("part.obj", b"v 0 0 0").unwrap();

        let registry = Arc::new(default_registry().unwrap());
        let engine = Arc::new(ExecutionEngine::new(registry, dir.path().to_path_buf(), 2));
        let plan_source = Arc::new(StaticPlanSource::new(
            "Fitting primitives.",
            vec![PlannedToolCall {
                tool_name: "geometry.dsl_fit_open3d".into(),
                stage_name: "geometry_fit".into(),
                expected_asset_paths: vec!["geometry/primitives.json".into()],
                input: StructuredValue::object([(
                    "points".into(),
                    StructuredValue::Array(vec![]),
                )]),
            }],
        ));
        let orchestrator = StreamingOrchestrator::new(engine, sessions.clone(), plan_source);

        let (tx, rx) = mpsc::channel(16);
        orchestrator
            .run_turn(&manifest.session_id, "fit this", tx, CancellationToken::new())
            .await;
        let events = drain(rx).await;

        assert_eq!(events.last().unwrap().name(), "error");
        assert!(!events.iter().any(|e| e.name() == "agent_done"));
    }
}
