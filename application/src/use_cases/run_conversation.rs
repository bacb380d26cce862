//! Run Conversation use case
//!
//! Drives the full round-robin conversation: speaker selection, context
//! construction, generation, budget accounting, durable recording, and
//! finalization on every exit path.

use crate::config::ConversationConfig;
use crate::ports::generator::{GenerationError, TextGenerator};
use crate::ports::observer::ConversationObserver;
use crate::ports::recorder::{RecorderError, SessionArtifacts, SessionRecorder};
use colloquy_domain::{
    BudgetLedger, ContextBuilder, ConversationState, ParticipantId, Session, SessionSummary,
    TokenCounter, TurnScheduler, Utterance,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during conversation execution.
///
/// Per-turn failures (generation, tokenization) are contained inside the
/// loop and never surface here; only precondition violations and durable
/// write failures end the session with an error, and finalization runs
/// even then.
#[derive(Error, Debug)]
pub enum RunConversationError {
    #[error("At least two participants are required, got {0}")]
    NotEnoughParticipants(usize),

    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),
}

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The token budget was exhausted (normal termination)
    BudgetExhausted,
    /// The operator requested cancellation (normal termination)
    Cancelled,
}

/// Result of a completed conversation session
#[derive(Debug)]
pub struct ConversationOutcome {
    pub end_reason: EndReason,
    pub turns_completed: u64,
    pub summary: SessionSummary,
    pub artifacts: SessionArtifacts,
}

/// Use case for running one observed conversation session.
///
/// Owns the session state exclusively for its lifetime: a single logical
/// task drives the loop, so no locking is needed around the ledger,
/// history, or recorder. The suspend points (generation call, delays,
/// durable writes) block the whole loop by design.
pub struct RunConversationUseCase<R: SessionRecorder> {
    generators: HashMap<ParticipantId, Arc<dyn TextGenerator>>,
    roster: Vec<ParticipantId>,
    recorder: R,
    config: ConversationConfig,
    counter: Box<dyn TokenCounter>,
    scheduler: TurnScheduler,
    cancellation_token: Option<CancellationToken>,
}

impl<R: SessionRecorder> RunConversationUseCase<R> {
    pub fn new(
        generators: Vec<(ParticipantId, Arc<dyn TextGenerator>)>,
        recorder: R,
        config: ConversationConfig,
        counter: Box<dyn TokenCounter>,
    ) -> Self {
        let roster: Vec<ParticipantId> = generators.iter().map(|(id, _)| id.clone()).collect();
        Self {
            generators: generators.into_iter().collect(),
            roster,
            recorder,
            config,
            counter,
            scheduler: TurnScheduler::new(),
            cancellation_token: None,
        }
    }

    /// Install the cooperative cancellation token polled at each turn
    /// boundary. An in-flight generation call is allowed to complete or
    /// fail before cancellation is observed.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Replace the scheduler (deterministic seeding for tests)
    pub fn with_scheduler(mut self, scheduler: TurnScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Run the conversation to completion.
    ///
    /// Finalizes the recorder on every exit path: budget exhaustion,
    /// cancellation, precondition failure, and unrecovered write failure.
    pub async fn execute(
        self,
        observer: &dyn ConversationObserver,
    ) -> Result<ConversationOutcome, RunConversationError> {
        let Self {
            generators,
            roster,
            mut recorder,
            config,
            counter,
            mut scheduler,
            cancellation_token,
        } = self;

        let mut session = Session::new(recorder.session_name());

        // Precondition: a conversation needs at least two voices. Finalize
        // the (empty) session record before reporting the violation so the
        // durable artifacts stay consistent.
        if roster.len() < 2 {
            let count = roster.len();
            warn!("Refusing to start with {} participant(s)", count);
            session.end();
            let summary = recorder.summary();
            recorder.finalize(&summary)?;
            return Err(RunConversationError::NotEnoughParticipants(count));
        }

        info!(
            topic = %config.topic,
            token_limit = config.token_limit,
            participants = roster.len(),
            "Starting conversation session {}",
            session.name()
        );

        recorder.append_system(&format!("Conversation topic: {}", config.topic))?;
        recorder.append_system(&format!("Token limit: {}", config.token_limit))?;
        recorder.append_system(&format!(
            "Participants: {}",
            roster
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))?;

        let mut ledger = BudgetLedger::new(counter, config.token_limit, config.rates.clone())
            .with_warning_threshold(config.warning_threshold);

        let builder =
            ContextBuilder::new(roster.clone()).with_window_size(config.context_window_size);
        let mut state = ConversationState::new(&config.topic);

        let cancelled =
            || cancellation_token.as_ref().is_some_and(|t| t.is_cancelled());

        let mut turns_completed: u64 = 0;
        let mut warned = false;

        let end_reason = loop {
            // Step 1: termination predicates, checked at the turn boundary
            if cancelled() {
                info!("Cancellation observed; terminating session");
                break EndReason::Cancelled;
            }
            if ledger.is_exceeded() {
                info!(
                    total_tokens = ledger.total_tokens(),
                    token_limit = ledger.token_limit(),
                    "Token budget exhausted; terminating session"
                );
                break EndReason::BudgetExhausted;
            }

            // Step 2: choose the next speaker
            let speaker = scheduler.select_next(&roster);
            observer.on_turn_start(&speaker);
            debug!("{} is speaking", speaker);

            // Step 3: bounded, role-tagged context for this speaker
            let context = builder.build(&state);

            // Step 4: invoke the external generation capability
            let generator = generators
                .get(&speaker)
                .expect("roster and generator map are constructed together");

            let response = match generator.generate(&context, config.max_response_tokens).await
            {
                Ok(response) => response,
                Err(error) => {
                    // A single backend hiccup must not end the session:
                    // log, back off, and keep conversing. The failed turn
                    // produces no utterance and consumes no budget.
                    warn!("Turn failed: {}", error);
                    observer.on_turn_failed(&error);
                    tokio::time::sleep(config.turn_retry_backoff).await;
                    continue;
                }
            };

            // Budget accounting; the topic text stands in for the prompt
            // side of the exchange. Tokenization failure is handled exactly
            // like a generation failure.
            let (tokens, cost) = match ledger.record(&speaker, &config.topic, &response) {
                Ok(recorded) => recorded,
                Err(error) => {
                    warn!("Budget accounting failed for {}: {}", speaker, error);
                    observer.on_turn_failed(&GenerationError::new(
                        speaker.clone(),
                        error.to_string(),
                    ));
                    tokio::time::sleep(config.turn_retry_backoff).await;
                    continue;
                }
            };

            // Commit the turn: history first, then the durable record
            let utterance = Utterance::new(speaker, response, tokens, cost);
            state.push(utterance.clone());
            if let Err(error) = recorder.append(&utterance) {
                // Durability is broken; stop the session but still finalize
                warn!("Durable write failed, ending session: {}", error);
                session.end();
                let summary = recorder.summary();
                let _ = recorder.finalize(&summary);
                return Err(error.into());
            }

            turns_completed += 1;
            observer.on_utterance(&utterance, &ledger.snapshot());

            // Step 5: advisory warning, once per session on first crossing
            if !warned && ledger.is_warning() {
                warned = true;
                info!(
                    usage_percentage = ledger.usage_percentage(),
                    "Token usage crossed the warning threshold"
                );
                observer.on_budget_warning(&ledger.snapshot());
            }

            // Step 6: rate-limit courtesy toward the backends; skipped when
            // the budget check is about to end the session anyway
            if !ledger.is_exceeded() {
                tokio::time::sleep(config.inter_turn_delay).await;
            }
        };

        session.end();
        let summary = recorder.summary();
        let artifacts = recorder.finalize(&summary)?;
        observer.on_session_end(&summary);

        info!(
            turns = turns_completed,
            total_tokens = summary.total_tokens,
            "Session {} finalized",
            session.name()
        );

        Ok(ConversationOutcome {
            end_reason,
            turns_completed,
            summary,
            artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::observer::NoObserver;
    use async_trait::async_trait;
    use colloquy_domain::TokenizationError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Counter charging a fixed amount per text, for exact budget math
    struct FixedCounter(u64);

    impl TokenCounter for FixedCounter {
        fn count(&self, _text: &str) -> Result<u64, TokenizationError> {
            Ok(self.0)
        }
    }

    struct FixedGenerator;

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(
            &self,
            _context: &[colloquy_domain::Message],
            _max_tokens: u32,
        ) -> Result<String, GenerationError> {
            Ok("an interesting remark".to_string())
        }
    }

    struct FailingGenerator(ParticipantId);

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(
            &self,
            _context: &[colloquy_domain::Message],
            _max_tokens: u32,
        ) -> Result<String, GenerationError> {
            Err(GenerationError::new(self.0.clone(), "boom"))
        }
    }

    #[derive(Default)]
    struct RecorderState {
        utterances: Vec<Utterance>,
        system_entries: Vec<String>,
        finalize_calls: usize,
        finalized: bool,
    }

    #[derive(Clone)]
    struct InMemoryRecorder {
        name: String,
        state: Arc<Mutex<RecorderState>>,
    }

    impl InMemoryRecorder {
        fn new() -> (Self, Arc<Mutex<RecorderState>>) {
            let state = Arc::new(Mutex::new(RecorderState::default()));
            (
                Self {
                    name: "test_session".to_string(),
                    state: Arc::clone(&state),
                },
                state,
            )
        }
    }

    impl SessionRecorder for InMemoryRecorder {
        fn session_name(&self) -> &str {
            &self.name
        }

        fn append(&mut self, utterance: &Utterance) -> Result<(), RecorderError> {
            self.state.lock().unwrap().utterances.push(utterance.clone());
            Ok(())
        }

        fn append_system(&mut self, content: &str) -> Result<(), RecorderError> {
            self.state
                .lock()
                .unwrap()
                .system_entries
                .push(content.to_string());
            Ok(())
        }

        fn summary(&self) -> SessionSummary {
            let state = self.state.lock().unwrap();
            let mut summary = SessionSummary {
                session_name: self.name.clone(),
                message_count: (state.utterances.len() + state.system_entries.len()) as u64,
                ..Default::default()
            };
            for utterance in &state.utterances {
                summary.total_tokens += utterance.tokens;
                summary.total_cost += utterance.cost;
                let stats = summary
                    .participant_stats
                    .entry(utterance.speaker.clone())
                    .or_default();
                stats.count += 1;
                stats.tokens += utterance.tokens;
                stats.cost += utterance.cost;
            }
            summary
        }

        fn finalize(
            &mut self,
            _summary: &SessionSummary,
        ) -> Result<SessionArtifacts, RecorderError> {
            let mut state = self.state.lock().unwrap();
            state.finalize_calls += 1;
            if state.finalized {
                return Err(RecorderError::AlreadyFinalized);
            }
            state.finalized = true;
            Ok(SessionArtifacts {
                transcript_path: "test_session.txt".into(),
                snapshot_path: "test_session.json".into(),
            })
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        failures: AtomicUsize,
        warnings: AtomicUsize,
        speakers: Mutex<Vec<ParticipantId>>,
    }

    impl ConversationObserver for CountingObserver {
        fn on_utterance(
            &self,
            utterance: &Utterance,
            _budget: &colloquy_domain::BudgetSnapshot,
        ) {
            self.speakers.lock().unwrap().push(utterance.speaker.clone());
        }

        fn on_turn_failed(&self, _error: &GenerationError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }

        fn on_budget_warning(&self, _budget: &colloquy_domain::BudgetSnapshot) {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fast_config(token_limit: u64) -> ConversationConfig {
        ConversationConfig {
            token_limit,
            inter_turn_delay: Duration::ZERO,
            turn_retry_backoff: Duration::ZERO,
            ..Default::default()
        }
    }

    fn trio() -> Vec<(ParticipantId, Arc<dyn TextGenerator>)> {
        ["A", "B", "C"]
            .iter()
            .map(|name| {
                (
                    ParticipantId::new(*name),
                    Arc::new(FixedGenerator) as Arc<dyn TextGenerator>,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_budget_ends_session_after_exactly_three_turns() {
        // Each turn costs exactly 40 tokens (20 input + 20 output) against
        // a limit of 100: turns land at 40, 80, 120, and the fourth turn
        // is never attempted.
        let (recorder, state) = InMemoryRecorder::new();
        let observer = CountingObserver::default();

        let use_case = RunConversationUseCase::new(
            trio(),
            recorder,
            fast_config(100),
            Box::new(FixedCounter(20)),
        )
        .with_scheduler(TurnScheduler::with_seed(11));

        let outcome = use_case.execute(&observer).await.unwrap();

        assert_eq!(outcome.end_reason, EndReason::BudgetExhausted);
        assert_eq!(outcome.turns_completed, 3);
        assert_eq!(outcome.summary.total_tokens, 120);
        assert_eq!(state.lock().unwrap().utterances.len(), 3);
        assert_eq!(state.lock().unwrap().finalize_calls, 1);
    }

    #[tokio::test]
    async fn test_no_immediate_speaker_repeat_in_recorded_turns() {
        let (recorder, _state) = InMemoryRecorder::new();
        let observer = CountingObserver::default();

        // Generous budget: 20-token turns against a 400 limit → 20 turns
        let use_case = RunConversationUseCase::new(
            trio(),
            recorder,
            fast_config(400),
            Box::new(FixedCounter(10)),
        )
        .with_scheduler(TurnScheduler::with_seed(5));

        use_case.execute(&observer).await.unwrap();

        let speakers = observer.speakers.lock().unwrap();
        assert!(speakers.len() >= 2);
        for pair in speakers.windows(2) {
            assert_ne!(pair[0], pair[1], "speaker repeated immediately");
        }
    }

    #[tokio::test]
    async fn test_generation_failure_is_recoverable() {
        let failing_id = ParticipantId::new("B");
        let generators: Vec<(ParticipantId, Arc<dyn TextGenerator>)> = vec![
            (
                ParticipantId::new("A"),
                Arc::new(FixedGenerator) as Arc<dyn TextGenerator>,
            ),
            (
                failing_id.clone(),
                Arc::new(FailingGenerator(failing_id.clone())) as Arc<dyn TextGenerator>,
            ),
        ];

        let (recorder, state) = InMemoryRecorder::new();
        let observer = CountingObserver::default();

        let use_case = RunConversationUseCase::new(
            generators,
            recorder,
            fast_config(100),
            Box::new(FixedCounter(20)),
        )
        .with_scheduler(TurnScheduler::with_seed(2));

        let outcome = use_case.execute(&observer).await.unwrap();

        // B fails every attempt; only A's turns advance the session. The
        // budget still runs out at 120 tokens after three successful turns.
        assert_eq!(outcome.end_reason, EndReason::BudgetExhausted);
        assert_eq!(outcome.turns_completed, 3);
        assert_eq!(outcome.summary.total_tokens, 120);
        assert!(observer.failures.load(Ordering::SeqCst) >= 1);

        let state = state.lock().unwrap();
        assert!(state.utterances.iter().all(|u| u.speaker.as_str() == "A"));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_finalizes_with_zero_turns() {
        let (recorder, state) = InMemoryRecorder::new();
        let token = CancellationToken::new();
        token.cancel();

        let use_case = RunConversationUseCase::new(
            trio(),
            recorder,
            fast_config(100),
            Box::new(FixedCounter(20)),
        )
        .with_cancellation_token(token);

        let outcome = use_case.execute(&NoObserver).await.unwrap();

        assert_eq!(outcome.end_reason, EndReason::Cancelled);
        assert_eq!(outcome.turns_completed, 0);
        assert!(state.lock().unwrap().utterances.is_empty());
        assert_eq!(state.lock().unwrap().finalize_calls, 1);
    }

    #[tokio::test]
    async fn test_single_participant_is_a_precondition_failure() {
        let generators: Vec<(ParticipantId, Arc<dyn TextGenerator>)> = vec![(
            ParticipantId::new("Solo"),
            Arc::new(FixedGenerator) as Arc<dyn TextGenerator>,
        )];
        let (recorder, state) = InMemoryRecorder::new();

        let use_case = RunConversationUseCase::new(
            generators,
            recorder,
            fast_config(100),
            Box::new(FixedCounter(20)),
        );

        let error = use_case.execute(&NoObserver).await.unwrap_err();
        assert!(matches!(
            error,
            RunConversationError::NotEnoughParticipants(1)
        ));

        // The empty session record is still finalized
        let state = state.lock().unwrap();
        assert!(state.utterances.is_empty());
        assert_eq!(state.finalize_calls, 1);
    }

    #[tokio::test]
    async fn test_warning_fires_once_on_first_crossing() {
        let (recorder, _state) = InMemoryRecorder::new();
        let observer = CountingObserver::default();

        // 20-token turns against a 100 limit: warning threshold (90) is
        // crossed at turn 5 (100 tokens), which also exhausts the budget.
        // Use a 200 limit so turns 9 and 10 both sit above 90%.
        let use_case = RunConversationUseCase::new(
            trio(),
            recorder,
            fast_config(200),
            Box::new(FixedCounter(10)),
        )
        .with_scheduler(TurnScheduler::with_seed(9));

        use_case.execute(&observer).await.unwrap();

        assert_eq!(observer.warnings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_annotations_are_recorded() {
        let (recorder, state) = InMemoryRecorder::new();

        let use_case = RunConversationUseCase::new(
            trio(),
            recorder,
            fast_config(100).with_topic("rust vs go"),
            Box::new(FixedCounter(20)),
        );

        use_case.execute(&NoObserver).await.unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.system_entries.len(), 3);
        assert!(state.system_entries[0].contains("rust vs go"));
        assert!(state.system_entries[2].contains("A, B, C"));
    }
}
