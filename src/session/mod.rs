//! Trading session for one pair
//!
//! A `Session` owns the market monitor, circuit breaker, safety log, signal
//! generator and trade history for a single pair. `start()` spawns two periodic
//! tasks (price sampling and condition evaluation); `stop()` aborts them together
//! with any pending circuit-breaker reset. Every state change is published as a
//! `SessionEvent` on a broadcast channel.

mod events;
mod tasks;

pub use events::SessionEvent;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::api::PriceFeed;
use crate::config::{ExecutionGate, SafetyThresholds, SessionConfig};
use crate::errors::SafetyError;
use crate::execution::{PnLTracker, TradeExecutor};
use crate::models::{
    MarketCondition, Pair, SafetyWarning, Signal, StrategyConfig, StrategyKind, Trade, TradeSide,
};
use crate::monitor::MarketConditionMonitor;
use crate::risk::{self, CircuitBreaker, CircuitBreakerState, SafetyLog};
use crate::strategy::SignalGenerator;

const DEFAULT_STRATEGY_AMOUNT: f64 = 1.0;

/// Mutable session state, shared with the periodic tasks
///
/// Only ever locked for short synchronous sections, never across an `.await`.
struct SessionState {
    running: bool,
    monitor: MarketConditionMonitor,
    breaker: CircuitBreaker,
    log: SafetyLog,
    generator: SignalGenerator,
    strategy: StrategyConfig,
    pnl: PnLTracker,
    current_price: Option<f64>,
    latest_signal: Option<Signal>,
    executing: usize,
    reset_task: Option<JoinHandle<()>>,
}

/// Handle cloned into every spawned task
#[derive(Clone)]
struct Shared {
    pair: Pair,
    feed: Arc<dyn PriceFeed>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Nobody listening is fine
    fn publish(&self, events: Vec<SessionEvent>) {
        for event in events {
            let _ = self.events.send(event);
        }
    }
}

fn warning_events(log: &SafetyLog, mark: u64) -> impl Iterator<Item = SessionEvent> {
    log.added_since(mark)
        .into_iter()
        .map(SessionEvent::WarningAdded)
}

/// Decrements the in-flight execution count even if the execution future is dropped
struct ExecutingGuard<'a>(&'a Shared);

impl Drop for ExecutingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.executing = state.executing.saturating_sub(1);
    }
}

pub struct Session {
    shared: Shared,
    config: SessionConfig,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    /// Create a stopped session for `pair` ("BASE/QUOTE")
    ///
    /// Uses a Mean Reversion strategy and an entropy-seeded signal generator until
    /// replaced with `with_strategy` / `with_generator`.
    pub fn new(
        pair: &str,
        feed: Arc<dyn PriceFeed>,
        config: SessionConfig,
    ) -> Result<Self, SafetyError> {
        config.validate()?;
        let pair: Pair = pair.parse()?;

        let thresholds = config.thresholds.clone();
        let state = SessionState {
            running: false,
            monitor: MarketConditionMonitor::new(
                pair.clone(),
                thresholds.clone(),
                config.price_history_len,
            ),
            breaker: CircuitBreaker::new(thresholds.circuit_breaker_timeout()),
            log: SafetyLog::new(config.warning_log_capacity),
            generator: SignalGenerator::from_entropy(),
            strategy: StrategyConfig::new(
                StrategyKind::MeanReversion,
                pair.clone(),
                DEFAULT_STRATEGY_AMOUNT,
            ),
            pnl: PnLTracker::new(),
            current_price: None,
            latest_signal: None,
            executing: 0,
            reset_task: None,
        };

        let (events, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            shared: Shared {
                pair,
                feed,
                state: Arc::new(Mutex::new(state)),
                events,
            },
            config,
            tasks: Vec::new(),
        })
    }

    pub fn with_generator(self, generator: SignalGenerator) -> Self {
        self.shared.lock().generator = generator;
        self
    }

    pub fn with_strategy(self, strategy: StrategyConfig) -> Self {
        self.set_strategy(strategy);
        self
    }

    /// Replace the active strategy. Its pair is forced to the session pair.
    pub fn set_strategy(&self, mut strategy: StrategyConfig) {
        if strategy.pair != self.shared.pair {
            tracing::warn!(
                session_pair = %self.shared.pair,
                strategy_pair = %strategy.pair,
                "Strategy pair differs from session pair, using session pair"
            );
            strategy.pair = self.shared.pair.clone();
        }
        tracing::info!(pair = %self.shared.pair, strategy = %strategy.kind, "Strategy selected");
        self.shared.lock().strategy = strategy;
    }

    /// Validate the pair against the feed and spawn the periodic tasks
    ///
    /// Both tasks tick immediately. If the breaker is still tripped from an earlier
    /// run, its reset is rescheduled for the original deadline.
    pub async fn start(&mut self) -> Result<(), SafetyError> {
        if self.is_running() {
            return Err(SafetyError::AlreadyRunning {
                pair: self.shared.pair.to_string(),
            });
        }

        self.validate_tokens().await?;

        {
            let mut state = self.shared.lock();
            state.running = true;
            if let Some(reset_at) = state.breaker.reset_at() {
                self.shared.schedule_reset(&mut state, reset_at);
            }
        }

        self.tasks = vec![
            tokio::spawn(tasks::run_sampling(
                self.shared.clone(),
                self.config.price_poll_interval(),
            )),
            tokio::spawn(tasks::run_evaluation(
                self.shared.clone(),
                self.config.condition_check_interval(),
            )),
        ];

        tracing::info!(
            pair = %self.shared.pair,
            poll_secs = self.config.price_poll_interval_secs,
            check_secs = self.config.condition_check_interval_secs,
            "🚀 Trading session started"
        );
        self.shared.publish(vec![SessionEvent::SessionStarted {
            pair: self.shared.pair.clone(),
        }]);

        Ok(())
    }

    async fn validate_tokens(&self) -> Result<(), SafetyError> {
        let pair = &self.shared.pair;
        match self.shared.feed.token_list().await {
            Ok(tokens) => {
                for token in [&pair.base, &pair.quote] {
                    if !tokens.iter().any(|t| t.eq_ignore_ascii_case(token)) {
                        return Err(SafetyError::UnsupportedToken {
                            token: token.clone(),
                        });
                    }
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    pair = %pair,
                    error = %e,
                    "Could not fetch supported tokens, skipping pair validation"
                );
                Ok(())
            }
        }
    }

    /// Abort the periodic tasks and any pending breaker reset
    ///
    /// No timer can touch session state afterwards. A tripped breaker stays
    /// tripped until the session is started again.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }

        for task in self.tasks.drain(..) {
            task.abort();
        }
        let reset_task = {
            let mut state = self.shared.lock();
            state.running = false;
            state.reset_task.take()
        };
        if let Some(task) = reset_task {
            task.abort();
        }

        tracing::info!(pair = %self.shared.pair, "👋 Trading session stopped");
        self.shared.publish(vec![SessionEvent::SessionStopped {
            pair: self.shared.pair.clone(),
        }]);
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub fn pair(&self) -> &Pair {
        &self.shared.pair
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn thresholds(&self) -> &SafetyThresholds {
        &self.config.thresholds
    }

    pub fn strategy(&self) -> StrategyConfig {
        self.shared.lock().strategy.clone()
    }

    pub fn market_condition(&self) -> MarketCondition {
        self.shared.lock().monitor.condition()
    }

    pub fn price_change_percent(&self) -> f64 {
        self.shared.lock().monitor.price_change_percent()
    }

    /// Last sampled price, None until the first successful sample
    pub fn current_price(&self) -> Option<f64> {
        self.shared.lock().current_price
    }

    pub fn price_history(&self) -> Vec<f64> {
        self.shared.lock().monitor.price_history()
    }

    pub fn breaker_state(&self) -> CircuitBreakerState {
        self.shared.lock().breaker.state().clone()
    }

    pub fn is_circuit_breaker_triggered(&self) -> bool {
        self.shared.lock().breaker.is_tripped()
    }

    /// Oldest first
    pub fn safety_warnings(&self) -> Vec<SafetyWarning> {
        self.shared.lock().log.snapshot()
    }

    /// Generate a signal for the active strategy and remember it as the latest
    pub fn generate_signal(&self) -> Signal {
        let signal = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            let history = state.monitor.price_history();
            let signal = state.generator.generate_informed(&state.strategy, &history);
            state.latest_signal = Some(signal.clone());
            signal
        };

        tracing::debug!(
            pair = %self.shared.pair,
            action = %signal.action,
            confidence = signal.confidence,
            "Signal generated"
        );
        self.shared
            .publish(vec![SessionEvent::SignalGenerated(signal.clone())]);
        signal
    }

    pub fn latest_signal(&self) -> Option<Signal> {
        self.shared.lock().latest_signal.clone()
    }

    /// Signal documenting the most recent executed trade
    pub fn last_signal(&self) -> Option<Signal> {
        self.shared.lock().pnl.last_signal().cloned()
    }

    /// Newest first
    pub fn trades(&self) -> Vec<Trade> {
        self.shared.lock().pnl.trades()
    }

    pub fn pnl(&self) -> f64 {
        self.shared.lock().pnl.total_pnl()
    }

    pub fn is_executing(&self) -> bool {
        self.shared.lock().executing > 0
    }

    pub fn is_trade_size_safe(&self, amount: f64) -> bool {
        risk::is_trade_size_safe(amount, &self.config.thresholds)
    }

    pub fn is_slippage_safe(&self, expected_price: f64, execution_price: f64) -> bool {
        risk::is_slippage_safe(expected_price, execution_price, &self.config.thresholds)
    }

    /// Execute a simulated trade on the session pair
    ///
    /// Returns false if the quote could not be obtained (nothing is recorded) or,
    /// with `ExecutionGate::Enforced`, if a safety gate refused the trade.
    pub async fn execute_trade(&self, side: TradeSide, amount: f64) -> bool {
        let enforced = self.config.execution_gate == ExecutionGate::Enforced;

        let (current_price, strategy_kind, refusal) = {
            let state = self.shared.lock();
            let refusal = if !enforced {
                None
            } else if state.breaker.is_tripped() {
                Some("Trade refused: circuit breaker active".to_string())
            } else if !self.is_trade_size_safe(amount) {
                Some(format!(
                    "Trade refused: size {} exceeds maximum {}",
                    amount, self.config.thresholds.max_trade_size_sol
                ))
            } else {
                None
            };
            (state.current_price, state.strategy.kind, refusal)
        };

        if let Some(message) = refusal {
            self.refuse(message);
            return false;
        }

        self.shared.lock().executing += 1;
        let _executing = ExecutingGuard(&self.shared);

        let executor = TradeExecutor::new(
            Arc::clone(&self.shared.feed),
            self.shared.pair.clone(),
            strategy_kind,
            self.config.fee_rate,
            self.config.slippage_bps,
        );

        let report = match executor.execute(side, amount, current_price).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(
                    pair = %self.shared.pair,
                    side = %side,
                    amount,
                    error = %e,
                    "Trade execution failed"
                );
                return false;
            }
        };

        if enforced {
            if let Some(expected) = current_price {
                if !self.is_slippage_safe(expected, report.execution_price) {
                    self.refuse(format!(
                        "Trade refused: slippage {:.2}% exceeds {}%",
                        risk::slippage_percent(expected, report.execution_price),
                        self.config.thresholds.max_slippage_percent
                    ));
                    return false;
                }
            }
        }

        self.shared
            .lock()
            .pnl
            .record(report.trade.clone(), report.signal);
        self.shared
            .publish(vec![SessionEvent::TradeRecorded(report.trade)]);
        true
    }

    fn refuse(&self, message: String) {
        tracing::warn!(pair = %self.shared.pair, reason = %message, "🚫 Trade refused");
        let warning = self.shared.lock().log.push(message);
        self.shared
            .publish(vec![SessionEvent::WarningAdded(warning)]);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(task) = self.shared.lock().reset_task.take() {
            task.abort();
        }
    }
}
