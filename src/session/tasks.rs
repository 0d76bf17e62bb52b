use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};

use super::{warning_events, SessionEvent, SessionState, Shared};
use crate::risk::TripOutcome;

/// Price sampling loop: refreshes the displayed current price
pub(super) async fn run_sampling(shared: Shared, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        shared.sample().await;
    }
}

/// Condition evaluation loop: drives the monitor and the circuit breaker
pub(super) async fn run_evaluation(shared: Shared, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        shared.evaluate().await;
    }
}

impl Shared {
    async fn price(&self) -> Result<f64, crate::errors::FeedError> {
        self.feed
            .price_for_pair(&self.pair.base, &self.pair.quote)
            .await
    }

    /// Sampling failures are logged and otherwise ignored
    async fn sample(&self) {
        let price = match self.price().await {
            Ok(price) if price.is_finite() && price > 0.0 => price,
            Ok(price) => {
                tracing::warn!(pair = %self.pair, price, "Ignoring invalid price sample");
                return;
            }
            Err(e) => {
                tracing::error!(pair = %self.pair, error = %e, "Error fetching price");
                return;
            }
        };

        {
            let mut state = self.lock();
            if !state.running {
                return;
            }
            state.current_price = Some(price);
        }

        tracing::debug!(pair = %self.pair, price, "Price sampled");
        self.publish(vec![SessionEvent::PriceUpdated { price }]);
    }

    async fn evaluate(&self) {
        let fetched = self.price().await;
        let now = Instant::now();

        let events = {
            let mut guard = self.lock();
            let state = &mut *guard;
            if !state.running {
                return;
            }

            let mark = state.log.total();
            let update = state
                .monitor
                .evaluate(fetched, now, &mut state.breaker, &mut state.log);

            let mut events = Vec::new();
            if update.changed() {
                events.push(SessionEvent::ConditionChanged {
                    previous: update.previous,
                    current: update.condition,
                    change_pct: update.change_pct,
                });
            }
            events.extend(warning_events(&state.log, mark));

            if let Some(TripOutcome::Tripped { reset_at }) = update.trip {
                events.push(SessionEvent::BreakerTripped {
                    reason: state.breaker.state().reason.clone().unwrap_or_default(),
                    reset_in: reset_at - now,
                });
                self.schedule_reset(state, reset_at);
            }

            // Exploratory signal, only while trading is allowed
            if !state.breaker.is_tripped() {
                let history = state.monitor.price_history();
                let signal = state
                    .generator
                    .generate_informed(&state.strategy, &history);
                state.latest_signal = Some(signal.clone());
                events.push(SessionEvent::SignalGenerated(signal));
            }

            events
        };

        self.publish(events);
    }

    /// Spawn the one-shot reset for the current trip episode
    pub(super) fn schedule_reset(&self, state: &mut SessionState, reset_at: Instant) {
        let shared = self.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(reset_at).await;
            shared.fire_reset();
        });

        if let Some(stale) = state.reset_task.replace(task) {
            stale.abort();
        }
    }

    fn fire_reset(&self) {
        let events = {
            let mut guard = self.lock();
            let state = &mut *guard;
            if !state.running {
                return;
            }
            // Not due means a retrip rescheduled; the newer task owns reset_task
            if !state.breaker.reset_due(Instant::now()) {
                return;
            }
            state.reset_task = None;

            let mark = state.log.total();
            if !state.breaker.reset(&mut state.log) {
                return;
            }

            let mut events = vec![SessionEvent::BreakerReset];
            events.extend(warning_events(&state.log, mark));
            events
        };

        self.publish(events);
    }
}
