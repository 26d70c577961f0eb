// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background driver for the reaction jobs.

use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};
use tutor_booking_api::SweepReport;

use crate::AppState;

/// Runs one tick against the shared store.
pub async fn tick_once(app_state: &AppState) -> SweepReport {
    let mut persistence = app_state.persistence.lock().await;
    let report = app_state
        .scheduler
        .run_tick(&mut persistence, &app_state.env);
    drop(persistence);

    let failed = report.total_failed();
    if failed > 0 {
        warn!(failed, "Tick finished with failed rows");
    }
    report
}

/// Ticks every `period` until the runtime shuts down.
///
/// A tick that overruns its period delays the next one instead of
/// queueing a burst.
pub async fn run(app_state: AppState, period: Duration) {
    info!(period_secs = period.as_secs(), "Reaction ticker started");
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        tick_once(&app_state).await;
    }
}
