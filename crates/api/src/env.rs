// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Injected collaborators shared by handlers and the scheduler.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::warn;
use tutor_booking::{
    BookingCodeGenerator, BookingConfig, CacheKv, Clock, ConfigError, Geocoder, LocationResolver,
    NotificationEvent, Notifier,
};

/// How long a resolved address stays cached.
const LOCATION_TTL_HOURS: i64 = 24;

/// Everything a booking operation needs besides the store.
///
/// Built once at startup. The configuration is validated on construction
/// and never mutated afterwards.
pub struct BookingEnv {
    pub config: BookingConfig,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
    pub cache: Arc<dyn CacheKv>,
    pub codes: Arc<dyn BookingCodeGenerator>,
    pub locations: LocationResolver,
}

impl BookingEnv {
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is unusable.
    pub fn new(
        config: BookingConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn CacheKv>,
        codes: Arc<dyn BookingCodeGenerator>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let locations =
            LocationResolver::new(geocoder, Arc::clone(&cache), Duration::hours(LOCATION_TTL_HOURS));
        Ok(Self {
            config,
            clock,
            notifier,
            cache,
            codes,
            locations,
        })
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Hands committed events to the notifier.
    ///
    /// Delivery failures are logged and dropped.
    pub fn dispatch(&self, events: Vec<NotificationEvent>) {
        for event in events {
            let kind = event.kind;
            let recipient = event.recipient;
            if let Err(err) = self.notifier.notify(event) {
                warn!(kind = %kind, recipient = %recipient, error = %err, "Notification dropped");
            }
        }
    }
}

impl std::fmt::Debug for BookingEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEnv")
            .field("config", &self.config)
            .field("locations", &self.locations)
            .finish_non_exhaustive()
    }
}
