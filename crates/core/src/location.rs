// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Human-readable location for offline session reminders.

use crate::cache::CacheKv;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tutor_booking_domain::Coordinates;

/// Reverse geocoding backend.
pub trait Geocoder: Send + Sync {
    /// Returns a display address for `point`, or `None` if unknown.
    fn describe(&self, point: Coordinates) -> Option<String>;
}

/// Falls back to printing the raw coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateGeocoder;

impl Geocoder for CoordinateGeocoder {
    fn describe(&self, point: Coordinates) -> Option<String> {
        Some(format!("{:.6}, {:.6}", point.latitude, point.longitude))
    }
}

/// Read-through cache in front of a [`Geocoder`].
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: Arc<dyn CacheKv>,
    ttl: Duration,
}

impl LocationResolver {
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>, cache: Arc<dyn CacheKv>, ttl: Duration) -> Self {
        Self {
            geocoder,
            cache,
            ttl,
        }
    }

    fn key(point: Coordinates) -> String {
        format!("location:{:.6},{:.6}", point.latitude, point.longitude)
    }

    /// Resolves `point`, serving repeated lookups from the cache.
    pub fn resolve(&self, point: Coordinates, now: DateTime<Utc>) -> Option<String> {
        let key = Self::key(point);
        if let Some(hit) = self.cache.get(&key, now) {
            return Some(hit);
        }
        let described = self.geocoder.describe(point)?;
        self.cache.set(&key, described.clone(), self.ttl, now);
        Some(described)
    }
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
