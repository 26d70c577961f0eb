// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tutor_booking_domain::TutorId;

/// A status change requested for an existing booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The course tutor takes the booking.
    Accept {
        tutor_id: TutorId,
        notes: Option<String>,
    },
    /// The course tutor turns the booking down.
    Decline {
        tutor_id: TutorId,
        notes: Option<String>,
    },
    /// The scheduler materialises a passed deadline.
    Expire,
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Accept { .. } => "AcceptBooking",
            Self::Decline { .. } => "DeclineBooking",
            Self::Expire => "ExpireBooking",
        }
    }
}
