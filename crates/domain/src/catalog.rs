// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only catalog records owned by other parts of the platform.

use crate::money::Money;
use crate::types::{
    CategoryId, ClassType, CourseId, DayOfWeek, ScheduleId, StudentId, Timezone, TutorId, UserId,
};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub tutor_id: TutorId,
    pub category_id: CategoryId,
    pub title: String,
    pub is_published: bool,
    pub is_free_first_course: bool,
    pub class_type: ClassType,
    pub price: Money,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Returns whether a student may book this course for `requested`.
    #[must_use]
    pub fn is_bookable_for(&self, requested: ClassType) -> bool {
        self.deleted_at.is_none() && self.is_published && self.class_type.accepts(requested)
    }
}

/// A recurring weekly slot a course is offered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSchedule {
    pub id: ScheduleId,
    pub course_id: CourseId,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub timezone: Timezone,
    pub class_type: ClassType,
}

impl CourseSchedule {
    #[must_use]
    pub fn matches(
        &self,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        timezone: Timezone,
        requested: ClassType,
    ) -> bool {
        self.day_of_week == day_of_week
            && self.start_time == start_time
            && self.timezone == timezone
            && self.class_type.accepts(requested)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    pub id: TutorId,
    pub user_id: UserId,
    pub name: String,
    pub response_time: Option<String>,
    pub level_point: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    pub name: String,
    pub deleted_at: Option<DateTime<Utc>>,
}
