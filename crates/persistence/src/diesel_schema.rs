// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

// Maintained by hand to match `migrations/`. `cargo xtask verify-schema`
// compares the two.

diesel::table! {
    tutors (id) {
        id -> Text,
        user_id -> Text,
        name -> Text,
        response_time -> Nullable<Text>,
        level_point -> BigInt,
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    students (id) {
        id -> Text,
        user_id -> Text,
        name -> Text,
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    courses (id) {
        id -> Text,
        tutor_id -> Text,
        category_id -> Text,
        title -> Text,
        is_published -> Integer,
        is_free_first_course -> Integer,
        class_type -> Text,
        price -> BigInt,
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    course_schedules (id) {
        id -> Text,
        course_id -> Text,
        day_of_week -> Integer,
        start_time -> Text,
        timezone -> Text,
        class_type -> Text,
    }
}

diesel::table! {
    bookings (id) {
        id -> Text,
        code -> Text,
        course_id -> Text,
        tutor_id -> Text,
        student_id -> Text,
        category_id -> Text,
        class_type -> Text,
        booking_date -> Text,
        booking_time -> Text,
        timezone -> Text,
        session_starts_at -> Text,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
        notes_for_tutor -> Nullable<Text>,
        notes_for_student -> Nullable<Text>,
        is_free_first_course -> Integer,
        gross_amount -> BigInt,
        status -> Text,
        is_reviewed -> Integer,
        expired_at -> Text,
        created_at -> Text,
        updated_at -> Text,
        deleted_at -> Nullable<Text>,
        created_by -> Text,
        updated_by -> Nullable<Text>,
        deleted_by -> Nullable<Text>,
    }
}

diesel::table! {
    booking_status_history (id) {
        id -> BigInt,
        booking_id -> Text,
        previous_status -> Nullable<Text>,
        new_status -> Text,
        transitioned_at -> Text,
        actor_user_id -> Nullable<Text>,
        actor_role -> Text,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    tutor_balances (tutor_id) {
        tutor_id -> Text,
        balance -> BigInt,
        updated_at -> Nullable<Text>,
    }
}

diesel::table! {
    balance_transactions (id) {
        id -> Text,
        tutor_id -> Text,
        transaction_type -> Text,
        amount -> BigInt,
        commission -> BigInt,
        reference_type -> Text,
        reference_id -> Text,
        description -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    withdrawal_requests (id) {
        id -> Text,
        tutor_id -> Text,
        amount -> BigInt,
        bank_name -> Text,
        account_number -> Text,
        account_holder -> Text,
        status -> Text,
        admin_note -> Nullable<Text>,
        processed_at -> Nullable<Text>,
        processed_by -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    tutor_reviews (id) {
        id -> Text,
        booking_id -> Text,
        course_id -> Text,
        tutor_id -> Text,
        student_id -> Text,
        review -> Nullable<Text>,
        rate -> Nullable<Integer>,
        recommend_by_student -> Integer,
        is_submitted -> Integer,
        created_at -> Text,
        updated_at -> Text,
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    report_bookings (id) {
        id -> Text,
        booking_id -> Text,
        student_id -> Text,
        topic -> Text,
        body -> Text,
        status -> Text,
        resolved_by -> Nullable<Text>,
        resolved_at -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    notifications (id) {
        id -> Text,
        recipient_user_id -> Text,
        kind -> Text,
        title -> Text,
        body -> Text,
        booking_id -> Nullable<Text>,
        created_at -> Text,
        read_at -> Nullable<Text>,
    }
}

diesel::joinable!(courses -> tutors (tutor_id));
diesel::joinable!(course_schedules -> courses (course_id));
diesel::joinable!(booking_status_history -> bookings (booking_id));
diesel::joinable!(tutor_reviews -> bookings (booking_id));
diesel::joinable!(report_bookings -> bookings (booking_id));

diesel::allow_tables_to_appear_in_same_query!(
    tutors,
    students,
    courses,
    course_schedules,
    bookings,
    booking_status_history,
    tutor_balances,
    balance_transactions,
    withdrawal_requests,
    tutor_reviews,
    report_bookings,
    notifications,
);
