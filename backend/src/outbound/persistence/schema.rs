//! Diesel table definitions mirroring `backend/migrations`.

diesel::table! {
    users (id) {
        id -> Int8,
        username -> Text,
        email -> Text,
        password_hash -> Text,
        role -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    courses (id) {
        id -> Int8,
        code -> Text,
        name -> Text,
        instructor -> Text,
        credits -> Int4,
        capacity -> Int4,
        enrolled -> Int4,
        day -> Text,
        start_time -> Text,
        end_time -> Text,
        semester -> Text,
        description -> Nullable<Text>,
    }
}

diesel::table! {
    registrations (id) {
        id -> Int8,
        student_id -> Int8,
        course_id -> Int8,
        status -> Text,
        registered_at -> Timestamptz,
    }
}

diesel::joinable!(registrations -> courses (course_id));
diesel::joinable!(registrations -> users (student_id));

diesel::allow_tables_to_appear_in_same_query!(courses, registrations, users);
