// Keep in sync with `migrations/`.

diesel::table! {
    calendar_event (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        location -> Nullable<Text>,
        color -> Nullable<Text>,
        is_all_day -> Bool,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        recurrence_frequency -> Text,
        recurrence_interval -> Nullable<Int4>,
        recurrence_days -> Nullable<Array<Int2>>,
        recurrence_day_of_month -> Nullable<Int4>,
        recurrence_week_of_month -> Nullable<Int4>,
        recurrence_day_of_week -> Nullable<Int4>,
        recurrence_end_date -> Nullable<Timestamptz>,
        recurrence_count -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}
