// Mirrors the tables created under `migrations/`. Timestamp columns are
// filled by database defaults and never read, so they are left out.

diesel::table! {
    follows (follower_id, followed_id) {
        follower_id -> Int8,
        followed_id -> Int8,
    }
}

diesel::table! {
    users (id) {
        id -> Int8,
        #[max_length = 20]
        login -> Varchar,
        password -> Text,
        #[max_length = 254]
        email -> Varchar,
        avatar -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(follows, users);
