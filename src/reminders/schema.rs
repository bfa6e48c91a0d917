diesel::table! {
    medicine_reminders (id) {
        id -> Integer,
        medicine -> Text,
        times -> Text,
        days -> Text,
        number_of_days -> Nullable<Integer>,
        created_at -> BigInt,
    }
}
