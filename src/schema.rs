table! {
    schedule (telescope, date) {
        telescope -> Varchar,
        date -> Date,
        queue -> Nullable<Varchar>,
        staff_op -> Nullable<Varchar>,
        staff_eo -> Nullable<Varchar>,
        staff_it -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        notes_private -> Bool,
        holiday -> Bool,
    }
}

table! {
    schedule_slot (telescope, date, time) {
        telescope -> Varchar,
        date -> Date,
        time -> Time,
        queue -> Varchar,
    }
}

table! {
    schedule_queue (telescope, queue) {
        telescope -> Varchar,
        queue -> Varchar,
        name -> Varchar,
        foreground -> Nullable<Char>,
        background -> Nullable<Char>,
        hidden -> Bool,
    }
}

allow_tables_to_appear_in_same_query!(
    schedule,
    schedule_queue,
    schedule_slot,
);
