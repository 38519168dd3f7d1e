diesel::table! {
    books (id) {
        id -> Text,
        name -> Text,
        chapters -> Integer,
    }
}

diesel::table! {
    translations (id) {
        id -> Text,
        name -> Text,
        note -> Text,
    }
}

diesel::table! {
    verses (id) {
        id -> Integer,
        translation_id -> Text,
        book_id -> Text,
        book_name -> Text,
        chapter -> Integer,
        verse -> Integer,
        text -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(books, translations, verses);
