pub const VERSION: &str = "1";

pub const CREATE_STATEMENT: &str = r#"
        CREATE TABLE "tweets_scored" (
            "id_tweet"  TEXT NOT NULL,
            "user_id"   TEXT NOT NULL,
            "username"  TEXT NOT NULL,
            "text"      TEXT NOT NULL,
            "published_at"  TEXT NOT NULL,
            "likes"     INTEGER NOT NULL DEFAULT 0,
            "retweets"  INTEGER NOT NULL DEFAULT 0,
            "replies"   INTEGER NOT NULL DEFAULT 0,
            "followers" INTEGER NOT NULL DEFAULT 0,
            "score"     REAL NOT NULL,
            "impact_score"  REAL NOT NULL,
            "freshness_multiplier"  REAL NOT NULL,
            "consistency_multiplier"    REAL NOT NULL,
            "decay_factor"  REAL NOT NULL,
            "index_in_batch"    INTEGER NOT NULL,
            "is_first_of_week"  INTEGER NOT NULL DEFAULT 0,
            "is_second_of_week" INTEGER NOT NULL DEFAULT 0,
            "user_was_active_last_week" INTEGER NOT NULL DEFAULT 0,
            "processed_at"  TEXT NOT NULL,
            PRIMARY KEY("id_tweet")
        );

        CREATE TABLE "meta" (
            "key"       TEXT NOT NULL,
            "value"     TEXT,
            PRIMARY KEY("key")
        );
    "#;
