use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- AUTOINCREMENT so a deleted account's id is never reissued;
        -- tokens never expire, so a reissued id would honor stale ones.
        CREATE TABLE IF NOT EXISTS users (
            user_id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username         TEXT NOT NULL UNIQUE,
            email            TEXT NOT NULL UNIQUE,
            password         TEXT NOT NULL,
            habit_id         INTEGER REFERENCES habits(habit_id),
            habit_frequency  INTEGER,
            created_at       TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS habits (
            habit_id           INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_name         TEXT NOT NULL,
            habit_description  TEXT NOT NULL DEFAULT '',
            habit_category     TEXT NOT NULL DEFAULT '',
            is_default         INTEGER NOT NULL DEFAULT 0,
            created_by         INTEGER REFERENCES users(user_id)
        );

        CREATE TABLE IF NOT EXISTS habit_completions (
            habit_id      INTEGER NOT NULL REFERENCES habits(habit_id),
            user_id       INTEGER NOT NULL REFERENCES users(user_id),
            completed_on  TEXT NOT NULL,
            PRIMARY KEY (habit_id, user_id, completed_on)
        );

        CREATE TABLE IF NOT EXISTS posts (
            post_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(user_id),
            post_title  TEXT NOT NULL,
            post_text   TEXT NOT NULL,
            filename    TEXT NOT NULL,
            media_type  TEXT NOT NULL,
            filesize    INTEGER NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_user
            ON posts(user_id, created_at);

        CREATE TABLE IF NOT EXISTS comments (
            comment_id    INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id       INTEGER NOT NULL REFERENCES posts(post_id),
            user_id       INTEGER NOT NULL REFERENCES users(user_id),
            comment_text  TEXT NOT NULL,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id, created_at);

        -- Deletion of dependents is ordered explicitly by the store layer,
        -- never delegated to ON DELETE CASCADE.
        CREATE TABLE IF NOT EXISTS likes (
            like_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL REFERENCES posts(post_id),
            user_id     INTEGER NOT NULL REFERENCES users(user_id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(post_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_likes_post
            ON likes(post_id);

        CREATE TABLE IF NOT EXISTS prompts (
            prompt_id    INTEGER PRIMARY KEY AUTOINCREMENT,
            prompt_text  TEXT NOT NULL,
            prompt_type  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS reflections (
            reflection_id    INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id          INTEGER NOT NULL REFERENCES users(user_id),
            prompt_id        INTEGER NOT NULL REFERENCES prompts(prompt_id),
            reflection_text  TEXT NOT NULL,
            created_at       TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS motivation_messages (
            message_id      INTEGER PRIMARY KEY AUTOINCREMENT,
            message_text    TEXT NOT NULL,
            message_author  TEXT NOT NULL DEFAULT '',
            last_used_on    TEXT
        );

        -- Seed the stock habits
        INSERT OR IGNORE INTO habits
            (habit_id, habit_name, habit_description, habit_category, is_default)
        VALUES
            (1, 'Drink water', 'Eight glasses spread over the day', 'Health', 1),
            (2, 'Read', 'Twenty minutes with a book', 'Growth', 1),
            (3, 'Walk', 'A thirty minute walk outside', 'Fitness', 1),
            (4, 'Meditate', 'Ten quiet minutes', 'Mindfulness', 1),
            (5, 'Journal', 'Three sentences about the day', 'Mindfulness', 1);

        -- Seed the reflection prompts
        INSERT OR IGNORE INTO prompts (prompt_id, prompt_text, prompt_type) VALUES
            (1, 'What went well today?', 'daily'),
            (2, 'What made your habit hard today?', 'habit'),
            (3, 'What are you grateful for right now?', 'gratitude'),
            (4, 'What will you do differently tomorrow?', 'daily');

        -- Seed the motivational messages
        INSERT OR IGNORE INTO motivation_messages (message_id, message_text, message_author) VALUES
            (1, 'Small steps every day add up to big change.', 'stride'),
            (2, 'You do not have to be perfect, just consistent.', 'stride'),
            (3, 'Showing up is the hardest part, and you just did.', 'stride'),
            (4, 'Every habit is a vote for the person you want to become.', 'stride'),
            (5, 'Progress over perfection.', 'stride');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
