use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};

use crate::middleware::require_auth;
use crate::state::{AppState, MediaState};
use crate::{auth, comments, habits, likes, messages, posts, reflections, users};

pub async fn health() -> &'static str {
    "ok"
}

/// Routes for the identity/habit service. Mutating routes sit behind the
/// token check; reads are public.
pub fn auth_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/users", post(users::register))
        .route("/users", get(users::list_users))
        .route("/users/username/{username}", get(users::check_username))
        .route("/users/email/{email}", get(users::check_email))
        .route("/users/{id}", get(users::get_user))
        .route("/habits", get(habits::list_habits))
        .route("/habits/created", get(habits::list_created_habits))
        .route("/habits/created/{id}", get(habits::get_created_habit))
        .route("/habits/{id}", get(habits::get_habit))
        .route("/health", get(health));

    let protected = Router::new()
        .route("/users/token", get(users::check_token))
        .route("/users", put(users::update_user))
        .route("/users", delete(users::delete_user))
        .route("/habits", post(habits::create_habit))
        .route("/habits", put(habits::select_habit))
        .route("/habits/frequency", post(habits::set_frequency))
        .route("/habits/dates/{id}", get(habits::list_completions))
        .route("/habits/dates/{id}", post(habits::add_completion))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).with_state(state)
}

/// Routes for the social-content service.
pub fn media_router(state: MediaState) -> Router {
    let public = Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/comments", get(comments::list_comments))
        .route("/comments/bypost/{id}", get(comments::comments_by_post))
        .route("/comments/byuser/{id}", get(comments::comments_by_user))
        .route("/comments/count/{id}", get(comments::comment_count))
        .route("/likes", get(likes::list_likes))
        .route("/likes/bypost/{id}", get(likes::likes_by_post))
        .route("/likes/count/{id}", get(likes::like_count))
        .route("/reflections", get(reflections::list_reflections))
        .route("/reflections/prompts", get(reflections::list_prompts))
        .route("/messages", get(messages::next_message))
        .route("/health", get(health));

    let protected = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/{id}", put(posts::update_post))
        .route("/posts/{id}", delete(posts::delete_post))
        .route("/comments", post(comments::create_comment))
        .route("/comments/{id}", put(comments::update_comment))
        .route("/comments/{id}", delete(comments::delete_comment))
        .route("/likes", post(likes::create_like))
        .route("/likes/bypost/user/{id}", get(likes::like_by_post_and_user))
        .route("/likes/byuser/{id}", get(likes::likes_by_user))
        .route("/likes/{post_id}", delete(likes::delete_like))
        .route("/reflections", post(reflections::create_reflection))
        .route("/reflections/byuser/{id}", get(reflections::reflections_by_user))
        .layer(middleware::from_fn_with_state(
            state.app.clone(),
            require_auth,
        ));

    public.merge(protected).with_state(state)
}
