pub mod config;
pub mod routes;
pub mod store;
pub mod cors;
pub mod error;
pub mod rate_limiter;
pub mod catchers;
pub mod persist;

use rocket::{routes, catchers, Build, Rocket};
use crate::{
    routes::{all_options, cast_vote, create_poll, get_poll, list_polls, AppState},
    cors::CORS,
    catchers::{bad_request, conflict, internal_error, not_found, too_many_requests, unprocessable},
};

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .attach(CORS)
        .manage(state)
        .mount(
            "/api",
            routes![
                list_polls,
                get_poll,
                cast_vote,
                create_poll,
                all_options
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                not_found,
                conflict,
                unprocessable,
                too_many_requests,
                internal_error
            ],
        )
}
