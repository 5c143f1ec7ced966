use rocket::{Request, catch, serde::json::Json};
use shared::ErrorResponse;

fn body(error: &str) -> Json<ErrorResponse> {
    Json(ErrorResponse { error: error.into() })
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorResponse> {
    body("Invalid request parameters.")
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<ErrorResponse> {
    match req.uri().path().segments().nth(1) {
        Some("poll") => body("Poll not found"),
        _ => body("The requested resource was not found."),
    }
}

#[catch(409)]
pub fn conflict(_req: &Request) -> Json<ErrorResponse> {
    body("You have already voted in this poll")
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<ErrorResponse> {
    body("Malformed request body.")
}

#[catch(429)]
pub fn too_many_requests(_req: &Request) -> Json<ErrorResponse> {
    body("Rate limit exceeded. Please wait before trying again.")
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorResponse> {
    body("An internal server error occurred.")
}
