/// Middleware modules for the API server
///
/// Authentication and the admin gate live in `app`, next to the routes they guard.

pub mod security;
