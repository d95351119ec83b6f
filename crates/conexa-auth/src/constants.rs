//! Authentication endpoints, relative to `<host>/index.php/api/v2`

/// Login with client id + secret/access keys, returns an access/refresh pair.
pub const LOGIN_PATH: &str = "/pdvauth";

/// Exchange the refresh token (sent as a bearer credential) for a new pair.
pub const REFRESH_PATH: &str = "/refresh-token";
