use serde::{Serialize, Deserialize};

/// Identity of the device behind a request, as far as the server can tell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub user_fingerprint: String,
    pub ip: String,
}

pub fn generate_server_fingerprint(ip: &str, user_agent: Option<&str>) -> String {
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine;
    use sha2::{Sha256, Digest};

    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    if let Some(ua) = user_agent {
        hasher.update(ua.as_bytes());
    }
    URL_SAFE.encode(hasher.finalize())
}

#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for UserInfo {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let headers = req.headers();
            let ip = headers.get_one("X-Real-IP")
                .or_else(|| headers.get_one("X-Forwarded-For"))
                .map(str::to_string)
                .or_else(|| req.client_ip().map(|ip| ip.to_string()))
                .unwrap_or_else(|| "0.0.0.0".to_string());

            let user_agent = headers.get_one("User-Agent");
            let fingerprint = super::generate_server_fingerprint(&ip, user_agent);

            Outcome::Success(UserInfo {
                user_fingerprint: fingerprint,
                ip,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generate_server_fingerprint;

    #[test]
    fn fingerprint_depends_on_ip_and_agent() {
        let a = generate_server_fingerprint("10.0.0.1", Some("firefox"));
        assert_eq!(a, generate_server_fingerprint("10.0.0.1", Some("firefox")));
        assert_ne!(a, generate_server_fingerprint("10.0.0.2", Some("firefox")));
        assert_ne!(a, generate_server_fingerprint("10.0.0.1", None));
    }
}
