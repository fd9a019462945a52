use gloo_net::http::{Method, Request};
use shared::api::{ClientTransport, HttpMethod};
use shared::{UserId, USER_ID_HEADER};

const API_BASE: &str = match option_env!("GPTNIX_API_URL") {
    Some(url) => url,
    None => "http://localhost:3000",
};

/// Talks to the backend over `fetch`, tagging each request with the identity
/// taken from the page's `?user=` parameter.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    base_url: String,
    identity: Option<UserId>,
}

impl HttpTransport {
    pub fn from_location() -> Self {
        let identity = web_sys::window()
            .and_then(|window| window.location().search().ok())
            .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok())
            .and_then(|params| params.get("user"))
            .and_then(|user| UserId::parse(&user));

        Self {
            base_url: API_BASE.trim_end_matches('/').to_owned(),
            identity,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl ClientTransport for HttpTransport {
    type Error = gloo_net::Error;

    async fn send_request(
        &self,
        method: HttpMethod,
        route: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Result<serde_json::Value, serde_json::Value>, Self::Error> {
        let method = match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let url = format!("{}{}", self.base_url, route);
        let mut req = Request::new(&url).method(method);
        if let Some(identity) = &self.identity {
            req = req.header(USER_ID_HEADER, identity.as_str());
        }

        let req = if let Some(body) = body {
            req.json(&body)?
        } else {
            req
        };

        let resp = req.send().await?;

        let json = resp.json().await?;

        if resp.ok() {
            Ok(Ok(json))
        } else {
            Ok(Err(json))
        }
    }
}
