use crate::{
    data::{RequestData, ResponseData},
    error::Error,
    util,
};
use async_trait::async_trait;
use hyper::{body, client::HttpConnector, Body, Client, Request, Uri};
use hyper_tls::HttpsConnector;
use std::fmt::Debug;
use tracing::debug;

// headers describing the hop to the local server, not the call itself
const HOP_HEADERS: &[&str] = &["host", "connection", "content-length", "transfer-encoding"];

/// Passes a captured request on to the real service while recording.
#[async_trait]
pub trait HttpForwarder: Debug {
    async fn forward(
        &self,
        domain_name: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error>;
}

type HttpsClient = Client<HttpsConnector<HttpConnector>>;

/// Forwards over one pooled hyper client. Plain `http://` domains work too.
#[derive(Debug, Clone)]
pub struct HyperForwarder {
    client: HttpsClient,
}

impl HyperForwarder {
    pub fn new() -> Self {
        Self {
            client: Client::builder().build(HttpsConnector::new()),
        }
    }

    fn to_request(domain_name: &str, request_data: &RequestData) -> Result<Request<Body>, Error> {
        let target = format!("{}{}", domain_name.trim_end_matches('/'), request_data.uri);
        let uri: Uri = target.parse().map_err(|_| Error::InvalidUrl(target.clone()))?;

        let mut request = Request::new(Body::from(request_data.body.clone()));
        *request.uri_mut() = uri;
        *request.method_mut() = request_data
            .method
            .parse()
            .map_err(|_| Error::Playback(format!("unsupported method {}", request_data.method)))?;

        let forwarded = request_data
            .headers
            .iter()
            .filter(|(name, _)| !HOP_HEADERS.contains(&name.to_lowercase().as_str()));
        util::put_headers(request.headers_mut(), forwarded)?;

        Ok(request)
    }
}

#[async_trait]
impl HttpForwarder for HyperForwarder {
    async fn forward(
        &self,
        domain_name: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error> {
        let request = Self::to_request(domain_name, request_data)?;
        debug!("Forwarding {} {}", request.method(), request.uri());

        let (parts, body) = self.client.request(request).await?.into_parts();
        let body = body::to_bytes(body).await?;

        Ok(ResponseData {
            status_code: parts.status.as_u16(),
            headers: util::extract_headers(&parts.headers),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

impl Default for HyperForwarder {
    fn default() -> Self {
        Self::new()
    }
}
