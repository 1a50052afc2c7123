use http::Method;
use serde::Serialize;
use url::Url;

use crate::authorizer::OutgoingRequest;
use crate::client::errors::ClientError;
use crate::client::pipeline::RequestPipeline;

/// `reqwest` client that runs every request through a [`RequestPipeline`].
///
/// This is the glue between the session's interception hook and a concrete
/// transport: requests are classified and decorated before dispatch, and the
/// response head is offered back to the interceptors.
#[derive(Clone)]
pub struct AuthorizedClient {
    client: reqwest::Client,
    pipeline: RequestPipeline,
}

impl AuthorizedClient {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self::with_client(reqwest::Client::new(), pipeline)
    }

    pub fn with_client(client: reqwest::Client, pipeline: RequestPipeline) -> Self {
        Self { client, pipeline }
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub async fn send(&self, mut request: OutgoingRequest) -> Result<reqwest::Response, ClientError> {
        self.pipeline.prepare(&mut request);
        tracing::debug!(
            "{} {} (cross-origin: {})",
            request.method(),
            request.url(),
            request.is_cross_origin()
        );

        let (method, url, headers, body) = request.clone().into_parts();
        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let response = builder.send().await?;

        self.pipeline
            .complete(&request, response.status(), response.headers());
        Ok(response)
    }

    pub async fn get(&self, url: Url) -> Result<reqwest::Response, ClientError> {
        self.send(OutgoingRequest::get(url)).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
    ) -> Result<reqwest::Response, ClientError> {
        self.send(OutgoingRequest::new(Method::POST, url).with_json(body)?)
            .await
    }
}
