pub mod reqwest_client;

use std::sync::Arc;

use async_trait::async_trait;

/// The request-issuing surface a throttled client wraps.
///
/// Implementations only need to eventually produce a response or an error;
/// nothing above this trait looks at status codes, headers or bodies.
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    type Request: Send + 'static;
    type Body: Send + 'static;
    type Response: Send;
    type Error: Send;

    async fn execute(&self, request: Self::Request) -> Result<Self::Response, Self::Error>;

    async fn get(&self, url: &str) -> Result<Self::Response, Self::Error>;

    async fn head(&self, url: &str) -> Result<Self::Response, Self::Error>;

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Self::Body,
    ) -> Result<Self::Response, Self::Error>;

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<Self::Response, Self::Error>;
}

#[async_trait]
impl<T> HttpClientTrait for Arc<T>
where
    T: HttpClientTrait + ?Sized,
{
    type Request = T::Request;
    type Body = T::Body;
    type Response = T::Response;
    type Error = T::Error;

    async fn execute(&self, request: Self::Request) -> Result<Self::Response, Self::Error> {
        (**self).execute(request).await
    }

    async fn get(&self, url: &str) -> Result<Self::Response, Self::Error> {
        (**self).get(url).await
    }

    async fn head(&self, url: &str) -> Result<Self::Response, Self::Error> {
        (**self).head(url).await
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Self::Body,
    ) -> Result<Self::Response, Self::Error> {
        (**self).post(url, content_type, body).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<Self::Response, Self::Error> {
        (**self).post_form(url, form).await
    }
}
