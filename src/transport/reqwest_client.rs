use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::HttpClientTrait;

#[async_trait]
impl HttpClientTrait for reqwest::Client {
    type Request = reqwest::Request;
    type Body = reqwest::Body;
    type Response = reqwest::Response;
    type Error = reqwest::Error;

    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::execute(self, request).await
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::get(self, url).send().await
    }

    async fn head(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::head(self, url).send().await
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: reqwest::Body,
    ) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::post(self, url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::post(self, url).form(form).send().await
    }
}
