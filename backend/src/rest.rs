use std::marker::PhantomData;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, de::DeserializeOwned};
use table::{DataSource, Page, PageQuery};
use types::{Error, Patch, Result, Row};
use url::Url;

use crate::auth::AuthProvider;

trait ReqwestExt {
    /// Send the request, sorting failures into network and server errors.
    async fn send_checked(self) -> Result<Vec<u8>>;

    async fn try_send<T: DeserializeOwned>(self) -> Result<T>;
}

impl ReqwestExt for RequestBuilder {
    async fn send_checked(self) -> Result<Vec<u8>> {
        let response = self
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::server(status.as_u16(), server_message(status, &body)));
        }
        Ok(body.to_vec())
    }

    async fn try_send<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.send_checked().await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|error| {
        // NOTE: The body may hold user data, so only the parse error is logged.
        tracing::debug!(%error, "failed to parse response");
        Error::malformed(error.to_string())
    })
}

/// Pull a human-readable message out of an error body.
fn server_message(status: StatusCode, body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    if let Ok(ErrorBody { message, error }) = serde_json::from_slice::<ErrorBody>(body)
        && let Some(message) = message.or(error)
    {
        return message;
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        text.to_string()
    }
}

/// The two list shapes the backends return: a bare array, or one page
/// together with the total count.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<R> {
    Paged { records: Vec<R>, total: usize },
    Full(Vec<R>),
}

impl<R> From<ListResponse<R>> for Page<R> {
    fn from(response: ListResponse<R>) -> Self {
        match response {
            ListResponse::Paged { records, total } => Page::partial(records, total),
            ListResponse::Full(records) => Page::full(records),
        }
    }
}

/// A REST collection, e.g. `GET {base}/users` and `PATCH {base}/users/{id}`.
pub struct RestSource<R, A> {
    client: Client,
    base_url: Url,
    collection: String,
    auth: A,
    _row: PhantomData<fn() -> R>,
}

impl<R, A: AuthProvider> RestSource<R, A> {
    pub fn new(base_url: Url, collection: impl Into<String>, auth: A) -> Self {
        Self::with_client(Client::new(), base_url, collection, auth)
    }

    pub fn with_client(
        client: Client,
        mut base_url: Url,
        collection: impl Into<String>,
        auth: A,
    ) -> Self {
        // Without a trailing slash `join` would replace the last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            client,
            base_url,
            collection: collection.into(),
            auth,
            _row: PhantomData,
        }
    }

    fn collection_url(&self) -> Result<Url> {
        self.base_url
            .join(&self.collection)
            .map_err(|e| Error::network(format!("invalid collection url: {e}")))
    }

    fn row_url(&self, id: &impl std::fmt::Display) -> Result<Url> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|()| Error::network("base url cannot hold a path"))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.auth.auth_header().await {
            Some(header) => builder.header(header.name.as_str(), header.value.expose_secret()),
            None => builder,
        }
    }
}

fn query_params(query: &PageQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    let text = query.query.trim();
    if !text.is_empty() {
        params.push(("q", text.to_string()));
    }
    if let Some(tag) = &query.tag {
        params.push(("tag_field", tag.field.clone()));
        params.push(("tag_value", tag.value.to_string()));
    }
    if let Some(range) = &query.date_range {
        params.push(("date_field", range.field.clone()));
        if let Some(from) = range.from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = range.to {
            params.push(("to", to.to_string()));
        }
    }
    if let Some(sort) = &query.sort {
        params.push(("sort", sort.key.clone()));
        params.push(("dir", sort.direction.as_str().to_string()));
    }
    if let Some(page) = query.page {
        params.push(("page", page.to_string()));
    }
    if let Some(page_size) = query.page_size {
        params.push(("page_size", page_size.to_string()));
    }

    params
}

impl<R, A> DataSource for RestSource<R, A>
where
    R: Row + DeserializeOwned,
    A: AuthProvider,
{
    type Row = R;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<R>> {
        let url = self.collection_url()?;
        tracing::debug!(%url, "fetching collection");

        let response: ListResponse<R> = self
            .request(Method::GET, url)
            .await
            .query(&query_params(query))
            .try_send()
            .await?;
        Ok(response.into())
    }

    async fn apply_patch(&self, id: &R::Id, patch: &Patch) -> Result<Option<R>> {
        let url = self.row_url(id)?;
        tracing::debug!(%url, fields = patch.len(), "patching row");

        let body = self
            .request(Method::PATCH, url)
            .await
            .json(patch)
            .send_checked()
            .await?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        decode(&body).map(Some)
    }
}
