//! HTTP fetching of item documents, with a read-through response cache.

use crate::cache::ResponseCache;
use crate::config::{ID_PLACEHOLDER, Settings};
use crate::error::Result;
use crate::models::ItemId;

/// Status code and body of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP GET client.
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        (**self).get(url)
    }
}

/// Blocking `reqwest` client.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

/// Serves responses from a cache, falling back to the wrapped client.
///
/// Only successful responses are stored.
pub struct CachedClient<C, K> {
    inner: C,
    cache: K,
}

impl<C: HttpClient, K: ResponseCache> CachedClient<C, K> {
    pub fn new(inner: C, cache: K) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &K {
        &self.cache
    }
}

impl<C: HttpClient, K: ResponseCache> HttpClient for CachedClient<C, K> {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        if let Some(body) = self.cache.get(url)? {
            tracing::debug!("Cache hit for URL: {}", url);
            return Ok(HttpResponse::ok(body));
        }

        tracing::debug!("Cache miss, fetching URL: {}", url);
        let response = self.inner.get(url)?;
        if response.is_success() {
            self.cache.put(url, &response.body)?;
        }
        Ok(response)
    }
}

/// Fetches item documents from the item API.
pub struct ItemFetcher<C> {
    client: C,
    url_template: String,
}

impl<C: HttpClient> ItemFetcher<C> {
    pub fn new(client: C, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn item_url(&self, item_id: ItemId) -> String {
        self.url_template.replace(ID_PLACEHOLDER, &item_id.to_string())
    }

    /// Fetch the raw body for one item. Transport errors propagate.
    pub fn fetch_item(&self, item_id: ItemId) -> Result<String> {
        let url = self.item_url(item_id);
        tracing::info!("Fetching {}", url);

        let response = self.client.get(&url)?;
        if !response.is_success() {
            tracing::warn!("Item {} returned HTTP {}", item_id, response.status);
        }
        Ok(response.body)
    }

    /// Fetch items one at a time, in iteration order.
    pub fn fetch_items<I>(&self, item_ids: I) -> Result<Vec<(ItemId, String)>>
    where
        I: IntoIterator<Item = ItemId>,
    {
        item_ids
            .into_iter()
            .map(|id| Ok((id, self.fetch_item(id)?)))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::PtFoodError;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned responses keyed by URL, recording every request made.
    #[derive(Default)]
    pub struct FakeClient {
        pub responses: HashMap<String, HttpResponse>,
        pub requests: RefCell<Vec<String>>,
    }

    impl FakeClient {
        pub fn with(mut self, url: &str, response: HttpResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }
    }

    impl HttpClient for FakeClient {
        fn get(&self, url: &str) -> Result<HttpResponse> {
            self.requests.borrow_mut().push(url.to_string());
            self.responses.get(url).cloned().ok_or_else(|| {
                PtFoodError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("no route to {}", url),
                ))
            })
        }
    }
}
