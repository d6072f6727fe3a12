use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER};
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::Filter;
use crate::error::RunError;
use crate::models::{Posting, RawPosting};
use crate::sources::PostingSource;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:131.0) Gecko/20100101 Firefox/131.0";
const PAGE_LIMIT: u32 = 32;

/// Client for the Fundgrube postings API shared by both endpoints. One
/// request per filter per endpoint, bounded timeout, no retries.
pub struct FundgrubeApi {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct PostingsPage {
    postings: Vec<RawPosting>,
}

impl FundgrubeApi {
    pub fn new() -> Result<Self, RunError> {
        // The endpoint rejects clients that do not look like a browser.
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.5"));
        headers.insert(
            REFERER,
            HeaderValue::from_static("https://www.mediamarkt.de/de/data/fundgrube"),
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(25))
            .build()
            .map_err(|e| RunError::Config(format!("cannot build http client: {e}")))?;

        Ok(Self { client })
    }

    fn build_url(filter: &Filter, base_url: &str) -> String {
        let text = utf8_percent_encode(&filter.search, NON_ALPHANUMERIC);
        let mut url = format!(
            "{base_url}/api/postings?limit={PAGE_LIMIT}&offset=0&orderBy=new&recentFilter=text&text={text}"
        );
        if let Some(max_price) = filter.max_price {
            url.push_str(&format!("&priceMax={max_price}"));
        }
        url
    }
}

#[async_trait]
impl PostingSource for FundgrubeApi {
    async fn fetch(&self, filter: &Filter, base_url: &str) -> Result<Vec<Posting>, RunError> {
        let url = Self::build_url(filter, base_url);
        debug!("fetching {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RunError::Fetch(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RunError::Fetch(format!("GET {url}: HTTP {status}")));
        }

        let page: PostingsPage = response
            .json()
            .await
            .map_err(|e| RunError::Fetch(format!("decode postings from {url}: {e}")))?;

        Ok(page
            .postings
            .into_iter()
            .map(|raw| Posting::from_raw(raw, base_url))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn filter(search: &str, max_price: Option<f64>) -> Filter {
        serde_json::from_value(serde_json::json!({
            "include": search,
            "price": max_price,
        }))
        .unwrap()
    }

    #[test]
    fn url_percent_encodes_the_search_text() {
        let url = FundgrubeApi::build_url(
            &filter("Nintendo Switch", None),
            "https://www.saturn.de/de/data/fundgrube",
        );
        assert_eq!(
            url,
            "https://www.saturn.de/de/data/fundgrube/api/postings?limit=32&offset=0&orderBy=new&recentFilter=text&text=Nintendo%20Switch"
        );
    }

    #[test]
    fn url_appends_price_ceiling_when_set() {
        let url = FundgrubeApi::build_url(&filter("PS5", Some(400.0)), "https://base");
        assert!(url.ends_with("&text=PS5&priceMax=400"));
    }

    #[tokio::test]
    async fn fetch_decodes_postings_from_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/postings"))
            .and(query_param("text", "Switch"))
            .and(query_param("orderBy", "new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "postings": [{
                    "posting_id": "abc",
                    "pim_id": 2681424,
                    "name": "Nintendo Switch",
                    "posting_text": "Einzelstück",
                    "price": "199.00",
                    "shipping_cost": 4.99,
                    "discount_in_percent": 30,
                    "outlet": {"id": 418}
                }],
                "morePostingsAvailable": false
            })))
            .mount(&server)
            .await;

        let api = FundgrubeApi::new().unwrap();
        let postings = api.fetch(&filter("Switch", None), &server.uri()).await.unwrap();

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].posting_id.0, "abc");
        assert_eq!(postings[0].base_url, server.uri());
        assert_eq!(
            postings[0].direct_url(),
            format!("{}?outletIds=418&text=2681424", server.uri())
        );
    }

    #[tokio::test]
    async fn http_error_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = FundgrubeApi::new().unwrap();
        let err = api
            .fetch(&filter("Switch", None), &server.uri())
            .await
            .unwrap_err();
        assert_eq!(err.kind_name(), "FetchError");
    }

    #[tokio::test]
    async fn malformed_body_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let api = FundgrubeApi::new().unwrap();
        let err = api
            .fetch(&filter("Switch", None), &server.uri())
            .await
            .unwrap_err();
        assert_eq!(err.kind_name(), "FetchError");
    }
}
