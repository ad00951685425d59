// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

use reqwest::blocking::Response;
use slog::debug;

/// Response header carrying the size of the whole collection
pub const TOTAL_COUNT_HEADER: &str = "Total-Count";

/// How a page-numbered listing recognizes its last page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterStop {
    /// A page holding fewer than `limit` items is the last one.
    ShortPage,

    /// Keep going until as many items arrived as the `Total-Count` header
    /// announced. The header is required.
    TotalCount,
}

/// Where the next page comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum PageCursor {
    /// Client-side page numbers starting at 1, sent as `limit` and `page`.
    Counter { page: u32, limit: u32, stop: CounterStop },

    /// A server-supplied `next_link`, followed verbatim.
    Link(Url),
}

impl PageCursor {
    pub fn counter(limit: u32, stop: CounterStop) -> Self {
        PageCursor::Counter { page: 1, limit: limit.max(1), stop }
    }

    fn request_url(&self, base: &Url) -> Url {
        match self {
            PageCursor::Counter { page, limit, .. } => {
                let mut url = base.clone();
                url.query_pairs_mut()
                    .append_pair("limit", &limit.to_string())
                    .append_pair("page", &page.to_string());
                url
            }

            PageCursor::Link(url) => url.clone(),
        }
    }

    fn read_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: Response,
    ) -> Result<Page<T>, Error> {
        let status = response.status();
        let undecodable =
            |e: reqwest::Error| Error::fetch(endpoint, Some(status), e.to_string());

        match self {
            PageCursor::Counter { stop, .. } => {
                let total = match stop {
                    CounterStop::ShortPage => None,
                    CounterStop::TotalCount => {
                        Some(total_count(endpoint, status, &response)?)
                    }
                };

                let items: Vec<T> = response.json().map_err(undecodable)?;

                Ok(Page { items, total, next_link: None })
            }

            PageCursor::Link(_) => {
                let envelope: LinkedPage<T> =
                    response.json().map_err(undecodable)?;

                Ok(Page {
                    items: envelope.data,
                    total: None,
                    next_link: envelope.pagination.and_then(|p| p.next_link),
                })
            }
        }
    }

    /// Decide what to request after a page of `received` items, with
    /// `accumulated` items collected so far.
    fn advance(
        self,
        endpoint: &str,
        received: usize,
        accumulated: usize,
        total: Option<usize>,
        next_link: Option<String>,
    ) -> Result<Option<PageCursor>, Error> {
        match self {
            PageCursor::Counter { page, limit, stop: CounterStop::ShortPage } => {
                if received < limit as usize {
                    Ok(None)
                } else {
                    Ok(Some(PageCursor::Counter {
                        page: page + 1,
                        limit,
                        stop: CounterStop::ShortPage,
                    }))
                }
            }

            PageCursor::Counter { page, limit, stop: CounterStop::TotalCount } => {
                let Some(total) = total else {
                    return Err(Error::fetch(
                        endpoint,
                        None,
                        format!("no {TOTAL_COUNT_HEADER} for page {page}"),
                    ));
                };

                if accumulated >= total {
                    Ok(None)
                } else if received == 0 {
                    // The collection shrank underneath us.
                    Err(Error::fetch(
                        endpoint,
                        None,
                        format!(
                            "page {page} was empty after {accumulated} of \
                             {total} items"
                        ),
                    ))
                } else {
                    Ok(Some(PageCursor::Counter {
                        page: page + 1,
                        limit,
                        stop: CounterStop::TotalCount,
                    }))
                }
            }

            PageCursor::Link(_) => match next_link.filter(|l| !l.is_empty()) {
                None => Ok(None),

                Some(link) => match Url::parse(&link) {
                    Ok(url) => Ok(Some(PageCursor::Link(url))),
                    Err(e) => Err(Error::fetch(
                        endpoint,
                        None,
                        format!("bad next_link {link}: {e}"),
                    )),
                },
            },
        }
    }
}

struct Page<T> {
    items: Vec<T>,
    total: Option<usize>,
    next_link: Option<String>,
}

/// The version 1 list envelope
#[derive(Deserialize)]
struct LinkedPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,

    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize, Debug, Default)]
struct Pagination {
    #[serde(default)]
    next_link: Option<String>,
}

fn total_count(
    endpoint: &str,
    status: StatusCode,
    response: &Response,
) -> Result<usize, Error> {
    let Some(value) = response.headers().get(TOTAL_COUNT_HEADER) else {
        return Err(Error::fetch(
            endpoint,
            Some(status),
            format!("response has no {TOTAL_COUNT_HEADER} header"),
        ));
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .ok_or_else(|| {
            Error::fetch(
                endpoint,
                Some(status),
                format!("unparseable {TOTAL_COUNT_HEADER} header {value:?}"),
            )
        })
}

impl OneLogin {
    /// Request pages starting at `first` until the cursor runs out. Any
    /// failure discards everything collected so far.
    pub(crate) fn fetch_all<T: DeserializeOwned>(
        &self,
        token: &Token,
        endpoint: &str,
        base: Url,
        first: PageCursor,
    ) -> Result<Vec<T>, Error> {
        let mut items: Vec<T> = Vec::new();
        let mut requests = 0usize;
        let mut cursor = Some(first);

        while let Some(current) = cursor {
            let response =
                self.get(token, endpoint, current.request_url(&base))?;
            let page: Page<T> = current.read_page(endpoint, response)?;
            requests += 1;

            let received = page.items.len();
            items.extend(page.items);

            cursor = current.advance(
                endpoint,
                received,
                items.len(),
                page.total,
                page.next_link,
            )?;
        }

        debug!(
            self.log,
            "fetched {endpoint}";
            "items" => items.len(),
            "requests" => requests,
        );

        Ok(items)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn link(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_counter_starts_at_one() {
        assert_eq!(
            PageCursor::counter(0, CounterStop::ShortPage),
            PageCursor::Counter { page: 1, limit: 1, stop: CounterStop::ShortPage }
        );
    }

    #[test]
    fn test_request_url() {
        let base = Url::parse("https://x.test/api/2/apps?auth_method=2").unwrap();
        let cursor = PageCursor::Counter {
            page: 3,
            limit: 50,
            stop: CounterStop::TotalCount,
        };

        assert_eq!(
            cursor.request_url(&base).as_str(),
            "https://x.test/api/2/apps?auth_method=2&limit=50&page=3"
        );

        let next = Url::parse("https://x.test/api/1/events?after_cursor=abc").unwrap();
        assert_eq!(PageCursor::Link(next.clone()).request_url(&base), next);
    }

    #[test]
    fn test_short_page_stops() {
        let cursor = PageCursor::counter(2, CounterStop::ShortPage);

        let next = cursor.clone().advance("users", 2, 2, None, None).unwrap();
        assert_eq!(
            next,
            Some(PageCursor::Counter { page: 2, limit: 2, stop: CounterStop::ShortPage })
        );

        assert_eq!(cursor.clone().advance("users", 1, 3, None, None).unwrap(), None);
        assert_eq!(cursor.advance("users", 0, 4, None, None).unwrap(), None);
    }

    #[test]
    fn test_total_count_stops() {
        let cursor = PageCursor::counter(2, CounterStop::TotalCount);

        assert!(cursor.clone().advance("apps", 2, 2, Some(5), None).unwrap().is_some());
        assert_eq!(cursor.clone().advance("apps", 2, 6, Some(5), None).unwrap(), None);
        assert_eq!(cursor.clone().advance("apps", 1, 5, Some(5), None).unwrap(), None);

        // never loop without a total, or on an empty page short of it
        assert!(cursor.clone().advance("apps", 2, 2, None, None).is_err());
        assert!(cursor.advance("apps", 0, 2, Some(5), None).is_err());
    }

    #[test]
    fn test_link_follows_next() {
        let first = PageCursor::Link(Url::parse("https://x.test/api/1/events").unwrap());

        let next = first
            .clone()
            .advance("events", 50, 50, None, link("https://x.test/api/1/events?after_cursor=b"))
            .unwrap();
        assert_eq!(
            next,
            Some(PageCursor::Link(
                Url::parse("https://x.test/api/1/events?after_cursor=b").unwrap()
            ))
        );

        assert_eq!(first.clone().advance("events", 50, 50, None, None).unwrap(), None);
        assert_eq!(first.clone().advance("events", 50, 50, None, link("")).unwrap(), None);
        assert!(first.advance("events", 1, 1, None, link("not a url")).is_err());
    }

    #[test]
    fn test_envelope_with_null_link() {
        let page: LinkedPage<u64> = serde_json::from_value(serde_json::json!({
            "status": { "error": false, "code": 200, "type": "success" },
            "pagination": {
                "before_cursor": null,
                "after_cursor": null,
                "previous_link": null,
                "next_link": null,
            },
            "data": [1, 2, 3],
        }))
        .unwrap();

        assert_eq!(page.data, vec![1, 2, 3]);
        assert_eq!(page.pagination.and_then(|p| p.next_link), None);
    }
}
