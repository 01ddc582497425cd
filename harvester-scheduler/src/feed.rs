//! Fetching and parsing RSS feeds.

use crate::error::SchedulerError;

/// A single feed entry, reduced to the fields the scheduler cares about.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub link: String,
}

/// Fetches and parses a feed, returning entries in feed order. `max_items`
/// truncates to the first `max_items` entries; `max_items == 0` means
/// unbounded and every entry is returned. A feed with zero usable links
/// (missing `<link>` per item) yields an empty vec rather than an error;
/// that's logged by the caller, not this function.
///
/// # Errors
/// Returns [`SchedulerError::Fetch`] if the HTTP request fails, and
/// [`SchedulerError::Parse`] if the body isn't a well-formed RSS channel.
pub async fn fetch_feed(feed_url: &str, max_items: usize) -> Result<Vec<FeedItem>, SchedulerError> {
    let body = reqwest::get(feed_url)
        .await
        .map_err(|source| SchedulerError::Fetch {
            url: feed_url.to_string(),
            source,
        })?
        .bytes()
        .await
        .map_err(|source| SchedulerError::Fetch {
            url: feed_url.to_string(),
            source,
        })?;

    let channel = rss::Channel::read_from(&body[..]).map_err(|e| SchedulerError::Parse {
        url: feed_url.to_string(),
        reason: e.to_string(),
    })?;

    let links = channel
        .items()
        .iter()
        .filter_map(|item| item.link().map(str::to_string));

    let items = if max_items == 0 {
        links.map(|link| FeedItem { link }).collect()
    } else {
        links.take(max_items).map(|link| FeedItem { link }).collect()
    };

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_item_keeps_link() {
        let item = FeedItem {
            link: "https://example.com/a".into(),
        };
        assert_eq!(item.link, "https://example.com/a");
    }
}
