//! Map links for a listing's place.  Only URLs are built; nothing is fetched.

use serde::Serialize;

const EMBED_BASE: &str = "https://www.google.com/maps";
const SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// URL for an embedded map frame centred on `address`.
pub fn embed_url(address: &str) -> String {
    format!("{EMBED_BASE}?q={}&output=embed", urlencoding::encode(address.trim()))
}

/// URL opening a map search for `address` in a new tab.
pub fn search_url(address: &str) -> String {
    format!("{SEARCH_BASE}{}", urlencoding::encode(address.trim()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLinks {
    pub embed_url: String,
    pub search_url: String,
}

impl MapLinks {
    pub fn for_address(address: &str) -> Self {
        Self {
            embed_url: embed_url(address),
            search_url: search_url(address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_addresses() {
        assert_eq!(
            embed_url("Shibuya Station"),
            "https://www.google.com/maps?q=Shibuya%20Station&output=embed"
        );
        assert_eq!(
            search_url(" 東京都 "),
            "https://www.google.com/maps/search/%E6%9D%B1%E4%BA%AC%E9%83%BD"
        );
    }
}
