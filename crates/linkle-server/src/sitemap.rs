//! `sitemap.xml` for search engines: the fixed pages plus one entry per
//! listing.

use chrono::{DateTime, SecondsFormat, Utc};
use linkle_shared::Listing;
use quick_xml::escape::escape;

struct UrlEntry {
    loc: String,
    change_freq: &'static str,
    priority: f32,
}

/// Render the sitemap for `base` (an origin without trailing slash).
pub fn build_sitemap_xml(base: &str, listings: &[Listing], now: DateTime<Utc>) -> String {
    let mut entries = vec![
        UrlEntry {
            loc: format!("{base}/"),
            change_freq: "daily",
            priority: 1.0,
        },
        UrlEntry {
            loc: format!("{base}/listings/new"),
            change_freq: "weekly",
            priority: 0.6,
        },
    ];
    entries.extend(listings.iter().map(|l| UrlEntry {
        loc: format!("{base}/listings/{}", urlencoding::encode(l.id.as_str())),
        change_freq: "weekly",
        priority: 0.7,
    }));

    let lastmod = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for entry in &entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape(entry.loc.as_str())));
        xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.change_freq));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use linkle_client::seed::demo_listings;

    use super::*;

    #[test]
    fn test_fixed_pages_only() {
        let xml = build_sitemap_xml("https://linkle.example", &[], Utc::now());
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://linkle.example/</loc>"));
        assert!(xml.contains("<loc>https://linkle.example/listings/new</loc>"));
        assert!(xml.contains("<priority>1.0</priority>"));
    }

    #[test]
    fn test_one_entry_per_listing() {
        let listings = demo_listings();
        let xml = build_sitemap_xml("https://linkle.example", &listings, Utc::now());
        assert_eq!(xml.matches("<url>").count(), listings.len() + 2);
        assert!(xml.contains("<loc>https://linkle.example/listings/demo-1</loc>"));
        assert_eq!(xml.matches("<priority>0.7</priority>").count(), listings.len());
    }
}
