/// Application name
pub const APP_NAME: &str = "Linkle";

/// Inbox owner used when neither a session nor a profile names the organizer
pub const DEFAULT_HOST_NAME: &str = "Linkle運営事務局";

/// Host name attached to listings created without a profile nickname
pub const FALLBACK_NICKNAME: &str = "You";

/// Heading inserted before the organizer bio appended to listing descriptions
pub const HOST_BIO_HEADING: &str = "— 主催者自己紹介 —";

/// Default prefecture for fresh account settings
pub const DEFAULT_PREFECTURE: &str = "東京都";

/// Default number of similar listings on a detail page
pub const SIMILAR_LIMIT: usize = 4;

/// Size of the popularity ranking
pub const RANKING_SIZE: usize = 5;

/// A listing starting within this many hours is "closing soon"
pub const CLOSING_SOON_HOURS: i64 = 72;

/// A listing with at most this many seats left is "closing soon"
pub const LOW_CAPACITY_LEFT: u32 = 2;

/// Maximum number of entries returned from the blog feed
pub const FEED_MAX_ITEMS: usize = 6;

/// Blog feed cache lifetime in seconds (10 minutes)
pub const FEED_CACHE_SECS: u64 = 600;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Review ratings are stars in this inclusive range
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
