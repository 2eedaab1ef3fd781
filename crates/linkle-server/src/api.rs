use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, Stream};
use linkle_client::commands::organizers::OrganizerProfile;
use linkle_client::feed::FeedEntry;
use linkle_client::map::MapLinks;
use linkle_client::{AppState, AuthStatus, ClientError, EventBus, JoinOutcome, Session};
use linkle_shared::constants::{CLOSING_SOON_HOURS, LOW_CAPACITY_LEFT, RANKING_SIZE, SIMILAR_LIMIT};
use linkle_shared::inbox::InboxFilter;
use linkle_shared::organizer::{NewReview, Review, ReviewOrder};
use linkle_shared::query::{DateFilter, ListingQuery, ListingSort, OrganizerQuery};
use linkle_shared::{
    Category, FeeType, HostNotification, Listing, ListingId, NewListing, NotificationId,
    UserSettings,
};
use linkle_store::{ImportStats, MembershipSet, Snapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::feed_cache::FeedCache;
use crate::sitemap::build_sitemap_xml;

#[derive(Clone)]
pub struct ApiState {
    pub app: Arc<Mutex<AppState>>,
    pub events: EventBus,
    pub feed: FeedCache,
    pub config: Arc<ServerConfig>,
}

impl ApiState {
    pub fn new(app: AppState, config: ServerConfig) -> Self {
        let events = app.events().clone();
        let feed = FeedCache::new(
            config.client.feed_url(),
            config.feed_cache_ttl,
            reqwest::Client::new(),
        );
        Self {
            app: Arc::new(Mutex::new(app)),
            events,
            feed,
            config: Arc::new(config),
        }
    }

    /// Core operations are synchronous; never hold the guard across an await.
    fn app(&self) -> Result<MutexGuard<'_, AppState>, ServerError> {
        self.app
            .lock()
            .map_err(|e| ServerError::Internal(format!("Lock poisoned: {e}")))
    }
}

pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/sitemap.xml", get(sitemap))
        // Listings
        .route("/api/listings", get(list_listings).post(create_listing))
        .route("/api/listings/ranking", get(ranking))
        .route("/api/listings/:id", get(get_listing).delete(delete_listing))
        .route("/api/listings/:id/similar", get(similar_listings))
        .route("/api/listings/:id/join", post(join_listing).delete(leave_listing))
        .route("/api/listings/:id/favorite", post(toggle_favorite))
        .route("/api/listings/:id/contact", post(contact_organizer))
        .route("/api/me/:set", get(my_set).delete(clear_my_listings))
        // Inbox
        .route("/api/inbox", get(inbox))
        .route("/api/inbox/unread", get(inbox_unread))
        .route("/api/inbox/read-all", post(inbox_read_all))
        .route("/api/inbox/:id/read", post(inbox_mark_read))
        .route("/api/inbox/:id", delete(inbox_report))
        // Account
        .route("/api/settings", get(get_settings).put(update_settings))
        .route("/api/session", get(get_session).post(sign_in).delete(sign_out))
        .route("/api/account", delete(delete_account))
        .route("/api/account/export", get(export_snapshot))
        .route("/api/account/import", post(import_snapshot))
        // Organizers
        .route("/api/following", get(followed_organizers))
        .route("/api/organizers/:slug", get(organizer_page))
        .route("/api/organizers/:slug/follow", post(toggle_follow))
        .route(
            "/api/organizers/:slug/reviews",
            get(list_reviews).post(submit_review),
        )
        .route("/api/organizers/:slug/reviews/:id", delete(report_review))
        // Live updates and blog
        .route("/api/events", get(store_events))
        .route("/api/note/latest", get(latest_posts))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// A listing plus the badges and map links every card shows.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingView {
    #[serde(flatten)]
    listing: Listing,
    closing_soon: bool,
    closed: bool,
    map: MapLinks,
}

impl ListingView {
    fn new(listing: Listing, now: DateTime<Utc>) -> Self {
        Self {
            closing_soon: listing.is_closing_soon(now, CLOSING_SOON_HOURS, LOW_CAPACITY_LEFT),
            closed: listing.is_closed(now),
            map: MapLinks::for_address(&listing.place),
            listing,
        }
    }

    fn all(listings: Vec<Listing>) -> Vec<Self> {
        let now = Utc::now();
        listings.into_iter().map(|l| Self::new(l, now)).collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingDetail {
    #[serde(flatten)]
    view: ListingView,
    joined: bool,
    favorite: bool,
    mine: bool,
}

#[derive(Serialize)]
struct CreatedResponse {
    id: ListingId,
}

#[derive(Serialize)]
struct DeletedResponse {
    deleted: bool,
}

#[derive(Serialize)]
struct ClearedResponse {
    deleted: usize,
}

#[derive(Serialize)]
struct LeftResponse {
    left: bool,
}

#[derive(Serialize)]
struct FavoriteResponse {
    favorite: bool,
}

#[derive(Serialize)]
struct FollowResponse {
    following: bool,
}

#[derive(Serialize)]
struct RemovedResponse {
    removed: bool,
}

#[derive(Serialize)]
struct MarkReadResponse {
    read: bool,
}

#[derive(Serialize)]
struct UpdatedResponse {
    updated: usize,
}

#[derive(Serialize)]
struct UnreadResponse {
    host: String,
    unread: u32,
}

#[derive(Serialize)]
struct InboxResponse {
    host: String,
    unread: u32,
    notifications: Vec<HostNotification>,
}

#[derive(Serialize)]
struct OrganizerPage {
    profile: OrganizerProfile,
    listings: Vec<ListingView>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Top page filter bar as query parameters.  `date` is `today`, `weekend`
/// or a `YYYY-MM-DD` day.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BrowseParams {
    category: Option<Category>,
    keyword: String,
    area: String,
    fee: Option<FeeType>,
    date: Option<String>,
    sort: Option<ListingSort>,
}

impl BrowseParams {
    fn into_query(self) -> Result<ListingQuery, ServerError> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") | Some("any") => DateFilter::Any,
            Some("today") => DateFilter::Today,
            Some("weekend") => DateFilter::Weekend,
            Some(day) => NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(DateFilter::On)
                .map_err(|_| ServerError::BadRequest(format!("invalid date filter: {day}")))?,
        };

        Ok(ListingQuery {
            category: self.category,
            keyword: self.keyword,
            area: self.area,
            fee: self.fee,
            date,
            sort: self.sort.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct LimitParams {
    n: Option<usize>,
}

#[derive(Deserialize)]
struct ContactRequest {
    name: String,
    message: String,
}

#[derive(Deserialize)]
struct SignInRequest {
    sub: String,
    #[serde(default)]
    profile: Value,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ReviewParams {
    order: ReviewOrder,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_listings(
    State(state): State<ApiState>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<Vec<ListingView>>, ServerError> {
    let query = params.into_query()?;
    let listings = state.app()?.browse(&query, Utc::now().date_naive());
    Ok(Json(ListingView::all(listings)))
}

async fn create_listing(
    State(state): State<ApiState>,
    Json(input): Json<NewListing>,
) -> Result<(StatusCode, Json<CreatedResponse>), ServerError> {
    input.validate().map_err(ClientError::from)?;
    let id = state.app()?.create_listing(input)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn ranking(
    State(state): State<ApiState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<ListingView>>, ServerError> {
    let listings = state.app()?.ranking(params.n.unwrap_or(RANKING_SIZE));
    Ok(Json(ListingView::all(listings)))
}

async fn get_listing(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ListingDetail>, ServerError> {
    let id = ListingId::from(id);
    let app = state.app()?;
    let listing = app
        .get_listing_by_id(&id)
        .ok_or_else(|| ServerError::NotFound(format!("Listing {id}")))?;

    Ok(Json(ListingDetail {
        joined: app.is_member(MembershipSet::Joined, &id),
        favorite: app.is_member(MembershipSet::Favs, &id),
        mine: app.is_member(MembershipSet::Mine, &id),
        view: ListingView::new(listing, Utc::now()),
    }))
}

async fn delete_listing(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ServerError> {
    let deleted = state.app()?.delete_listing_by_id(&ListingId::from(id));
    Ok(Json(DeletedResponse { deleted }))
}

async fn similar_listings(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<ListingView>>, ServerError> {
    let listings = state
        .app()?
        .get_similar_listings(&ListingId::from(id), params.n.unwrap_or(SIMILAR_LIMIT));
    Ok(Json(ListingView::all(listings)))
}

async fn join_listing(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<JoinOutcome>, ServerError> {
    let id = ListingId::from(id);
    match state.app()?.join_listing(&id)? {
        JoinOutcome::NotFound => Err(ServerError::NotFound(format!("Listing {id}"))),
        outcome => Ok(Json(outcome)),
    }
}

async fn leave_listing(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<LeftResponse>, ServerError> {
    let left = state.app()?.leave_listing(&ListingId::from(id));
    Ok(Json(LeftResponse { left }))
}

async fn toggle_favorite(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<FavoriteResponse>, ServerError> {
    let favorite = state.app()?.toggle_favorite(&ListingId::from(id));
    Ok(Json(FavoriteResponse { favorite }))
}

async fn contact_organizer(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<HostNotification>), ServerError> {
    let notification =
        state
            .app()?
            .message_organizer(&ListingId::from(id), &req.name, &req.message)?;
    Ok((StatusCode::CREATED, Json(notification)))
}

async fn my_set(
    State(state): State<ApiState>,
    Path(set): Path<String>,
) -> Result<Json<Vec<ListingView>>, ServerError> {
    let set: MembershipSet = set
        .parse()
        .map_err(|e| ServerError::BadRequest(format!("{e}")))?;
    let app = state.app()?;
    let listings = match set {
        MembershipSet::Mine => app.my_listings(),
        other => app.listings_in(other),
    };
    Ok(Json(ListingView::all(listings)))
}

/// Only `mine` can be cleared.
async fn clear_my_listings(
    State(state): State<ApiState>,
    Path(set): Path<String>,
) -> Result<Json<ClearedResponse>, ServerError> {
    match set.parse::<MembershipSet>() {
        Ok(MembershipSet::Mine) => {
            let deleted = state.app()?.delete_all_my_listings();
            Ok(Json(ClearedResponse { deleted }))
        }
        _ => Err(ServerError::BadRequest(format!("cannot clear set: {set}"))),
    }
}

async fn inbox(
    State(state): State<ApiState>,
    Query(filter): Query<InboxFilter>,
) -> Result<Json<InboxResponse>, ServerError> {
    let app = state.app()?;
    let host = app.current_host_name();
    Ok(Json(InboxResponse {
        unread: app.unread_count(&host),
        notifications: app.filter_inbox(&host, &filter),
        host,
    }))
}

async fn inbox_unread(State(state): State<ApiState>) -> Result<Json<UnreadResponse>, ServerError> {
    let app = state.app()?;
    let host = app.current_host_name();
    Ok(Json(UnreadResponse {
        unread: app.unread_count(&host),
        host,
    }))
}

async fn inbox_read_all(State(state): State<ApiState>) -> Result<Json<UpdatedResponse>, ServerError> {
    let app = state.app()?;
    let updated = app.mark_all_read(&app.current_host_name());
    Ok(Json(UpdatedResponse { updated }))
}

async fn inbox_mark_read(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<MarkReadResponse>, ServerError> {
    let read = state.app()?.mark_as_read(&NotificationId::from(id.as_str()));
    Ok(Json(MarkReadResponse { read }))
}

async fn inbox_report(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<RemovedResponse>, ServerError> {
    let removed = state
        .app()?
        .report_notification(&NotificationId::from(id.as_str()));
    Ok(Json(RemovedResponse { removed }))
}

async fn get_settings(State(state): State<ApiState>) -> Result<Json<UserSettings>, ServerError> {
    Ok(Json(state.app()?.settings()))
}

/// Merge a partial settings document over the stored one.
async fn update_settings(
    State(state): State<ApiState>,
    Json(patch): Json<Value>,
) -> Result<Json<UserSettings>, ServerError> {
    Ok(Json(state.app()?.update_settings(patch)?))
}

async fn get_session(State(state): State<ApiState>) -> Result<Json<AuthStatus>, ServerError> {
    Ok(Json(state.app()?.auth().clone()))
}

/// Hand over the profile the OAuth provider returned.
async fn sign_in(
    State(state): State<ApiState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<AuthStatus>, ServerError> {
    if req.sub.trim().is_empty() {
        return Err(ServerError::BadRequest("sub is required".into()));
    }
    let session = Session::from_oauth_profile(req.sub.trim(), &req.profile);
    let mut app = state.app()?;
    app.sign_in(session);
    info!(user = %req.sub.trim(), "Signed in");
    Ok(Json(app.auth().clone()))
}

async fn sign_out(State(state): State<ApiState>) -> Result<Json<AuthStatus>, ServerError> {
    let mut app = state.app()?;
    app.sign_out();
    Ok(Json(app.auth().clone()))
}

async fn delete_account(State(state): State<ApiState>) -> Result<StatusCode, ServerError> {
    state.app()?.delete_account()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_snapshot(State(state): State<ApiState>) -> Result<Json<Snapshot>, ServerError> {
    Ok(Json(state.app()?.export_snapshot()?))
}

async fn import_snapshot(
    State(state): State<ApiState>,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<ImportStats>, ServerError> {
    Ok(Json(state.app()?.import_snapshot(&snapshot)?))
}

async fn organizer_page(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Query(query): Query<OrganizerQuery>,
) -> Result<Json<OrganizerPage>, ServerError> {
    let app = state.app()?;
    Ok(Json(OrganizerPage {
        profile: app.organizer_profile(&slug),
        listings: ListingView::all(app.organizer_listings(&slug, &query)),
    }))
}

async fn toggle_follow(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<Json<FollowResponse>, ServerError> {
    let following = state.app()?.toggle_follow(&slug);
    Ok(Json(FollowResponse { following }))
}

async fn followed_organizers(
    State(state): State<ApiState>,
) -> Result<Json<Vec<OrganizerProfile>>, ServerError> {
    Ok(Json(state.app()?.followed_organizers()))
}

async fn list_reviews(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Query(params): Query<ReviewParams>,
) -> Result<Json<Vec<Review>>, ServerError> {
    Ok(Json(state.app()?.reviews(&slug, params.order)))
}

async fn submit_review(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Json(input): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), ServerError> {
    let review = state.app()?.submit_review(&slug, input)?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn report_review(
    State(state): State<ApiState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<RemovedResponse>, ServerError> {
    let removed = state.app()?.report_review(&slug, &id);
    Ok(Json(RemovedResponse { removed }))
}

/// Store-change keys as server-sent events (`event: change`, data = key).
async fn store_events(
    State(state): State<ApiState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();
    debug!("Event subscriber connected");

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse = Event::default().event("change").data(event.key.as_str());
                    return Some((Ok(sse), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn latest_posts(State(state): State<ApiState>) -> Json<Vec<FeedEntry>> {
    Json(state.feed.latest().await)
}

async fn sitemap(State(state): State<ApiState>) -> Result<impl IntoResponse, ServerError> {
    let listings = state.app()?.get_all_listings();
    let xml = build_sitemap_xml(&state.config.site_url, &listings, Utc::now());
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

pub async fn serve(state: ApiState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use linkle_client::seed::demo_listings;
    use linkle_store::Database;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    fn test_router() -> Router {
        let app = AppState::new(Database::open_in_memory().unwrap(), demo_listings());
        build_router(ApiState::new(app, ServerConfig::default()))
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn futsal(title: &str) -> Value {
        json!({
            "category": "sports",
            "title": title,
            "date": (Utc::now().date_naive() + chrono::Duration::days(10)).to_string(),
            "place": "東京都 渋谷区",
            "capacity": 1,
            "feeType": "free",
            "tags": ["ball"],
        })
    }

    async fn sign_in_as(router: &Router, name: &str) {
        let (status, _) = call(
            router,
            Method::POST,
            "/api/session",
            Some(json!({ "sub": format!("{name}-id"), "profile": { "name": name } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router();
        let (status, body) = call(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let router = test_router();
        let (status, body) = call(&router, Method::POST, "/api/listings", Some(futsal("  "))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Title is required");
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let router = test_router();
        let (status, body) = call(&router, Method::POST, "/api/listings", Some(futsal("Futsal"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_string();

        let (status, detail) = call(&router, Method::GET, &format!("/api/listings/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["title"], "Futsal");
        assert_eq!(detail["host"]["name"], "You");
        assert_eq!(detail["mine"], true);
        assert_eq!(detail["joined"], false);
        assert_eq!(detail["closingSoon"], true);
        assert_eq!(detail["closed"], false);
        assert!(detail["map"]["searchUrl"].as_str().unwrap().starts_with("https://www.google.com/maps/search/"));

        let (_, mine) = call(&router, Method::GET, "/api/me/mine", None).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_join_fills_host_inbox() {
        let router = test_router();
        let (status, _) = call(
            &router,
            Method::PUT,
            "/api/settings",
            Some(json!({ "nickname": "Taro", "city": "渋谷区" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&router, Method::POST, "/api/listings", Some(futsal("Futsal"))).await;
        let id = body["id"].as_str().unwrap().to_string();
        let join = format!("/api/listings/{id}/join");

        let (status, outcome) = call(&router, Method::POST, &join, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome, json!({ "outcome": "joined", "capacityLeft": 0 }));

        let (_, again) = call(&router, Method::POST, &join, None).await;
        assert_eq!(again["outcome"], "already-joined");

        let (_, inbox) = call(&router, Method::GET, "/api/inbox?type=join-request", None).await;
        assert_eq!(inbox["host"], "Taro");
        assert_eq!(inbox["unread"], 1);
        assert_eq!(inbox["notifications"].as_array().unwrap().len(), 1);

        let (_, updated) = call(&router, Method::POST, "/api/inbox/read-all", None).await;
        assert_eq!(updated["updated"], 1);
        let (_, unread) = call(&router, Method::GET, "/api/inbox/unread", None).await;
        assert_eq!(unread["unread"], 0);

        let (_, left) = call(&router, Method::DELETE, &join, None).await;
        assert_eq!(left["left"], true);
        let (_, detail) = call(&router, Method::GET, &format!("/api/listings/{id}"), None).await;
        assert_eq!(detail["capacityLeft"], 1);
    }

    #[tokio::test]
    async fn test_join_unknown_listing() {
        let router = test_router();
        let (status, _) = call(&router, Method::POST, "/api/listings/nope/join", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_requires_session() {
        let router = test_router();
        let (_, body) = call(&router, Method::POST, "/api/listings", Some(futsal("Futsal"))).await;
        let uri = format!("/api/listings/{}", body["id"].as_str().unwrap());

        let (_, refused) = call(&router, Method::DELETE, &uri, None).await;
        assert_eq!(refused["deleted"], false);

        sign_in_as(&router, "Taro").await;
        let (_, deleted) = call(&router, Method::DELETE, &uri, None).await;
        assert_eq!(deleted["deleted"], true);

        let (status, _) = call(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_browse_and_ranking() {
        let router = test_router();
        let (status, all) = call(&router, Method::GET, "/api/listings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), demo_listings().len());

        let (status, _) = call(&router, Method::GET, "/api/listings?date=someday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, ranked) = call(&router, Method::GET, "/api/listings/ranking?n=2", None).await;
        let ranked = ranked.as_array().unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0]["views"].as_u64() >= ranked[1]["views"].as_u64());

        let (_, similar) = call(&router, Method::GET, "/api/listings/demo-1/similar", None).await;
        assert!(similar
            .as_array()
            .unwrap()
            .iter()
            .all(|l| l["id"] != "demo-1"));
    }

    #[tokio::test]
    async fn test_favorites_and_sets() {
        let router = test_router();
        let (_, fav) = call(&router, Method::POST, "/api/listings/demo-2/favorite", None).await;
        assert_eq!(fav["favorite"], true);

        let (_, favs) = call(&router, Method::GET, "/api/me/favs", None).await;
        assert_eq!(favs[0]["id"], "demo-2");

        let (status, _) = call(&router, Method::GET, "/api/me/everything", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&router, Method::DELETE, "/api/me/favs", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clear_my_listings() {
        let router = test_router();
        call(&router, Method::POST, "/api/listings", Some(futsal("One"))).await;
        call(&router, Method::POST, "/api/listings", Some(futsal("Two"))).await;

        let (_, cleared) = call(&router, Method::DELETE, "/api/me/mine", None).await;
        assert_eq!(cleared["deleted"], 2);
        let (_, all) = call(&router, Method::GET, "/api/listings", None).await;
        assert_eq!(all.as_array().unwrap().len(), demo_listings().len());
    }

    #[tokio::test]
    async fn test_contact_organizer() {
        let router = test_router();
        let (status, body) = call(
            &router,
            Method::POST,
            "/api/listings/demo-1/contact",
            Some(json!({ "name": "Hanako", "message": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Message is required");

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/listings/demo-1/contact",
            Some(json!({ "name": "Hanako", "message": "Is parking available?" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["type"], "message");
        assert_eq!(body["hostName"], "Mika Sato");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let router = test_router();
        let (_, status) = call(&router, Method::GET, "/api/session", None).await;
        assert_eq!(status["status"], "unauthenticated");

        sign_in_as(&router, "Taro").await;
        let (_, status) = call(&router, Method::GET, "/api/session", None).await;
        assert_eq!(status["status"], "authenticated");
        assert_eq!(status["session"]["name"], "Taro");

        let (_, status) = call(&router, Method::DELETE, "/api/session", None).await;
        assert_eq!(status["status"], "unauthenticated");

        let (code, _) = call(&router, Method::POST, "/api/session", Some(json!({ "sub": " " }))).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let router = test_router();
        let (status, body) = call(
            &router,
            Method::PUT,
            "/api/settings",
            Some(json!({ "nickname": "", "city": "渋谷区" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Nickname is required");
    }

    #[tokio::test]
    async fn test_organizer_page_and_reviews() {
        let router = test_router();
        let (status, page) = call(&router, Method::GET, "/api/organizers/ken-ito", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["profile"]["name"], "Ken Ito");
        assert_eq!(page["profile"]["stats"]["events"], 2);
        assert_eq!(page["listings"].as_array().unwrap().len(), 2);

        let (_, follow) = call(&router, Method::POST, "/api/organizers/ken-ito/follow", None).await;
        assert_eq!(follow["following"], true);
        let (_, followed) = call(&router, Method::GET, "/api/following", None).await;
        assert_eq!(followed[0]["slug"], "ken-ito");
        assert_eq!(followed.as_array().unwrap().len(), 1);

        let reviews = "/api/organizers/ken-ito/reviews";
        let (status, _) = call(
            &router,
            Method::POST,
            reviews,
            Some(json!({ "author": "Aoi", "rating": 9, "comment": "?" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, review) = call(
            &router,
            Method::POST,
            reviews,
            Some(json!({ "author": "Aoi", "rating": 4, "comment": "Well run" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, listed) = call(&router, Method::GET, reviews, None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let uri = format!("{reviews}/{}", review["id"].as_str().unwrap());
        let (_, removed) = call(&router, Method::DELETE, &uri, None).await;
        assert_eq!(removed["removed"], true);
    }

    #[tokio::test]
    async fn test_account_export_and_delete() {
        let router = test_router();
        call(&router, Method::POST, "/api/listings", Some(futsal("Futsal"))).await;

        let (status, snapshot) = call(&router, Method::GET, "/api/account/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["listings"].as_array().unwrap().len(), 1);

        let (status, _) = call(&router, Method::DELETE, "/api/account", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, mine) = call(&router, Method::GET, "/api/me/mine", None).await;
        assert!(mine.as_array().unwrap().is_empty());

        let (status, stats) = call(&router, Method::POST, "/api/account/import", Some(snapshot)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["listingsImported"], 1);
    }

    #[tokio::test]
    async fn test_data_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            client: linkle_client::ClientConfig {
                data_dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
            ..ServerConfig::default()
        };
        let open = || {
            let app = AppState::open(&config.client).unwrap();
            build_router(ApiState::new(app, config.clone()))
        };

        let first = open();
        let (_, body) = call(&first, Method::POST, "/api/listings", Some(futsal("Futsal"))).await;
        let id = body["id"].as_str().unwrap().to_string();
        call(&first, Method::POST, &format!("/api/listings/{id}/favorite"), None).await;
        drop(first);

        let second = open();
        let (_, favs) = call(&second, Method::GET, "/api/me/favs", None).await;
        assert_eq!(favs[0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_feed_disabled_returns_empty() {
        let router = test_router();
        let (status, body) = call(&router, Method::GET, "/api/note/latest", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_sitemap() {
        let router = test_router();
        let request = Request::get("/sitemap.xml").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let xml = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(xml.contains("/listings/demo-1</loc>"));
    }

    #[tokio::test]
    async fn test_events_stream_opens() {
        let router = test_router();
        let request = Request::get("/api/events").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    }
}
