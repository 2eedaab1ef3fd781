//! Built-in demo listings, enabled with `LINKLE_SEED_DEMO=1`.
//!
//! Dates are relative to the moment the catalog is built so the demo never
//! goes stale.

use chrono::{Duration, Utc};
use linkle_shared::{Category, FeeType, HostRef, Listing, ListingId};

struct Demo {
    id: &'static str,
    category: Category,
    title: &'static str,
    days_ahead: i64,
    place: &'static str,
    capacity_left: u32,
    host: &'static str,
    fee_type: FeeType,
    description: &'static str,
    tags: &'static [&'static str],
    views: u64,
}

const DEMOS: &[Demo] = &[
    Demo {
        id: "demo-1",
        category: Category::Sports,
        title: "週末フットサル（初心者歓迎）",
        days_ahead: 2,
        place: "東京都 渋谷区",
        capacity_left: 6,
        host: "Mika Sato",
        fee_type: FeeType::Paid,
        description: "室内コートで2時間。シューズは各自ご持参ください。",
        tags: &["フットサル", "初心者歓迎"],
        views: 412,
    },
    Demo {
        id: "demo-2",
        category: Category::Learning,
        title: "Rust もくもく会",
        days_ahead: 5,
        place: "東京都 千代田区",
        capacity_left: 2,
        host: "Ken Ito",
        fee_type: FeeType::Free,
        description: "各自の作業を持ち寄る静かな勉強会です。",
        tags: &["プログラミング", "もくもく会"],
        views: 268,
    },
    Demo {
        id: "demo-3",
        category: Category::Hobby,
        title: "朝の公園スケッチ散歩",
        days_ahead: 9,
        place: "神奈川県 横浜市",
        capacity_left: 10,
        host: "Mika Sato",
        fee_type: FeeType::Free,
        description: "画材は自由。雨天中止です。",
        tags: &["スケッチ", "散歩"],
        views: 95,
    },
    Demo {
        id: "demo-4",
        category: Category::Sports,
        title: "皇居ラン 5km",
        days_ahead: 1,
        place: "東京都 千代田区",
        capacity_left: 12,
        host: "Ken Ito",
        fee_type: FeeType::Free,
        description: "ゆっくりペースで一周します。",
        tags: &["ランニング", "初心者歓迎"],
        views: 530,
    },
    Demo {
        id: "demo-5",
        category: Category::Learning,
        title: "英会話カフェ",
        days_ahead: 14,
        place: "大阪府 大阪市",
        capacity_left: 0,
        host: "Aoi Tanaka",
        fee_type: FeeType::Paid,
        description: "ドリンク代のみ各自負担です。",
        tags: &["英語", "カフェ"],
        views: 187,
    },
];

pub fn demo_listings() -> Vec<Listing> {
    let now = Utc::now();
    let today = now.date_naive();

    DEMOS
        .iter()
        .enumerate()
        .map(|(i, d)| Listing {
            id: ListingId::from(d.id),
            category: d.category,
            title: d.title.to_string(),
            date: today + Duration::days(d.days_ahead),
            place: d.place.to_string(),
            capacity_left: d.capacity_left,
            host: HostRef {
                name: d.host.to_string(),
                avatar_url: None,
            },
            image_url: String::new(),
            fee_type: d.fee_type,
            description: Some(d.description.to_string()),
            tags: d.tags.iter().map(|t| t.to_string()).collect(),
            views: d.views,
            created_at: now - Duration::hours(i as i64 + 1),
        })
        .collect()
}
