//! Browse-page filtering, sorting and ranking over listing collections.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::listing::Listing;
use crate::types::{Category, FeeType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "date")]
pub enum DateFilter {
    #[default]
    Any,
    Today,
    Weekend,
    On(NaiveDate),
}

impl DateFilter {
    pub fn matches(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::Any => true,
            Self::Today => date == today,
            Self::Weekend => matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            Self::On(day) => date == *day,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingSort {
    #[default]
    Newest,
    EventDate,
}

/// Top page filter bar.  Empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingQuery {
    pub category: Option<Category>,
    pub keyword: String,
    pub area: String,
    pub fee: Option<FeeType>,
    pub date: DateFilter,
    pub sort: ListingSort,
}

impl ListingQuery {
    pub fn matches(&self, l: &Listing, today: NaiveDate) -> bool {
        if let Some(category) = self.category {
            if l.category != category {
                return false;
            }
        }

        let keyword = self.keyword.trim().to_lowercase();
        if !keyword.is_empty()
            && !(l.title.to_lowercase().contains(&keyword)
                || l.place.to_lowercase().contains(&keyword)
                || l.category.as_str().contains(&keyword)
                || l.category.label().contains(&keyword))
        {
            return false;
        }

        let area = self.area.trim();
        if !area.is_empty() && !l.place.contains(area) {
            return false;
        }

        if let Some(fee) = self.fee {
            if l.fee_type != fee {
                return false;
            }
        }

        self.date.matches(l.date, today)
    }

    pub fn apply(&self, listings: &[Listing], today: NaiveDate) -> Vec<Listing> {
        let mut result: Vec<Listing> = listings
            .iter()
            .filter(|l| self.matches(l, today))
            .cloned()
            .collect();

        match self.sort {
            ListingSort::Newest => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ListingSort::EventDate => result.sort_by(|a, b| a.date.cmp(&b.date)),
        }
        result
    }
}

/// The `n` most viewed listings.
pub fn ranking(listings: &[Listing], n: usize) -> Vec<Listing> {
    let mut ranked = listings.to_vec();
    ranked.sort_by(|a, b| b.views.cmp(&a.views));
    ranked.truncate(n);
    ranked
}

/// Up to `limit` listings related to `target`, never including it.
pub fn similar(listings: &[Listing], target: &Listing, limit: usize) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| l.id != target.id && l.is_related_to(target))
        .take(limit)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrganizerOrder {
    #[default]
    Soonest,
    MostViewed,
}

/// Filter bar on an organizer page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizerQuery {
    pub search: String,
    pub category: Option<Category>,
    pub order: OrganizerOrder,
}

impl OrganizerQuery {
    pub fn apply(&self, hosted: &[Listing]) -> Vec<Listing> {
        let search = self.search.trim().to_lowercase();
        let mut result: Vec<Listing> = hosted
            .iter()
            .filter(|l| {
                search.is_empty()
                    || l.title.to_lowercase().contains(&search)
                    || l.place.to_lowercase().contains(&search)
                    || l.tags.iter().any(|t| t.to_lowercase().contains(&search))
            })
            .filter(|l| self.category.map_or(true, |c| l.category == c))
            .cloned()
            .collect();

        match self.order {
            OrganizerOrder::Soonest => result.sort_by(|a, b| a.date.cmp(&b.date)),
            OrganizerOrder::MostViewed => result.sort_by(|a, b| b.views.cmp(&a.views)),
        }
        result
    }
}
