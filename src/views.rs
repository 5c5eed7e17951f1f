use std::collections::BTreeSet;

use clap::ValueEnum;

use crate::models::{CuisineType, Mess};

/// Currency-unit granularity of the "Under ₹N" price menu.
pub const PRICE_STEP: u32 = 1_000;

/// Hard cap on generated menu entries; one outlier listing must not
/// produce hundreds of them.
const MAX_PRICE_OPTIONS: usize = 50;

/// Total order applied to the filtered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    /// Highest average rating first
    Rating,
    /// Cheapest monthly plan first, listings without one last
    Price,
}

/// Filter and sort state driving the derived view.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    /// Case-insensitive text matched against name, address, city and state
    pub search: String,
    /// Keep listings whose average rating is at least this
    pub min_rating: f64,
    /// Monthly price ceiling; `None` means any price
    pub max_price: Option<u32>,
    /// `None` shows every cuisine
    pub cuisine: Option<CuisineType>,
    /// Exact city match when non-empty
    pub city: String,
    /// Exact state match when non-empty
    pub state: String,
    pub sort_by: SortBy,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            min_rating: 0.0,
            max_price: None,
            cuisine: None,
            city: String::new(),
            state: String::new(),
            sort_by: SortBy::Rating,
        }
    }
}

/// Everything the UI needs, recomputed from the listing set and the
/// current filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView {
    pub messes: Vec<Mess>,
    pub price_options: Vec<u32>,
    pub cities: Vec<String>,
    pub states: Vec<String>,
}

/// Compute the filtered, sorted projection together with the dynamic
/// filter option sets. Pure and total; holds no state of its own.
pub fn derive_view(messes: &[Mess], params: &FilterParams) -> DerivedView {
    let (cities, states) = location_options(messes);
    DerivedView {
        messes: filter_and_sort(messes, params),
        price_options: price_filter_options(messes),
        cities,
        states,
    }
}

/// Arithmetic mean of a listing's review ratings; 0 with no reviews.
pub fn average_rating(mess: &Mess) -> f64 {
    if mess.reviews.is_empty() {
        return 0.0;
    }
    let total: u32 = mess.reviews.iter().map(|review| u32::from(review.rating)).sum();
    f64::from(total) / mess.reviews.len() as f64
}

/// Ceilings for the "Under ₹N" menu, derived from the listings that
/// actually have a monthly plan. Only multiples of [`PRICE_STEP`] appear:
/// the lowest option covers the cheapest listing, the highest is the
/// first multiple at or above the dearest.
pub fn price_filter_options(messes: &[Mess]) -> Vec<u32> {
    let monthly: Vec<u32> = messes.iter().filter_map(Mess::monthly_price).collect();
    let (Some(&min), Some(&max)) = (monthly.iter().min(), monthly.iter().max()) else {
        return Vec::new();
    };

    let mut options = Vec::new();
    let mut current = PRICE_STEP.max((min - 1) / PRICE_STEP * PRICE_STEP);
    let target = max.div_ceil(PRICE_STEP) * PRICE_STEP;
    while current <= target {
        options.push(current);
        current += PRICE_STEP;
        if options.len() >= MAX_PRICE_OPTIONS {
            break;
        }
    }

    options.retain(|price| *price > 0);
    options.sort_unstable();
    options
}

/// Distinct non-empty city and state values across all listings, each
/// sorted ascending. Listings with a missing city/state still show up in
/// results; they just contribute no menu entry.
pub fn location_options(messes: &[Mess]) -> (Vec<String>, Vec<String>) {
    let mut cities = BTreeSet::new();
    let mut states = BTreeSet::new();
    for mess in messes {
        if !mess.city.is_empty() {
            cities.insert(mess.city.clone());
        }
        if !mess.state.is_empty() {
            states.insert(mess.state.clone());
        }
    }
    (cities.into_iter().collect(), states.into_iter().collect())
}

/// The ordered subsequence of listings satisfying every active filter.
pub fn filter_and_sort(messes: &[Mess], params: &FilterParams) -> Vec<Mess> {
    let needle = params.search.to_lowercase();

    let mut matched: Vec<Mess> = messes
        .iter()
        .filter(|mess| {
            let text_match = mess.name.to_lowercase().contains(&needle)
                || mess.address.to_lowercase().contains(&needle)
                || mess.city.to_lowercase().contains(&needle)
                || mess.state.to_lowercase().contains(&needle);
            let city_match = params.city.is_empty() || mess.city == params.city;
            let state_match = params.state.is_empty() || mess.state == params.state;
            let cuisine_match = params
                .cuisine
                .map_or(true, |cuisine| mess.cuisine_type == cuisine);
            let rating_match = average_rating(mess) >= params.min_rating;
            // a listing without a monthly plan fails every finite ceiling
            let price_match = params.max_price.map_or(true, |ceiling| {
                mess.monthly_price().is_some_and(|price| price <= ceiling)
            });

            text_match && city_match && state_match && cuisine_match && rating_match && price_match
        })
        .cloned()
        .collect();

    // both sorts are stable so equal keys keep their store order
    match params.sort_by {
        SortBy::Rating => {
            matched.sort_by(|a, b| average_rating(b).total_cmp(&average_rating(a)));
        }
        SortBy::Price => {
            matched.sort_by_key(|mess| mess.monthly_price().unwrap_or(u32::MAX));
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Price, Review};
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    fn mess(id: &str, name: &str, city: &str, state: &str, monthly: u32, ratings: &[u8]) -> Mess {
        Mess {
            id: id.to_string(),
            name: name.to_string(),
            address: format!("{name} Road"),
            city: city.to_string(),
            state: state.to_string(),
            contact: "9876543210".to_string(),
            price: Price {
                one_time: 60,
                two_time: 100,
                monthly,
            },
            reviews: ratings
                .iter()
                .enumerate()
                .map(|(index, rating)| Review {
                    id: format!("{id}-r{index}"),
                    author: "Tester".to_string(),
                    author_id: None,
                    rating: *rating,
                    comment: "ok".to_string(),
                    date: DateTime::<Utc>::UNIX_EPOCH,
                })
                .collect(),
            google_maps_link: String::new(),
            owner_id: "owner-1".to_string(),
            cuisine_type: CuisineType::Veg,
        }
    }

    #[test]
    fn average_rating_is_zero_without_reviews() {
        assert_eq!(average_rating(&mess("m1", "A", "Pune", "MH", 2000, &[])), 0.0);
    }

    #[test]
    fn average_rating_is_the_unrounded_mean() {
        let rated = mess("m1", "A", "Pune", "MH", 2000, &[5, 3, 4]);
        assert_eq!(average_rating(&rated), 4.0);
        let uneven = mess("m2", "B", "Pune", "MH", 2000, &[5, 4]);
        assert_eq!(average_rating(&uneven), 4.5);
    }

    #[test]
    fn price_options_cover_the_observed_monthly_range() {
        let messes = vec![
            mess("m1", "A", "Pune", "MH", 1500, &[]),
            mess("m2", "B", "Pune", "MH", 2700, &[]),
            mess("m3", "C", "Pune", "MH", 4000, &[]),
        ];
        assert_eq!(price_filter_options(&messes), vec![1000, 2000, 3000, 4000]);
    }

    #[test]
    fn price_options_are_empty_without_monthly_plans() {
        let messes = vec![mess("m1", "A", "Pune", "MH", 0, &[])];
        assert!(price_filter_options(&messes).is_empty());
        assert!(price_filter_options(&[]).is_empty());
    }

    #[test]
    fn price_options_are_capped() {
        let messes = vec![
            mess("m1", "Cheap", "Pune", "MH", 1000, &[]),
            mess("m2", "Pricey", "Pune", "MH", 900_000, &[]),
        ];
        let options = price_filter_options(&messes);
        assert_eq!(options.len(), 50);
        assert_eq!(options[0], 1000);
    }

    #[test]
    fn location_options_are_distinct_sorted_and_non_empty() {
        let messes = vec![
            mess("m1", "A", "Pune", "Maharashtra", 0, &[]),
            mess("m2", "B", "Mumbai", "Maharashtra", 0, &[]),
            mess("m3", "C", "Pune", "", 0, &[]),
            mess("m4", "D", "", "Karnataka", 0, &[]),
        ];
        let (cities, states) = location_options(&messes);
        assert_eq!(cities, vec!["Mumbai".to_string(), "Pune".to_string()]);
        assert_eq!(
            states,
            vec!["Karnataka".to_string(), "Maharashtra".to_string()]
        );
    }

    #[rstest]
    #[case("annapurna")]
    #[case("ANNAPURNA")]
    #[case("Road")]
    #[case("pune")]
    #[case("mahara")]
    fn search_matches_any_text_field_case_insensitively(#[case] search: &str) {
        let messes = vec![mess("m1", "Annapurna", "Pune", "Maharashtra", 2000, &[])];
        let params = FilterParams {
            search: search.to_string(),
            ..FilterParams::default()
        };
        assert_eq!(filter_and_sort(&messes, &params).len(), 1);
    }

    #[test]
    fn empty_search_matches_everything() {
        let messes = vec![
            mess("m1", "A", "Pune", "MH", 2000, &[]),
            mess("m2", "B", "", "", 0, &[]),
        ];
        let result = filter_and_sort(&messes, &FilterParams::default());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn city_filter_is_an_exact_match() {
        let messes = vec![
            mess("m1", "A", "Pune", "MH", 2000, &[]),
            mess("m2", "B", "Pune East", "MH", 2000, &[]),
        ];
        let params = FilterParams {
            city: "Pune".to_string(),
            ..FilterParams::default()
        };
        let result = filter_and_sort(&messes, &params);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "m1");
    }

    #[test]
    fn cuisine_filter_keeps_only_the_selected_cuisine() {
        let mut non_veg = mess("m2", "B", "Pune", "MH", 2000, &[]);
        non_veg.cuisine_type = CuisineType::NonVeg;
        let messes = vec![mess("m1", "A", "Pune", "MH", 2000, &[]), non_veg];

        let params = FilterParams {
            cuisine: Some(CuisineType::NonVeg),
            ..FilterParams::default()
        };
        let result = filter_and_sort(&messes, &params);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "m2");
    }

    #[test]
    fn finite_price_ceiling_excludes_listings_without_a_monthly_plan() {
        let messes = vec![
            mess("m1", "A", "Pune", "MH", 2000, &[]),
            mess("m2", "B", "Pune", "MH", 0, &[]),
        ];
        let params = FilterParams {
            max_price: Some(5000),
            ..FilterParams::default()
        };
        let result = filter_and_sort(&messes, &params);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "m1");
    }

    #[test]
    fn price_sort_puts_missing_monthly_prices_last() {
        let messes = vec![
            mess("m1", "No plan", "Pune", "MH", 0, &[5, 5, 5]),
            mess("m2", "Dear", "Pune", "MH", 3000, &[]),
            mess("m3", "Cheap", "Pune", "MH", 1000, &[]),
        ];
        let params = FilterParams {
            sort_by: SortBy::Price,
            ..FilterParams::default()
        };
        let ids: Vec<_> = filter_and_sort(&messes, &params)
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["m3", "m2", "m1"]);
    }

    #[test]
    fn rating_sort_is_descending_and_stable() {
        let messes = vec![
            mess("m1", "Three", "Pune", "MH", 0, &[3]),
            mess("m2", "Five A", "Pune", "MH", 0, &[5]),
            mess("m3", "Five B", "Pune", "MH", 0, &[5]),
        ];
        let ids: Vec<_> = filter_and_sort(&messes, &FilterParams::default())
            .into_iter()
            .map(|m| m.id)
            .collect();
        // the two 5.0 listings keep their store order
        assert_eq!(ids, vec!["m2", "m3", "m1"]);
    }

    #[test]
    fn min_rating_excludes_unreviewed_listings() {
        // B has no reviews, so its average rating of 0 fails a
        // min-rating of 1
        let messes = vec![
            mess("a", "A", "Pune", "MH", 2000, &[5]),
            mess("b", "B", "Mumbai", "MH", 1000, &[]),
        ];
        let params = FilterParams {
            min_rating: 1.0,
            ..FilterParams::default()
        };
        let result = filter_and_sort(&messes, &params);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
    }

    #[test]
    fn filtering_is_idempotent() {
        let messes = vec![
            mess("m1", "A", "Pune", "MH", 2000, &[4, 5]),
            mess("m2", "B", "Mumbai", "MH", 1000, &[3]),
            mess("m3", "C", "Nashik", "MH", 0, &[]),
        ];
        let params = FilterParams {
            search: "m".to_string(),
            sort_by: SortBy::Price,
            ..FilterParams::default()
        };
        let first = filter_and_sort(&messes, &params);
        let second = filter_and_sort(&messes, &params);
        assert_eq!(first, second);
    }

    #[test]
    fn derive_view_bundles_projection_and_option_sets() {
        let messes = vec![
            mess("m1", "A", "Pune", "Maharashtra", 1500, &[5]),
            mess("m2", "B", "Mumbai", "Maharashtra", 4000, &[]),
        ];
        let view = derive_view(&messes, &FilterParams::default());
        assert_eq!(view.messes.len(), 2);
        assert_eq!(view.messes[0].id, "m1");
        assert_eq!(view.price_options, vec![1000, 2000, 3000, 4000]);
        assert_eq!(view.cities, vec!["Mumbai".to_string(), "Pune".to_string()]);
        assert_eq!(view.states, vec!["Maharashtra".to_string()]);
    }
}
