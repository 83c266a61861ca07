//! Read-only projections of the candidate list for the dashboard: search,
//! age distribution, record-by-record navigation and map markers.

use std::collections::HashMap;

use regdesk_core::Candidate;
use regdesk_geo::{Coordinates, CountryLocator};

/// Case-insensitive substring match over name, country, age, phone and email.
///
/// An empty (or whitespace) filter matches everything.
#[must_use]
pub fn matches_filter(candidate: &Candidate, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        candidate.name.to_lowercase(),
        candidate.country.to_lowercase(),
        candidate.age.to_string(),
        candidate.phone.to_lowercase(),
        candidate.email.to_lowercase(),
    ]
    .iter()
    .any(|field| field.contains(&needle))
}

#[must_use]
pub fn filter_candidates<'a>(list: &'a [Candidate], filter: &str) -> Vec<&'a Candidate> {
    list.iter().filter(|c| matches_filter(c, filter)).collect()
}

/// Candidate counts per age range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeBuckets {
    pub age_18_25: usize,
    pub age_26_35: usize,
    pub age_36_50: usize,
    pub age_51_plus: usize,
}

impl AgeBuckets {
    #[must_use]
    pub fn from_candidates(list: &[Candidate]) -> Self {
        let mut buckets = Self::default();
        for candidate in list {
            match candidate.age {
                ..=25 => buckets.age_18_25 += 1,
                26..=35 => buckets.age_26_35 += 1,
                36..=50 => buckets.age_36_50 += 1,
                _ => buckets.age_51_plus += 1,
            }
        }
        buckets
    }

    /// `(label, count)` pairs in ascending age order.
    #[must_use]
    pub const fn labeled(&self) -> [(&'static str, usize); 4] {
        [
            ("18-25", self.age_18_25),
            ("26-35", self.age_26_35),
            ("36-50", self.age_36_50),
            ("51+", self.age_51_plus),
        ]
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.age_18_25 + self.age_26_35 + self.age_36_50 + self.age_51_plus
    }
}

/// Position in a candidate list with previous/next navigation.
#[derive(Debug, Clone)]
pub struct CandidateCursor {
    list: Vec<Candidate>,
    index: usize,
}

impl CandidateCursor {
    /// Cursor on the candidate with `id`, or `None` if it is not listed.
    #[must_use]
    pub fn new(list: Vec<Candidate>, id: &str) -> Option<Self> {
        let index = list.iter().position(|c| c.id == id)?;
        Some(Self { list, index })
    }

    #[must_use]
    pub fn current(&self) -> &Candidate {
        &self.list[self.index]
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Moves forward unless already on the last entry. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Moves back unless already on the first entry. Returns whether it moved.
    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.list.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub candidate_id: String,
    pub name: String,
    pub country: String,
    pub country_code: String,
    pub coordinates: Coordinates,
}

/// South-west and north-east corners enclosing every marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

/// One marker per candidate whose country resolves to coordinates.
///
/// Each distinct country code is looked up once. Failed lookups are
/// logged and their candidates left off the map.
pub async fn build_map_markers(
    list: &[Candidate],
    locator: &dyn CountryLocator,
) -> Vec<MapMarker> {
    let mut resolved: HashMap<&str, Option<Coordinates>> = HashMap::new();
    let mut markers = Vec::with_capacity(list.len());

    for candidate in list {
        let code = candidate.country_code.as_str();
        if code.trim().is_empty() {
            continue;
        }
        if !resolved.contains_key(code) {
            let coords = match locator.locate(code).await {
                Ok(coords) => Some(coords),
                Err(e) => {
                    tracing::warn!(
                        country = %candidate.country,
                        country_code = code,
                        error = %e,
                        "No coordinates for country"
                    );
                    None
                },
            };
            resolved.insert(code, coords);
        }
        if let Some(Some(coordinates)) = resolved.get(code) {
            markers.push(MapMarker {
                candidate_id: candidate.id.clone(),
                name: candidate.display_name(),
                country: candidate.country.clone(),
                country_code: code.to_owned(),
                coordinates: *coordinates,
            });
        }
    }

    tracing::debug!(markers = markers.len(), countries = resolved.len(), "Map markers built");
    markers
}

#[must_use]
pub fn map_bounds(markers: &[MapMarker]) -> Option<MapBounds> {
    let first = markers.first()?.coordinates;
    let mut bounds = MapBounds { south_west: first, north_east: first };
    for marker in &markers[1..] {
        let c = marker.coordinates;
        bounds.south_west.lat = bounds.south_west.lat.min(c.lat);
        bounds.south_west.lon = bounds.south_west.lon.min(c.lon);
        bounds.north_east.lat = bounds.north_east.lat.max(c.lat);
        bounds.north_east.lon = bounds.north_east.lon.max(c.lon);
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use regdesk_core::NewCandidate;
    use regdesk_geo::GeoError;

    use super::*;

    fn candidate(id: &str, name: &str, age: u32, code: &str) -> Candidate {
        Candidate::from_new(
            id.to_owned(),
            NewCandidate {
                name: name.to_owned(),
                email: format!("{id}@mail.com"),
                phone: "+40712345678".to_owned(),
                age,
                country: format!("Country {code}"),
                country_code: code.to_owned(),
                ..NewCandidate::default()
            },
            Utc::now(),
        )
    }

    /// Locator with fixed answers that records every lookup.
    struct FakeLocator {
        known: HashMap<&'static str, Coordinates>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CountryLocator for FakeLocator {
        async fn locate(&self, country_code: &str) -> Result<Coordinates, GeoError> {
            self.calls.lock().unwrap().push(country_code.to_owned());
            self.known
                .get(country_code)
                .copied()
                .ok_or_else(|| GeoError::MissingCoordinates(country_code.to_owned()))
        }
    }

    #[test]
    fn test_filter_matches_any_listed_field() {
        let list = vec![
            candidate("1", "Ana Pop", 30, "RO"),
            candidate("2", "John Doe", 45, "US"),
        ];

        assert_eq!(filter_candidates(&list, "  ANA ").len(), 1);
        assert_eq!(filter_candidates(&list, "45")[0].id, "2");
        assert_eq!(filter_candidates(&list, "country us")[0].id, "2");
        assert_eq!(filter_candidates(&list, "2@mail")[0].id, "2");
        assert_eq!(filter_candidates(&list, "+4071").len(), 2);
        assert_eq!(filter_candidates(&list, "").len(), 2);
        assert!(filter_candidates(&list, "zzz").is_empty());
    }

    #[test]
    fn test_age_buckets_boundaries() {
        let list: Vec<Candidate> = [18, 25, 26, 35, 36, 50, 51, 100]
            .iter()
            .enumerate()
            .map(|(i, age)| candidate(&i.to_string(), "x", *age, "RO"))
            .collect();

        let buckets = AgeBuckets::from_candidates(&list);

        assert_eq!(buckets.labeled(), [("18-25", 2), ("26-35", 2), ("36-50", 2), ("51+", 2)]);
        assert_eq!(buckets.total(), 8);
    }

    #[test]
    fn test_cursor_navigation_flags() {
        let list = vec![
            candidate("a", "a", 20, "RO"),
            candidate("b", "b", 20, "RO"),
            candidate("c", "c", 20, "RO"),
        ];
        let mut cursor = CandidateCursor::new(list.clone(), "b").unwrap();
        assert!(!cursor.is_first() && !cursor.is_last());

        assert!(cursor.next());
        assert_eq!(cursor.current().id, "c");
        assert!(cursor.is_last());
        assert!(!cursor.next());

        assert!(cursor.prev() && cursor.prev());
        assert!(cursor.is_first());
        assert!(!cursor.prev());
        assert_eq!(cursor.index(), 0);

        assert!(CandidateCursor::new(list, "missing").is_none());
    }

    #[test]
    fn test_cursor_single_entry_is_both_ends() {
        let cursor = CandidateCursor::new(vec![candidate("a", "a", 20, "RO")], "a").unwrap();
        assert!(cursor.is_first() && cursor.is_last());
    }

    #[tokio::test]
    async fn test_markers_lookup_each_country_once() {
        let locator = FakeLocator {
            known: HashMap::from([
                ("RO", Coordinates::new(46.0, 25.0)),
                ("US", Coordinates::new(38.0, -97.0)),
            ]),
            calls: Mutex::new(Vec::new()),
        };
        let list = vec![
            candidate("1", "ana pop", 30, "RO"),
            candidate("2", "ion", 30, "RO"),
            candidate("3", "john", 30, "US"),
            candidate("4", "nobody", 30, "XX"),
            candidate("5", "nobody else", 30, "XX"),
        ];

        let markers = build_map_markers(&list, &locator).await;

        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].name, "Ana Pop");
        let mut calls = locator.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, vec!["RO", "US", "XX"]);

        let bounds = map_bounds(&markers).unwrap();
        assert_eq!(bounds.south_west, Coordinates::new(38.0, -97.0));
        assert_eq!(bounds.north_east, Coordinates::new(46.0, 25.0));
    }

    #[test]
    fn test_no_markers_no_bounds() {
        assert!(map_bounds(&[]).is_none());
    }
}
