use anyhow::{Result, bail};
use regdesk_geo::GeoClient;
use regdesk_service::RegistrationDesk;
use regdesk_service::views::{
    AgeBuckets, CandidateCursor, build_map_markers, filter_candidates, map_bounds,
};

pub(crate) fn run_list(desk: &RegistrationDesk, search: Option<&str>) -> Result<()> {
    let list = desk.candidates().list();
    let matches = filter_candidates(&list, search.unwrap_or_default());
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

pub(crate) async fn run_show(desk: &RegistrationDesk, id: &str) -> Result<()> {
    let list = desk.candidates_with_photos().await?;
    let total = list.len();
    let Some(cursor) = CandidateCursor::new(list, id) else {
        bail!("Candidate not found: {id}");
    };

    let mut prev = cursor.clone();
    let mut next = cursor.clone();
    let out = serde_json::json!({
        "position": cursor.index() + 1,
        "total": total,
        "prev": prev.prev().then(|| prev.current().id.clone()),
        "next": next.next().then(|| next.current().id.clone()),
        "candidate": cursor.current(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub(crate) async fn run_remove(desk: &RegistrationDesk, id: &str) -> Result<()> {
    if !desk.remove_candidate(id).await? {
        bail!("Candidate not found: {id}");
    }
    println!("Removed {id}");
    Ok(())
}

pub(crate) fn run_stats(desk: &RegistrationDesk) -> Result<()> {
    let list = desk.candidates().list();
    let buckets: serde_json::Map<String, serde_json::Value> = AgeBuckets::from_candidates(&list)
        .labeled()
        .iter()
        .map(|(label, count)| ((*label).to_owned(), (*count).into()))
        .collect();
    let out = serde_json::json!({
        "visits": desk.counters().visits(),
        "registrations": desk.counters().registrations(),
        "candidates": list.len(),
        "ageBuckets": buckets,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub(crate) async fn run_map(desk: &RegistrationDesk, geo_api_url: Option<&str>) -> Result<()> {
    let Some(url) = geo_api_url else {
        bail!("REGDESK_GEO_API_URL is not set, map lookups are disabled");
    };
    let locator = GeoClient::new(url)?;
    let markers = build_map_markers(&desk.candidates().list(), &locator).await;

    let bounds = map_bounds(&markers).map(|b| {
        serde_json::json!({ "southWest": b.south_west, "northEast": b.north_east })
    });
    let markers: Vec<_> = markers
        .iter()
        .map(|m| {
            serde_json::json!({
                "candidateId": m.candidate_id,
                "name": m.name,
                "country": m.country,
                "countryCode": m.country_code,
                "lat": m.coordinates.lat,
                "lon": m.coordinates.lon,
            })
        })
        .collect();
    let out = serde_json::json!({ "markers": markers, "bounds": bounds });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
