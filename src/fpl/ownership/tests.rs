//! Unit tests for ownership resolution and lineup slots

use super::*;
use crate::config::DashboardConfig;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn pick(element: u32, position: Option<i64>, multiplier: Option<i64>) -> Pick {
    Pick {
        element: PlayerId::new(element),
        position,
        multiplier,
    }
}

async fn mount_league(server: &MockServer, league_id: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/api/league/{league_id}/details")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "league": {"id": league_id, "name": "Test League"},
            "league_entries": [
                {"id": 1, "entry_id": 101, "entry_name": "Alpha"},
                {"id": 2, "entry_id": 102, "entry_name": "Bravo"},
                {"id": 3, "entry_id": 103, "entry_name": null},
                {"id": 4, "entry_id": null, "entry_name": "Pending"}
            ],
            "matches": [],
            "standings": []
        })))
        .mount(server)
        .await;
}

async fn mount_picks(server: &MockServer, entry: u64, gw: u16, picks: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/entry/{entry}/event/{gw}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "picks": picks })))
        .mount(server)
        .await;
}

fn resolver_for(server: &MockServer) -> OwnershipResolver {
    let config = DashboardConfig::default().with_base_url(&server.uri());
    OwnershipResolver::new(FplClient::new(config).unwrap())
}

#[cfg(test)]
mod collect_tests {
    use super::*;

    #[test]
    fn test_collect_skips_missing_multiplier() {
        let squads = vec![(
            EntryId::new(1),
            vec![pick(10, Some(1), Some(1)), pick(11, Some(2), None)],
        )];
        let map = collect_ownership(squads, false);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&PlayerId::new(10)], EntryId::new(1));
    }

    #[test]
    fn test_collect_starters_only() {
        let squads = vec![(
            EntryId::new(1),
            vec![
                pick(10, Some(1), Some(1)),
                pick(11, Some(12), Some(0)),
                pick(12, Some(5), Some(2)),
            ],
        )];
        let all = collect_ownership(squads.clone(), false);
        let starters = collect_ownership(squads, true);

        assert_eq!(all.len(), 3);
        assert_eq!(starters.len(), 2);
        assert!(!starters.contains_key(&PlayerId::new(11)));
    }

    #[test]
    fn test_collect_is_order_independent() {
        let a = (EntryId::new(7), vec![pick(10, Some(1), Some(1))]);
        let b = (EntryId::new(3), vec![pick(10, Some(1), Some(1))]);

        let forward = collect_ownership(vec![a.clone(), b.clone()], false);
        let backward = collect_ownership(vec![b, a], false);
        assert_eq!(forward, backward);
        assert_eq!(forward[&PlayerId::new(10)], EntryId::new(7));
    }

    #[test]
    fn test_owner_names_fall_back() {
        let details = LeagueDetails::from_value(&json!({
            "league_entries": [
                {"id": 1, "entry_id": 101, "entry_name": "Alpha"},
                {"id": 2, "entry_id": 102}
            ]
        }));
        let ownership: OwnershipMap = [
            (PlayerId::new(1), EntryId::new(101)),
            (PlayerId::new(2), EntryId::new(102)),
            (PlayerId::new(3), EntryId::new(999)),
        ]
        .into_iter()
        .collect();

        let names = owner_names(&ownership, &details);
        assert_eq!(names[&PlayerId::new(1)], "Alpha");
        assert_eq!(names[&PlayerId::new(2)], UNKNOWN_OWNER);
        assert_eq!(names[&PlayerId::new(3)], UNKNOWN_OWNER);
    }
}

#[cfg(test)]
mod slot_tests {
    use super::*;

    #[test]
    fn test_position_decides_when_in_range() {
        assert_eq!(compute_slot(Some(1), Some(1)), LineupSlot::Starting);
        assert_eq!(compute_slot(Some(0), Some(11)), LineupSlot::Starting);
        assert_eq!(compute_slot(Some(0), Some(12)), LineupSlot::Bench(1));
        assert_eq!(compute_slot(Some(1), Some(15)), LineupSlot::Bench(4));
    }

    #[test]
    fn test_multiplier_decides_without_position() {
        assert_eq!(compute_slot(Some(2), None), LineupSlot::Starting);
        assert_eq!(compute_slot(Some(0), None), LineupSlot::BenchUnordered);
        assert_eq!(compute_slot(None, None), LineupSlot::Unknown);
        assert_eq!(compute_slot(Some(-1), Some(16)), LineupSlot::Unknown);
        assert_eq!(compute_slot(Some(1), Some(0)), LineupSlot::Starting);
    }

    #[test]
    fn test_slot_labels_and_order() {
        assert_eq!(LineupSlot::Starting.to_string(), "XI");
        assert_eq!(LineupSlot::Bench(3).to_string(), "Bench 3");
        assert_eq!(LineupSlot::BenchUnordered.to_string(), "Bench ?");
        assert_eq!(LineupSlot::Unknown.to_string(), "Unknown");

        let mut slots = vec![
            LineupSlot::Unknown,
            LineupSlot::Bench(2),
            LineupSlot::Starting,
            LineupSlot::Bench(1),
        ];
        slots.sort_by_key(LineupSlot::rank);
        assert_eq!(
            slots,
            vec![
                LineupSlot::Starting,
                LineupSlot::Bench(1),
                LineupSlot::Bench(2),
                LineupSlot::Unknown
            ]
        );
    }
}

#[cfg(test)]
mod resolver_tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_entry_contributes_nothing() {
        let mock_server = MockServer::start().await;
        mount_league(&mock_server, 12260).await;
        mount_picks(
            &mock_server,
            101,
            4,
            json!([
                {"element": 10, "position": 1, "multiplier": 1},
                {"element": 11, "position": 12, "multiplier": 0}
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/api/entry/102/event/4"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        mount_picks(
            &mock_server,
            103,
            4,
            json!([{"element": "20", "position": 1, "multiplier": 1}]),
        )
        .await;

        let resolver = resolver_for(&mock_server);
        let map = resolver
            .build_current_ownership(LeagueId::new(12260), Gameweek::new(4), false)
            .await;

        assert_eq!(map.len(), 3);
        assert_eq!(map[&PlayerId::new(10)], EntryId::new(101));
        assert_eq!(map[&PlayerId::new(11)], EntryId::new(101));
        assert_eq!(map[&PlayerId::new(20)], EntryId::new(103));
    }

    #[tokio::test]
    async fn test_starters_only_and_names() {
        let mock_server = MockServer::start().await;
        mount_league(&mock_server, 5).await;
        mount_picks(
            &mock_server,
            101,
            2,
            json!([
                {"element": 10, "position": 1, "multiplier": 1},
                {"element": 11, "position": 12, "multiplier": 0}
            ]),
        )
        .await;
        mount_picks(&mock_server, 102, 2, json!([])).await;
        mount_picks(
            &mock_server,
            103,
            2,
            json!([{"element": 30, "position": 3, "multiplier": 1}]),
        )
        .await;

        let resolver = resolver_for(&mock_server);
        let names = resolver
            .build_current_ownership_names(LeagueId::new(5), Gameweek::new(2), true)
            .await;

        assert_eq!(names.len(), 2);
        assert_eq!(names[&PlayerId::new(10)], "Alpha");
        assert_eq!(names[&PlayerId::new(30)], UNKNOWN_OWNER);
    }

    #[tokio::test]
    async fn test_ownership_map_is_cached() {
        let mock_server = MockServer::start().await;
        mount_league(&mock_server, 9).await;
        for entry in [101, 102, 103] {
            Mock::given(method("GET"))
                .and(path(format!("/api/entry/{entry}/event/1")))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "picks": [{"element": entry, "position": 1, "multiplier": 1}]
                })))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let resolver = resolver_for(&mock_server);
        let first = resolver
            .build_current_ownership(LeagueId::new(9), Gameweek::new(1), false)
            .await;
        // Drop the picks responses so only the ownership cache can answer.
        resolver.client().cache().clear();
        let second = resolver
            .build_current_ownership(LeagueId::new(9), Gameweek::new(1), false)
            .await;

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_league_is_not_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/league/1/details"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let resolver = resolver_for(&mock_server);
        let map = resolver
            .build_current_ownership(LeagueId::new(1), Gameweek::new(1), false)
            .await;
        assert!(map.is_empty());
        assert!(resolver.maps.is_empty());
    }
}

#[cfg(test)]
mod fan_out_tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use wiremock::{Request, Respond};

    /// Answers `/entry/{id}/event/{gw}` with one pick (element = id) after
    /// `delay`, recording when each request arrived.
    struct SlowPicks {
        arrivals: Arc<Mutex<Vec<Instant>>>,
        delay: Duration,
    }

    impl Respond for SlowPicks {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            self.arrivals.lock().unwrap().push(Instant::now());
            let entry: u64 = request
                .url
                .path_segments()
                .and_then(|mut s| s.nth(2))
                .and_then(|id| id.parse().ok())
                .unwrap_or(0);
            ResponseTemplate::new(200)
                .set_body_json(json!({"picks": [{"element": entry, "position": 1, "multiplier": 1}]}))
                .set_delay(self.delay)
        }
    }

    fn resolver_with(server: &MockServer, max_concurrent: usize, timeout: Duration) -> OwnershipResolver {
        let config = DashboardConfig {
            max_concurrent_requests: max_concurrent,
            request_timeout: timeout,
            ..DashboardConfig::default().with_base_url(&server.uri())
        };
        OwnershipResolver::new(FplClient::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_requests_in_flight_never_exceed_cap() {
        let mock_server = MockServer::start().await;
        let arrivals = Arc::new(Mutex::new(Vec::new()));
        let delay = Duration::from_millis(300);
        Mock::given(method("GET"))
            .respond_with(SlowPicks {
                arrivals: arrivals.clone(),
                delay,
            })
            .mount(&mock_server)
            .await;

        let cap = 2;
        let resolver = resolver_with(&mock_server, cap, Duration::from_secs(10));
        let entries: Vec<EntryId> = (101..=106).map(EntryId::new).collect();

        let started = Instant::now();
        let mut squads = resolver.fetch_squads(&entries, Gameweek::new(1)).await;
        let elapsed = started.elapsed();

        squads.sort_by_key(|(entry, _)| *entry);
        assert_eq!(squads.len(), 6);
        for (entry, picks) in &squads {
            assert_eq!(picks.len(), 1);
            assert_eq!(u64::from(picks[0].element.as_u32()), entry.as_u64());
        }

        // Six requests two at a time take at least three response delays.
        assert!(elapsed >= delay * 3, "finished in {elapsed:?}");

        // A request holds its slot for `delay`, so every arrival within half of
        // that window was in flight at the same time.
        let arrivals = arrivals.lock().unwrap().clone();
        assert_eq!(arrivals.len(), 6);
        let peak = arrivals
            .iter()
            .map(|start| {
                arrivals
                    .iter()
                    .filter(|t| **t >= *start && t.duration_since(*start) < delay / 2)
                    .count()
            })
            .max()
            .unwrap_or(0);
        assert!(peak <= cap, "peak of {peak} concurrent requests");
    }

    #[tokio::test]
    async fn test_slow_entry_times_out_alone() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/entry/102/event/3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"picks": [{"element": 99, "position": 1, "multiplier": 1}]}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;
        mount_picks(&mock_server, 101, 3, json!([{"element": 10, "position": 1, "multiplier": 1}])).await;
        mount_picks(&mock_server, 103, 3, json!([{"element": 30, "position": 1, "multiplier": 1}])).await;

        let resolver = resolver_with(&mock_server, 8, Duration::from_millis(300));
        let entries = [EntryId::new(101), EntryId::new(102), EntryId::new(103)];

        let started = Instant::now();
        let mut squads = resolver.fetch_squads(&entries, Gameweek::new(3)).await;
        assert!(started.elapsed() < Duration::from_secs(5));

        squads.sort_by_key(|(entry, _)| *entry);
        let elements: Vec<Vec<PlayerId>> = squads
            .iter()
            .map(|(_, picks)| picks.iter().map(|p| p.element).collect())
            .collect();
        assert_eq!(
            elements,
            vec![vec![PlayerId::new(10)], Vec::new(), vec![PlayerId::new(30)]]
        );

        let map = collect_ownership(squads, false);
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key(&PlayerId::new(99)));
    }
}
