use crate::common::{arc, create_test_config, open_shared, SNAPSHOT_2019, SNAPSHOT_2021};
use michelin_my_maps::extract::Source;
use michelin_my_maps::scraper::BackfillScraper;
use michelin_my_maps::storage::{Repository, Restaurant, RestaurantAward};
use michelin_my_maps::Distinction;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LES_AMIS_URL: &str = "https://guide.michelin.com/en/sg/restaurant/les-amis";

fn les_amis() -> Restaurant {
    Restaurant {
        url: LES_AMIS_URL.to_string(),
        name: "Les Amis".to_string(),
        description: String::new(),
        address: "1 Scotts Road, 228208, Singapore".to_string(),
        location: "Singapore".to_string(),
        latitude: "1.3050".to_string(),
        longitude: "103.8268".to_string(),
        cuisine: "French".to_string(),
        phone_number: String::new(),
        facilities_and_services: String::new(),
        website_url: String::new(),
    }
}

async fn mount_wayback(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cdx"))
        .and(query_param("url", LES_AMIS_URL))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"[["timestamp","original"],
               ["20190615123000","{url}"],
               ["20210301000000","{url}"],
               ["20230101000000","{url}"],
               ["2021","{url}"]]"#,
            url = LES_AMIS_URL
        )))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/web/20190615123000id_/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SNAPSHOT_2019))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/web/20210301000000id_/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SNAPSHOT_2021))
        .mount(mock_server)
        .await;

    // No year anywhere on this capture
    Mock::given(method("GET"))
        .and(path_regex(r"^/web/20230101000000id_/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>Closed</p></body></html>"),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_backfill_records_one_award_per_year() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_wayback(&mock_server).await;

    let config = arc(create_test_config(&mock_server.uri(), vec![], &dir));
    let repository = open_shared(&config);
    let id = repository
        .lock()
        .unwrap()
        .save_restaurant(&les_amis())
        .unwrap();

    let summary = BackfillScraper::new(config.clone(), repository.clone())
        .unwrap()
        .run(None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.fetch.fetched, 4);
    assert_eq!(summary.snapshots_enqueued, 3);
    assert_eq!(summary.snapshots_skipped, 1);
    assert_eq!(summary.awards_inserted, 2);

    let repo = repository.lock().unwrap();
    let awards = repo.awards_for_restaurant(id).unwrap();
    assert_eq!(awards.len(), 2);

    let first = &awards[0].award;
    assert_eq!(first.year, 2019);
    assert_eq!(first.distinction, Distinction::OneStar);
    assert_eq!(first.price, "$$");
    assert!(first.green_star);
    assert!(first
        .source
        .wayback_url()
        .contains("/web/20190615123000id_/https://guide.michelin.com/en/sg/restaurant/les-amis"));

    let second = &awards[1].award;
    assert_eq!(second.year, 2021);
    assert_eq!(second.distinction, Distinction::TwoStars);
    assert_eq!(second.price, "$$$");
    assert!(!second.green_star);
}

#[tokio::test]
async fn test_backfill_rerun_changes_nothing() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_wayback(&mock_server).await;

    let config = arc(create_test_config(&mock_server.uri(), vec![], &dir));
    let id = open_shared(&config)
        .lock()
        .unwrap()
        .save_restaurant(&les_amis())
        .unwrap();

    BackfillScraper::new(config.clone(), open_shared(&config))
        .unwrap()
        .run(None, CancellationToken::new())
        .await
        .unwrap();

    let repository = open_shared(&config);
    let before = repository.lock().unwrap().awards_for_restaurant(id).unwrap();

    let summary = BackfillScraper::new(config.clone(), repository.clone())
        .unwrap()
        .run(Some(LES_AMIS_URL), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.fetch.fetched, 0);
    assert_eq!(summary.fetch.cache_hits, 4);
    assert_eq!(summary.awards_inserted, 0);
    assert_eq!(summary.awards_updated, 0);
    assert_eq!(summary.awards_unchanged, 2);

    let after = repository.lock().unwrap().awards_for_restaurant(id).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_snapshot_takes_over_live_award_for_its_year() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_wayback(&mock_server).await;

    let config = arc(create_test_config(&mock_server.uri(), vec![], &dir));
    let repository = open_shared(&config);
    let id = {
        let mut repo = repository.lock().unwrap();
        let id = repo.save_restaurant(&les_amis()).unwrap();
        repo.save_award(&RestaurantAward {
            restaurant_id: id,
            year: 2021,
            distinction: Distinction::TwoStars,
            price: "$$$".to_string(),
            green_star: false,
            source: Source::Live,
        })
        .unwrap();
        id
    };

    let summary = BackfillScraper::new(config.clone(), repository.clone())
        .unwrap()
        .run(None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.awards_inserted, 1);
    assert_eq!(summary.awards_updated, 1);

    let repo = repository.lock().unwrap();
    let award = repo.find_award(id, 2021).unwrap().expect("2021 award");
    assert_eq!(award.award.distinction, Distinction::TwoStars);
    assert!(award.award.source.wayback_url().contains("20210301000000id_"));
}

#[tokio::test]
async fn test_backfill_unknown_target_does_nothing() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = arc(create_test_config(&mock_server.uri(), vec![], &dir));
    let summary = BackfillScraper::new(config.clone(), open_shared(&config))
        .unwrap()
        .run(
            Some("https://guide.michelin.com/en/sg/restaurant/unknown"),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.fetch.fetched, 0);
    assert_eq!(summary.snapshots_enqueued, 0);
}

#[tokio::test]
async fn test_empty_cdx_answer_queues_no_snapshots() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/cdx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = arc(create_test_config(&mock_server.uri(), vec![], &dir));
    let repository = open_shared(&config);
    repository
        .lock()
        .unwrap()
        .save_restaurant(&les_amis())
        .unwrap();

    let summary = BackfillScraper::new(config.clone(), repository)
        .unwrap()
        .run(None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.fetch.fetched, 1);
    assert_eq!(summary.snapshots_enqueued, 0);
    assert_eq!(summary.fetch.handler_errors, 0);
}
