use crate::common::{arc, create_test_config, open_shared, LES_AMIS, ODETTE};
use michelin_my_maps::client::ClientError;
use michelin_my_maps::parse::current_year;
use michelin_my_maps::scraper::LiveScraper;
use michelin_my_maps::storage::Repository;
use michelin_my_maps::{Distinction, HarvestError};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_listing_to_detail_with_pagination() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/en/restaurants/3-stars-michelin"))
        .respond_with(html(
            r#"<html><body>
            <div class="card__menu selection-card" data-lat="1.304" data-lng="103.83">
              <a class="link" href="/en/sg/restaurant/les-amis"></a>
              <div class="card__menu-footer--score pl-text"> Singapore </div>
            </div>
            <ul><li class="arrow"><a class="btn btn-outline-secondary" href="/en/restaurants/3-stars-michelin/page/2">Next</a></li></ul>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/restaurants/3-stars-michelin/page/2"))
        .respond_with(html(
            r#"<html><body>
            <div class="card__menu selection-card" data-lat="1.2902" data-lng="103.8515">
              <a class="link" href="/en/sg/restaurant/odette?ref=listing"></a>
              <div class="card__menu-footer--score pl-text">Singapore</div>
            </div>
            <div class="card__menu selection-card">
              <a class="link" href="/en/sg/restaurant/les-amis/"></a>
            </div>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/sg/restaurant/les-amis"))
        .respond_with(html(LES_AMIS))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/sg/restaurant/odette"))
        .respond_with(html(ODETTE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        &base_url,
        vec![format!("{}/en/restaurants/3-stars-michelin", base_url)],
        &dir,
    );
    let repository = open_shared(&config);
    let scraper = LiveScraper::new(arc(config), repository.clone()).unwrap();

    let summary = scraper.run(None, CancellationToken::new()).await.unwrap();

    assert_eq!(summary.fetch.fetched, 4);
    assert_eq!(summary.restaurants_saved, 2);
    assert_eq!(summary.awards_inserted, 2);
    assert_eq!(summary.validation_failures, 0);

    let repo = repository.lock().unwrap();
    let les_amis = repo
        .find_restaurant_by_url(&format!("{}/en/sg/restaurant/les-amis", base_url))
        .unwrap()
        .expect("Les Amis should be stored");
    assert_eq!(les_amis.restaurant.name, "Les Amis");
    assert_eq!(les_amis.restaurant.location, "Singapore");
    assert_eq!(les_amis.restaurant.latitude, "1.304");
    assert_eq!(les_amis.restaurant.longitude, "103.83");
    assert_eq!(les_amis.restaurant.phone_number, "+6567332225");
    assert_eq!(les_amis.restaurant.cuisine, "French");

    let awards = repo.awards_for_restaurant(les_amis.id).unwrap();
    assert_eq!(awards.len(), 1);
    assert_eq!(awards[0].award.year, 2024);
    assert_eq!(awards[0].award.distinction, Distinction::ThreeStars);
    assert_eq!(awards[0].award.price, "$$$$");
    assert!(awards[0].award.source.is_live());

    // Odette's page has no date: the live edition is the current year
    let odette = repo
        .find_restaurant_by_url(&format!("{}/en/sg/restaurant/odette", base_url))
        .unwrap()
        .expect("Odette should be stored");
    let awards = repo.awards_for_restaurant(odette.id).unwrap();
    assert_eq!(awards[0].award.year, current_year());
    assert_eq!(awards[0].award.distinction, Distinction::TwoStars);
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/en/sg/restaurant/les-amis"))
        .respond_with(html(LES_AMIS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = arc(create_test_config(&base_url, vec![], &dir));
    let target = format!("{}/en/sg/restaurant/les-amis", base_url);

    let first = LiveScraper::new(config.clone(), open_shared(&config))
        .unwrap()
        .run(Some(&target), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.fetch.fetched, 1);
    assert_eq!(first.awards_inserted, 1);

    let second = LiveScraper::new(config.clone(), open_shared(&config))
        .unwrap()
        .run(Some(&target), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(second.fetch.fetched, 0);
    assert_eq!(second.fetch.cache_hits, 1);
    assert_eq!(second.awards_inserted, 0);
    assert_eq!(second.awards_unchanged, 1);
}

#[tokio::test]
async fn test_server_error_is_retried_then_dropped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/en/restaurants/bib-gourmand"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        &base_url,
        vec![format!("{}/en/restaurants/bib-gourmand", base_url)],
        &dir,
    );
    let repository = open_shared(&config);
    let summary = LiveScraper::new(arc(config), repository)
        .unwrap()
        .run(None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.fetch.fetched, 3);
    assert_eq!(summary.fetch.retries, 2);
    assert_eq!(summary.fetch.dropped, 1);
    assert_eq!(summary.restaurants_saved, 0);
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/en/sg/restaurant/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = arc(create_test_config(&base_url, vec![], &dir));
    let summary = LiveScraper::new(config.clone(), open_shared(&config))
        .unwrap()
        .run(
            Some(&format!("{}/en/sg/restaurant/blocked", base_url)),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.fetch.fetched, 1);
    assert_eq!(summary.fetch.retries, 0);
    assert_eq!(summary.fetch.dropped, 1);
}

#[tokio::test]
async fn test_cancelled_run_fetches_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(html(LES_AMIS))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = arc(create_test_config(
        &base_url,
        vec![format!("{}/en/restaurants/3-stars-michelin", base_url)],
        &dir,
    ));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = LiveScraper::new(config.clone(), open_shared(&config))
        .unwrap()
        .run(None, cancel)
        .await
        .unwrap();
    assert_eq!(summary.fetch.fetched, 0);
}

#[tokio::test]
async fn test_queue_overflow_fails_the_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/en/restaurants/1-star-michelin"))
        .respond_with(html(
            r#"<html><body>
            <div class="card__menu selection-card"><a class="link" href="/en/sg/restaurant/a"></a></div>
            <div class="card__menu selection-card"><a class="link" href="/en/sg/restaurant/b"></a></div>
            <div class="card__menu selection-card"><a class="link" href="/en/sg/restaurant/c"></a></div>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html(ODETTE))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(
        &base_url,
        vec![format!("{}/en/restaurants/1-star-michelin", base_url)],
        &dir,
    );
    config.scrape.client.max_queued_urls = 2;
    config.scrape.client.worker_count = 1;

    let repository = open_shared(&config);
    let result = LiveScraper::new(arc(config), repository)
        .unwrap()
        .run(None, CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(HarvestError::Client(ClientError::QueueFull { capacity: 2 }))
    ));
}
