use super::common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppEnvironment;
use crate::directory::rate_limit::InMemoryRateLimitStore;
use crate::directory::service::{ListingError, ListingQuery};

fn query(
    q: Option<&str>,
    state: Option<&str>,
    page: Option<&str>,
    limit: Option<&str>,
) -> ListingQuery {
    ListingQuery {
        q: q.map(str::to_string),
        state: state.map(str::to_string),
        page: page.map(str::to_string),
        limit: limit.map(str::to_string),
    }
}

#[tokio::test]
async fn lists_every_company_by_name_with_default_pagination() {
    let (directory, _) = build_directory(100);

    let page = directory.list(&ListingQuery::default()).await.unwrap();

    let names: Vec<&str> = page.companies.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "BluePeak Appraisal Management",
            "Lone Star Valuations",
            "Mountain View AMC",
            "Precision Valuation Services",
            "SunCoast AMC",
        ]
    );
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.limit, 20);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.total_pages, 1);
}

#[tokio::test]
async fn combines_name_and_state_filters() {
    let (directory, _) = build_directory(100);

    let by_state = directory
        .list(&query(None, Some("tx"), None, None))
        .await
        .unwrap();
    assert_eq!(by_state.pagination.total, 2);

    let by_both = directory
        .list(&query(Some("star"), Some("TX"), None, None))
        .await
        .unwrap();
    assert_eq!(by_both.companies.len(), 1);
    assert_eq!(by_both.companies[0].name, "Lone Star Valuations");

    let explicit_all = directory
        .list(&query(Some("amc"), Some("ALL"), None, None))
        .await
        .unwrap();
    assert_eq!(explicit_all.pagination.total, 2);
}

#[tokio::test]
async fn pages_report_total_across_all_matches() {
    let (directory, _) = build_directory(100);

    let second = directory
        .list(&query(None, None, Some("2"), Some("2")))
        .await
        .unwrap();

    let names: Vec<&str> = second.companies.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Mountain View AMC", "Precision Valuation Services"]);
    assert_eq!(second.pagination.total, 5);
    assert_eq!(second.pagination.total_pages, 3);

    let beyond = directory
        .list(&query(None, None, Some("9"), Some("2")))
        .await
        .unwrap();
    assert!(beyond.companies.is_empty());
    assert_eq!(beyond.pagination.total, 5);
}

#[tokio::test]
async fn invalid_search_never_reaches_the_store() {
    let (directory, store) = build_directory(100);

    let err = directory
        .list(&query(None, Some("XX"), None, None))
        .await
        .unwrap_err();

    match err {
        ListingError::InvalidSearch(errors) => {
            assert_eq!(errors.message_for("state"), Some("Invalid state filter"));
        }
        other => panic!("expected invalid search, got {other:?}"),
    }
    assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_pagination_is_reported_separately() {
    let (directory, store) = build_directory(100);

    let err = directory
        .list(&query(None, None, Some("0"), Some("500")))
        .await
        .unwrap_err();

    match err {
        ListingError::InvalidPagination(errors) => {
            let fields: Vec<&str> = errors.fields().collect();
            assert_eq!(fields, ["page", "limit"]);
        }
        other => panic!("expected invalid pagination, got {other:?}"),
    }
    assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn admits_up_to_the_limit_per_client() {
    let (directory, _) = build_directory(2);

    directory.admit("203.0.113.1").await.unwrap();
    directory.admit("203.0.113.1").await.unwrap();
    let err = directory.admit("203.0.113.1").await.unwrap_err();
    match err {
        ListingError::RateLimited { retry_after } => {
            assert_eq!(retry_after, Duration::from_secs(60));
        }
        other => panic!("expected rate limit, got {other:?}"),
    }

    directory.admit("203.0.113.2").await.unwrap();
}

#[tokio::test]
async fn list_for_counts_rejected_requests_too() {
    let (directory, _) = build_directory(1);

    let invalid = directory
        .list_for("198.51.100.3", &query(None, Some("ZZ"), None, None))
        .await;
    assert!(matches!(invalid, Err(ListingError::InvalidSearch(_))));

    let limited = directory
        .list_for("198.51.100.3", &ListingQuery::default())
        .await;
    assert!(matches!(limited, Err(ListingError::RateLimited { .. })));
}

#[tokio::test]
async fn store_failures_surface_as_store_errors() {
    let directory = directory_with(
        Arc::new(UnavailableStore),
        Arc::new(InMemoryRateLimitStore::default()),
        100,
        AppEnvironment::Production,
    );

    let err = directory.list(&ListingQuery::default()).await.unwrap_err();
    assert!(matches!(err, ListingError::Store(_)));
}

#[tokio::test]
async fn broken_rate_limit_store_fails_closed() {
    let directory = directory_with(
        Arc::new(sample_store()),
        Arc::new(BrokenRateLimitStore),
        100,
        AppEnvironment::Production,
    );

    let err = directory.admit("203.0.113.7").await.unwrap_err();
    assert!(matches!(err, ListingError::RateLimitStore(_)));
}
