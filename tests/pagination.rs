use daocensus::query::{PROPOSAL_ID_QUERY, DAO_QUERY};
use daocensus::{InMemoryTransport, Paginator, Record, RetryPolicy};
use serde_json::json;
use std::time::Duration;

fn proposals(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| json!({ "id": format!("p{}", i) }).as_object().cloned().unwrap())
        .collect()
}

fn transport_with(count: usize) -> InMemoryTransport {
    let mut transport = InMemoryTransport::new();
    transport.add_records("proposals", Some("0xdao"), proposals(count));
    transport
}

#[tokio::test]
async fn partial_last_page_ends_pagination() {
    let transport = transport_with(1500);
    let paginator = Paginator::new(&transport);

    let records = paginator
        .collect(PROPOSAL_ID_QUERY, "proposals", Some("0xdao"))
        .await
        .unwrap();

    assert_eq!(records.len(), 1500);
    assert_eq!(transport.request_count(), 2, "1000 + 500 records");
    let queries = transport.requests();
    assert!(queries[0].contains("skip: 0"));
    assert!(queries[1].contains("skip: 1000"));
}

#[tokio::test]
async fn exact_multiple_needs_one_extra_request() {
    let transport = transport_with(2000);
    let paginator = Paginator::new(&transport);

    let records = paginator
        .collect(PROPOSAL_ID_QUERY, "proposals", Some("0xdao"))
        .await
        .unwrap();

    assert_eq!(records.len(), 2000);
    assert_eq!(transport.request_count(), 3, "1000 + 1000 + empty page");
}

#[tokio::test]
async fn records_keep_server_order() {
    let transport = transport_with(7);
    let paginator = Paginator::with_page_size(&transport, 3);

    let records = paginator
        .collect(PROPOSAL_ID_QUERY, "proposals", Some("0xdao"))
        .await
        .unwrap();

    let ids: Vec<&str> = records.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["p0", "p1", "p2", "p3", "p4", "p5", "p6"]);
}

#[tokio::test]
async fn per_dao_query_without_dao_id_is_rejected() {
    let transport = transport_with(3);
    let paginator = Paginator::new(&transport);

    let result = paginator.collect(PROPOSAL_ID_QUERY, "proposals", None).await;
    assert!(result.is_err());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn missing_collection_is_an_empty_result() {
    let transport = InMemoryTransport::new();
    let paginator = Paginator::new(&transport);

    let records = paginator.collect(DAO_QUERY, "daos", None).await.unwrap();
    assert!(records.is_empty());
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn single_retry_recovers_from_one_failure() {
    let transport = transport_with(5);
    let paginator = Paginator::new(&transport);
    transport.fail_next(1);

    let policy = RetryPolicy::Once {
        cooldown: Duration::ZERO,
    };
    let records = paginator
        .collect_with_retry(PROPOSAL_ID_QUERY, "proposals", Some("0xdao"), policy)
        .await
        .unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(transport.request_count(), 2);
}
