// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
use std::num::NonZeroU32;

use httpmock::prelude::*;
use serde_json::json;
use snapshot_voter_sdk::VoteMessage;
use url::Url;

use crate::snapshot::queries::{PROPOSALS_QUERY, VOTES_QUERY};
use crate::snapshot::{GovernanceClient, SnapshotClient};

const VOTER: &str = "0xc1c39b466a3660e64bfc5c256e6b8e7083957a4a";
const PROPOSAL: &str = "0x9b1faf762db03057ec16ad3b347548a4d19bbe35d01c8b20cd725239e8c89028";

fn client(server: &MockServer) -> SnapshotClient {
    SnapshotClient::new(
        Url::parse(&server.url("/graphql")).unwrap(),
        Url::parse(&server.url("/")).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn query_active_proposals() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql").json_body(json!({
                "query": PROPOSALS_QUERY,
                "variables": {"space": "cvx.eth", "title": "Gauge Weight"}
            }));
            then.status(200).json_body(json!({
                "data": {
                    "proposals": [
                        {"id": "0x02", "title": "Gauge Weight for Week of 10th Oct", "choices": ["A", "B"]},
                        {"id": "0x01", "title": "Gauge Weight for Week of 3rd Oct", "choices": ["A"]}
                    ]
                }
            }));
        })
        .await;

    let proposals = client(&server)
        .query_active_proposals("cvx.eth", "Gauge Weight")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(proposals.len(), 2);
    assert_eq!(proposals[0].id, "0x02");
    assert_eq!(proposals[0].choices, vec!["A", "B"]);
}

#[tokio::test]
async fn query_graphql_errors_fail() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .json_body(json!({"data": null, "errors": [{"message": "rate limited"}]}));
        })
        .await;

    let err = client(&server)
        .query_active_proposals("cvx.eth", "Gauge Weight")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rate limited"));
}

#[tokio::test]
async fn has_voted() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql").json_body(json!({
                "query": VOTES_QUERY,
                "variables": {"voter": VOTER, "proposal": PROPOSAL}
            }));
            then.status(200)
                .json_body(json!({"data": {"votes": [{"id": "0xvote"}]}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql").json_body(json!({
                "query": VOTES_QUERY,
                "variables": {"voter": VOTER, "proposal": "0x01"}
            }));
            then.status(200).json_body(json!({"data": {"votes": []}}));
        })
        .await;

    let client = client(&server);
    assert!(client.has_voted(VOTER, PROPOSAL).await.unwrap());
    assert!(!client.has_voted(VOTER, "0x01").await.unwrap());
}

#[tokio::test]
async fn has_voted_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(502);
        })
        .await;

    let err = client(&server).has_voted(VOTER, PROPOSAL).await.unwrap_err();
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn submit_vote() {
    let vote = VoteMessage::new(
        VOTER,
        "cvx.eth",
        1727621658,
        NonZeroU32::new(2).unwrap(),
        PROPOSAL,
    );

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .json_body_partial(
                    json!({
                        "address": VOTER,
                        "sig": "0x1234",
                        "data": {"message": {"proposal": PROPOSAL, "choice": "{\"2\":1}"}}
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!({"id": "0xreceipt"}));
        })
        .await;

    client(&server).submit_vote(&vote, "0x1234").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn submit_vote_rejected() {
    let vote = VoteMessage::new(VOTER, "cvx.eth", 1727621658, NonZeroU32::MIN, PROPOSAL);

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(400)
                .json_body(json!({"error": "client_error", "error_description": "signature validation failed"}));
        })
        .await;

    let err = client(&server)
        .submit_vote(&vote, "0x1234")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("signature validation failed"));
}
