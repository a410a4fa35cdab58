use github_battle::error::BattleError;
use github_battle::github::{fetch_profiles_ranked, GitHubApi, GitHubClient, GitHubClientConfig};
use github_battle::ranking::DEFAULT_WEIGHTS;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, token: Option<&str>) -> GitHubClient {
    GitHubClient::new(GitHubClientConfig {
        base_url: server.uri(),
        token: token.map(str::to_string),
        timeout: Duration::from_secs(5),
    })
    .expect("Failed to create client")
}

fn search_item(name: &str, stars: u64) -> serde_json::Value {
    json!({
        "id": 1,
        "name": name,
        "full_name": format!("owner/{}", name),
        "owner": {
            "login": "owner",
            "id": 7,
            "avatar_url": "https://avatars.githubusercontent.com/u/7"
        },
        "html_url": format!("https://github.com/owner/{}", name),
        "stargazers_count": stars,
        "watchers_count": stars,
        "forks": 12,
        "open_issues": 3,
        "language": "Ruby"
    })
}

fn profile(login: &str, followers: u64) -> serde_json::Value {
    json!({
        "login": login,
        "id": 42,
        "avatar_url": format!("https://avatars.githubusercontent.com/{}", login),
        "html_url": format!("https://github.com/{}", login),
        "name": null,
        "company": "@github",
        "blog": "",
        "location": "San Francisco",
        "public_repos": 2,
        "followers": followers,
        "following": 9
    })
}

async fn mount_player(server: &MockServer, login: &str, followers: u64, stars: &[u64]) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{}", login)))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile(login, followers)))
        .expect(1)
        .mount(server)
        .await;

    let repos: Vec<serde_json::Value> = stars
        .iter()
        .enumerate()
        .map(|(i, s)| json!({ "name": format!("repo-{}", i), "stargazers_count": s, "fork": false }))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/users/{}/repos", login)))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_github_client_creation() {
    let client = GitHubClient::new(GitHubClientConfig::default());
    assert!(client.is_ok());
}

#[tokio::test]
async fn test_search_popular_repos_by_language() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "stars:>1 language:Ruby"))
        .and(query_param("sort", "stars"))
        .and(query_param("order", "desc"))
        .and(query_param("type", "Repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "incomplete_results": false,
            "items": [search_item("rails", 50000), search_item("jekyll", 45000)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let repos = client
        .fetch_repos_by_language("Ruby")
        .await
        .expect("Failed to fetch repositories");

    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0].name, "rails");
    assert_eq!(repos[0].owner.login, "owner");
    assert_eq!(repos[0].stargazers_count, 50000);
    assert_eq!(repos[0].forks, 12);
    assert_eq!(repos[0].open_issues, 3);
}

#[tokio::test]
async fn test_all_languages_omits_language_qualifier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "stars:>1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let repos = client_for(&server, None)
        .fetch_repos_by_language("All")
        .await
        .expect("Failed to fetch repositories");
    assert!(repos.is_empty());
}

#[tokio::test]
async fn test_fetch_player_combines_profile_and_repos() {
    let server = MockServer::start().await;
    mount_player(&server, "octocat", 4000, &[10, 20]).await;

    let player = client_for(&server, None)
        .fetch_player("octocat")
        .await
        .expect("Failed to fetch player");

    assert_eq!(player.profile.login, "octocat");
    assert_eq!(player.profile.followers, 4000);
    assert_eq!(player.profile.location.as_deref(), Some("San Francisco"));
    assert_eq!(player.total_stars(), 30);
}

#[tokio::test]
async fn test_fetch_profiles_ranked_orders_by_score() {
    let server = MockServer::start().await;
    mount_player(&server, "alice", 1, &[500]).await;
    mount_player(&server, "bob", 100, &[]).await;

    let client = client_for(&server, None);
    let ranked = fetch_profiles_ranked(&client, "alice", "bob", &DEFAULT_WEIGHTS)
        .await
        .expect("Failed to rank players");

    assert_eq!(ranked.winner.username, "alice");
    assert_eq!(ranked.winner.score, 503);
    assert_eq!(ranked.loser.username, "bob");
    assert_eq!(ranked.loser.score, 300);
}

#[tokio::test]
async fn test_user_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
        )
        .mount(&server)
        .await;

    let result = client_for(&server, None).fetch_player("nobody-here").await;

    match result {
        Err(BattleError::NotFound(_)) => {}
        other => panic!("Expected NotFound error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_username_is_rejected_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client_for(&server, None).fetch_player("../admin").await;

    match result {
        Err(BattleError::InvalidUsername(name)) => assert_eq!(name, "../admin"),
        other => panic!("Expected InvalidUsername error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limit_exhausted() {
    let server = MockServer::start().await;
    let reset = chrono::Utc::now().timestamp() + 3600;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("X-RateLimit-Remaining", "0")
                .insert_header("X-RateLimit-Limit", "60")
                .insert_header("X-RateLimit-Reset", reset.to_string().as_str()),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let result = client.fetch_repos_by_language("Java").await;

    assert!(matches!(result, Err(BattleError::RateLimitExceeded(_))));

    let state = client.rate_limit_state().expect("Rate limit should be recorded");
    assert!(state.is_limited);
    assert_eq!(state.limit, 60);
    assert_eq!(state.reset_time.timestamp(), reset);
}

#[tokio::test]
async fn test_unexpected_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_string("Validation Failed"))
        .mount(&server)
        .await;

    let result = client_for(&server, None).fetch_repos_by_language("Python").await;

    match result {
        Err(BattleError::ApiError(message)) => assert!(message.contains("Validation Failed")),
        other => panic!("Expected ApiError, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_token_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(header("Authorization", "token secret-token"))
        .and(header("Accept", "application/vnd.github.v3+json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Remaining", "4999")
                .insert_header("X-RateLimit-Limit", "5000")
                .set_body_json(json!({ "items": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret-token"));
    client
        .fetch_repos_by_language("Go")
        .await
        .expect("Authenticated request failed");

    let state = client.rate_limit_state().expect("Rate limit should be recorded");
    assert_eq!(state.remaining, 4999);
    assert!(!state.is_limited);
}
