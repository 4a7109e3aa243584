use blogsmith_core::config::GhostConfig;
use blogsmith_core::contract::{
    ListQuery, PostStatus, PublishDocument, Publisher, RenderedContent,
};
use blogsmith_core::credential::{SignedCredential, SigningIdentity};
use blogsmith_core::ghost::GhostClient;
use chrono::Utc;
use mockito::Matcher;
use serde_json::json;

const ADMIN_KEY: &str =
    "6489f1a2b3c4d5e6f7a8b9c0:a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90";

fn credential() -> SignedCredential {
    SigningIdentity::parse(ADMIN_KEY)
        .unwrap()
        .sign(Utc::now())
        .unwrap()
}

fn document(content: RenderedContent) -> PublishDocument {
    PublishDocument {
        title: "Kubernetes Security 101".to_string(),
        rendered_content: content,
        status: PostStatus::Draft,
        meta_description: Some("Lock down your cluster.".to_string()),
        tags: vec!["k8s".to_string(), "security".to_string()],
    }
}

fn client_for(server: &mockito::ServerGuard) -> GhostClient {
    GhostClient::new(&GhostConfig::new(format!("{}/", server.url()))).unwrap()
}

#[tokio::test]
async fn test_create_post_sends_envelope_and_reads_first_post() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ghost/api/admin/posts/")
        .match_header("authorization", Matcher::Regex(r"^Ghost [\w-]+\.[\w-]+\.[\w-]+$".into()))
        .match_body(Matcher::PartialJson(json!({
            "posts": [{
                "title": "Kubernetes Security 101",
                "mobiledoc": "{\"version\":\"0.3.1\"}",
                "status": "draft",
                "meta_description": "Lock down your cluster.",
                "custom_excerpt": "Lock down your cluster.",
                "tags": [{"name": "k8s"}, {"name": "security"}]
            }]
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "posts": [{
                    "id": "65f0c1",
                    "url": "https://blog.example.com/kubernetes-security-101/",
                    "title": "Kubernetes Security 101",
                    "status": "draft"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let outcome = client
        .create_post(
            &document(RenderedContent::Mobiledoc("{\"version\":\"0.3.1\"}".into())),
            &credential(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.post_id, "65f0c1");
    assert_eq!(outcome.post_url, "https://blog.example.com/kubernetes-security-101/");
    assert_eq!(outcome.status, PostStatus::Draft);
}

#[tokio::test]
async fn test_create_post_html_uses_source_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ghost/api/admin/posts/")
        .match_query(Matcher::UrlEncoded("source".into(), "html".into()))
        .match_body(Matcher::PartialJson(json!({
            "posts": [{ "html": "<p>Hello</p>" }]
        })))
        .with_status(201)
        .with_body(
            json!({
                "posts": [{
                    "id": "abc",
                    "url": "https://blog.example.com/hello/",
                    "status": "published"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let outcome = client
        .create_post(&document(RenderedContent::Html("<p>Hello</p>".into())), &credential())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.status, PostStatus::Published);
    assert_eq!(outcome.title, "Kubernetes Security 101");
}

#[tokio::test]
async fn test_create_post_validation_error_is_upstream() {
    let mut server = mockito::Server::new_async().await;
    let body = r#"{"errors":[{"message":"Validation error, cannot save post."}]}"#;
    server
        .mock("POST", "/ghost/api/admin/posts/")
        .with_status(422)
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .create_post(&document(RenderedContent::Mobiledoc("{}".into())), &credential())
        .await
        .unwrap_err();

    match err {
        blogsmith_core::PipelineError::Upstream { status, body: got } => {
            assert_eq!(status, Some(422));
            assert_eq!(got, body);
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_post_without_posts_is_response_shape() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/ghost/api/admin/posts/")
        .with_status(201)
        .with_body(r#"{"posts": []}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .create_post(
            &document(RenderedContent::Mobiledoc("{}".into())),
            &credential(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "response_shape");
}

#[tokio::test]
async fn test_unknown_remote_status_keeps_requested_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/ghost/api/admin/posts/")
        .with_status(201)
        .with_body(
            json!({
                "posts": [{ "id": "x", "url": "https://blog.example.com/x/", "status": "scheduled" }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let outcome = client
        .create_post(
            &document(RenderedContent::Mobiledoc("{}".into())),
            &credential(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, PostStatus::Draft);
}

#[tokio::test]
async fn test_list_posts_sends_query_and_derives_missing_urls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/ghost/api/admin/posts/")
        .match_header("authorization", Matcher::Regex("^Ghost ".into()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "15".into()),
            Matcher::UrlEncoded(
                "fields".into(),
                "id,title,slug,custom_excerpt,published_at,url".into(),
            ),
            Matcher::UrlEncoded("include".into(), "tags".into()),
            Matcher::UrlEncoded("order".into(), "published_at desc".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "posts": [
                    {
                        "id": "p1",
                        "title": "Newest",
                        "slug": "newest",
                        "custom_excerpt": "Short.",
                        "published_at": "2026-10-01T09:00:00.000Z",
                        "url": "https://blog.example.com/newest/",
                        "tags": [{"name": "rust"}]
                    },
                    {
                        "id": "p2",
                        "title": "Draft without url",
                        "slug": "draft-without-url",
                        "published_at": null
                    }
                ],
                "meta": {"pagination": {"page": 1}}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let posts = client
        .list_posts(
            ListQuery {
                limit: 15,
                newest_first: true,
            },
            &credential(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].tags, vec!["rust".to_string()]);
    assert_eq!(posts[0].excerpt.as_deref(), Some("Short."));
    assert_eq!(
        posts[1].url,
        format!("{}/draft-without-url/", server.url())
    );
    assert!(posts[1].tags.is_empty());
}

#[tokio::test]
async fn test_list_posts_unauthorized_is_upstream() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/ghost/api/admin/posts/")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"errors":[{"type":"UnauthorizedError"}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .list_posts(
            ListQuery {
                limit: 5,
                newest_first: false,
            },
            &credential(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "upstream");
    assert!(err.to_string().contains("HTTP 401"));
}

#[test]
fn test_client_rejects_url_without_scheme() {
    let err = GhostClient::new(&GhostConfig::new("blog.example.com")).err().unwrap();
    assert_eq!(err.kind(), "configuration");
}

#[tokio::test]
async fn test_expired_credential_is_refused_before_sending() {
    let server = mockito::Server::new_async().await;
    let stale = SigningIdentity::parse(ADMIN_KEY)
        .unwrap()
        .sign(Utc::now() - chrono::TimeDelta::seconds(600))
        .unwrap();

    let client = client_for(&server);
    let err = client
        .create_post(&document(RenderedContent::Html("<p/>".into())), &stale)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "configuration");
}
