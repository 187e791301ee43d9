use libris_app::rest_api::conversion::AuthorDto;
use libris_e2e_tests::{extend_url, launch_env, test_config};
use tracing::info;
use tracing_test::traced_test;

fn create_author(first_name: &str, last_name: &str) -> serde_json::Value {
    serde_json::json!({
        "first_name": first_name,
        "last_name": last_name,
        "contact_info": format!("{}@example.com", last_name.to_lowercase()),
    })
}

#[tokio::test]
#[traced_test]
async fn test_author_crud() {
    let (args, _config_guard) = test_config("test_author_crud").unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();

    let api_url = base_url.join("api/author").unwrap();

    let response = client
        .post(api_url.clone())
        .json(&create_author("Frank", "Herbert"))
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 201);

    let new_author: AuthorDto = response.json().await.unwrap();
    assert_eq!(new_author.first_name, "Frank");
    let id = new_author.id;
    info!("ID: {}", id);

    let response = client.get(api_url.clone()).send().await.unwrap();
    assert!(response.status().is_success());
    let all: Vec<AuthorDto> = response.json().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].last_name, "Herbert");

    // Partial update leaves the other fields alone.
    let record_url = extend_url(&api_url, id);
    let response = client
        .put(record_url.clone())
        .json(&serde_json::json!({"contact_info": "frank@dune.example"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let updated: AuthorDto = response.json().await.unwrap();
    assert_eq!(updated.contact_info, "frank@dune.example");
    assert_eq!(updated.first_name, "Frank");
    assert_eq!(updated.last_name, "Herbert");

    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client.get(api_url.clone()).send().await.unwrap();
    let all: Vec<AuthorDto> = response.json().await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_author_validation_lists_every_failing_field() {
    let (args, _config_guard) = test_config("test_author_validation").unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();

    let api_url = base_url.join("api/author").unwrap();

    // First name too short and contact info missing entirely.
    let response = client
        .post(api_url.clone())
        .json(&serde_json::json!({"first_name": "F", "last_name": "Herbert", "contact_info": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains("first_name"), "body: {body}");
    assert!(body.contains("contact_info"), "body: {body}");
}

#[tokio::test]
#[traced_test]
async fn test_missing_author_operations_are_not_found() {
    let (args, _config_guard) = test_config("test_missing_author").unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();

    let api_url = base_url.join("api/author").unwrap();
    let record_url = extend_url(&api_url, "99999999-9999-9999-9999-999999999999");

    let response = client
        .put(record_url.clone())
        .json(&serde_json::json!({"first_name": "Nobody"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client.delete(record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
