use crate::api::{ProjectApi, SearchFilter};
use crate::prompt::Prompter;
use anyhow::Result;
use tracing::info;

/// Delete a resource given its page id or its exact name.
///
/// Returns whether something was deleted. An unknown resource is logged,
/// not treated as an error.
pub async fn delete_command<P: Prompter>(
    api: &ProjectApi,
    target: &str,
    force: bool,
    mut prompter: P,
) -> Result<bool> {
    let project = api.get_project().await?;
    let language = project.first_target()?;

    let page_id = match target.trim().parse::<u64>() {
        Ok(id) if id != 0 => Some(id),
        _ => api
            .page_search(language.id(), SearchFilter::with_title(target))
            .find(|page| page.url == target)
            .await?
            .map(|page| page.page_id),
    };

    let Some(page_id) = page_id else {
        info!("Resource `{}` not found.", target);
        return Ok(false);
    };

    if !force {
        let question =
            format!("Are you sure you want to delete `{target}` and all translations for this resource? ");
        if !prompter.ask_bool(&question)? {
            return Ok(false);
        }
    }

    api.delete_page(page_id).await?;
    info!("Resource `{}` deleted.", target);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::prompt::ConsolePrompter;
    use serde_json::json;
    use std::io::Cursor;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn api(server: &MockServer) -> ProjectApi {
        let mut settings = Settings::new("unused.yml");
        settings.access_token = Some("token".to_string());
        settings.project_id = Some(7);
        settings.organization_id = Some(9);
        ProjectApi::with_base_url(&settings, &server.uri()).unwrap()
    }

    fn answers(input: &str) -> ConsolePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        ConsolePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    async fn mount_project(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/projects/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "project": {
                    "id": 7,
                    "source_language": {"id": 94, "name": "English - United States", "code": "en-us"},
                    "target_languages": [{"id": 190, "name": "Russian - Russia", "code": "ru-ru"}]
                }
            })))
            .mount(server)
            .await;
    }

    async fn mount_delete(server: &MockServer, page_id: u64, times: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/organizations/9/projects/7/pages/{page_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "success"})))
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_delete_by_id_with_force() {
        let server = MockServer::start().await;
        mount_project(&server).await;
        mount_delete(&server, 723662, 1).await;

        assert!(delete_command(&api(&server), "723662", true, answers("")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_exact_name_after_confirmation() {
        let server = MockServer::start().await;
        mount_project(&server).await;
        Mock::given(method("POST"))
            .and(path("/projects/7/languages/190/page_settings/search"))
            .and(body_json(json!({"title": "server.en.yml"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pages": [
                    {"id": 1, "page_id": 10, "url": "old.server.en.yml"},
                    {"id": 2, "page_id": 11, "url": "server.en.yml"}
                ],
                "meta": {"paging": {"total_results": 2}}
            })))
            .mount(&server)
            .await;
        mount_delete(&server, 11, 1).await;

        let mut prompter = answers("y\n");
        assert!(delete_command(&api(&server), "server.en.yml", false, &mut prompter).await.unwrap());

        let (_, output) = prompter.into_parts();
        assert!(String::from_utf8(output)
            .unwrap()
            .contains("Are you sure you want to delete `server.en.yml`"));
    }

    #[tokio::test]
    async fn test_delete_declined() {
        let server = MockServer::start().await;
        mount_project(&server).await;
        mount_delete(&server, 5, 0).await;

        assert!(!delete_command(&api(&server), "5", false, answers("no\n")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_resource() {
        let server = MockServer::start().await;
        mount_project(&server).await;
        Mock::given(method("POST"))
            .and(path("/projects/7/languages/190/page_settings/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pages": [],
                "meta": {"paging": {"total_results": 0}}
            })))
            .mount(&server)
            .await;

        assert!(!delete_command(&api(&server), "missing.json", true, answers("")).await.unwrap());
    }
}
