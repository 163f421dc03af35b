use crate::api::{FileStatus, PageRecord, ProjectApi, SearchFilter};
use crate::table::Table;
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;

const HEADERS: [&str; 5] = ["ID", "NAME", "#SEGMENTS", "UPDATED_ON", "STATUS"];

/// One listed resource.
#[derive(Debug, Clone, PartialEq)]
pub struct LsRow {
    pub id: u64,
    pub name: String,
    pub segments: u64,
    pub updated_on: Option<DateTime<Utc>>,
    pub status: FileStatus,
}

impl From<PageRecord> for LsRow {
    fn from(page: PageRecord) -> Self {
        LsRow {
            id: page.page_id,
            name: page.display_name(),
            segments: page.segment_count,
            updated_on: page.updated_on(),
            status: page.status(),
        }
    }
}

/// Every resource of the project that is not deleted, as seen from the
/// first target language.
pub async fn ls_command(api: &ProjectApi) -> Result<Vec<LsRow>> {
    let project = api.get_project().await?;
    let language = project.first_target()?;

    let mut pages = api.page_search(language.id(), SearchFilter::default());
    let rows = pages
        .filter_by(|page| !page.deleted)
        .map_ok(LsRow::from)
        .try_collect()
        .await?;
    Ok(rows)
}

pub fn ls_table(rows: &[LsRow]) -> Table {
    let mut table = Table::new(HEADERS);
    for row in rows {
        let updated = row
            .updated_on
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        table.push_row([
            row.id.to_string(),
            row.name.clone(),
            row.segments.to_string(),
            updated,
            row.status.to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::Error;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn api(server: &MockServer) -> ProjectApi {
        let mut settings = Settings::new("unused.yml");
        settings.access_token = Some("token".to_string());
        settings.project_id = Some(7);
        ProjectApi::with_base_url(&settings, &server.uri()).unwrap()
    }

    async fn mount_project(server: &MockServer, targets: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/projects/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "project": {
                    "id": 7,
                    "source_language": {"id": 94, "name": "English - United States", "code": "en-us"},
                    "target_languages": targets
                }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_ls_lists_non_deleted_pages() {
        let server = MockServer::start().await;
        mount_project(&server, json!([{"id": 190, "name": "Russian - Russia", "code": "ru-ru"}])).await;
        Mock::given(method("POST"))
            .and(path("/projects/7/languages/190/page_settings/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pages": [
                    {"id": 1, "page_id": 723661, "url": "server.ru.yml", "enabled": true, "completed": true,
                     "segment_count": 0, "update": 1482169101000i64, "error_id": 1000, "deleted": false},
                    {"id": 2, "page_id": 723662, "url": "server.en.yml", "enabled": true, "completed": true,
                     "segment_count": 4, "update": 1482169101000i64, "deleted": true},
                    {"id": 3, "page_id": 723663, "url": "app.json", "enabled": true, "version_tag": "v2",
                     "segment_count": 9, "update": 1482169101000i64, "deleted": false}
                ],
                "meta": {"paging": {"total_results": 3}}
            })))
            .mount(&server)
            .await;

        let rows = ls_command(&api(&server)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, FileStatus::Error);
        assert_eq!(rows[1].name, "app.json [v2]");
        assert_eq!(rows[1].status, FileStatus::Enabled);

        let table = ls_table(&rows);
        assert_eq!(
            table.rows()[1],
            vec!["723663", "app.json [v2]", "9", "2016-12-19 17:38:21", "Enabled"]
        );
        assert!(table.to_string().contains("| ID     | NAME"));
    }

    #[tokio::test]
    async fn test_ls_requires_target_language() {
        let server = MockServer::start().await;
        mount_project(&server, json!([])).await;

        let err = ls_command(&api(&server)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoTargetLanguages)));
    }
}
