use crate::api::ProjectApi;
use crate::table::Table;
use anyhow::Result;

const DEFAULT_HEADERS: [&str; 3] = ["LOCALE", "#WORDS", "#SEGMENTS"];

/// Per-language progress: fixed columns, then one column per milestone in
/// ascending milestone order.
pub async fn status_command(api: &ProjectApi) -> Result<Table> {
    let report = api.get_report_progress().await?;

    let mut table: Option<Table> = None;
    for language in &report.languages {
        let milestones = language.sorted_milestones();

        let table = table.get_or_insert_with(|| {
            let names = milestones.iter().map(|m| m.name.to_uppercase());
            Table::new(DEFAULT_HEADERS.iter().map(|h| h.to_string()).chain(names))
        });

        let mut row = vec![
            language.code.clone(),
            language.total_words.to_string(),
            language.segments.to_string(),
        ];
        row.extend(milestones.iter().map(|m| format!("{}%", m.percent)));
        table.push_row(row);
    }

    Ok(table.unwrap_or_else(|| Table::new(DEFAULT_HEADERS)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
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

    fn milestones(completed: f64, proofreading: f64, editing: u32) -> serde_json::Value {
        json!([
            {"id": -100, "name": "Completed", "order": 1000, "count": 2, "words_count": 8, "percent": completed},
            {"id": 7865, "name": "Proofreading", "order": 1, "count": 10, "words_count": 72, "percent": proofreading},
            {"id": 7864, "name": "Editing", "order": 0, "count": 0, "words_count": 0, "percent": editing}
        ])
    }

    #[tokio::test]
    async fn test_status_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/7/reports/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "languages": [
                    {"id": 190, "code": "ru-ru", "segments": 12, "words": 80, "total": 12, "total_words": 80,
                     "milestones": milestones(16.67, 83.33, 0)},
                    {"id": 150, "code": "ja-jp", "segments": 12, "words": 80, "total": 12, "total_words": 80,
                     "milestones": milestones(0.0, 0.0, 100)}
                ]
            })))
            .mount(&server)
            .await;

        let table = status_command(&api(&server)).await.unwrap();
        let rendered = table.to_string();

        assert!(rendered.contains("| LOCALE | #WORDS | #SEGMENTS | EDITING | PROOFREADING | COMPLETED |"));
        assert_eq!(table.rows()[0], vec!["ru-ru", "80", "12", "0%", "83.33%", "16.67%"]);
        assert_eq!(table.rows()[1][3], "100%");
    }

    #[tokio::test]
    async fn test_status_without_languages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/7/reports/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"languages": []})))
            .mount(&server)
            .await;

        let table = status_command(&api(&server)).await.unwrap();
        assert!(table.is_empty());
    }
}
