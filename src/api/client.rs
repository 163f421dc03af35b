use crate::api::models::{
    AppendFile, ExportResponse, LanguagesEnvelope, PageDetails, PageEnvelope, PageRecord, PagesEnvelope,
    ProgressReport, Project, ProjectEnvelope, ProjectRecord, ProjectsEnvelope, SearchFilter,
    UpdateUploadResponse, UploadResponse, DEFAULT_MILESTONE_ID,
};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::i18n::LanguageRecord;
use crate::paginate::{Page, PageFetcher, Paginated};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

const AUTH_HEADER: &str = "X-AUTH-TOKEN";

/// Client for one project of the service.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ProjectApi {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
    project_id: u64,
    organization_id: Option<u64>,
}

impl ProjectApi {
    /// Build a client from validated settings, using the configured API url.
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_base_url(settings, &settings.api_url())
    }

    pub fn with_base_url(settings: &Settings, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Url(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            access_token: settings.access_token()?.to_string(),
            project_id: settings.project_id()?,
            organization_id: settings.organization_id,
        })
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    fn organization_id(&self) -> Result<u64> {
        self.organization_id
            .ok_or_else(|| Error::SettingsMissing("organization_id".to_string()))
    }

    /// Base url + path segments + query. Segments lose surrounding '/' and
    /// empty ones are dropped.
    fn build_url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Url(self.base_url.to_string()))?;
            path.pop_if_empty();
            for segment in segments.iter().map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
                path.push(segment);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    fn project_segment(&self) -> String {
        self.project_id.to_string()
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.header(AUTH_HEADER, &self.access_token).build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!("Request({}): method: {}", url, method);

        let response = self.http.execute(request).await?;
        debug!("Response({}): status_code: {}", url, response.status());

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(&method, &url, response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        debug!("Response body: {}", String::from_utf8_lossy(&body));
        Ok(serde_json::from_slice(&body)?)
    }

    /// Every language the service knows.
    pub async fn get_languages(&self) -> Result<Vec<LanguageRecord>> {
        let url = self.build_url(&["languages"], &[])?;
        let envelope: LanguagesEnvelope = self.send_json(self.http.get(url)).await?;
        Ok(envelope.languages)
    }

    pub async fn get_project(&self) -> Result<Project> {
        let url = self.build_url(&["projects", &self.project_segment()], &[])?;
        let envelope: ProjectEnvelope = self.send_json(self.http.get(url)).await?;
        Ok(envelope.project.into())
    }

    async fn list_projects(&self, offset: usize, limit: usize) -> Result<Page<ProjectRecord>> {
        let organization = self.organization_id()?.to_string();
        let url = self.build_url(
            &["organizations", &organization, "projects"],
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )?;
        let envelope: ProjectsEnvelope = self.send_json(self.http.get(url)).await?;
        Ok(Page {
            items: envelope.projects,
            total: envelope.meta.paging.total_results,
        })
    }

    /// Projects of the organization, fetched page by page.
    pub fn projects(&self) -> Paginated<ProjectListing> {
        Paginated::new(ProjectListing { api: self.clone() })
    }

    async fn search_pages(
        &self,
        language_id: u64,
        filter: &SearchFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Page<PageRecord>> {
        let url = self.build_url(
            &[
                "projects",
                &self.project_segment(),
                "languages",
                &language_id.to_string(),
                "page_settings",
                "search",
            ],
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )?;
        let envelope: PagesEnvelope = self.send_json(self.http.post(url).json(filter)).await?;
        Ok(Page {
            items: envelope.pages,
            total: envelope.meta.paging.total_results,
        })
    }

    /// Pages of the project in `language_id` matching `filter`, fetched lazily.
    pub fn page_search(&self, language_id: u64, filter: SearchFilter) -> Paginated<PageSearch> {
        Paginated::new(PageSearch {
            api: self.clone(),
            language_id,
            filter,
        })
    }

    pub async fn get_page_details(&self, language_id: u64, page_id: u64) -> Result<PageDetails> {
        let url = self.build_url(
            &[
                "projects",
                &self.project_segment(),
                "languages",
                &language_id.to_string(),
                "pages",
                &page_id.to_string(),
            ],
            &[],
        )?;
        let envelope: PageEnvelope = self.send_json(self.http.get(url)).await?;
        Ok(envelope.page)
    }

    pub async fn get_report_progress(&self) -> Result<ProgressReport> {
        let url = self.build_url(&["projects", &self.project_segment(), "reports", "progress"], &[])?;
        self.send_json(self.http.get(url)).await
    }

    /// Upload a new source file. The response's `upload_id` is then passed
    /// to [`ProjectApi::append_file`].
    pub async fn upload_anytype_file(
        &self,
        content: Vec<u8>,
        file_name: &str,
        content_type_code: &str,
        mimetype: &str,
    ) -> Result<UploadResponse> {
        let organization = self.organization_id()?.to_string();
        let url = self.build_url(
            &["organizations", &organization, "upload", "uploadFile_anyType"],
            &[
                ("projectId", self.project_segment()),
                ("content_type_code", content_type_code.to_string()),
            ],
        )?;
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(mimetype)?;
        let form = Form::new().part("file", part).text("file_names", "[]");

        self.send_json(self.http.post(url).multipart(form)).await
    }

    /// Upload new content for an existing page.
    pub async fn update_upload_file(
        &self,
        content: Vec<u8>,
        file_name: &str,
        page_id: u64,
        mimetype: &str,
    ) -> Result<UpdateUploadResponse> {
        let url = self.build_url(
            &["projects", &self.project_segment(), "files", &page_id.to_string(), "update", "upload"],
            &[],
        )?;
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(mimetype)?;

        self.send_json(self.http.post(url).multipart(Form::new().part("file", part)))
            .await
    }

    /// Replace a page's content with a previous [`ProjectApi::update_upload_file`].
    pub async fn apply_upload_file(&self, upload_id: &serde_json::Value, page_id: u64) -> Result<serde_json::Value> {
        let url = self.build_url(
            &["projects", &self.project_segment(), "files", &page_id.to_string(), "update", "apply"],
            &[],
        )?;
        let body = serde_json::json!({ "new_file_id": upload_id });
        self.send_json(self.http.put(url).json(&body)).await
    }

    /// Attach an uploaded file to the project.
    pub async fn append_file(&self, file: &AppendFile) -> Result<serde_json::Value> {
        let url = self.build_url(&["projects", &self.project_segment(), "append_files"], &[])?;
        self.send_json(self.http.post(url).json(&[file])).await
    }

    /// Request a translated export and open its download.
    ///
    /// `milestone` defaults to the latest completed one. The returned response
    /// has not been read; stream its body to disk.
    pub async fn download_file(&self, page_id: u64, language_id: u64, milestone: Option<i64>) -> Result<Response> {
        let milestone = milestone.unwrap_or(DEFAULT_MILESTONE_ID);
        let url = self.build_url(
            &[
                "projects",
                &self.project_segment(),
                "languages",
                &language_id.to_string(),
                "pages",
                &page_id.to_string(),
                "segments",
                "milestones",
                &milestone.to_string(),
                "export",
            ],
            &[],
        )?;
        let export: ExportResponse = self.send_json(self.http.get(url)).await?;

        let url = self.build_url(
            &["file", "download"],
            &[("token", export.token), ("filename", export.filename)],
        )?;
        self.send(self.http.get(url)).await
    }

    pub async fn delete_page(&self, page_id: u64) -> Result<serde_json::Value> {
        let organization = self.organization_id()?.to_string();
        let url = self.build_url(
            &[
                "organizations",
                &organization,
                "projects",
                &self.project_segment(),
                "pages",
                &page_id.to_string(),
            ],
            &[],
        )?;
        let response = self.send(self.http.delete(url)).await?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Map a non-2xx response to [`Error::Remote`] or [`Error::AlreadyExists`].
async fn error_from_response(method: &Method, url: &Url, response: Response) -> Error {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    debug!("Response({}): status_code: {}, error_text: {}", url, status, String::from_utf8_lossy(&body));

    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(payload) if payload.is_object() => {
            let err_message = payload
                .get("errMessage")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            let conflict = err_message.as_deref().is_some_and(|m| m.contains("already exist"));
            let message = err_message.unwrap_or_else(|| payload.to_string());

            if conflict {
                Error::AlreadyExists {
                    message,
                    payload: Some(payload),
                }
            } else {
                Error::Remote {
                    message,
                    payload: Some(payload),
                }
            }
        }
        _ => {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            let message = if text.is_empty() {
                format!("An error occurred while making a {method} request to {url}")
            } else {
                text
            };
            Error::Remote { message, payload: None }
        }
    }
}

/// Page search listing, see [`ProjectApi::page_search`].
#[derive(Debug, Clone)]
pub struct PageSearch {
    api: ProjectApi,
    language_id: u64,
    filter: SearchFilter,
}

impl PageFetcher for PageSearch {
    type Item = PageRecord;

    async fn fetch(&self, offset: usize, limit: usize) -> Result<Page<PageRecord>> {
        self.api.search_pages(self.language_id, &self.filter, offset, limit).await
    }
}

/// Organization project listing, see [`ProjectApi::projects`].
#[derive(Debug, Clone)]
pub struct ProjectListing {
    api: ProjectApi,
}

impl PageFetcher for ProjectListing {
    type Item = ProjectRecord;

    async fn fetch(&self, offset: usize, limit: usize) -> Result<Page<ProjectRecord>> {
        self.api.list_projects(offset, limit).await
    }
}
