//! Transifex REST API 3.0 client
//!
//! Implements [`RemoteClient`] with blocking `reqwest` calls against the
//! JSON:API endpoints. Uploads and downloads are asynchronous jobs on the
//! service side: a job is created with a POST and then polled until it
//! succeeds or fails. A finished download job answers with a `303 See Other`
//! pointing at the file, so polling uses a client that does not follow
//! redirects.
//!
//! Object ids are namespaced strings: `o:{org}:p:{project}` for the project,
//! `o:{org}:p:{project}:r:{slug}` for a resource and `l:{code}` for a
//! language.

use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{debug, trace};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{
    RemoteClient, RemoteStats, ResourceDescriptor, ResourceStats, ResourceStatsMap,
    TranslationStatsMap, UploadSummary,
};
use crate::catalog::po;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::timestamp::parse_timestamp;

const JSON_API: &str = "application/vnd.api+json";

#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ResourceObject {
    attributes: ResourceAttributes,
}

#[derive(Debug, Deserialize)]
struct ResourceAttributes {
    slug: String,
    name: String,
    #[serde(default)]
    datetime_created: Option<String>,
    #[serde(default)]
    datetime_modified: Option<String>,
    #[serde(default)]
    string_count: usize,
}

#[derive(Debug, Deserialize)]
struct LanguageStatsObject {
    attributes: LanguageStatsAttributes,
    relationships: LanguageStatsRelationships,
}

#[derive(Debug, Deserialize)]
struct LanguageStatsAttributes {
    #[serde(default)]
    translated_strings: usize,
    #[serde(default)]
    untranslated_strings: usize,
    #[serde(default)]
    last_translation_update: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LanguageStatsRelationships {
    resource: Relationship,
    language: Relationship,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: RelationshipData,
}

#[derive(Debug, Deserialize)]
struct RelationshipData {
    id: String,
}

impl RelationshipData {
    /// Last `:` separated segment of a namespaced id.
    fn tail(&self) -> &str {
        self.id.rsplit(':').next().unwrap_or(&self.id)
    }
}

#[derive(Debug, Deserialize)]
struct JobObject {
    id: String,
    attributes: JobAttributes,
}

#[derive(Debug, Deserialize)]
struct JobAttributes {
    status: String,
    #[serde(default)]
    details: JobDetails,
    #[serde(default)]
    errors: Vec<JobError>,
}

#[derive(Debug, Default, Deserialize)]
struct JobDetails {
    #[serde(default, alias = "strings_created", alias = "translations_created")]
    created: usize,
    #[serde(default, alias = "strings_updated", alias = "translations_updated")]
    updated: usize,
    #[serde(default, alias = "strings_skipped", alias = "translations_skipped")]
    skipped: usize,
    #[serde(default, alias = "strings_deleted", alias = "translations_deleted")]
    deleted: usize,
}

#[derive(Debug, Deserialize)]
struct JobError {
    #[serde(default)]
    detail: String,
}

/// Which kind of asynchronous job is polled.
#[derive(Debug, Clone, Copy)]
enum Job {
    SourceUpload,
    TranslationUpload,
    SourceDownload,
    TranslationDownload,
}

impl Job {
    fn endpoint(&self) -> &'static str {
        match self {
            Job::SourceUpload => "resource_strings_async_uploads",
            Job::TranslationUpload => "resource_translations_async_uploads",
            Job::SourceDownload => "resource_strings_async_downloads",
            Job::TranslationDownload => "resource_translations_async_downloads",
        }
    }
}

/// What a finished poll produced.
enum PollOutcome {
    Pending,
    Uploaded(UploadSummary),
    Download(Url),
}

/// Client for the Transifex REST API 3.0.
#[derive(Debug, Clone)]
pub struct TransifexClient {
    client: Client,
    polling: Client,
    api_url: Url,
    organization: String,
    project: String,
    source_language: String,
    excluded: Vec<String>,
    timeout: Duration,
    poll_interval: Duration,
    max_polls: u32,
}

fn transport(operation: &str, url: &str, message: impl ToString) -> Error {
    Error::Transport {
        operation: operation.to_string(),
        url: url.to_string(),
        message: message.to_string(),
    }
}

impl TransifexClient {
    /// Build a client from configuration and an API token.
    pub fn new(config: &Config, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::Config {
                message: "missing API token".to_string(),
                hint: Some("Pass --api-token or set TRANSIFEX_API_TOKEN".to_string()),
            });
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| Error::config("API token contains invalid characters"))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static(JSON_API));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_API));

        let timeout = Duration::from_secs(config.remote.timeout_secs);
        let build = |policy: Policy| {
            Client::builder()
                .default_headers(headers.clone())
                .redirect(policy)
                .timeout(timeout)
                .build()
                .map_err(|e| transport("build client", &config.remote.api_url, e))
        };

        let mut api_url = Url::parse(&config.remote.api_url)?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Ok(Self {
            client: build(Policy::default())?,
            polling: build(Policy::none())?,
            api_url,
            organization: config.remote.organization.clone(),
            project: config.remote.project.clone(),
            source_language: config.source_language.clone(),
            excluded: config.excluded_resources.clone(),
            timeout,
            poll_interval: Duration::from_millis(config.remote.poll_interval_ms),
            max_polls: config.remote.max_polls,
        })
    }

    fn project_id(&self) -> String {
        format!("o:{}:p:{}", self.organization, self.project)
    }

    fn resource_id(&self, slug: &str) -> String {
        format!("{}:r:{}", self.project_id(), slug)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.api_url.join(path)?)
    }

    fn send(&self, operation: &str, url: &Url, request: RequestBuilder) -> Result<Response> {
        trace!("{} {}", operation, url);
        let response = request
            .send()
            .map_err(|e| transport(operation, url.as_str(), e))?;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(transport(operation, url.as_str(), format!("{} {}", status, body.trim())))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self.send("GET", url, self.client.get(url.clone()))?;
        response.json().map_err(|e| transport("GET", url.as_str(), e))
    }

    fn post_json<T: DeserializeOwned>(&self, url: &Url, body: &Value) -> Result<T> {
        let payload = serde_json::to_vec(body)?;
        let response = self.send("POST", url, self.client.post(url.clone()).body(payload))?;
        response.json().map_err(|e| transport("POST", url.as_str(), e))
    }

    /// Follow `links.next` until exhausted.
    fn get_all<T: DeserializeOwned>(&self, mut url: Url) -> Result<Vec<T>> {
        let mut items = Vec::new();
        loop {
            let page: Page<T> = self.get_json(&url)?;
            items.extend(page.data);
            match page.links.next {
                Some(next) => url = Url::parse(&next)?,
                None => return Ok(items),
            }
        }
    }

    fn project_filtered(&self, path: &str) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("filter[project]", &self.project_id());
        Ok(url)
    }

    fn resources(&self) -> Result<Vec<ResourceObject>> {
        self.get_all(self.project_filtered("resources")?)
    }

    fn start_job(&self, job: Job, body: Value) -> Result<String> {
        let url = self.endpoint(job.endpoint())?;
        let document: Document<JobObject> = self.post_json(&url, &body)?;
        debug!("Started {} job {}", job.endpoint(), document.data.id);
        Ok(document.data.id)
    }

    fn poll_once(&self, job: Job, id: &str) -> Result<PollOutcome> {
        let url = self.endpoint(&format!("{}/{}", job.endpoint(), id))?;
        let response = self.send("GET", &url, self.polling.get(url.clone()))?;

        if response.status() == StatusCode::SEE_OTHER {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| transport("GET", url.as_str(), "redirect without location"))?;
            return Ok(PollOutcome::Download(Url::parse(location)?));
        }

        let document: Document<JobObject> = response
            .json()
            .map_err(|e| transport("GET", url.as_str(), e))?;
        let attributes = document.data.attributes;
        match attributes.status.as_str() {
            "succeeded" => {
                let details = attributes.details;
                Ok(PollOutcome::Uploaded(UploadSummary {
                    created: details.created,
                    updated: details.updated,
                    skipped: details.skipped,
                    deleted: details.deleted,
                }))
            }
            "failed" => {
                let message = attributes
                    .errors
                    .iter()
                    .map(|e| e.detail.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(Error::RemoteJob {
                    job: format!("{} {}", job.endpoint(), id),
                    message: if message.is_empty() {
                        "job failed".to_string()
                    } else {
                        message
                    },
                })
            }
            _ => Ok(PollOutcome::Pending),
        }
    }

    fn wait(&self, job: Job, id: &str) -> Result<PollOutcome> {
        for _ in 0..self.max_polls {
            match self.poll_once(job, id)? {
                PollOutcome::Pending => thread::sleep(self.poll_interval),
                done => return Ok(done),
            }
        }
        Err(Error::RemoteJob {
            job: format!("{} {}", job.endpoint(), id),
            message: format!("not finished after {} polls", self.max_polls),
        })
    }

    fn upload(&self, job: Job, body: Value) -> Result<UploadSummary> {
        let id = self.start_job(job, body)?;
        match self.wait(job, &id)? {
            PollOutcome::Uploaded(summary) => Ok(summary),
            _ => Err(Error::RemoteJob {
                job: format!("{} {}", job.endpoint(), id),
                message: "upload job answered with a redirect".to_string(),
            }),
        }
    }

    fn download(&self, job: Job, body: Value) -> Result<Vec<u8>> {
        let id = self.start_job(job, body)?;
        match self.wait(job, &id)? {
            PollOutcome::Download(url) => {
                // The file URL is pre-signed; it must not carry our token.
                let response = Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .map_err(|e| transport("GET", url.as_str(), e))?
                    .get(url.clone())
                    .send()
                    .and_then(Response::error_for_status)
                    .map_err(|e| transport("GET", url.as_str(), e))?;
                let bytes = response
                    .bytes()
                    .map_err(|e| transport("GET", url.as_str(), e))?;
                Ok(bytes.to_vec())
            }
            _ => Err(Error::RemoteJob {
                job: format!("{} {}", job.endpoint(), id),
                message: "download finished without a file".to_string(),
            }),
        }
    }

    fn upload_body(
        &self,
        kind: &str,
        slug: &str,
        content: &[u8],
        language: Option<&str>,
    ) -> Result<Value> {
        let content = po::decode(content, Path::new(slug))?;
        let mut relationships = json!({
            "resource": { "data": { "type": "resources", "id": self.resource_id(slug) } }
        });
        if let Some(language) = language {
            relationships["language"] = json!({ "data": { "type": "languages", "id": format!("l:{}", language) } });
        }
        Ok(json!({
            "data": {
                "type": kind,
                "attributes": {
                    "content": content,
                    "content_encoding": "text",
                },
                "relationships": relationships,
            }
        }))
    }
}

impl RemoteClient for TransifexClient {
    fn list_resources(&self) -> Result<Vec<ResourceDescriptor>> {
        Ok(self
            .resources()?
            .into_iter()
            .map(|resource| ResourceDescriptor {
                slug: resource.attributes.slug,
                display_name: resource.attributes.name,
                source_language: self.source_language.clone(),
            })
            .collect())
    }

    fn get_resource_stats(&self) -> Result<ResourceStatsMap> {
        let mut stats = ResourceStatsMap::new();
        for resource in self.resources()? {
            let attributes = resource.attributes;
            if self.excluded.contains(&attributes.slug) {
                continue;
            }
            stats.insert(
                attributes.slug.clone(),
                ResourceStats {
                    created_at: attributes.datetime_created.as_deref().and_then(parse_timestamp),
                    revised_at: attributes.datetime_modified.as_deref().and_then(parse_timestamp),
                    string_count: attributes.string_count,
                    slug: attributes.slug,
                    name: attributes.name,
                },
            );
        }
        Ok(stats)
    }

    fn get_translation_stats(&self) -> Result<TranslationStatsMap> {
        let resources = self.get_resource_stats()?;
        let objects: Vec<LanguageStatsObject> =
            self.get_all(self.project_filtered("resource_language_stats")?)?;

        let mut stats = TranslationStatsMap::new();
        for object in objects {
            let slug = object.relationships.resource.data.tail().to_string();
            if self.excluded.contains(&slug) {
                continue;
            }
            let language = object.relationships.language.data.tail().to_string();
            let created_at = resources.get(&slug).and_then(|resource| resource.created_at);
            let attributes = object.attributes;
            stats.entry(slug.clone()).or_default().insert(
                language.clone(),
                RemoteStats {
                    resource_slug: slug,
                    language,
                    created_at,
                    revised_at: attributes
                        .last_translation_update
                        .as_deref()
                        .and_then(parse_timestamp),
                    translated_count: attributes.translated_strings,
                    untranslated_count: attributes.untranslated_strings,
                },
            );
        }
        Ok(stats)
    }

    fn create_resource(&self, slug: &str, name: &str, source: &[u8]) -> Result<UploadSummary> {
        let url = self.endpoint("resources")?;
        let body = json!({
            "data": {
                "type": "resources",
                "attributes": { "name": name, "slug": slug },
                "relationships": {
                    "i18n_format": { "data": { "type": "i18n_formats", "id": "PO" } },
                    "project": { "data": { "type": "projects", "id": self.project_id() } },
                },
            }
        });
        let _: Value = self.post_json(&url, &body)?;
        self.upload_source(slug, source)
    }

    fn upload_source(&self, slug: &str, source: &[u8]) -> Result<UploadSummary> {
        let body = self.upload_body("resource_strings_async_uploads", slug, source, None)?;
        self.upload(Job::SourceUpload, body)
    }

    fn upload_translation(&self, slug: &str, language: &str, content: &[u8]) -> Result<UploadSummary> {
        let mut body = self.upload_body(
            "resource_translations_async_uploads",
            slug,
            content,
            Some(language),
        )?;
        body["data"]["attributes"]["file_type"] = json!("default");
        self.upload(Job::TranslationUpload, body)
    }

    fn download_source(&self, slug: &str) -> Result<Vec<u8>> {
        let body = json!({
            "data": {
                "type": "resource_strings_async_downloads",
                "attributes": { "content_encoding": "text", "file_type": "default" },
                "relationships": {
                    "resource": { "data": { "type": "resources", "id": self.resource_id(slug) } },
                },
            }
        });
        self.download(Job::SourceDownload, body)
    }

    fn download_translation(&self, slug: &str, language: &str) -> Result<Vec<u8>> {
        let body = json!({
            "data": {
                "type": "resource_translations_async_downloads",
                "attributes": { "content_encoding": "text", "file_type": "default", "mode": "translator" },
                "relationships": {
                    "resource": { "data": { "type": "resources", "id": self.resource_id(slug) } },
                    "language": { "data": { "type": "languages", "id": format!("l:{}", language) } },
                },
            }
        });
        self.download(Job::TranslationDownload, body)
    }
}
