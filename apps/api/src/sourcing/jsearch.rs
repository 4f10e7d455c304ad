//! JSearch (RapidAPI) provider client and field normalization.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::country::country_code;
use super::{SearchProvider, SourcingError};
use crate::models::job::{non_blank, JobPosting, JobQuery};

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<RawJob>,
}

/// Only the fields we map. JSearch sends many more.
#[derive(Debug, Default, Deserialize)]
struct RawJob {
    job_id: Option<String>,
    job_title: Option<String>,
    employer_name: Option<String>,
    employer_logo: Option<String>,
    job_city: Option<String>,
    job_country: Option<String>,
    job_description: Option<String>,
    job_highlights: Option<Highlights>,
    job_google_link: Option<String>,
    job_apply_link: Option<String>,
    /// Usually a bool, occasionally a string.
    job_is_remote: Option<Value>,
    job_required_experience: Option<RequiredExperience>,
    job_required_skills: Option<Vec<String>>,
    job_posted_at_datetime_utc: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Highlights {
    #[serde(rename = "Qualifications", default)]
    qualifications: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RequiredExperience {
    required_experience_in_months: Option<i64>,
}

pub struct JSearchClient {
    client: Client,
    api_key: String,
    host: String,
    base_url: String,
}

impl JSearchClient {
    pub fn new(api_key: String, host: String, timeout: Duration) -> Result<Self, SourcingError> {
        let client = Client::builder()
            .user_agent("jobflow/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| SourcingError::ProviderUnavailable(e.to_string()))?;
        let base_url = format!("https://{host}");
        Ok(Self {
            client,
            api_key,
            host,
            base_url,
        })
    }

    fn headers(&self) -> Result<HeaderMap, SourcingError> {
        let invalid = |e: reqwest::header::InvalidHeaderValue| {
            SourcingError::ProviderUnavailable(format!("invalid header value: {e}"))
        };
        let mut headers = HeaderMap::new();
        headers.insert("x-rapidapi-key", HeaderValue::from_str(&self.api_key).map_err(invalid)?);
        headers.insert("x-rapidapi-host", HeaderValue::from_str(&self.host).map_err(invalid)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl SearchProvider for JSearchClient {
    fn name(&self) -> &str {
        "jsearch"
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, SourcingError> {
        let url = format!("{}/search", self.base_url);
        let params = search_params(query);
        debug!("JSearch request: {:?}", params);

        let unavailable = |e: reqwest::Error| SourcingError::ProviderUnavailable(e.to_string());
        let response: SearchResponse = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&params)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        Ok(response
            .data
            .into_iter()
            .map(|raw| normalize_job(raw, query))
            .collect())
    }
}

/// `query` reads "<title> in <place>" when a city or location is given.
fn search_params(query: &JobQuery) -> Vec<(&'static str, String)> {
    let mut search = query.title.trim().to_string();
    if let Some(place) = query.place() {
        search = format!("{search} in {place}");
    }

    let mut params = vec![
        ("query", search),
        ("page", "1".to_string()),
        ("num_pages", "1".to_string()),
    ];
    if let Some(code) = country_code(query.country.as_deref()) {
        params.push(("country", code));
    }
    if let Some(city) = non_blank(query.city.as_deref()) {
        params.push(("city", city.to_string()));
    }
    params
}

fn normalize_job(raw: RawJob, query: &JobQuery) -> JobPosting {
    let work_mode = match raw.job_is_remote {
        Some(Value::Bool(true)) => Some("remote".to_string()),
        Some(Value::Bool(false)) => Some("on-site".to_string()),
        Some(Value::Null) | None => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    };

    let location = non_blank(raw.job_city.as_deref())
        .or(non_blank(raw.job_country.as_deref()))
        .or(non_blank(query.location.as_deref()))
        .or(non_blank(query.city.as_deref()))
        .or(non_blank(query.country.as_deref()))
        .unwrap_or("Remote")
        .to_string();

    let snippet = raw
        .job_highlights
        .map(|h| h.qualifications.into_iter().next().unwrap_or_default());

    let url = non_blank(raw.job_google_link.as_deref())
        .or(non_blank(raw.job_apply_link.as_deref()))
        .unwrap_or_default()
        .to_string();

    JobPosting {
        id: raw
            .job_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        title: raw.job_title.unwrap_or_else(|| query.title.clone()),
        company: raw.employer_name.unwrap_or_else(|| "Unknown".to_string()),
        location,
        description: raw.job_description.unwrap_or_default(),
        snippet,
        url,
        application_link: raw.job_apply_link,
        match_score: None,
        work_mode,
        experience_level: raw
            .job_required_experience
            .and_then(|e| e.required_experience_in_months)
            .map(|months| months.to_string()),
        skills: raw.job_required_skills.unwrap_or_default(),
        posting_date: parse_posting_date(raw.job_posted_at_datetime_utc.as_deref()),
        company_logo_url: raw.employer_logo,
    }
}

/// ISO-8601 to naive UTC. Offsets (including `Z`) are converted; naive input is
/// taken as already UTC; anything unparseable is dropped.
fn parse_posting_date(value: Option<&str>) -> Option<NaiveDateTime> {
    let value = non_blank(value)?;

    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Some(aware.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
