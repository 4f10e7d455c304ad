//! Curated sample postings served when no search provider is usable.
//! Output depends only on the query, so repeated searches look the same.

use crate::models::job::{JobPosting, JobQuery};

pub fn sample_postings(query: &JobQuery) -> Vec<JobPosting> {
    let location = query.place().unwrap_or("Remote").to_string();
    let title = query.title.trim().to_string();

    vec![
        JobPosting {
            id: "sample-lumina-analytics".to_string(),
            title: title.clone(),
            company: "Lumina Analytics".to_string(),
            location: location.clone(),
            description: "We are looking for a driven professional to own end-to-end data \
                workflows, partner with product teams, and present insights to executives. \
                You will build scalable reporting, collaborate with engineering, and turn \
                experiment results into decisions."
                .to_string(),
            snippet: Some(
                "Partner with cross-functional teams, build dashboards, drive insights."
                    .to_string(),
            ),
            url: "https://example.com/jobs/lumina".to_string(),
            application_link: Some("https://example.com/jobs/lumina/apply".to_string()),
            match_score: None,
            work_mode: Some(
                query
                    .work_mode
                    .map(|m| m.as_str())
                    .unwrap_or("hybrid")
                    .to_string(),
            ),
            experience_level: Some(
                query
                    .experience_level
                    .clone()
                    .unwrap_or_else(|| "mid".to_string()),
            ),
            skills: vec!["SQL".into(), "Python".into(), "Looker".into()],
            posting_date: None,
            company_logo_url: None,
        },
        JobPosting {
            id: "sample-nova-research".to_string(),
            title,
            company: "Nova Research".to_string(),
            location,
            description: "Join the experimentation platform team to build scalable ML-powered \
                products. You will lead experimentation design, collaborate with engineering, \
                and present findings."
                .to_string(),
            snippet: Some("Lead experimentation design and communicate results.".to_string()),
            url: "https://example.com/jobs/nova".to_string(),
            application_link: Some("https://example.com/jobs/nova/apply".to_string()),
            match_score: None,
            work_mode: Some("remote".to_string()),
            experience_level: Some("senior".to_string()),
            skills: vec!["Python".into(), "ML".into(), "Airflow".into()],
            posting_date: None,
            company_logo_url: None,
        },
    ]
}
