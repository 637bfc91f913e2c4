use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::error::{MergeError, Result};
use crate::types::{ContributionDay, UserContributions};

pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const USER_AGENT: &str = "github-contribution-merger";

const CONTRIBUTIONS_QUERY: &str = r#"
query($username: String!) {
  user(login: $username) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            date
            contributionCount
          }
        }
      }
    }
  }
}"#;

/// Anything that can produce one user's contribution calendar.
pub trait ContributionSource {
    fn fetch_user(&self, username: &str) -> Result<UserContributions>;
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<GraphqlData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlData {
    user: Option<GraphqlUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlUser {
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionCalendar {
    total_contributions: u32,
    weeks: Vec<ContributionWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionWeek {
    contribution_days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarDay {
    date: chrono::NaiveDate,
    contribution_count: u32,
}

/// Turn a GraphQL payload into a flat, date-ordered calendar.
fn parse_calendar(username: &str, payload: GraphqlResponse) -> Result<UserContributions> {
    if let Some(error) = payload.errors.into_iter().next() {
        return Err(MergeError::Upstream(format!(
            "GitHub GraphQL error: {}",
            error.message
        )));
    }

    let user = payload
        .data
        .and_then(|data| data.user)
        .ok_or_else(|| MergeError::UserNotFound(username.to_string()))?;

    let calendar = user.contributions_collection.contribution_calendar;
    let days = calendar
        .weeks
        .into_iter()
        .flat_map(|week| week.contribution_days)
        .map(|day| ContributionDay {
            date: day.date,
            count: day.contribution_count,
        })
        .collect();

    Ok(UserContributions {
        username: username.to_string(),
        total_contributions: calendar.total_contributions,
        days,
    })
}

/// Blocking GitHub GraphQL client.
pub struct GithubClient {
    agent: ureq::Agent,
    endpoint: String,
    token: String,
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_endpoint(token, GITHUB_GRAPHQL_URL)
    }

    pub fn with_endpoint(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }
}

impl ContributionSource for GithubClient {
    fn fetch_user(&self, username: &str) -> Result<UserContributions> {
        debug!(username, endpoint = %self.endpoint, "querying contribution calendar");

        let body = json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": { "username": username },
        });

        let mut response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", format!("bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .send_json(&body)?;
        let payload: GraphqlResponse = response.body_mut().read_json()?;

        parse_calendar(username, payload)
    }
}

/// Wraps a source with a per-user cache keyed `user:<name>`.
pub struct CachingSource<S> {
    inner: S,
    cache: TtlCache<UserContributions>,
}

impl<S> CachingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: TtlCache::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: ContributionSource> ContributionSource for CachingSource<S> {
    fn fetch_user(&self, username: &str) -> Result<UserContributions> {
        let key = format!("user:{}", username);
        if let Some(cached) = self.cache.get(&key) {
            debug!(username, "user calendar served from cache");
            return Ok(cached);
        }

        let fetched = self.inner.fetch_user(username)?;
        self.cache.set(key, fetched.clone());
        Ok(fetched)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub username: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct FetchResult {
    pub fulfilled: Vec<UserContributions>,
    pub errors: Vec<FetchFailure>,
}

/// Fetch every user concurrently and wait for all of them. One user's
/// failure is recorded and never cancels the others; results keep the
/// order of `usernames`.
pub fn fetch_multiple_users<S>(source: &S, usernames: &[String]) -> FetchResult
where
    S: ContributionSource + Sync + ?Sized,
{
    let outcomes: Vec<Result<UserContributions>> = std::thread::scope(|scope| {
        let handles: Vec<_> = usernames
            .iter()
            .map(|username| scope.spawn(move || source.fetch_user(username)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(MergeError::Upstream("fetch worker panicked".to_string())))
            })
            .collect()
    });

    let mut result = FetchResult::default();
    for (username, outcome) in usernames.iter().zip(outcomes) {
        match outcome {
            Ok(user) => result.fulfilled.push(user),
            Err(err) => {
                warn!(username = %username, error = %err, "failed to fetch contributions");
                result.errors.push(FetchFailure {
                    username: username.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    info!(
        requested = usernames.len(),
        fulfilled = result.fulfilled.len(),
        failed = result.errors.len(),
        "fetched contribution calendars"
    );
    result
}
