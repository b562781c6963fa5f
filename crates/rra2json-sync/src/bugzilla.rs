//! Bugzilla REST client and the follow-up ("nag") bugs for incomplete RRAs.

use rra2json_core::{BugzillaConfig, RraRecord, missing_fields};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::SyncError;
use crate::http::check_status;

/// Search filter for `GET /rest/bug`. Unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BugQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// `"---"` restricts the search to open bugs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bug {
    pub id: u64,
    pub summary: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub assigned_to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBug {
    pub product: String,
    pub component: String,
    pub summary: String,
    pub description: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BugUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub body: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    bugs: Vec<Bug>,
}

#[derive(Deserialize)]
struct CreateResponse {
    id: u64,
}

pub struct BugzillaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl BugzillaClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}/rest/{}", self.base_url, path));
        match &self.api_key {
            Some(key) => req.header("X-BUGZILLA-API-KEY", key),
            None => req,
        }
    }

    pub async fn search_bugs(&self, query: &BugQuery) -> Result<Vec<Bug>, SyncError> {
        let resp = self
            .request(reqwest::Method::GET, "bug")
            .query(query)
            .send()
            .await?;
        let found: SearchResponse = check_status(resp).await?.json().await?;
        debug!(count = found.bugs.len(), "bug search");
        Ok(found.bugs)
    }

    /// File a bug, returning its id.
    pub async fn create_bug(&self, bug: &NewBug) -> Result<u64, SyncError> {
        let resp = self
            .request(reqwest::Method::POST, "bug")
            .json(bug)
            .send()
            .await?;
        let created: CreateResponse = check_status(resp).await?.json().await?;
        info!(id = created.id, summary = %bug.summary, "filed bug");
        Ok(created.id)
    }

    pub async fn update_bug(&self, id: u64, update: &BugUpdate) -> Result<(), SyncError> {
        let resp = self
            .request(reqwest::Method::PUT, &format!("bug/{id}"))
            .json(update)
            .send()
            .await?;
        check_status(resp).await?;
        info!(id, "updated bug");
        Ok(())
    }
}

/// Round-robin over the configured assignees.
#[derive(Debug, Clone)]
pub struct Rotation {
    assignees: Vec<String>,
    next: usize,
}

impl Rotation {
    pub fn new(assignees: Vec<String>) -> Self {
        Self { assignees, next: 0 }
    }

    /// Next assignee, or `None` when nobody is configured.
    pub fn next_assignee(&mut self) -> Option<&str> {
        if self.assignees.is_empty() {
            return None;
        }
        let i = self.next % self.assignees.len();
        self.next = i + 1;
        Some(&self.assignees[i])
    }
}

/// What [`nag`] did for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NagOutcome {
    /// Nothing missing.
    Complete,
    /// An open bug with the same summary was commented on and reassigned.
    Updated(u64),
    Filed(u64),
}

/// Bugzilla call [`nag`] will make for one record.
#[derive(Debug, Clone)]
pub enum NagAction {
    Nothing,
    Update(u64, BugUpdate),
    File(NewBug),
}

pub fn nag_summary(record: &RraRecord) -> String {
    format!("RRA for {} is missing information", record.service())
}

fn missing_list(missing: &[String]) -> String {
    missing.iter().map(|f| format!("- {f}\n")).collect()
}

/// Id of the open bug already tracking `summary`.
///
/// Bugzilla's summary search matches substrings, so "RRA for Login2 ..."
/// comes back for "RRA for Login"; only an exact summary counts.
pub fn open_nag(bugs: &[Bug], summary: &str) -> Option<u64> {
    bugs.iter().find(|b| b.summary == summary).map(|b| b.id)
}

/// The follow-up bug for `record`, or `None` if nothing is missing.
pub fn nag_bug(
    record: &RraRecord,
    config: &BugzillaConfig,
    assignee: Option<&str>,
) -> Option<NewBug> {
    let missing = missing_fields(record);
    if missing.is_empty() {
        return None;
    }
    let description = format!(
        "The RRA for {} (document {}) is missing the following fields:\n{}",
        record.service(),
        record.source,
        missing_list(&missing)
    );
    Some(NewBug {
        product: config.product.clone(),
        component: config.component.clone(),
        summary: nag_summary(record),
        description,
        version: "unspecified".to_string(),
        assigned_to: assignee.map(str::to_string),
    })
}

/// Comment and reassignment for an open follow-up bug, or `None` if
/// nothing is missing any more.
pub fn nag_update(record: &RraRecord, assignee: Option<&str>) -> Option<BugUpdate> {
    let missing = missing_fields(record);
    if missing.is_empty() {
        return None;
    }
    Some(BugUpdate {
        comment: Some(Comment {
            body: format!(
                "Still missing as of {}:\n{}",
                record.timestamp,
                missing_list(&missing)
            ),
        }),
        assigned_to: assignee.map(str::to_string),
        status: None,
    })
}

/// Decide what to do for `record` given the open bugs matching its summary.
/// Takes the next assignee from `rotation` whenever a bug is touched.
pub fn plan_nag(
    record: &RraRecord,
    config: &BugzillaConfig,
    open: &[Bug],
    rotation: &mut Rotation,
) -> NagAction {
    if missing_fields(record).is_empty() {
        return NagAction::Nothing;
    }
    let existing = open_nag(open, &nag_summary(record));
    let assignee = rotation.next_assignee();
    let planned = match existing {
        Some(id) => nag_update(record, assignee).map(|update| NagAction::Update(id, update)),
        None => nag_bug(record, config, assignee).map(NagAction::File),
    };
    planned.unwrap_or(NagAction::Nothing)
}

/// File a follow-up bug for an incomplete record, or chase the one already open.
pub async fn nag(
    client: &BugzillaClient,
    config: &BugzillaConfig,
    rotation: &mut Rotation,
    record: &RraRecord,
) -> Result<NagOutcome, SyncError> {
    if missing_fields(record).is_empty() {
        return Ok(NagOutcome::Complete);
    }
    let query = BugQuery {
        product: Some(config.product.clone()),
        component: Some(config.component.clone()),
        summary: Some(nag_summary(record)),
        resolution: Some("---".to_string()),
    };
    let open = client.search_bugs(&query).await?;

    match plan_nag(record, config, &open, rotation) {
        NagAction::Nothing => Ok(NagOutcome::Complete),
        NagAction::Update(id, update) => {
            debug!(id, service = %record.service(), "nag bug already open");
            client.update_bug(id, &update).await?;
            Ok(NagOutcome::Updated(id))
        }
        NagAction::File(bug) => Ok(NagOutcome::Filed(client.create_bug(&bug).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::{reply, serve};
    use rra2json_core::{Area, Dimension};

    fn config() -> BugzillaConfig {
        BugzillaConfig {
            url: "https://bugzilla.example".into(),
            api_key: None,
            product: "Enterprise Information Security".into(),
            component: "Risk Assessment".into(),
            assignees: vec!["a@example.com".into(), "b@example.com".into()],
        }
    }

    fn incomplete() -> RraRecord {
        let mut rec = RraRecord::new("doc-7");
        rec.details.metadata.service = "Login".into();
        rec
    }

    #[test]
    fn rotation_cycles() {
        let mut rot = Rotation::new(vec!["a".into(), "b".into(), "c".into()]);
        let picked: Vec<String> = (0..5)
            .map(|_| rot.next_assignee().unwrap().to_string())
            .collect();
        assert_eq!(picked, ["a", "b", "c", "a", "b"]);
        assert_eq!(Rotation::new(Vec::new()).next_assignee(), None);
    }

    #[test]
    fn nag_bug_lists_missing_fields() {
        let bug = nag_bug(&incomplete(), &config(), Some("a@example.com")).unwrap();
        assert_eq!(bug.summary, "RRA for Login is missing information");
        assert_eq!(bug.product, "Enterprise Information Security");
        assert_eq!(bug.assigned_to.as_deref(), Some("a@example.com"));
        assert!(bug.description.contains("- metadata.scope\n"));
        assert!(bug.description.contains("document doc-7"));
    }

    #[test]
    fn new_bug_omits_unset_assignee() {
        let bug = nag_bug(&incomplete(), &config(), None).unwrap();
        let json = serde_json::to_value(&bug).unwrap();
        assert!(json.get("assigned_to").is_none());
        assert_eq!(json["version"], "unspecified");
    }

    #[test]
    fn search_response_parses() {
        let body = r#"{"bugs": [{"id": 1234, "summary": "RRA for Login is missing information",
            "status": "NEW", "assigned_to": "a@example.com", "whiteboard": ""}]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.bugs[0].id, 1234);
        assert_eq!(parsed.bugs[0].status, "NEW");
    }

    fn bug(id: u64, summary: &str) -> Bug {
        Bug {
            id,
            summary: summary.into(),
            status: "NEW".into(),
            assigned_to: "a@example.com".into(),
        }
    }

    #[test]
    fn open_nag_needs_exact_summary() {
        let summary = nag_summary(&incomplete());
        let open = [
            bug(11, "RRA for Login2 is missing information"),
            bug(12, "RRA for Login is missing information"),
        ];
        assert_eq!(open_nag(&open, &summary), Some(12));
        assert_eq!(open_nag(&open[..1], &summary), None);
        assert_eq!(open_nag(&[], &summary), None);
    }

    #[test]
    fn plan_updates_matching_open_bug() {
        let mut rot = Rotation::new(config().assignees);
        let open = [bug(12, "RRA for Login is missing information")];
        let NagAction::Update(id, update) = plan_nag(&incomplete(), &config(), &open, &mut rot)
        else {
            panic!("expected an update");
        };
        assert_eq!(id, 12);
        assert_eq!(update.assigned_to.as_deref(), Some("a@example.com"));
        let body = update.comment.map(|c| c.body).unwrap_or_default();
        assert!(body.contains("- metadata.scope\n"));

        let json = serde_json::to_value(nag_update(&incomplete(), None).unwrap()).unwrap();
        assert!(json["comment"]["body"].as_str().unwrap().contains("- data.default\n"));
        assert!(json.get("assigned_to").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn plan_files_when_only_a_similar_bug_is_open() {
        let mut rot = Rotation::new(config().assignees);
        let open = [bug(11, "RRA for Login2 is missing information")];
        let NagAction::File(new) = plan_nag(&incomplete(), &config(), &open, &mut rot) else {
            panic!("expected a new bug");
        };
        assert_eq!(new.assigned_to.as_deref(), Some("a@example.com"));

        // Nothing open: file again, and the rotation has moved on.
        let NagAction::File(new) = plan_nag(&incomplete(), &config(), &[], &mut rot) else {
            panic!("expected a new bug");
        };
        assert_eq!(new.summary, "RRA for Login is missing information");
        assert_eq!(new.assigned_to.as_deref(), Some("b@example.com"));
    }

    #[test]
    fn complete_record_plans_nothing() {
        let mut rec = incomplete();
        rec.details.metadata.scope = "Everything".into();
        rec.details.metadata.owner = "Identity".into();
        rec.details.data.default = "RESTRICTED".into();
        for dim in Dimension::ALL {
            for area in Area::ALL {
                rec.details.risk.get_mut(dim, area).impact = "LOW".into();
            }
        }
        let mut rot = Rotation::new(config().assignees);
        assert!(matches!(
            plan_nag(&rec, &config(), &[], &mut rot),
            NagAction::Nothing
        ));
        assert_eq!(rot.next_assignee(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn nag_comments_on_open_bug() {
        let (url, server) = serve(vec![
            reply(
                "200 OK",
                r#"{"bugs": [{"id": 11, "summary": "RRA for Login2 is missing information"},
                            {"id": 12, "summary": "RRA for Login is missing information"}]}"#,
            ),
            reply("200 OK", r#"{"bugs": [{"id": 12, "changes": {}}]}"#),
        ])
        .await;
        let client = BugzillaClient::new(&url, Some("key".into()));
        let mut rot = Rotation::new(config().assignees);

        let outcome = nag(&client, &config(), &mut rot, &incomplete()).await.unwrap();
        assert_eq!(outcome, NagOutcome::Updated(12));

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /rest/bug?"));
        assert!(requests[0].contains("resolution=---"));
        assert!(requests[1].starts_with("PUT /rest/bug/12 "));
        assert!(requests[1].to_lowercase().contains("x-bugzilla-api-key: key"));
        assert!(requests[1].contains("\"assigned_to\":\"a@example.com\""));
    }

    #[tokio::test]
    async fn nag_files_when_nothing_matches() {
        let (url, server) = serve(vec![
            reply(
                "200 OK",
                r#"{"bugs": [{"id": 11, "summary": "RRA for Login2 is missing information"}]}"#,
            ),
            reply("200 OK", r#"{"id": 77}"#),
        ])
        .await;
        let client = BugzillaClient::new(&url, None);
        let mut rot = Rotation::new(config().assignees);

        let outcome = nag(&client, &config(), &mut rot, &incomplete()).await.unwrap();
        assert_eq!(outcome, NagOutcome::Filed(77));
        let requests = server.await.unwrap();
        assert!(requests[1].starts_with("POST /rest/bug "));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = BugzillaClient::new("https://bugzilla.example/", Some("key".into()));
        assert_eq!(client.base_url, "https://bugzilla.example");
    }
}
