use serde::Deserialize;

/// Snapshot of a Jira issue. Never cached; every check re-fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    pub key: String,
    pub status: String,
    pub issue_type: String,
    pub parent_key: Option<String>,
    pub subtasks: Vec<SubtaskRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskRecord {
    pub key: String,
    pub status: String,
}

/// A transition currently available on an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    /// Name of the status the transition leads to.
    pub target: String,
}

// Wire shapes for GET /issue/{key} and GET /issue/{key}/transitions.

#[derive(Debug, Deserialize)]
pub(crate) struct IssueResponse {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueFields {
    pub status: Named,
    #[serde(rename = "issuetype")]
    pub issue_type: Named,
    #[serde(default)]
    pub parent: Option<IssueLink>,
    #[serde(default)]
    pub subtasks: Vec<IssueLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Named {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueLink {
    pub key: String,
    #[serde(default)]
    pub fields: Option<LinkFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkFields {
    #[serde(default)]
    pub status: Option<Named>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<TransitionEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub to: Option<Named>,
}

impl From<IssueResponse> for TicketRecord {
    fn from(issue: IssueResponse) -> Self {
        let fields = issue.fields;
        TicketRecord {
            key: issue.key,
            status: fields.status.name,
            issue_type: fields.issue_type.name,
            parent_key: fields.parent.map(|parent| parent.key),
            subtasks: fields
                .subtasks
                .into_iter()
                .map(|sub| SubtaskRecord {
                    status: sub
                        .fields
                        .and_then(|f| f.status)
                        .map(|s| s.name)
                        .unwrap_or_default(),
                    key: sub.key,
                })
                .collect(),
        }
    }
}

impl From<TransitionEntry> for Transition {
    /// Older Jira payloads omit `to`; the transition name is the best fallback.
    fn from(entry: TransitionEntry) -> Self {
        Transition {
            id: entry.id,
            target: entry.to.map(|to| to.name).unwrap_or(entry.name),
        }
    }
}
