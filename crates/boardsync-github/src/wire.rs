//! Response shapes of the GitHub GraphQL API and their conversion into
//! boardsync domain types.
//!
//! GitHub answers a fragment that does not apply (a draft item's content, a
//! field value of another type) with an empty object, so nearly every field
//! here is optional.

use boardsync_core::{
    Assignee, Comment, FieldDefinition, FieldNames, FieldValue, IssueContent, IssueRef, Item,
    ItemState, IterationOption, Page, ProjectCatalog, SingleSelectOption,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::GithubError;
use crate::Result;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<T> GraphQlResponse<T> {
    /// The `data` member, or the reason there is none.
    ///
    /// Any entry in `errors` fails the call, even when partial data came
    /// back. Errors that are all of type `NOT_FOUND` become
    /// [`GithubError::MissingData`].
    pub fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.iter().map(|e| e.message.clone()).collect();
            let not_found = self
                .errors
                .iter()
                .all(|e| e.kind.as_deref() == Some("NOT_FOUND"));
            return Err(if not_found {
                GithubError::MissingData(messages.join("; "))
            } else {
                GithubError::GraphQl { messages }
            });
        }
        self.data
            .ok_or_else(|| GithubError::MissingData("response has no data".to_string()))
    }
}

/// Decode a raw HTTP response into the `data` payload.
pub fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if !(200..300).contains(&status) {
        return Err(GithubError::Status {
            status,
            body: body.to_string(),
        });
    }
    serde_json::from_str::<GraphQlResponse<T>>(body)?.into_data()
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    fn into_page<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        let nodes = self.nodes.into_iter().flatten().map(f).collect();
        Page::new(nodes, self.page_info.end_cursor, self.page_info.has_next_page)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerData<P> {
    pub owner: Option<OwnerNode<P>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerNode<P> {
    #[serde(rename = "projectV2")]
    pub project: Option<P>,
}

impl<P> OwnerData<P> {
    /// The project, or `MissingData` naming what was not there.
    pub fn into_project(self, owner: &str, number: u64) -> Result<P> {
        self.owner
            .ok_or_else(|| GithubError::MissingData(format!("owner {owner}")))?
            .project
            .ok_or_else(|| GithubError::MissingData(format!("project {owner}/{number}")))
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ItemsProject {
    pub items: Connection<ItemNode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateValue {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectValue {
    pub option_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationValue {
    pub iteration_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserNode {
    pub login: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserConnection {
    #[serde(default)]
    pub nodes: Vec<Option<UserNode>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentNode {
    pub id: Option<String>,
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: Option<ItemState>,
    pub url: Option<String>,
    pub assignees: Option<UserConnection>,
}

impl ContentNode {
    /// Issue content; `None` for drafts and pull requests.
    fn into_issue(self) -> Option<IssueContent> {
        Some(IssueContent {
            id: self.id?,
            number: self.number?,
            title: self.title.unwrap_or_default(),
            url: self.url?,
            state: self.state?,
            assignees: self
                .assignees
                .map(|a| {
                    a.nodes
                        .into_iter()
                        .flatten()
                        .map(|u| Assignee {
                            login: u.login,
                            name: u.name,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemNode {
    pub id: String,
    pub due_date: Option<DateValue>,
    pub release: Option<SelectValue>,
    pub week: Option<IterationValue>,
    pub estimate: Option<SelectValue>,
    pub size: Option<SelectValue>,
    pub status: Option<SelectValue>,
    pub content: Option<ContentNode>,
}

fn select(value: Option<SelectValue>) -> Option<FieldValue> {
    let value = value?;
    Some(FieldValue::SingleSelect {
        option_id: value.option_id?,
        name: value.name?,
    })
}

impl ItemNode {
    /// Domain item with fields keyed by their board names.
    pub fn into_item(self, names: &FieldNames) -> Item {
        let mut item = Item::new(self.id);
        if let Some(content) = self.content.and_then(ContentNode::into_issue) {
            item = item.with_content(content);
        }

        let week = self.week.and_then(|w| {
            Some(FieldValue::Iteration {
                iteration_id: w.iteration_id?,
                title: w.title.unwrap_or_default(),
            })
        });
        let due = self
            .due_date
            .and_then(|d| d.date)
            .map(|date| FieldValue::Date { date });

        let values = [
            (&names.due_date, due),
            (&names.release, select(self.release)),
            (&names.week, week),
            (&names.estimate, select(self.estimate)),
            (&names.size, select(self.size)),
            (&names.status, select(self.status)),
        ];
        for (name, value) in values {
            if let Some(value) = value {
                item = item.with_field(name.clone(), value);
            }
        }
        item
    }
}

impl ItemsProject {
    pub fn into_page(self, names: &FieldNames) -> Page<Item> {
        self.items.into_page(|node| node.into_item(names))
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CatalogProject {
    pub id: String,
    pub fields: FieldNodes,
}

#[derive(Debug, Deserialize)]
pub struct FieldNodes {
    #[serde(default)]
    pub nodes: Vec<Option<FieldNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationNode {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub duration: u32,
}

impl From<IterationNode> for IterationOption {
    fn from(node: IterationNode) -> Self {
        IterationOption::new(node.id, node.title, node.start_date, node.duration)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationConfiguration {
    #[serde(default)]
    pub iterations: Vec<IterationNode>,
    #[serde(default)]
    pub completed_iterations: Vec<IterationNode>,
}

#[derive(Debug, Deserialize)]
pub struct OptionNode {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum FieldNode {
    #[serde(rename = "ProjectV2SingleSelectField")]
    SingleSelect {
        id: String,
        name: String,
        options: Vec<OptionNode>,
    },
    #[serde(rename = "ProjectV2IterationField")]
    Iteration {
        id: String,
        name: String,
        configuration: IterationConfiguration,
    },
    /// Text, number, date and built-in fields carry nothing we derive.
    #[serde(other)]
    Other,
}

impl FieldNode {
    fn into_definition(self) -> Option<FieldDefinition> {
        match self {
            FieldNode::SingleSelect { id, name, options } => Some(FieldDefinition::single_select(
                id,
                name,
                options
                    .into_iter()
                    .map(|o| SingleSelectOption::new(o.id, o.name))
                    .collect(),
            )),
            FieldNode::Iteration {
                id,
                name,
                configuration,
            } => Some(FieldDefinition::iteration(
                id,
                name,
                configuration.iterations.into_iter().map(Into::into).collect(),
                configuration
                    .completed_iterations
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            )),
            FieldNode::Other => None,
        }
    }
}

impl CatalogProject {
    pub fn into_catalog(self) -> ProjectCatalog {
        self.fields
            .nodes
            .into_iter()
            .flatten()
            .filter_map(FieldNode::into_definition)
            .fold(ProjectCatalog::new(self.id), ProjectCatalog::with_field)
    }
}

// ---------------------------------------------------------------------------
// Comments and issues
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Actor {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentNode {
    pub body: String,
    pub author: Option<Actor>,
}

impl From<CommentNode> for Comment {
    fn from(node: CommentNode) -> Self {
        Comment {
            body: node.body,
            author: node.author.map(|a| a.login),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentsData {
    pub node: Option<CommentsSubject>,
}

#[derive(Debug, Deserialize)]
pub struct CommentsSubject {
    pub comments: Option<Connection<CommentNode>>,
}

impl CommentsData {
    pub fn into_page(self, subject_id: &str) -> Result<Page<Comment>> {
        self.node
            .and_then(|n| n.comments)
            .map(|c| c.into_page(Comment::from))
            .ok_or_else(|| GithubError::MissingData(format!("issue {subject_id}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct IssueData {
    pub repository: Option<IssueRepository>,
}

#[derive(Debug, Deserialize)]
pub struct IssueRepository {
    pub issue: Option<IssueRef>,
}

impl IssueData {
    pub fn into_issue(self, owner: &str, repo: &str, number: u64) -> Result<IssueRef> {
        self.repository
            .and_then(|r| r.issue)
            .ok_or_else(|| GithubError::MissingData(format!("issue {owner}/{repo}#{number}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_item_page_decodes_fields_and_content() {
        let data = json!({
            "owner": { "projectV2": { "items": {
                "nodes": [
                    {
                        "id": "PVTI_1",
                        "dueDate": { "date": "2024-03-10" },
                        "release": {},
                        "week": { "iterationId": "w10", "title": "Week 10" },
                        "estimate": { "optionId": "e_m", "name": "M" },
                        "size": null,
                        "status": { "optionId": "s_qa", "name": "QA Testing" },
                        "content": {
                            "id": "I_1", "number": 12, "title": "Login", "state": "OPEN",
                            "url": "https://github.com/acme/app/issues/12",
                            "assignees": { "nodes": [ { "login": "alice", "name": "Alice" } ] }
                        }
                    },
                    { "id": "PVTI_2", "content": {} },
                    null
                ],
                "pageInfo": { "endCursor": "Y3Vyc29yOjI=", "hasNextPage": true }
            } } }
        });
        let owner: OwnerData<ItemsProject> = serde_json::from_value(data).unwrap();
        let page = owner
            .into_project("acme", 3)
            .unwrap()
            .into_page(&FieldNames::default());

        assert_eq!(page.nodes.len(), 2);
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("Y3Vyc29yOjI="));

        let item = &page.nodes[0];
        assert_eq!(item.date("Due Date"), Some(date(2024, 3, 10)));
        assert_eq!(item.value_id("Week"), Some("w10"));
        assert_eq!(item.option_name("Estimate"), Some("M"));
        assert_eq!(item.option_name("Status"), Some("QA Testing"));
        assert!(item.field("Release").is_none());
        assert!(item.field("Size").is_none());
        let content = item.content.as_ref().unwrap();
        assert_eq!(content.state, ItemState::Open);
        assert_eq!(content.mentions(), "@alice");

        let draft = &page.nodes[1];
        assert!(draft.content.is_none());
        assert!(!draft.is_open());
    }

    #[test]
    fn test_missing_project_is_missing_data() {
        let owner: OwnerData<ItemsProject> =
            serde_json::from_value(json!({ "owner": { "projectV2": null } })).unwrap();
        let err = owner.into_project("acme", 9).unwrap_err();
        assert!(matches!(err, GithubError::MissingData(ref what) if what == "project acme/9"));
    }

    #[test]
    fn test_catalog_keeps_select_and_iteration_fields() {
        let data = json!({
            "id": "PVT_1",
            "fields": { "nodes": [
                { "__typename": "ProjectV2Field" },
                {
                    "__typename": "ProjectV2SingleSelectField",
                    "id": "F_size", "name": "Size",
                    "options": [ { "id": "s", "name": "S" }, { "id": "m", "name": "M" } ]
                },
                {
                    "__typename": "ProjectV2IterationField",
                    "id": "F_week", "name": "Week",
                    "configuration": {
                        "iterations": [
                            { "id": "w10", "title": "Week 10", "startDate": "2024-03-04", "duration": 14 }
                        ],
                        "completedIterations": [
                            { "id": "w08", "title": "Week 8", "startDate": "2024-02-19", "duration": 14 }
                        ]
                    }
                }
            ] }
        });
        let catalog = serde_json::from_value::<CatalogProject>(data)
            .unwrap()
            .into_catalog();

        assert_eq!(catalog.project_id, "PVT_1");
        assert_eq!(catalog.fields.len(), 2);
        let (_, sizes) = catalog.single_select("Size").unwrap();
        assert_eq!(sizes.len(), 2);
        let (_, weeks) = catalog.iterations("Week").unwrap();
        let ids: Vec<_> = weeks.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["w10", "w08"]);
        assert_eq!(weeks[0].start_date, date(2024, 3, 4));
    }

    #[test]
    fn test_comment_page_decodes_authors() {
        let data = json!({ "node": { "comments": {
            "nodes": [
                { "body": "hello", "author": { "login": "bot" } },
                { "body": "ghost", "author": null }
            ],
            "pageInfo": { "endCursor": null, "hasNextPage": false }
        } } });
        let page = serde_json::from_value::<CommentsData>(data)
            .unwrap()
            .into_page("I_1")
            .unwrap();
        assert_eq!(page.nodes[0].author.as_deref(), Some("bot"));
        assert_eq!(page.nodes[1].author, None);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_comments_of_non_issue_is_missing() {
        let data: CommentsData = serde_json::from_value(json!({ "node": {} })).unwrap();
        assert!(matches!(
            data.into_page("PR_1"),
            Err(GithubError::MissingData(_))
        ));
    }

    #[test]
    fn test_issue_lookup() {
        let data: IssueData = serde_json::from_value(json!({
            "repository": { "issue": {
                "id": "I_ops", "number": 5, "url": "https://github.com/acme/ops/issues/5"
            } }
        }))
        .unwrap();
        assert_eq!(data.into_issue("acme", "ops", 5).unwrap().id, "I_ops");

        let empty: IssueData =
            serde_json::from_value(json!({ "repository": { "issue": null } })).unwrap();
        assert!(empty.into_issue("acme", "ops", 6).is_err());
    }

    #[test]
    fn test_decode_rejects_non_success_status() {
        let err = decode::<serde_json::Value>(502, "bad gateway").unwrap_err();
        assert!(matches!(err, GithubError::Status { status: 502, .. }));
    }

    #[test]
    fn test_decode_surfaces_graphql_errors() {
        let body = json!({
            "data": null,
            "errors": [ { "message": "Field 'x' doesn't exist" } ]
        })
        .to_string();
        let err = decode::<serde_json::Value>(200, &body).unwrap_err();
        assert!(matches!(err, GithubError::GraphQl { ref messages } if messages.len() == 1));

        let body = json!({
            "data": { "repository": null },
            "errors": [ { "type": "NOT_FOUND", "message": "Could not resolve to a Repository" } ]
        })
        .to_string();
        let err = decode::<IssueData>(200, &body).unwrap_err();
        assert!(matches!(err, GithubError::MissingData(_)));
    }

    #[test]
    fn test_decode_requires_data() {
        let err = decode::<serde_json::Value>(200, "{}").unwrap_err();
        assert!(matches!(err, GithubError::MissingData(_)));

        let err = decode::<serde_json::Value>(200, "not json").unwrap_err();
        assert!(matches!(err, GithubError::Json(_)));
    }
}
