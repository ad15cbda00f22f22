//! `ProjectSource` over the GitHub GraphQL API.

use async_trait::async_trait;
use boardsync_core::{
    BatchError, Comment, FieldKind, IssueRef, Item, ItemId, MutationRequest, Page,
    ProjectCatalog, ProjectSource, TransportResult,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GithubConfig;
use crate::queries;
use crate::wire::{self, CatalogProject, CommentsData, IssueData, ItemsProject, OwnerData};
use crate::Result;

/// Input object of `updateProjectV2ItemFieldValue` for one mutation.
pub fn field_update_input(project_id: &str, m: &MutationRequest) -> Value {
    let value = match m.kind {
        FieldKind::SingleSelect => json!({ "singleSelectOptionId": m.value_id }),
        FieldKind::Iteration => json!({ "iterationId": m.value_id }),
    };
    json!({
        "projectId": project_id,
        "itemId": m.item_id.as_str(),
        "fieldId": m.field_id,
        "value": value,
    })
}

/// GitHub GraphQL client for one project
pub struct GithubClient {
    config: GithubConfig,
    http_client: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(GithubClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// POST one GraphQL document and decode its `data`.
    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        debug!(operation, endpoint = %self.config.endpoint, "graphql request");

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        wire::decode(status, &body)
    }

    fn owner_variables(&self) -> Value {
        json!({
            "owner": self.config.owner,
            "number": self.config.project_number,
        })
    }

    async fn item_page(&self, cursor: Option<&str>) -> Result<Page<Item>> {
        let names = &self.config.fields;
        let mut variables = self.owner_variables();
        variables["after"] = json!(cursor);
        variables["dueDate"] = json!(names.due_date);
        variables["release"] = json!(names.release);
        variables["week"] = json!(names.week);
        variables["estimate"] = json!(names.estimate);
        variables["size"] = json!(names.size);
        variables["status"] = json!(names.status);

        let data: OwnerData<ItemsProject> = self
            .graphql(
                "ProjectItems",
                &queries::items(self.config.owner_type),
                variables,
            )
            .await?;
        let project = data.into_project(&self.config.owner, self.config.project_number)?;
        Ok(project.into_page(names))
    }

    async fn catalog(&self) -> Result<ProjectCatalog> {
        let data: OwnerData<CatalogProject> = self
            .graphql(
                "ProjectFields",
                &queries::catalog(self.config.owner_type),
                self.owner_variables(),
            )
            .await?;
        let project = data.into_project(&self.config.owner, self.config.project_number)?;
        Ok(project.into_catalog())
    }

    async fn comment_page(&self, subject_id: &str, cursor: Option<&str>) -> Result<Page<Comment>> {
        let data: CommentsData = self
            .graphql(
                "IssueComments",
                queries::COMMENTS,
                json!({ "subjectId": subject_id, "after": cursor }),
            )
            .await?;
        data.into_page(subject_id)
    }

    /// One request per field; GitHub has no batch form of this mutation.
    /// Stops at the first rejection, leaving the earlier fields written.
    async fn update_fields(
        &self,
        project_id: &str,
        mutations: &[MutationRequest],
    ) -> std::result::Result<(), BatchError> {
        for (applied, m) in mutations.iter().enumerate() {
            let _: Value = self
                .graphql(
                    "UpdateItemField",
                    queries::UPDATE_FIELD,
                    json!({ "input": field_update_input(project_id, m) }),
                )
                .await
                .map_err(|err| BatchError {
                    applied,
                    source: err.into(),
                })?;
            debug!(item = %m.item_id, field = %m.field_id, value = %m.value_id, "field updated");
        }
        Ok(())
    }

    async fn add_comment(&self, subject_id: &str, body: &str) -> Result<()> {
        let _: Value = self
            .graphql(
                "AddComment",
                queries::ADD_COMMENT,
                json!({ "subjectId": subject_id, "body": body }),
            )
            .await?;
        Ok(())
    }

    async fn issue(&self, repo: &str, number: u64) -> Result<IssueRef> {
        let data: IssueData = self
            .graphql(
                "Issue",
                queries::ISSUE,
                json!({ "owner": self.config.owner, "repo": repo, "number": number }),
            )
            .await?;
        data.into_issue(&self.config.owner, repo, number)
    }
}

#[async_trait]
impl ProjectSource for GithubClient {
    async fn fetch_item_page(&self, cursor: Option<&str>) -> TransportResult<Page<Item>> {
        Ok(self.item_page(cursor).await?)
    }

    async fn fetch_catalog(&self) -> TransportResult<ProjectCatalog> {
        Ok(self.catalog().await?)
    }

    async fn fetch_comment_page(
        &self,
        subject_id: &str,
        cursor: Option<&str>,
    ) -> TransportResult<Page<Comment>> {
        Ok(self.comment_page(subject_id, cursor).await?)
    }

    async fn apply_mutations(
        &self,
        project_id: &str,
        _item_id: &ItemId,
        mutations: &[MutationRequest],
    ) -> std::result::Result<(), BatchError> {
        self.update_fields(project_id, mutations).await
    }

    async fn post_comment(&self, subject_id: &str, body: &str) -> TransportResult<()> {
        Ok(self.add_comment(subject_id, body).await?)
    }

    async fn fetch_issue(&self, repo: &str, number: u64) -> TransportResult<IssueRef> {
        Ok(self.issue(repo, number).await?)
    }
}
