//! GraphQL documents sent to the GitHub API.
//!
//! Owner-scoped queries alias the `organization`/`user` root field to
//! `owner`, so one response shape serves both owner kinds.

use crate::config::OwnerType;

const OWNER_PLACEHOLDER: &str = "__OWNER__";

const ITEMS: &str = r#"
query ProjectItems(
  $owner: String!, $number: Int!, $after: String,
  $dueDate: String!, $release: String!, $week: String!,
  $estimate: String!, $size: String!, $status: String!
) {
  owner: __OWNER__(login: $owner) {
    projectV2(number: $number) {
      items(first: 100, after: $after) {
        nodes {
          id
          dueDate: fieldValueByName(name: $dueDate) {
            ... on ProjectV2ItemFieldDateValue { date }
          }
          release: fieldValueByName(name: $release) { ...selectValue }
          week: fieldValueByName(name: $week) {
            ... on ProjectV2ItemFieldIterationValue { iterationId title }
          }
          estimate: fieldValueByName(name: $estimate) { ...selectValue }
          size: fieldValueByName(name: $size) { ...selectValue }
          status: fieldValueByName(name: $status) { ...selectValue }
          content {
            ... on Issue {
              id
              number
              title
              state
              url
              assignees(first: 20) { nodes { login name } }
            }
          }
        }
        pageInfo { endCursor hasNextPage }
      }
    }
  }
}

fragment selectValue on ProjectV2ItemFieldSingleSelectValue { optionId name }
"#;

const CATALOG: &str = r#"
query ProjectFields($owner: String!, $number: Int!) {
  owner: __OWNER__(login: $owner) {
    projectV2(number: $number) {
      id
      fields(first: 100) {
        nodes {
          __typename
          ... on ProjectV2SingleSelectField {
            id
            name
            options { id name }
          }
          ... on ProjectV2IterationField {
            id
            name
            configuration {
              iterations { id title startDate duration }
              completedIterations { id title startDate duration }
            }
          }
        }
      }
    }
  }
}
"#;

pub const COMMENTS: &str = r#"
query IssueComments($subjectId: ID!, $after: String) {
  node(id: $subjectId) {
    ... on Issue {
      comments(first: 100, after: $after) {
        nodes { body author { login } }
        pageInfo { endCursor hasNextPage }
      }
    }
  }
}
"#;

pub const ISSUE: &str = r#"
query Issue($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) { id number url }
  }
}
"#;

pub const UPDATE_FIELD: &str = r#"
mutation UpdateItemField($input: UpdateProjectV2ItemFieldValueInput!) {
  updateProjectV2ItemFieldValue(input: $input) {
    projectV2Item { id }
  }
}
"#;

pub const ADD_COMMENT: &str = r#"
mutation AddComment($subjectId: ID!, $body: String!) {
  addComment(input: { subjectId: $subjectId, body: $body }) {
    clientMutationId
  }
}
"#;

/// Item page query for `owner`.
pub fn items(owner: OwnerType) -> String {
    ITEMS.replace(OWNER_PLACEHOLDER, owner.as_str())
}

/// Field catalog query for `owner`.
pub fn catalog(owner: OwnerType) -> String {
    CATALOG.replace(OWNER_PLACEHOLDER, owner.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_root_is_substituted() {
        let org = items(OwnerType::Organization);
        assert!(org.contains("owner: organization(login: $owner)"));
        assert!(!org.contains(OWNER_PLACEHOLDER));

        let user = catalog(OwnerType::User);
        assert!(user.contains("owner: user(login: $owner)"));
    }

    #[test]
    fn test_field_names_are_variables() {
        let query = items(OwnerType::Organization);
        for var in ["$dueDate", "$release", "$week", "$estimate", "$size", "$status"] {
            assert!(query.contains(&format!("fieldValueByName(name: {var})")), "{var}");
        }
        assert!(!query.contains("\"Due Date\""));
    }
}
