//! GraphQL documents

pub const LATEST_DEPLOYMENTS: &str = r#"
query LatestDeployments($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    deployments(last: 1, orderBy: { field: CREATED_AT, direction: ASC }) {
      nodes {
        createdAt
      }
    }
  }
}
"#;

pub const REPOSITORY_ID: &str = r#"
query RepositoryId($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    id
  }
}
"#;

pub const CREATE_PULL_REQUEST: &str = r#"
mutation CreatePullRequest(
  $repositoryId: ID!
  $baseRefName: String!
  $headRefName: String!
  $title: String!
  $body: String
) {
  createPullRequest(
    input: {
      repositoryId: $repositoryId
      baseRefName: $baseRefName
      headRefName: $headRefName
      title: $title
      body: $body
    }
  ) {
    pullRequest {
      id
      number
    }
  }
}
"#;

pub const MERGE_PULL_REQUEST: &str = r#"
mutation MergePullRequest($pullRequestId: ID!) {
  mergePullRequest(input: { pullRequestId: $pullRequestId }) {
    pullRequest {
      mergeCommit {
        oid
      }
    }
  }
}
"#;

pub const PULL_REQUEST_STATUS_CHECK_ROLLUP: &str = r#"
query PullRequestStatusCheckRollup($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) {
      statusCheckRollup {
        state
      }
    }
  }
}
"#;

pub const COMMIT_CHECK_RUNS: &str = r#"
query CommitCheckRuns($owner: String!, $name: String!, $sha: String!, $after: String) {
  repository(owner: $owner, name: $name) {
    object(expression: $sha) {
      __typename
      ... on Commit {
        statusCheckRollup {
          contexts(first: 100, after: $after) {
            pageInfo {
              hasNextPage
              endCursor
            }
            nodes {
              __typename
              ... on CheckRun {
                name
                status
                conclusion
              }
            }
          }
        }
      }
    }
  }
}
"#;
