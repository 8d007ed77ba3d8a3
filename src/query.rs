//! GraphQL query templates
//!
//! Templates carry three placeholders: `{first}` (page size), `{skip}` (offset) and
//! `{dao}` (parent DAO id, only for per-DAO queries). Literal GraphQL braces are left
//! untouched since substitution only replaces those exact tokens.

use crate::error::CensusError;

const FIRST: &str = "{first}";
const SKIP: &str = "{skip}";
const DAO: &str = "{dao}";

/// A parameterized query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    text: &'static str,
}

impl QueryTemplate {
    pub const fn new(text: &'static str) -> Self {
        QueryTemplate { text }
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    /// Whether the template is scoped to a parent DAO.
    pub fn requires_dao(&self) -> bool {
        self.text.contains(DAO)
    }

    /// Fills the placeholders.
    ///
    /// # Errors
    /// Returns `CensusError::Query` if the template needs a DAO id and none was given.
    pub fn fill(&self, first: usize, skip: usize, dao_id: Option<&str>) -> Result<String, CensusError> {
        let mut query = self
            .text
            .replace(FIRST, &first.to_string())
            .replace(SKIP, &skip.to_string());

        if self.requires_dao() {
            let dao_id = dao_id.ok_or_else(|| {
                CensusError::Query(format!("template requires a DAO id: {}", self.text))
            })?;
            query = query.replace(DAO, dao_id);
        }

        Ok(query)
    }
}

/// Registered DAOs with their reputation holder count.
pub const DAO_CENSUS_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{daos(where: {register: "registered"}, first: {first}, skip: {skip}){id name reputationHoldersCount}}"#,
);

/// Registered DAOs, id and name only.
pub const DAO_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{daos(where: {register: "registered"}, first: {first}, skip: {skip}){id name}}"#,
);

pub const PROPOSAL_ID_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{proposals(where: {dao: "{dao}"}, first: {first}, skip: {skip}){id}}"#,
);

pub const VOTE_ID_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{proposalVotes(where: {dao: "{dao}"}, first: {first}, skip: {skip}){id}}"#,
);

pub const STAKE_ID_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{proposalStakes(where: {dao: "{dao}"}, first: {first}, skip: {skip}){id}}"#,
);

/// Executed proposals with the fields needed for outcome and staking analysis.
pub const EXECUTED_PROPOSAL_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{proposals(where: {dao: "{dao}", executedAt_not: null}, first: {first}, skip: {skip}){id createdAt boostedAt totalRepWhenExecuted votesFor votesAgainst stakesFor stakesAgainst winningOutcome stakes{staker}}}"#,
);

pub const PROPOSAL_ACTION_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{proposals(where: {dao: "{dao}"}, first: {first}, skip: {skip}){proposer createdAt}}"#,
);

pub const VOTE_ACTION_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{proposalVotes(where: {dao: "{dao}"}, first: {first}, skip: {skip}){voter createdAt}}"#,
);

pub const STAKE_ACTION_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{proposalStakes(where: {dao: "{dao}"}, first: {first}, skip: {skip}){staker createdAt}}"#,
);

pub const REPUTATION_HOLDER_QUERY: QueryTemplate = QueryTemplate::new(
    r#"{reputationHolders(where: {dao: "{dao}"}, first: {first}, skip: {skip}){address}}"#,
);
