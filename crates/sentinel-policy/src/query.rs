// query.rs — Query-safety guard for raw data-access statements.
//
// Two rules, applied to the uppercased query:
// 1. Forbidden keywords are matched as whole words (`DROP` does not match
//    `DROPLET`), so mixed case and extra whitespace do not evade them.
// 2. With `require_limit`, a SELECT must carry a LIMIT clause or an
//    equality on an id column.
//
// This is a keyword heuristic, not a SQL parser: comments, string literals
// and nested queries are not understood.

use regex::Regex;

use crate::decision::Decision;
use crate::rules::{QueryPolicy, QueryRules};
use crate::store::PolicySlot;

const READ_ALL_PATTERN: &str = r"\bSELECT\b";
const LIMIT_PATTERN: &str = r"\bLIMIT\b";
/// `ID =`, `ID=`, `USER_ID = ...`, `u.id=...` after uppercasing.
const ID_EQUALITY_PATTERN: &str = r"\b(?:\w*_)?ID\s*=";

/// Evaluates raw queries against the query policy.
///
/// Keyword patterns are compiled once, at construction.
#[derive(Debug, Clone)]
pub struct QueryGuard {
    state: GuardState,
}

#[derive(Debug, Clone)]
enum GuardState {
    Active(CompiledRules),
    Lockdown(String),
}

#[derive(Debug, Clone)]
struct CompiledRules {
    keywords: Vec<(String, Regex)>,
    require_limit: bool,
    read_all: Regex,
    limit_clause: Regex,
    id_equality: Regex,
}

impl CompiledRules {
    fn compile(rules: &QueryRules) -> Result<Self, regex::Error> {
        let mut keywords = Vec::with_capacity(rules.forbidden_keywords.len());
        for keyword in &rules.forbidden_keywords {
            if keyword.trim().is_empty() {
                continue;
            }
            keywords.push((keyword.clone(), Regex::new(&keyword_pattern(keyword))?));
        }
        Ok(Self {
            keywords,
            require_limit: rules.require_limit,
            read_all: Regex::new(READ_ALL_PATTERN)?,
            limit_clause: Regex::new(LIMIT_PATTERN)?,
            id_equality: Regex::new(ID_EQUALITY_PATTERN)?,
        })
    }
}

/// Whole-word pattern for an uppercased keyword.
///
/// Multi-word keywords (e.g. `DROP TABLE`) match across any whitespace run.
fn keyword_pattern(keyword: &str) -> String {
    let words: Vec<String> = keyword
        .to_uppercase()
        .split_whitespace()
        .map(regex::escape)
        .collect();
    format!(r"\b{}\b", words.join(r"\s+"))
}

impl QueryGuard {
    pub fn new(policy: PolicySlot<QueryPolicy>) -> Self {
        let state = match policy.document() {
            Some(document) => match CompiledRules::compile(&document.rules) {
                Ok(compiled) => GuardState::Active(compiled),
                Err(e) => {
                    tracing::error!(error = %e, "query rules failed to compile; denying all queries");
                    GuardState::Lockdown(format!(
                        "Query policy unusable ({}); denying all until corrected.",
                        e
                    ))
                }
            },
            None => GuardState::Lockdown(
                policy
                    .lockdown_reason()
                    .unwrap_or_else(|| "Query policy unavailable.".to_string()),
            ),
        };
        Self { state }
    }

    pub fn from_policy(policy: QueryPolicy) -> Self {
        Self::new(PolicySlot::from_document(policy))
    }

    /// Decide whether `query` may run.
    pub fn check_query(&self, query: &str) -> Decision {
        let rules = match &self.state {
            GuardState::Active(rules) => rules,
            GuardState::Lockdown(reason) => return Decision::deny(reason.clone()),
        };

        let normalized = query.to_uppercase();

        for (keyword, pattern) in &rules.keywords {
            if pattern.is_match(&normalized) {
                return Decision::deny(format!(
                    "Data Destruction Prevention: Forbidden keyword '{}' detected.",
                    keyword
                ));
            }
        }

        if rules.require_limit && rules.read_all.is_match(&normalized) {
            let bounded = rules.limit_clause.is_match(&normalized)
                || rules.id_equality.is_match(&normalized);
            if !bounded {
                return Decision::deny(
                    "Data Exfiltration Prevention: SELECT query missing LIMIT clause or specific ID constraint.",
                );
            }
        }

        Decision::allow("Query Approved. Policy checks passed.")
    }
}

/// One-shot check against `rules` without keeping a guard around.
pub fn check_query(query: &str, rules: &QueryRules) -> Decision {
    QueryGuard::from_policy(QueryPolicy {
        description: None,
        rules: rules.clone(),
    })
    .check_query(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::PolicyDocument;

    fn guard() -> QueryGuard {
        QueryGuard::from_policy(QueryPolicy::safe_default())
    }

    #[test]
    fn destructive_statement_is_denied() {
        let decision = guard().check_query("DROP TABLE users");
        assert!(!decision.is_allowed());
        assert!(decision.reason().contains("Forbidden keyword 'DROP'"));
    }

    #[test]
    fn mixed_case_keyword_is_denied() {
        let decision = guard().check_query("dRoP TaBlE users");
        assert!(decision.reason().contains("Forbidden keyword 'DROP'"));
    }

    #[test]
    fn whitespace_padding_does_not_evade() {
        assert!(!guard().check_query("DROP    TABLE      users").is_allowed());
    }

    #[test]
    fn keyword_inside_identifier_is_not_matched() {
        let decision = guard().check_query("SELECT name FROM droplets LIMIT 5");
        assert!(decision.is_allowed(), "{}", decision.reason());
    }

    #[test]
    fn unbounded_select_is_denied() {
        let decision = guard().check_query("SELECT * FROM users");
        assert!(!decision.is_allowed());
        assert!(decision.reason().contains("missing LIMIT"));
    }

    #[test]
    fn select_with_id_equality_is_allowed() {
        assert!(guard().check_query("SELECT * FROM users WHERE id=1").is_allowed());
        assert!(guard().check_query("select * from users where id = 7").is_allowed());
        assert!(guard()
            .check_query("SELECT * FROM orders o WHERE o.user_id = 3")
            .is_allowed());
    }

    #[test]
    fn select_with_limit_is_allowed() {
        assert!(guard().check_query("SELECT * FROM users LIMIT 10").is_allowed());
    }

    #[test]
    fn inequality_on_id_is_not_a_bound() {
        assert!(!guard().check_query("SELECT * FROM users WHERE id > 1").is_allowed());
        assert!(!guard().check_query("SELECT * FROM users WHERE paid = 1").is_allowed());
    }

    #[test]
    fn limit_not_required_when_disabled() {
        let rules = QueryRules {
            forbidden_keywords: vec!["DROP".to_string()],
            require_limit: false,
        };
        assert!(check_query("SELECT * FROM users", &rules).is_allowed());
    }

    #[test]
    fn keywords_are_matched_case_insensitively_both_ways() {
        let rules = QueryRules {
            forbidden_keywords: vec!["grant".to_string()],
            require_limit: false,
        };
        let decision = check_query("GRANT ALL ON db TO mallory", &rules);
        assert!(decision.reason().contains("Forbidden keyword 'grant'"));
    }

    #[test]
    fn multi_word_keyword_spans_whitespace() {
        let rules = QueryRules {
            forbidden_keywords: vec!["DROP TABLE".to_string()],
            require_limit: false,
        };
        assert!(!check_query("drop\n\ttable t", &rules).is_allowed());
        assert!(check_query("DROP INDEX i", &rules).is_allowed());
    }

    #[test]
    fn non_select_statements_are_not_limit_checked() {
        assert!(guard()
            .check_query("UPDATE users SET name = 'x' WHERE id = 1")
            .is_allowed());
        assert!(guard().check_query("INSERT INTO logs VALUES (1)").is_allowed());
    }

    #[test]
    fn lockdown_denies_everything() {
        let guard = QueryGuard::new(PolicySlot::Lockdown {
            path: "sql_policy.json".into(),
            reason: "trailing characters".to_string(),
        });
        let decision = guard.check_query("SELECT 1 LIMIT 1");
        assert!(!decision.is_allowed());
        assert!(decision.reason().contains("sql_policy.json"));
    }
}
