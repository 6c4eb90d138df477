use loghive_common::InjectionGuardConfig;

/// A submitted credential batch contained hostile tokens.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("injection attempt detected in submitted credentials")]
pub struct InjectionDetected;

/// Screens credential strings before they reach the raw credential query.
///
/// Three passes, in order: single tokens that reject wherever they appear,
/// token groups that reject when all members occur in sequence, and
/// find/replace substitutions applied to strings that survived both scans.
#[derive(Debug, Clone)]
pub struct InjectionGuard {
    cases: Vec<String>,
    groups: Vec<Vec<String>>,
    replaces: Vec<(String, String)>,
}

impl InjectionGuard {
    pub fn new(config: &InjectionGuardConfig) -> Self {
        Self {
            cases: config.cases.clone(),
            groups: config.groups.clone(),
            replaces: config.replaces.clone(),
        }
    }

    /// Checks the whole batch and returns sanitized copies, in the order
    /// given. One hostile string rejects the entire batch.
    pub fn sanitize(&self, inputs: &[&str]) -> Result<Vec<String>, InjectionDetected> {
        for input in inputs {
            if self.is_hostile(input) {
                return Err(InjectionDetected);
            }
        }
        Ok(inputs.iter().map(|input| self.replace(input)).collect())
    }

    fn is_hostile(&self, input: &str) -> bool {
        if self.cases.iter().any(|case| input.contains(case.as_str())) {
            return true;
        }
        self.groups.iter().any(|group| Self::matches_group(input, group))
    }

    /// Each member must be found strictly after the end of the previous one.
    fn matches_group(input: &str, group: &[String]) -> bool {
        if group.is_empty() {
            return false;
        }
        let mut pos = 0;
        for token in group {
            match input[pos..].find(token.as_str()) {
                Some(found) => pos += found + token.len(),
                None => return false,
            }
        }
        true
    }

    fn replace(&self, input: &str) -> String {
        let mut output = input.to_owned();
        for (find, with) in &self.replaces {
            output = output.replace(find.as_str(), with.as_str());
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> InjectionGuard {
        InjectionGuard::new(&InjectionGuardConfig::default())
    }

    #[test]
    fn test_clean_inputs_pass_through() {
        let out = guard().sanitize(&["alice", "hunter2"]).unwrap();
        assert_eq!(out, vec!["alice".to_owned(), "hunter2".to_owned()]);
    }

    #[test]
    fn test_comment_token_rejects() {
        assert_eq!(guard().sanitize(&["admin'--"]), Err(InjectionDetected));
    }

    #[test]
    fn test_group_rejects_only_in_order() {
        let guard = guard();
        // Quote before paren matches the ["'", ")"] group.
        assert_eq!(guard.sanitize(&["a'b)c"]), Err(InjectionDetected));
        // Paren before quote does not.
        assert!(guard.sanitize(&["a)b'c"]).is_ok());
    }

    #[test]
    fn test_group_members_must_not_overlap() {
        let config = InjectionGuardConfig {
            cases: vec![],
            groups: vec![vec!["ab".to_owned(), "bc".to_owned()]],
            replaces: vec![],
        };
        let guard = InjectionGuard::new(&config);
        // "abc" has "bc" overlapping the "ab" match, so the scan resumes
        // past it and finds nothing.
        assert!(guard.sanitize(&["abc"]).is_ok());
        assert_eq!(guard.sanitize(&["abXbc"]), Err(InjectionDetected));
    }

    #[test]
    fn test_one_bad_string_rejects_the_batch() {
        assert_eq!(
            guard().sanitize(&["alice", "x');DROP TABLE users"]),
            Err(InjectionDetected)
        );
    }

    #[test]
    fn test_quotes_are_replaced_after_passing() {
        let out = guard().sanitize(&["o'malley"]).unwrap();
        assert_eq!(out[0], "o\u{b4}malley");
    }
}
