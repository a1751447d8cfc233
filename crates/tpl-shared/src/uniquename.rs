use std::collections::HashSet;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("name {0:?} contains a disallowed character")]
    DisallowedCharacter(String),
    #[error("name {0:?} is already claimed")]
    AlreadyClaimed(String),
}

/// Generates identifiers that are unique within one compilation unit's
/// generated code (spec.md §4.6). Used by the conformance engine (to check
/// that rule-generated diagnostic identifiers aren't reused) and by
/// `tpl-runtime` for per-render bookkeeping of frame/state labels.
#[derive(Debug, Clone)]
pub struct UniqueNameGenerator {
    claimed: HashSet<String>,
    disallowed: Vec<char>,
    separator: String,
}

impl UniqueNameGenerator {
    pub fn new(disallowed: Vec<char>, separator: impl Into<String>) -> Self {
        Self {
            claimed: HashSet::new(),
            disallowed,
            separator: separator.into(),
        }
    }

    fn has_disallowed_char(&self, name: &str) -> bool {
        name.chars().any(|c| self.disallowed.contains(&c))
    }

    pub fn claim(&mut self, name: impl Into<String>) -> Result<(), ClaimError> {
        let name = name.into();
        if self.has_disallowed_char(&name) {
            return Err(ClaimError::DisallowedCharacter(name));
        }
        if !self.claimed.insert(name.clone()) {
            return Err(ClaimError::AlreadyClaimed(name));
        }
        Ok(())
    }

    /// Like `claim`, but silently accepts an already-claimed name instead of
    /// erroring; still rejects disallowed characters.
    pub fn claim_lenient(&mut self, name: impl Into<String>) -> Result<(), ClaimError> {
        let name = name.into();
        if self.has_disallowed_char(&name) {
            return Err(ClaimError::DisallowedCharacter(name));
        }
        self.claimed.insert(name);
        Ok(())
    }

    /// Returns `base` if it is unclaimed, otherwise `base<sep>N` for the
    /// smallest `N >= 1` that is unclaimed. The result is claimed before
    /// being returned.
    pub fn generate(&mut self, base: &str) -> String {
        if !self.claimed.contains(base) {
            self.claimed.insert(base.to_string());
            return base.to_string();
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{base}{}{n}", self.separator);
            if !self.claimed.contains(&candidate) {
                self.claimed.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }

    /// Forks the claim set so siblings number independently from this
    /// point forward without affecting each other or the parent.
    pub fn branch(&self) -> Self {
        self.clone()
    }
}
