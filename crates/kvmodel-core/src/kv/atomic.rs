use crate::{key::Key, kv::Versionstamp};

///
/// Check
///
/// Commit precondition: the entry at `key` must currently carry
/// `versionstamp` (`None` means the key must be absent).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Check {
    pub key: Key,
    pub versionstamp: Option<Versionstamp>,
}

///
/// MutationKind
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MutationKind {
    Set(Vec<u8>),
    Delete,
}

///
/// Mutation
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mutation {
    pub key: Key,
    pub kind: MutationKind,
}

///
/// AtomicWrite
///
/// Chained builder for one all-or-nothing commit. Mutations are applied in
/// insertion order, so a later mutation on the same key wins.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AtomicWrite {
    checks: Vec<Check>,
    mutations: Vec<Mutation>,
}

impl AtomicWrite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn check(mut self, key: Key, versionstamp: Option<Versionstamp>) -> Self {
        self.checks.push(Check { key, versionstamp });
        self
    }

    #[must_use]
    pub fn set(mut self, key: Key, value: Vec<u8>) -> Self {
        self.mutations.push(Mutation {
            key,
            kind: MutationKind::Set(value),
        });
        self
    }

    #[must_use]
    pub fn delete(mut self, key: Key) -> Self {
        self.mutations.push(Mutation {
            key,
            kind: MutationKind::Delete,
        });
        self
    }

    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<Check>, Vec<Mutation>) {
        (self.checks, self.mutations)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty() && self.mutations.is_empty()
    }
}

///
/// CommitResult
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommitResult {
    Committed { versionstamp: Versionstamp },

    /// A check failed; nothing was applied.
    Conflict,
}

impl CommitResult {
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}
