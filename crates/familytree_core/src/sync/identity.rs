//! Member identity space of one sync call.

use crate::model::identity::MemberId;
use std::collections::HashSet;

/// Confirmed, persisted member ids of the family being synced.
///
/// Built from storage after member reconciliation and dropped with the call;
/// relationship endpoints resolve only through this table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberIdentity {
    ids: HashSet<MemberId>,
}

impl MemberIdentity {
    pub fn from_ids(ids: impl IntoIterator<Item = MemberId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Resolves a draft member id to its persisted id.
    ///
    /// Ids are client-assigned, so a hit is always the same value.
    pub fn resolve(&self, id: MemberId) -> Option<MemberId> {
        self.ids.get(&id).copied()
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
