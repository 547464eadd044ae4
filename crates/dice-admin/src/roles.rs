use dice_auth::{Member, Role};
use dice_core::ID;
use dice_store::Store;

use crate::error::AdminError;

const SECTION: &str = "roles";

/// Reads/writes the server's durable role grants. The orchestrator's JWT
/// issuance path consults this section when minting `Claims` so a role
/// assigned here takes effect on the member's next sign-in; it is not
/// retrofitted onto tokens already outstanding.
pub async fn roles_of<S: Store>(store: &S, member: ID<Member>) -> Result<Vec<Role>, AdminError> {
    let doc = store.get(SECTION, &member.to_string()).await?;
    match doc {
        Some(v) => serde_json::from_value(v).map_err(|e| AdminError::Decode(e.to_string())),
        None => Ok(Vec::new()),
    }
}

pub async fn assign_role<S: Store>(store: &S, member: ID<Member>, role: Role) -> Result<Vec<Role>, AdminError> {
    let mut roles = roles_of(store, member).await?;
    if !roles.contains(&role) {
        roles.push(role);
    }
    let doc = serde_json::to_value(&roles).map_err(|e| AdminError::Decode(e.to_string()))?;
    store.put(SECTION, &member.to_string(), doc).await?;
    Ok(roles)
}

pub async fn list_all<S: Store>(store: &S) -> Result<Vec<(ID<Member>, Vec<Role>)>, AdminError> {
    let keys = store.list_keys(SECTION, "").await?;
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let Ok(uuid) = key.parse::<uuid::Uuid>() else {
            continue;
        };
        let member = ID::from(uuid);
        let roles = roles_of(store, member).await?;
        out.push((member, roles));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_store::FileStore;

    #[tokio::test]
    async fn assigning_a_role_twice_does_not_duplicate_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let member: ID<Member> = ID::default();
        assign_role(&store, member, Role::Operator).await.unwrap();
        let roles = assign_role(&store, member, Role::Operator).await.unwrap();
        assert_eq!(roles, vec![Role::Operator]);
    }

    #[tokio::test]
    async fn list_all_reflects_every_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let a: ID<Member> = ID::default();
        let b: ID<Member> = ID::default();
        assign_role(&store, a, Role::Viewer).await.unwrap();
        assign_role(&store, b, Role::Owner).await.unwrap();
        let all = list_all(&store).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
