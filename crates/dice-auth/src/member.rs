use dice_core::{Unique, ID};

use crate::Role;

/// A federated (verified-external-subject) identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    id: ID<Self>,
    display_name: String,
    external_subject: String,
    roles: Vec<Role>,
}

impl Member {
    pub fn new(id: ID<Self>, display_name: String, external_subject: String) -> Self {
        Self {
            id,
            display_name,
            external_subject,
            roles: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn external_subject(&self) -> &str {
        &self.external_subject
    }
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
    pub fn grant(&mut self, role: Role) {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
    }
}

impl Unique for Member {
    fn id(&self) -> ID<Self> {
        self.id
    }
}
