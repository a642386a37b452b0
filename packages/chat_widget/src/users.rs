//! Identity cache for users observed in transport events.
//!
//! Populated as users appear (profile updates, joins); never evicted —
//! bounded by session lifetime. Message attribution lives here: a message
//! belongs to an agent iff its author is a cached user other than the
//! local customer. Unknown authors default to customer.

use std::collections::HashMap;

use chat_transport::{Role, User, UserId};

#[derive(Debug, Default)]
pub struct UserCache {
    customer_id: Option<UserId>,
    users: HashMap<UserId, User>,
}

impl UserCache {
    pub fn set_customer_id(&mut self, id: UserId) {
        self.customer_id = Some(id);
    }

    pub fn customer_id(&self) -> Option<&UserId> {
        self.customer_id.as_ref()
    }

    pub fn insert(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// True when the id belongs to a cached user other than the customer.
    pub fn is_agent_id(&self, id: &UserId) -> bool {
        self.users.contains_key(id) && self.customer_id.as_ref() != Some(id)
    }

    /// Attribute a message to a side of the conversation.
    pub fn attribute(&self, author: Option<&UserId>) -> Role {
        match author {
            Some(id) if self.is_agent_id(id) => Role::Agent,
            _ => Role::Customer,
        }
    }
}
