use evently_domain::entity::EventBuffer;
use evently_domain::error::DomainError;
use evently_macros::{domain_event, entity, entity_id};
use uuid::Uuid;

#[entity_id]
pub struct UserId(Uuid);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

#[domain_event(event_type = "users.user_registered")]
pub struct UserRegistered {
    pub user_id: UserId,
}

#[domain_event(event_type = "users.user_profile_updated")]
pub struct UserProfileUpdated {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
}

/// 用户聚合
#[entity(id = UserId)]
pub struct User {
    email: String,
    first_name: String,
    last_name: String,
}

impl User {
    /// 注册新用户，产生 `UserRegistered`
    pub fn create(
        id: UserId,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let mut user = Self {
            id,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            domain_events: EventBuffer::new(),
        };
        user.raise(UserRegistered::new(id));
        user
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// 更新姓名；任一为空白时保持原样且不产生事件
    pub fn update_profile(&mut self, first_name: &str, last_name: &str) {
        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            return;
        }

        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();

        self.raise(UserProfileUpdated::new(
            self.id,
            first_name.to_string(),
            last_name.to_string(),
        ));
    }
}

pub struct UserErrors;

impl UserErrors {
    pub fn not_found(user_id: UserId) -> DomainError {
        DomainError::not_found(
            "Users.NotFound",
            format!("The user with the identifier {user_id} was not found"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evently_domain::entity::Entity;

    #[test]
    fn create_raises_registered_event() {
        let id = UserId::generate();
        let user = User::create(id, "ada@example.com", "Ada", "Lovelace");

        let events = user.domain_events().peek_all();
        assert_eq!(events.len(), 1);
        let registered = events[0].downcast_ref::<UserRegistered>().unwrap();
        assert_eq!(registered.user_id, id);
        assert_eq!(user.email(), "ada@example.com");
    }

    #[test]
    fn update_profile_raises_event_with_new_names() {
        let mut user = User::create(UserId::generate(), "ada@example.com", "Ada", "Lovelace");
        user.clear_domain_events();

        user.update_profile("Augusta", "King");

        assert_eq!(user.first_name(), "Augusta");
        assert_eq!(user.last_name(), "King");
        let events = user.domain_events().peek_all();
        assert_eq!(events.len(), 1);
        let updated = events[0].downcast_ref::<UserProfileUpdated>().unwrap();
        assert_eq!(updated.user_id, *user.id());
        assert_eq!(updated.first_name, "Augusta");
    }

    #[test]
    fn blank_name_is_ignored() {
        let mut user = User::create(UserId::generate(), "ada@example.com", "Ada", "Lovelace");
        user.clear_domain_events();

        user.update_profile("  ", "King");
        user.update_profile("Augusta", "");

        assert_eq!(user.first_name(), "Ada");
        assert_eq!(user.last_name(), "Lovelace");
        assert!(user.domain_events().is_empty());
    }
}
