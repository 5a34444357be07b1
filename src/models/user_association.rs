// Role codes as stored in UserAssociations_.role.
pub const ROLE_CLIENT: &str = "cli";
pub const ROLE_OWNER: &str = "own";
pub const ROLE_DEVELOPER: &str = "dev";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Owner,
    Developer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    CreateStory,
    EditStory,
    DeleteStory,
    CreateIteration,
    EditIteration,
    DeleteIteration,
    // Project edit/delete, membership and access levels, story scheduling
    // moves, report settings.
    ManageProject,
}

impl Role {
    pub fn parse(code: &str) -> Option<Role> {
        match code {
            ROLE_CLIENT => Some(Role::Client),
            ROLE_OWNER => Some(Role::Owner),
            ROLE_DEVELOPER => Some(Role::Developer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => ROLE_CLIENT,
            Role::Owner => ROLE_OWNER,
            Role::Developer => ROLE_DEVELOPER,
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        match self {
            Role::Owner => true,
            Role::Developer => matches!(
                permission,
                Permission::CreateStory | Permission::EditStory | Permission::DeleteStory
            ),
            Role::Client => {
                matches!(permission, Permission::CreateStory | Permission::EditStory)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Permission, Role, ROLE_CLIENT, ROLE_DEVELOPER, ROLE_OWNER};

    #[test]
    fn role_codes_round_trip() {
        for code in [ROLE_CLIENT, ROLE_OWNER, ROLE_DEVELOPER] {
            let role = Role::parse(code).expect("known code should parse");
            assert_eq!(role.as_str(), code);
        }
    }

    #[test]
    fn unknown_role_code_is_rejected() {
        assert!(Role::parse("adm").is_none());
        assert!(Role::parse("").is_none());
    }

    #[test]
    fn owner_holds_every_permission() {
        for permission in [
            Permission::CreateStory,
            Permission::EditStory,
            Permission::DeleteStory,
            Permission::CreateIteration,
            Permission::EditIteration,
            Permission::DeleteIteration,
            Permission::ManageProject,
        ] {
            assert!(Role::Owner.can(permission));
        }
    }

    #[test]
    fn developer_manages_stories_but_not_the_project() {
        assert!(Role::Developer.can(Permission::CreateStory));
        assert!(Role::Developer.can(Permission::DeleteStory));
        assert!(!Role::Developer.can(Permission::CreateIteration));
        assert!(!Role::Developer.can(Permission::ManageProject));
    }

    #[test]
    fn client_cannot_delete_stories() {
        assert!(Role::Client.can(Permission::CreateStory));
        assert!(Role::Client.can(Permission::EditStory));
        assert!(!Role::Client.can(Permission::DeleteStory));
        assert!(!Role::Client.can(Permission::EditIteration));
    }
}
