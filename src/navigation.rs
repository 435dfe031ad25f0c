//! Role-based navigation
//!
//! Decides which menu entries a role sees and where a user lands after login.
//! This only shapes the UI: the API authorizes every request on its own.

use crate::types::Role;

pub const LOGIN_ROUTE: &str = "/login";

/// One sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub title: &'static str,
    pub route: &'static str,
    roles: &'static [&'static str],
}

impl MenuItem {
    pub fn visible_to(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| *r == role.as_str())
    }
}

const ALL_ROLES: &[&str] = &["admin", "engineer", "utility", "division", "qac"];

pub const MENU: &[MenuItem] = &[
    MenuItem { title: "Dashboard", route: "/", roles: ALL_ROLES },
    MenuItem { title: "Work Orders", route: "/wo", roles: &["admin", "engineer"] },
    MenuItem { title: "Requests", route: "/request", roles: &["admin", "division"] },
    MenuItem { title: "Energy Monitor", route: "/energy", roles: &["admin", "utility"] },
    MenuItem { title: "Analytics", route: "/analytics", roles: &["admin"] },
    MenuItem { title: "Compliance", route: "/compliance", roles: &["admin", "qac"] },
    MenuItem { title: "Files", route: "/files", roles: ALL_ROLES },
    MenuItem { title: "Admin", route: "/admin", roles: &["admin"] },
];

/// Menu entries shown to `role`, in sidebar order
pub fn menu_for(role: &Role) -> Vec<&'static MenuItem> {
    MENU.iter().filter(|item| item.visible_to(role)).collect()
}

/// Where a freshly logged-in user is sent
pub fn landing_route(role: &Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Engineer => "/wo",
        Role::Utility => "/energy",
        Role::Qac => "/compliance",
        Role::Division | Role::Other(_) => "/request",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(role: &Role) -> Vec<&'static str> {
        menu_for(role).into_iter().map(|item| item.title).collect()
    }

    #[test]
    fn test_menu_for_engineer() {
        assert_eq!(titles(&Role::Engineer), vec!["Dashboard", "Work Orders", "Files"]);
    }

    #[test]
    fn test_menu_for_admin_shows_everything() {
        assert_eq!(menu_for(&Role::Admin).len(), MENU.len());
    }

    #[test]
    fn test_menu_for_unknown_role_is_empty() {
        assert!(menu_for(&Role::Other("guest".to_string())).is_empty());
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(landing_route(&Role::Admin), "/admin");
        assert_eq!(landing_route(&Role::Engineer), "/wo");
        assert_eq!(landing_route(&Role::Utility), "/energy");
        assert_eq!(landing_route(&Role::Qac), "/compliance");
        assert_eq!(landing_route(&Role::Division), "/request");
        assert_eq!(landing_route(&Role::Other("requester".to_string())), "/request");
    }
}
