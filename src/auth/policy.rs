//! Pure role-policy functions.
//!
//! Every access rule that doesn't need a database lookup lives here as a
//! plain function of role + ownership, so the rules are unit-testable in
//! isolation and handlers stay thin.

use crate::identity::models::Role;

/// Coaches and admins may create, update, and resolve injuries.
pub fn can_write_injuries(role: Role) -> bool {
    matches!(role, Role::Coach | Role::Admin)
}

/// Players may only read injuries on their own record; coaches and admins
/// pass here and are further scoped by the graph query.
pub fn can_view_injury(role: Role, own_pseudonym_id: &str, owner_pseudonym_id: &str) -> bool {
    match role {
        Role::Admin | Role::Coach => true,
        Role::Player => own_pseudonym_id == owner_pseudonym_id,
    }
}

/// Players report their own daily status; coaches and admins may report on
/// behalf of any player.
pub fn can_update_status(role: Role, own_pseudonym_id: &str, target_pseudonym_id: &str) -> bool {
    match role {
        Role::Admin | Role::Coach => true,
        Role::Player => own_pseudonym_id == target_pseudonym_id,
    }
}

/// Only coaches and admins may use the player-id filter on injury listings.
pub fn can_filter_by_player(role: Role) -> bool {
    matches!(role, Role::Coach | Role::Admin)
}

/// Roster access: admins always, coaches only for teams they manage
/// (`manages` is the MANAGES-edge check result), players never.
pub fn can_view_roster(role: Role, manages: bool) -> bool {
    match role {
        Role::Admin => true,
        Role::Coach => manages,
        Role::Player => false,
    }
}

/// Player directory and player detail views are staff-only.
pub fn can_view_players(role: Role) -> bool {
    matches!(role, Role::Coach | Role::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injury_writes_are_staff_only() {
        assert!(can_write_injuries(Role::Coach));
        assert!(can_write_injuries(Role::Admin));
        assert!(!can_write_injuries(Role::Player));
    }

    #[test]
    fn test_player_sees_only_own_injury() {
        assert!(can_view_injury(Role::Player, "PSY-PLAYER-aaa", "PSY-PLAYER-aaa"));
        assert!(!can_view_injury(Role::Player, "PSY-PLAYER-aaa", "PSY-PLAYER-bbb"));
        // Staff pass regardless of ownership
        assert!(can_view_injury(Role::Coach, "PSY-COACH-ccc", "PSY-PLAYER-bbb"));
        assert!(can_view_injury(Role::Admin, "PSY-ADMIN-ddd", "PSY-PLAYER-bbb"));
    }

    #[test]
    fn test_status_updates_ownership() {
        assert!(can_update_status(Role::Player, "PSY-PLAYER-aaa", "PSY-PLAYER-aaa"));
        assert!(!can_update_status(Role::Player, "PSY-PLAYER-aaa", "PSY-PLAYER-bbb"));
        assert!(can_update_status(Role::Coach, "PSY-COACH-ccc", "PSY-PLAYER-bbb"));
    }

    #[test]
    fn test_roster_requires_manages_edge_for_coach() {
        assert!(can_view_roster(Role::Admin, false));
        assert!(can_view_roster(Role::Coach, true));
        assert!(!can_view_roster(Role::Coach, false));
        assert!(!can_view_roster(Role::Player, true));
    }

    #[test]
    fn test_player_filter_is_staff_only() {
        assert!(can_filter_by_player(Role::Coach));
        assert!(!can_filter_by_player(Role::Player));
    }
}
