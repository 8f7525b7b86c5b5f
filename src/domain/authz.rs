//! Authorization resolver (SPEC_FULL.md §4.2).
//!
//! Pure predicates over already-loaded facts (actor, role, creator id, game
//! membership). Callers own fetching those facts inside the locked
//! transaction and turning a `false` into `AppError::Unauthorized`.

use uuid::Uuid;

use crate::models::Role;

/// The structural mutations of §4.2, grouped by the minimum non-creator role
/// that may also perform them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralAction {
    CreateRound,
    AdvanceRound,
    StartFinals,
    FinishTournament,
    ModifyStructuralFields,
    DeleteTournament,
    CancelTournament,
    AssignLobbyMaker,
    RemoveLobbyMaker,
    SwapParticipant,
    SwapFinalist,
}

/// Structural mutations: the creator may always act. Beyond that, §4.2 grants
/// delete/swap actions to `super_admin` and lobby-maker (re)assignment to
/// `admin`; the remaining actions (create/advance round, start finals, finish,
/// modify structural fields) are creator-only.
pub fn can_perform_structural(action: StructuralAction, actor_role: Role, is_creator: bool) -> bool {
    if is_creator {
        return true;
    }
    match action {
        StructuralAction::DeleteTournament
        | StructuralAction::CancelTournament
        | StructuralAction::SwapParticipant
        | StructuralAction::SwapFinalist => actor_role.at_least(Role::SuperAdmin),
        StructuralAction::AssignLobbyMaker | StructuralAction::RemoveLobbyMaker => {
            actor_role.at_least(Role::Admin)
        }
        StructuralAction::CreateRound
        | StructuralAction::AdvanceRound
        | StructuralAction::StartFinals
        | StructuralAction::FinishTournament
        | StructuralAction::ModifyStructuralFields => false,
    }
}

/// Result submission on a game `G`: creator, `>= admin`, a participant slot
/// holder in `G`, or `G`'s lobby maker.
pub fn can_submit_result(
    actor_id: Uuid,
    actor_role: Role,
    tournament_creator_id: Uuid,
    participant_user_ids_in_game: &[Uuid],
    lobby_maker_user_id: Option<Uuid>,
) -> bool {
    actor_id == tournament_creator_id
        || actor_role.at_least(Role::Admin)
        || participant_user_ids_in_game.contains(&actor_id)
        || lobby_maker_user_id == Some(actor_id)
}

/// Result clearing uses the submission predicate plus a state precondition
/// the caller checks separately (round not completed, next round not yet
/// created) — see `domain::results::clear_position`.
pub use can_submit_result as can_clear_result;

pub fn can_read_logs(
    actor_id: Uuid,
    actor_role: Role,
    tournament_creator_id: Uuid,
    is_participant: bool,
) -> bool {
    actor_id == tournament_creator_id || actor_role.at_least(Role::Admin) || is_participant
}

/// Whether `actor` may see `target`'s PII (phone/telegram/rating) within `T`.
pub fn can_read_pii(
    actor_id: Uuid,
    target_user_id: Uuid,
    actor_role: Role,
    tournament_creator_id: Uuid,
) -> bool {
    actor_id == target_user_id
        || actor_id == tournament_creator_id
        || actor_role.at_least(Role::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_can_do_everything() {
        let creator = Uuid::new_v4();
        assert!(can_perform_structural(
            StructuralAction::DeleteTournament,
            Role::User,
            true
        ));
    }

    #[test]
    fn plain_user_cannot_assign_lobby_maker() {
        assert!(!can_perform_structural(
            StructuralAction::AssignLobbyMaker,
            Role::User,
            false
        ));
        assert!(can_perform_structural(
            StructuralAction::AssignLobbyMaker,
            Role::Admin,
            false
        ));
    }

    #[test]
    fn admin_cannot_advance_round_without_being_creator() {
        assert!(!can_perform_structural(
            StructuralAction::AdvanceRound,
            Role::SuperAdmin,
            false
        ));
    }

    #[test]
    fn lobby_maker_may_submit_without_any_other_grant() {
        let creator = Uuid::new_v4();
        let lm = Uuid::new_v4();
        assert!(can_submit_result(lm, Role::User, creator, &[], Some(lm)));
    }

    #[test]
    fn non_participant_non_admin_non_creator_is_denied() {
        let creator = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        assert!(!can_submit_result(outsider, Role::User, creator, &[], None));
    }
}
