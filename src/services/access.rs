// src/services/access.rs
//
// Política de visibilidade por papel. Pura: só decide, não toca no banco.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        activity::Activity,
        auth::{Caller, Role},
        crm::Client,
        deal::Deal,
        task::Task,
    },
};

/// Registro que tem um usuário "dono" para efeito de escopo.
pub trait Owned {
    fn owner_id(&self) -> Option<Uuid>;
}

impl Owned for Client {
    fn owner_id(&self) -> Option<Uuid> {
        self.manager_id
    }
}

impl Owned for Deal {
    fn owner_id(&self) -> Option<Uuid> {
        self.manager_id
    }
}

impl Owned for Task {
    fn owner_id(&self) -> Option<Uuid> {
        self.assignee_id
    }
}

impl Owned for Activity {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

/// Recorte de linhas que o chamador enxerga numa coleção com dono.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    OwnedBy(Uuid),
}

impl Scope {
    /// Filtro para o SQL: `($n::uuid IS NULL OR <coluna_dono> = $n)`.
    pub fn owner_filter(self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::OwnedBy(id) => Some(id),
        }
    }

    pub fn permits(self, owner: Option<Uuid>) -> bool {
        match self {
            Scope::All => true,
            Scope::OwnedBy(id) => owner == Some(id),
        }
    }
}

// Gerentes só enxergam o que é deles; admin e funcionário enxergam tudo.
pub fn scope(caller: Caller) -> Scope {
    match caller.role {
        Role::Manager => Scope::OwnedBy(caller.id),
        Role::Admin | Role::Employee => Scope::All,
    }
}

/// Leitura e edição. Fora do escopo é 403, nunca 404.
pub fn ensure_visible<T: Owned>(caller: Caller, row: &T) -> Result<(), AppError> {
    if scope(caller).permits(row.owner_id()) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Exclusão: só admin ou o próprio dono.
pub fn ensure_can_delete<T: Owned>(caller: Caller, row: &T) -> Result<(), AppError> {
    if caller.role == Role::Admin || row.owner_id() == Some(caller.id) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

pub fn ensure_admin(caller: Caller) -> Result<(), AppError> {
    if caller.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Dono padrão na criação: o informado ou, na falta, o próprio chamador.
pub fn owner_or_caller(caller: Caller, requested: Option<Uuid>) -> Uuid {
    requested.unwrap_or(caller.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::models::deal::DealStatus;

    fn caller(role: Role) -> Caller {
        Caller { id: Uuid::new_v4(), role }
    }

    fn deal_owned_by(owner: Option<Uuid>) -> Deal {
        let now = Utc::now();
        Deal {
            id: Uuid::new_v4(),
            title: "Contrato anual".into(),
            description: None,
            client_id: Uuid::new_v4(),
            pipeline_id: Uuid::new_v4(),
            stage_id: Uuid::new_v4(),
            manager_id: owner,
            amount: Decimal::new(1000, 0),
            currency: "RUB".into(),
            expected_close_date: None,
            closed_at: None,
            status: DealStatus::Open,
            lost_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn scope_by_role() {
        let admin = caller(Role::Admin);
        let manager = caller(Role::Manager);
        let employee = caller(Role::Employee);

        assert_eq!(scope(admin), Scope::All);
        assert_eq!(scope(employee), Scope::All);
        assert_eq!(scope(manager), Scope::OwnedBy(manager.id));
        assert_eq!(scope(manager).owner_filter(), Some(manager.id));
        assert_eq!(scope(admin).owner_filter(), None);
    }

    #[test]
    fn manager_outside_scope_gets_permission_denied() {
        let m1 = caller(Role::Manager);
        let m2 = caller(Role::Manager);
        let deal = deal_owned_by(Some(m1.id));

        assert!(ensure_visible(m1, &deal).is_ok());
        assert!(matches!(ensure_visible(m2, &deal), Err(AppError::PermissionDenied)));
        assert!(matches!(ensure_can_delete(m2, &deal), Err(AppError::PermissionDenied)));
    }

    #[test]
    fn manager_cannot_see_unowned_rows() {
        let manager = caller(Role::Manager);
        let deal = deal_owned_by(None);
        assert!(ensure_visible(manager, &deal).is_err());
        assert!(ensure_visible(caller(Role::Employee), &deal).is_ok());
    }

    #[test]
    fn delete_needs_admin_or_owner() {
        let employee = caller(Role::Employee);
        let someone_else = deal_owned_by(Some(Uuid::new_v4()));
        let own = deal_owned_by(Some(employee.id));

        assert!(ensure_visible(employee, &someone_else).is_ok());
        assert!(ensure_can_delete(employee, &someone_else).is_err());
        assert!(ensure_can_delete(employee, &own).is_ok());
        assert!(ensure_can_delete(caller(Role::Admin), &someone_else).is_ok());
    }

    #[test]
    fn only_admin_passes_admin_gate() {
        assert!(ensure_admin(caller(Role::Admin)).is_ok());
        assert!(ensure_admin(caller(Role::Manager)).is_err());
        assert!(ensure_admin(caller(Role::Employee)).is_err());
    }

    #[test]
    fn creation_defaults_owner_to_caller() {
        let creator = caller(Role::Manager);
        assert_eq!(owner_or_caller(creator, None), creator.id);

        let other = Uuid::new_v4();
        assert_eq!(owner_or_caller(creator, Some(other)), other);
    }

    #[test]
    fn activity_owner_is_author() {
        let author = caller(Role::Manager);
        let now = Utc::now();
        let activity = Activity {
            id: Uuid::new_v4(),
            kind: crate::models::activity::ActivityType::Call,
            deal_id: None,
            client_id: None,
            user_id: author.id,
            subject: None,
            content: None,
            duration: Some(120),
            activity_date: now,
            created_at: now,
        };
        assert!(ensure_visible(author, &activity).is_ok());
        assert!(ensure_visible(caller(Role::Manager), &activity).is_err());
    }
}
