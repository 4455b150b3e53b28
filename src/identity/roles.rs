//! Bot role resolution over the closed set of system bots.
//!
//! Unlike the rest of bootstrap, an unknown bot name here is fatal to the
//! call: the set is compiled in, so a miss means misconfiguration rather
//! than an environmental race.

use crate::error::{AppError, AppResult};
use crate::identity::model::EntityReference;
use crate::identity::store::StoreError;

pub const INGESTION_BOT: &str = "ingestion-bot";
pub const QUALITY_BOT: &str = "quality-bot";
pub const PROFILER_BOT: &str = "profiler-bot";

pub const INGESTION_BOT_ROLE: &str = "IngestionBotRole";
pub const QUALITY_BOT_ROLE: &str = "QualityBotRole";
pub const PROFILER_BOT_ROLE: &str = "ProfilerBotRole";

/// Role store seam; the platform resolves role names to stored entities.
pub trait RoleLookup: Send + Sync {
    fn role_reference(&self, role_name: &str) -> Result<EntityReference, StoreError>;
}

pub fn resolve_bot_role_name(bot_name: &str) -> AppResult<&'static str> {
    match bot_name {
        INGESTION_BOT => Ok(INGESTION_BOT_ROLE),
        QUALITY_BOT => Ok(QUALITY_BOT_ROLE),
        PROFILER_BOT => Ok(PROFILER_BOT_ROLE),
        other => Err(AppError::unknown_bot("unknown_bot", format!("no role found for bot {}", other))),
    }
}

pub fn role_for_bot(bot_name: &str, roles: &dyn RoleLookup) -> AppResult<Vec<EntityReference>> {
    let role_name = resolve_bot_role_name(bot_name)?;
    let reference = roles.role_reference(role_name)?;
    Ok(vec![reference])
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct StaticRoles;
    impl RoleLookup for StaticRoles {
        fn role_reference(&self, role_name: &str) -> Result<EntityReference, StoreError> {
            Ok(EntityReference { id: Uuid::new_v4(), name: role_name.to_string(), entity_type: "role".into() })
        }
    }

    #[test]
    fn known_bots_resolve() {
        assert_eq!(resolve_bot_role_name(INGESTION_BOT).unwrap(), INGESTION_BOT_ROLE);
        assert_eq!(resolve_bot_role_name(QUALITY_BOT).unwrap(), QUALITY_BOT_ROLE);
        assert_eq!(resolve_bot_role_name(PROFILER_BOT).unwrap(), PROFILER_BOT_ROLE);
    }

    #[test]
    fn unknown_bot_is_fatal() {
        let err = resolve_bot_role_name("unregistered-bot").unwrap_err();
        assert!(matches!(err, AppError::UnknownBot { .. }));
    }

    #[test]
    fn role_for_bot_returns_reference() {
        let refs = role_for_bot(PROFILER_BOT, &StaticRoles).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, PROFILER_BOT_ROLE);
        assert_eq!(refs[0].entity_type, "role");
    }
}
