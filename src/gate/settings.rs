use serde::Serialize;

use super::capability::Capability;
use super::decision::AccessDecision;
use crate::types::{WorkspaceContext, WorkspaceRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSection {
    BasicInfo,
    Avatar,
    Logo,
    Security,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsPanel {
    pub section: SettingsSection,
    pub editable: bool,
}

/// Flags read by [`settings_panels`]
pub fn settings_capabilities() -> Vec<Capability> {
    [
        Capability::ENABLE_AVATAR,
        Capability::ENABLE_LOGO,
        Capability::PREVENT_WORKSPACE_DELETION,
    ]
    .into_iter()
    .map(Capability::named)
    .collect()
}

/// Settings panels visible to this member, in page order
pub fn settings_panels(ctx: &WorkspaceContext, decision: &AccessDecision) -> Vec<SettingsPanel> {
    let is_owner = ctx.has_role(WorkspaceRole::Owner);
    let mut panels = vec![SettingsPanel {
        section: SettingsSection::BasicInfo,
        editable: !ctx.is_root_workspace && ctx.has_role(WorkspaceRole::Admin),
    }];

    if decision.is_enabled(Capability::ENABLE_AVATAR) {
        panels.push(SettingsPanel {
            section: SettingsSection::Avatar,
            editable: is_owner,
        });
    }

    if decision.is_enabled(Capability::ENABLE_LOGO) {
        panels.push(SettingsPanel {
            section: SettingsSection::Logo,
            editable: is_owner,
        });
    }

    // A store failure leaves PREVENT_WORKSPACE_DELETION false, so the
    // security panel is additionally held back on fail-closed decisions.
    let deletion_prevented =
        decision.is_fail_closed() || decision.is_enabled(Capability::PREVENT_WORKSPACE_DELETION);
    if !ctx.is_root_workspace && is_owner && !deletion_prevented {
        panels.push(SettingsPanel {
            section: SettingsSection::Security,
            editable: true,
        });
    }

    panels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkspaceId;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    const ROOT: Uuid = Uuid::nil();

    fn ctx(role: WorkspaceRole, root: bool) -> WorkspaceContext {
        let ws = if root { ROOT } else { Uuid::new_v4() };
        WorkspaceContext::new(WorkspaceId::new(ws), Uuid::new_v4(), role, WorkspaceId::new(ROOT))
    }

    fn decision(ctx: &WorkspaceContext, flags: &[(&str, bool)]) -> AccessDecision {
        let map: BTreeMap<Capability, bool> =
            flags.iter().map(|(k, v)| (Capability::named(k), *v)).collect();
        AccessDecision::from_map(ctx.workspace_id, map)
    }

    fn sections(panels: &[SettingsPanel]) -> Vec<SettingsSection> {
        panels.iter().map(|p| p.section).collect()
    }

    #[test]
    fn owner_sees_everything_enabled() {
        let ctx = ctx(WorkspaceRole::Owner, false);
        let d = decision(&ctx, &[("ENABLE_AVATAR", true), ("ENABLE_LOGO", true)]);
        let panels = settings_panels(&ctx, &d);
        assert_eq!(
            sections(&panels),
            vec![SettingsSection::BasicInfo, SettingsSection::Avatar, SettingsSection::Logo, SettingsSection::Security]
        );
        assert!(panels.iter().all(|p| p.editable));
    }

    #[test]
    fn member_gets_read_only_basic_info() {
        let ctx = ctx(WorkspaceRole::Member, false);
        let d = decision(&ctx, &[("ENABLE_AVATAR", true)]);
        let panels = settings_panels(&ctx, &d);
        assert_eq!(sections(&panels), vec![SettingsSection::BasicInfo, SettingsSection::Avatar]);
        assert!(panels.iter().all(|p| !p.editable));
    }

    #[test]
    fn deletion_prevention_hides_security() {
        let ctx = ctx(WorkspaceRole::Owner, false);
        let d = decision(&ctx, &[("PREVENT_WORKSPACE_DELETION", true)]);
        assert!(!sections(&settings_panels(&ctx, &d)).contains(&SettingsSection::Security));
    }

    #[test]
    fn root_workspace_is_special_cased() {
        let ctx = ctx(WorkspaceRole::Owner, true);
        let d = decision(&ctx, &[]);
        let panels = settings_panels(&ctx, &d);
        assert_eq!(sections(&panels), vec![SettingsSection::BasicInfo]);
        assert!(!panels[0].editable);
    }

    #[test]
    fn fail_closed_hides_security() {
        let ctx = ctx(WorkspaceRole::Owner, false);
        let keys = settings_capabilities();
        let d = AccessDecision::fail_closed(ctx.workspace_id, &keys);
        assert_eq!(sections(&settings_panels(&ctx, &d)), vec![SettingsSection::BasicInfo]);
    }
}
