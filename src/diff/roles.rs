use crate::catalog::role::Role;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, RoleIdentifier, RoleOperation};

/// Diff a single role
pub fn diff(old: Option<&Role>, new: Option<&Role>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(new_role)) => {
            vec![MigrationStep::Role(RoleOperation::Create {
                role: Box::new(new_role.clone()),
            })]
        }

        (Some(old_role), None) => {
            let identifier = RoleIdentifier::new(old_role.name.clone());
            vec![MigrationStep::Role(RoleOperation::Drop { identifier })]
        }

        (Some(old_role), Some(new_role)) => {
            let identifier = RoleIdentifier::from_role(new_role);
            let mut steps = Vec::new();

            if attributes_differ(old_role, new_role) {
                steps.push(MigrationStep::Role(RoleOperation::AlterAttributes {
                    identifier: identifier.clone(),
                    login: diff_field(old_role.login, new_role.login),
                    superuser: diff_field(old_role.superuser, new_role.superuser),
                    createdb: diff_field(old_role.createdb, new_role.createdb),
                    createrole: diff_field(old_role.createrole, new_role.createrole),
                    replication: diff_field(old_role.replication, new_role.replication),
                    inherit: diff_field(old_role.inherit, new_role.inherit),
                    connection_limit: diff_field(
                        old_role.connection_limit,
                        new_role.connection_limit,
                    ),
                }));
            }

            for config in &new_role.config {
                let changed = old_role
                    .config
                    .iter()
                    .find(|c| c.name == config.name)
                    .is_none_or(|old_config| old_config.value != config.value);
                if changed {
                    steps.push(MigrationStep::Role(RoleOperation::SetConfig {
                        identifier: identifier.clone(),
                        name: config.name.clone(),
                        value: Some(config.value.clone()),
                    }));
                }
            }
            for old_config in &old_role.config {
                if !new_role.config.iter().any(|c| c.name == old_config.name) {
                    steps.push(MigrationStep::Role(RoleOperation::SetConfig {
                        identifier: identifier.clone(),
                        name: old_config.name.clone(),
                        value: None,
                    }));
                }
            }

            for group in &new_role.member_of {
                if !old_role.member_of.contains(group) {
                    steps.push(MigrationStep::Role(RoleOperation::GrantMembership {
                        identifier: identifier.clone(),
                        group: group.clone(),
                    }));
                }
            }
            for group in &old_role.member_of {
                if !new_role.member_of.contains(group) {
                    steps.push(MigrationStep::Role(RoleOperation::RevokeMembership {
                        identifier: identifier.clone(),
                        group: group.clone(),
                    }));
                }
            }

            let comment_ops =
                comment_utils::handle_comment_diff(Some(old_role), Some(new_role), || {
                    identifier.clone()
                });
            for comment_op in comment_ops {
                steps.push(MigrationStep::Role(RoleOperation::Comment(comment_op)));
            }

            steps
        }

        (None, None) => vec![],
    }
}

fn diff_field<T: PartialEq>(old: T, new: T) -> Option<T> {
    if old == new { None } else { Some(new) }
}

fn attributes_differ(old: &Role, new: &Role) -> bool {
    old.login != new.login
        || old.superuser != new.superuser
        || old.createdb != new.createdb
        || old.createrole != new.createrole
        || old.replication != new.replication
        || old.inherit != new.inherit
        || old.connection_limit != new.connection_limit
}
