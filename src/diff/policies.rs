use crate::catalog::policy::Policy;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, PolicyIdentifier, PolicyOperation};

/// Diff a single policy
pub fn diff(old: Option<&Policy>, new: Option<&Policy>) -> Vec<MigrationStep> {
    match (old, new) {
        // CREATE new policy
        (None, Some(new_policy)) => {
            vec![MigrationStep::Policy(PolicyOperation::Create {
                policy: Box::new(new_policy.clone()),
            })]
        }

        // DROP old policy
        (Some(old_policy), None) => {
            let identifier = PolicyIdentifier::new(
                old_policy.schema.clone(),
                old_policy.table_name.clone(),
                old_policy.name.clone(),
            );
            vec![MigrationStep::Policy(PolicyOperation::Drop { identifier })]
        }

        // REPLACE, ALTER, or comment-only changes
        (Some(old_policy), Some(new_policy)) => {
            let mut steps = Vec::new();

            // Check if we need REPLACE (command or permissive changed)
            if old_policy.command != new_policy.command
                || old_policy.permissive != new_policy.permissive
            {
                // Command type or permissive/restrictive changed - requires DROP + CREATE
                steps.push(MigrationStep::Policy(PolicyOperation::Replace {
                    old_policy: Box::new(old_policy.clone()),
                    new_policy: Box::new(new_policy.clone()),
                }));
            } else if policies_differ_in_alterable_fields(old_policy, new_policy) {
                // Only roles, USING, or WITH CHECK changed - can use ALTER
                let identifier = PolicyIdentifier::from_policy(new_policy);

                let new_roles = if old_policy.roles != new_policy.roles {
                    Some(new_policy.roles.clone())
                } else {
                    None
                };

                let new_using = if old_policy.using_expr != new_policy.using_expr {
                    Some(new_policy.using_expr.clone())
                } else {
                    None
                };

                let new_with_check = if old_policy.with_check_expr != new_policy.with_check_expr {
                    Some(new_policy.with_check_expr.clone())
                } else {
                    None
                };

                steps.push(MigrationStep::Policy(PolicyOperation::Alter {
                    identifier,
                    new_roles,
                    new_using,
                    new_with_check,
                }));
            } else {
                // Only comments might have changed
                let comment_ops =
                    comment_utils::handle_comment_diff(Some(old_policy), Some(new_policy), || {
                        PolicyIdentifier::from_policy(new_policy)
                    });
                for comment_op in comment_ops {
                    steps.push(MigrationStep::Policy(PolicyOperation::Comment(comment_op)));
                }
            }

            steps
        }

        // No change
        (None, None) => vec![],
    }
}

/// Check if policies differ in fields that can be altered
/// (roles, using_expr, with_check_expr - but NOT command or permissive)
fn policies_differ_in_alterable_fields(old: &Policy, new: &Policy) -> bool {
    old.roles != new.roles
        || old.using_expr != new.using_expr
        || old.with_check_expr != new.with_check_expr
}
