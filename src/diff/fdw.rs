use crate::catalog::fdw::{ForeignDataWrapper, ForeignServer, UserMapping};
use crate::diff::comment_utils;
use crate::diff::operations::{
    FdwIdentifier, FdwOperation, MigrationStep, OptionAction, ServerIdentifier, ServerOperation,
    UserMappingIdentifier, UserMappingOperation, diff_options,
};

pub fn diff_fdw(old: Option<&ForeignDataWrapper>, new: Option<&ForeignDataWrapper>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(fdw)) => vec![MigrationStep::Fdw(FdwOperation::Create { fdw: fdw.clone() })],
        (Some(old_fdw), None) => vec![MigrationStep::Fdw(FdwOperation::Drop {
            identifier: FdwIdentifier {
                name: old_fdw.name.clone(),
            },
        })],
        (Some(old_fdw), Some(new_fdw)) => {
            let identifier = FdwIdentifier {
                name: new_fdw.name.clone(),
            };
            let mut steps = Vec::new();

            let actions = filter_sensitive_sets(diff_options(&old_fdw.options, &new_fdw.options));
            if !actions.is_empty() {
                steps.push(MigrationStep::Fdw(FdwOperation::AlterOptions {
                    identifier: identifier.clone(),
                    actions,
                }));
            }

            for comment_op in comment_utils::handle_comment_diff(Some(old_fdw), Some(new_fdw), || {
                identifier.clone()
            }) {
                steps.push(MigrationStep::Fdw(FdwOperation::Comment(comment_op)));
            }

            steps
        }
        (None, None) => vec![],
    }
}

pub fn diff_server(old: Option<&ForeignServer>, new: Option<&ForeignServer>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(server)) => vec![MigrationStep::Server(ServerOperation::Create {
            server: server.clone(),
        })],
        (Some(old_server), None) => vec![MigrationStep::Server(ServerOperation::Drop {
            identifier: ServerIdentifier {
                name: old_server.name.clone(),
            },
        })],
        (Some(old_server), Some(new_server)) => {
            let identifier = ServerIdentifier {
                name: new_server.name.clone(),
            };
            let mut steps = Vec::new();

            let actions = filter_sensitive_sets(diff_options(&old_server.options, &new_server.options));
            if !actions.is_empty() {
                steps.push(MigrationStep::Server(ServerOperation::AlterOptions {
                    identifier: identifier.clone(),
                    actions,
                }));
            }

            for comment_op in
                comment_utils::handle_comment_diff(Some(old_server), Some(new_server), || {
                    identifier.clone()
                })
            {
                steps.push(MigrationStep::Server(ServerOperation::Comment(comment_op)));
            }

            steps
        }
        (None, None) => vec![],
    }
}

pub fn diff_user_mapping(
    old: Option<&UserMapping>,
    new: Option<&UserMapping>,
) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(mapping)) => vec![MigrationStep::UserMapping(UserMappingOperation::Create {
            mapping: mapping.clone(),
        })],
        (Some(old_mapping), None) => {
            vec![MigrationStep::UserMapping(UserMappingOperation::Drop {
                identifier: UserMappingIdentifier {
                    server: old_mapping.server.clone(),
                    user_name: old_mapping.user_name.clone(),
                },
            })]
        }
        (Some(old_mapping), Some(new_mapping)) => {
            let actions = filter_sensitive_sets(diff_options(&old_mapping.options, &new_mapping.options));
            if actions.is_empty() {
                vec![]
            } else {
                vec![MigrationStep::UserMapping(
                    UserMappingOperation::AlterOptions {
                        identifier: UserMappingIdentifier {
                            server: new_mapping.server.clone(),
                            user_name: new_mapping.user_name.clone(),
                        },
                        actions,
                    },
                )]
            }
        }
        (None, None) => vec![],
    }
}

/// Filter out `SET` actions on sensitive option keys (spec §4.2 point 6): this is
/// the diff-time counterpart of extractor masking, a belt-and-suspenders guard
/// in case two masked values still happen to render different placeholder tokens
/// (e.g. a key whose casing differs between environments).
pub fn filter_sensitive_sets(actions: Vec<OptionAction>) -> Vec<OptionAction> {
    actions
        .into_iter()
        .filter(|action| match action {
            OptionAction::Set { key, .. } => !crate::catalog::masking::is_sensitive_key(key),
            _ => true,
        })
        .collect()
}
