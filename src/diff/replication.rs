use crate::catalog::replication::{Publication, Subscription};
use crate::diff::comment_utils;
use crate::diff::operations::{
    MigrationStep, PublicationIdentifier, PublicationOperation, SubscriptionIdentifier,
    SubscriptionOperation,
};

pub fn diff_publication(
    old: Option<&Publication>,
    new: Option<&Publication>,
) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(publication)) => vec![MigrationStep::Publication(
            PublicationOperation::Create {
                publication: publication.clone(),
            },
        )],
        (Some(old_publication), None) => vec![MigrationStep::Publication(
            PublicationOperation::Drop {
                identifier: PublicationIdentifier {
                    name: old_publication.name.clone(),
                },
            },
        )],
        (Some(old_publication), Some(new_publication)) => {
            let identifier = PublicationIdentifier {
                name: new_publication.name.clone(),
            };
            let mut steps = Vec::new();

            if !old_publication.all_tables
                && !new_publication.all_tables
                && old_publication.tables != new_publication.tables
            {
                let add: Vec<_> = new_publication
                    .tables
                    .iter()
                    .filter(|t| !old_publication.tables.contains(t))
                    .cloned()
                    .collect();
                let drop: Vec<_> = old_publication
                    .tables
                    .iter()
                    .filter(|t| !new_publication.tables.contains(t))
                    .cloned()
                    .collect();
                if !add.is_empty() || !drop.is_empty() {
                    steps.push(MigrationStep::Publication(PublicationOperation::AlterTables {
                        identifier: identifier.clone(),
                        add,
                        drop,
                    }));
                }
            }

            let options_differ = old_publication.publish_insert != new_publication.publish_insert
                || old_publication.publish_update != new_publication.publish_update
                || old_publication.publish_delete != new_publication.publish_delete
                || old_publication.publish_truncate != new_publication.publish_truncate
                || old_publication.via_root != new_publication.via_root
                || old_publication.all_tables != new_publication.all_tables;
            if options_differ {
                steps.push(MigrationStep::Publication(PublicationOperation::AlterOptions {
                    identifier: identifier.clone(),
                    publication: new_publication.clone(),
                }));
            }

            for comment_op in comment_utils::handle_comment_diff(
                Some(old_publication),
                Some(new_publication),
                || identifier.clone(),
            ) {
                steps.push(MigrationStep::Publication(PublicationOperation::Comment(
                    comment_op,
                )));
            }

            steps
        }
        (None, None) => vec![],
    }
}

pub fn diff_subscription(
    old: Option<&Subscription>,
    new: Option<&Subscription>,
) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(subscription)) => vec![MigrationStep::Subscription(
            SubscriptionOperation::Create {
                subscription: subscription.clone(),
            },
        )],
        (Some(old_subscription), None) => vec![MigrationStep::Subscription(
            SubscriptionOperation::Drop {
                identifier: SubscriptionIdentifier {
                    name: old_subscription.name.clone(),
                },
            },
        )],
        (Some(old_subscription), Some(new_subscription)) => {
            let identifier = SubscriptionIdentifier {
                name: new_subscription.name.clone(),
            };
            let mut steps = Vec::new();

            if old_subscription.enabled != new_subscription.enabled {
                steps.push(MigrationStep::Subscription(
                    SubscriptionOperation::AlterEnabled {
                        identifier: identifier.clone(),
                        enabled: new_subscription.enabled,
                    },
                ));
            }

            if old_subscription.publications != new_subscription.publications {
                steps.push(MigrationStep::Subscription(
                    SubscriptionOperation::AlterPublications {
                        identifier: identifier.clone(),
                        publications: new_subscription.publications.clone(),
                    },
                ));
            }

            // subconninfo is intentionally never compared: both sides are masked
            // key-for-key, so environment-only conninfo differences never surface here.

            for comment_op in comment_utils::handle_comment_diff(
                Some(old_subscription),
                Some(new_subscription),
                || identifier.clone(),
            ) {
                steps.push(MigrationStep::Subscription(SubscriptionOperation::Comment(
                    comment_op,
                )));
            }

            steps
        }
        (None, None) => vec![],
    }
}
