mod mutation_gateway;
mod notifier;
mod reconciler;
mod tree_store;

pub use mutation_gateway::MutationGateway;
pub use notifier::{ChannelNotifier, Notification, NotificationKind, Notifier, TracingNotifier};
pub use reconciler::{PendingReorder, Reconciler, ReorderOutcome};
pub use tree_store::{move_item, GestureId, SharedTreeStore, TreeStore};
