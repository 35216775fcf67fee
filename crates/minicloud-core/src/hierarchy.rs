//! Type-erased view of a manager, used to walk the manager hierarchy

use crate::error::Result;
use std::sync::Arc;

/// Operations a manager offers to its parent manager
///
/// Parents only know their child manager through this trait, so a cloud
/// manager can cascade into clusters and a cluster manager into instances
/// without knowing their entity types.
pub trait ManagerNode: Send + Sync {
    fn entity_name(&self) -> &'static str;

    fn child_manager(&self) -> Option<Arc<dyn ManagerNode>>;

    /// Number of entities whose parent is `parent`
    fn count_of(&self, parent: &str) -> Result<usize>;

    /// Names of the entities whose parent is `parent`
    fn child_names(&self, parent: &str) -> Result<Vec<String>>;

    fn has_children(&self, name: &str) -> Result<bool>;

    /// Forget the named entity and all its descendants; true when nothing
    /// refused
    fn deep_undeclare_named(&self, name: &str) -> Result<bool>;

    fn reset(&self);

    fn clear(&self, cleanup: bool) -> Result<usize>;
}
