//! The two dashboard shells. Each owns its backend, its `Shell` and one `Panel` per
//! independently loading region; entering a section loads only that section's panels.

use crate::{
    errors::{ApiError, FormError},
    panels::{Keyed, Panel},
};

pub mod admin_dashboard;
pub mod restaurant_dashboard;

pub use admin_dashboard::AdminDashboard;
pub use restaurant_dashboard::RestaurantDashboard;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Upsert {
    Insert,
    Replace,
}

/// How a mutation's answer lands in the cached list.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconcile {
    /// The single record was applied locally.
    Done,
    /// The server sent no usable record; reload the collection.
    Refetch,
    /// 409: the cache is out of date. Reload, then report.
    Conflict(FormError),
    Failed(FormError),
}

pub fn reconcile<T: Keyed>(
    panel: &mut Panel<Vec<T>>,
    result: Result<Option<T>, ApiError>,
    upsert: Upsert,
    map_err: impl FnOnce(&ApiError) -> FormError,
) -> Reconcile {
    match result {
        Ok(Some(record)) => {
            let applied = match upsert {
                Upsert::Insert => panel.insert(record),
                Upsert::Replace => panel.replace(record),
            };
            if applied {
                Reconcile::Done
            } else {
                Reconcile::Refetch
            }
        }
        Ok(None) => Reconcile::Refetch,
        Err(err) if err.status() == Some(409) => Reconcile::Conflict(map_err(&err)),
        Err(err) => Reconcile::Failed(map_err(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::admin_types::Admin;
    use crate::test_utils::admin;

    #[test]
    fn reconcile_outcomes() {
        let mut panel: Panel<Vec<Admin>> = Panel::default();
        panel.set(vec![admin("a1", "root")]);
        let to_form = |err: &ApiError| FormError::Rejected(err.message());

        assert_eq!(
            reconcile(&mut panel, Ok(Some(admin("a2", "ops"))), Upsert::Insert, to_form),
            Reconcile::Done
        );
        assert_eq!(panel.items().len(), 2);

        assert_eq!(
            reconcile(&mut panel, Ok(Some(admin("a9", "x"))), Upsert::Replace, to_form),
            Reconcile::Refetch
        );
        assert_eq!(
            reconcile(&mut panel, Ok(None), Upsert::Insert, to_form),
            Reconcile::Refetch
        );

        let conflict = Err(ApiError::Status {
            status: 409,
            message: "Version mismatch".into(),
        });
        assert_eq!(
            reconcile(&mut panel, conflict, Upsert::Replace, to_form),
            Reconcile::Conflict(FormError::Rejected("Version mismatch".into()))
        );
        assert_eq!(panel.items().len(), 2);
    }

    #[test]
    fn insert_into_unloaded_list_refetches() {
        let mut panel: Panel<Vec<Admin>> = Panel::default();
        let to_form = |err: &ApiError| FormError::Rejected(err.message());

        assert_eq!(
            reconcile(&mut panel, Ok(Some(admin("a1", "root"))), Upsert::Insert, to_form),
            Reconcile::Refetch
        );
        assert!(panel.data().is_none());
    }
}
