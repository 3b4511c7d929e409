//! Reconciliation of downloaded place data with the stored record

use tracing::{debug, info};

use crate::Result;
use crate::models::{Place, PlaceStatus};
use crate::store::PlaceStore;

/// What reconciling a downloaded place requires.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Unknown geoid; store the place as `added`.
    Insert(Place),
    /// Stored values differ; store the merged place as `modified`.
    Update { place: Place, changed: Vec<&'static str> },
    /// Nothing differs, nothing is written.
    Unchanged,
}

pub struct PlaceReconciler;

impl PlaceReconciler {
    /// Compares coordinates, country, name and link by exact equality.
    #[must_use]
    pub fn reconcile(existing: Option<&Place>, downloaded: &Place) -> Reconciliation {
        let Some(existing) = existing else {
            return Reconciliation::Insert(Place {
                status: PlaceStatus::Added,
                ..downloaded.clone()
            });
        };

        let mut place = existing.clone();
        let mut changed = Vec::new();
        if place.latitude != downloaded.latitude {
            place.latitude = downloaded.latitude;
            changed.push("latitude");
        }
        if place.longitude != downloaded.longitude {
            place.longitude = downloaded.longitude;
            changed.push("longitude");
        }
        if place.country != downloaded.country {
            place.country.clone_from(&downloaded.country);
            changed.push("country");
        }
        if place.name != downloaded.name {
            place.name.clone_from(&downloaded.name);
            changed.push("name");
        }
        if place.link != downloaded.link {
            place.link.clone_from(&downloaded.link);
            changed.push("link");
        }

        if changed.is_empty() {
            Reconciliation::Unchanged
        } else {
            place.status = PlaceStatus::Modified;
            Reconciliation::Update { place, changed }
        }
    }

    /// Reconciles against `store` and performs the resulting write, if any.
    pub async fn apply(store: &dyn PlaceStore, downloaded: &Place) -> Result<Reconciliation> {
        let existing = store.get_place(&downloaded.geoid).await?;
        let outcome = Self::reconcile(existing.as_ref(), downloaded);
        match &outcome {
            Reconciliation::Insert(place) => {
                info!(geoid = %place.geoid, name = %place.name, "Adding place from feed");
                store.upsert_place(place.clone()).await?;
            }
            Reconciliation::Update { place, changed } => {
                info!(geoid = %place.geoid, ?changed, "Place changed upstream");
                store.upsert_place(place.clone()).await?;
            }
            Reconciliation::Unchanged => {
                debug!(geoid = %downloaded.geoid, "Place unchanged");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn hamburg() -> Place {
        Place {
            geoid: "geonames_2911298".to_string(),
            latitude: 53.57532,
            longitude: 10.01534,
            country: "Germany".to_string(),
            name: "Hamburg".to_string(),
            link: "Hamburg/Hamburg".to_string(),
            status: PlaceStatus::Original,
        }
    }

    #[test]
    fn test_insert_unknown_place() {
        let outcome = PlaceReconciler::reconcile(None, &hamburg());
        let Reconciliation::Insert(place) = outcome else {
            panic!("expected insert");
        };
        assert_eq!(place.status, PlaceStatus::Added);
    }

    #[test]
    fn test_identical_place_is_unchanged() {
        let stored = hamburg();
        let downloaded = Place {
            status: PlaceStatus::Added,
            ..hamburg()
        };
        assert_eq!(
            PlaceReconciler::reconcile(Some(&stored), &downloaded),
            Reconciliation::Unchanged
        );
    }

    #[test]
    fn test_changed_fields_are_overwritten() {
        let stored = hamburg();
        let downloaded = Place {
            name: "Hamburg-Mitte".to_string(),
            latitude: 53.55,
            ..hamburg()
        };
        let Reconciliation::Update { place, changed } =
            PlaceReconciler::reconcile(Some(&stored), &downloaded)
        else {
            panic!("expected update");
        };
        assert_eq!(changed, vec!["latitude", "name"]);
        assert_eq!(place.name, "Hamburg-Mitte");
        assert_eq!(place.longitude, 10.01534);
        assert_eq!(place.status, PlaceStatus::Modified);
    }

    #[test]
    fn test_comparison_is_exact() {
        let stored = hamburg();
        let downloaded = Place {
            longitude: 10.01535,
            ..hamburg()
        };
        assert!(matches!(
            PlaceReconciler::reconcile(Some(&stored), &downloaded),
            Reconciliation::Update { .. }
        ));
    }

    #[tokio::test]
    async fn test_apply_keeps_original_status() {
        let store = MemoryStore::new();
        store.upsert_place(hamburg()).await.unwrap();

        let outcome = PlaceReconciler::apply(&store, &hamburg()).await.unwrap();
        assert_eq!(outcome, Reconciliation::Unchanged);
        let stored = store.get_place("geonames_2911298").await.unwrap().unwrap();
        assert_eq!(stored.status, PlaceStatus::Original);
    }
}
