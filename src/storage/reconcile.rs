//! Award reconciliation
//!
//! Decides how a newly observed award merges with the one already stored for
//! the same restaurant and year. The decision is a pure function of the two
//! records so the repository only has to carry it out.

use super::RestaurantAward;
use crate::extract::Source;
use crate::parse::Distinction;

/// What the repository does with an incoming award
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardChange {
    /// No award for this restaurant and year yet
    Insert,
    /// Overwrite distinction, price, green star, year and provenance
    Update { distinction_changed: bool },
    /// Keep the stored award as is
    Unchanged,
}

/// Reconciles `incoming` against the stored award for the same restaurant-year
///
/// | Stored | Incoming | Outcome |
/// |--------|----------|---------|
/// | none | any | insert |
/// | live | live | update when distinction, price or green star differ |
/// | any | Wayback | update (a snapshot is authoritative when it reports) |
/// | Wayback | live | update only to promote a Selected Restaurants entry |
///
/// Writing exactly what is stored is always unchanged, so applying the same
/// award twice equals applying it once.
///
/// # Example
///
/// ```
/// use michelin_my_maps::storage::{reconcile, AwardChange, RestaurantAward};
/// use michelin_my_maps::{Distinction, Source};
///
/// let stored = RestaurantAward {
///     restaurant_id: 1,
///     year: 2022,
///     distinction: Distinction::SelectedRestaurants,
///     price: "$$".to_string(),
///     green_star: false,
///     source: Source::Wayback {
///         snapshot_url: "https://web.archive.org/web/20220101000000id_/https://guide.michelin.com/en/x".to_string(),
///     },
/// };
/// let live = RestaurantAward {
///     distinction: Distinction::ThreeStars,
///     price: "$$$$".to_string(),
///     source: Source::Live,
///     ..stored.clone()
/// };
///
/// assert_eq!(
///     reconcile(Some(&stored), &live),
///     AwardChange::Update { distinction_changed: true }
/// );
/// ```
pub fn reconcile(existing: Option<&RestaurantAward>, incoming: &RestaurantAward) -> AwardChange {
    let Some(existing) = existing else {
        return AwardChange::Insert;
    };

    if existing.same_award(incoming) && existing.source == incoming.source {
        return AwardChange::Unchanged;
    }

    let update = AwardChange::Update {
        distinction_changed: existing.distinction != incoming.distinction,
    };

    match (&existing.source, &incoming.source) {
        (Source::Live, Source::Live) => {
            if existing.same_award(incoming) {
                AwardChange::Unchanged
            } else {
                update
            }
        }
        (_, Source::Wayback { .. }) => update,
        (Source::Wayback { .. }, Source::Live) => {
            if existing.distinction == Distinction::SelectedRestaurants
                && incoming.distinction != Distinction::SelectedRestaurants
            {
                update
            } else {
                AwardChange::Unchanged
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT_2022: &str =
        "https://web.archive.org/web/20220101000000id_/https://guide.michelin.com/en/x";
    const SNAPSHOT_2022_LATER: &str =
        "https://web.archive.org/web/20220901000000id_/https://guide.michelin.com/en/x";

    fn live(distinction: Distinction, price: &str) -> RestaurantAward {
        RestaurantAward {
            restaurant_id: 1,
            year: 2022,
            distinction,
            price: price.to_string(),
            green_star: false,
            source: Source::Live,
        }
    }

    fn wayback(distinction: Distinction, price: &str, snapshot: &str) -> RestaurantAward {
        RestaurantAward {
            source: Source::Wayback {
                snapshot_url: snapshot.to_string(),
            },
            ..live(distinction, price)
        }
    }

    #[test]
    fn test_first_observation_is_inserted() {
        assert_eq!(
            reconcile(None, &live(Distinction::OneStar, "$$")),
            AwardChange::Insert
        );
        assert_eq!(
            reconcile(None, &wayback(Distinction::OneStar, "$$", SNAPSHOT_2022)),
            AwardChange::Insert
        );
    }

    #[test]
    fn test_live_over_live() {
        let stored = live(Distinction::OneStar, "$$");
        assert_eq!(
            reconcile(Some(&stored), &live(Distinction::OneStar, "$$")),
            AwardChange::Unchanged
        );
        assert_eq!(
            reconcile(Some(&stored), &live(Distinction::OneStar, "$$$")),
            AwardChange::Update {
                distinction_changed: false
            }
        );

        let mut green = live(Distinction::OneStar, "$$");
        green.green_star = true;
        assert_eq!(
            reconcile(Some(&stored), &green),
            AwardChange::Update {
                distinction_changed: false
            }
        );

        assert_eq!(
            reconcile(Some(&stored), &live(Distinction::TwoStars, "$$")),
            AwardChange::Update {
                distinction_changed: true
            }
        );
    }

    #[test]
    fn test_wayback_is_authoritative() {
        let stored = live(Distinction::OneStar, "$$");
        let incoming = wayback(Distinction::TwoStars, "$$$", SNAPSHOT_2022);
        assert_eq!(
            reconcile(Some(&stored), &incoming),
            AwardChange::Update {
                distinction_changed: true
            }
        );

        // Same values from a live record still pick up the snapshot provenance
        let same_values = wayback(Distinction::OneStar, "$$", SNAPSHOT_2022);
        assert_eq!(
            reconcile(Some(&stored), &same_values),
            AwardChange::Update {
                distinction_changed: false
            }
        );
    }

    #[test]
    fn test_later_snapshot_replaces_earlier_one() {
        let stored = wayback(Distinction::OneStar, "$$", SNAPSHOT_2022);
        let incoming = wayback(Distinction::OneStar, "$$", SNAPSHOT_2022_LATER);
        assert_eq!(
            reconcile(Some(&stored), &incoming),
            AwardChange::Update {
                distinction_changed: false
            }
        );
    }

    #[test]
    fn test_live_does_not_override_wayback() {
        let stored = wayback(Distinction::OneStar, "$$", SNAPSHOT_2022);
        assert_eq!(
            reconcile(Some(&stored), &live(Distinction::TwoStars, "$$$")),
            AwardChange::Unchanged
        );
        assert_eq!(
            reconcile(Some(&stored), &live(Distinction::SelectedRestaurants, "$")),
            AwardChange::Unchanged
        );
    }

    #[test]
    fn test_live_promotes_selected_wayback_entry() {
        let stored = wayback(Distinction::SelectedRestaurants, "$$", SNAPSHOT_2022);
        for distinction in [
            Distinction::ThreeStars,
            Distinction::TwoStars,
            Distinction::OneStar,
            Distinction::BibGourmand,
        ] {
            assert_eq!(
                reconcile(Some(&stored), &live(distinction, "$$$$")),
                AwardChange::Update {
                    distinction_changed: true
                }
            );
        }
    }

    #[test]
    fn test_applying_twice_equals_applying_once() {
        let candidates = [
            live(Distinction::OneStar, "$$"),
            live(Distinction::ThreeStars, "$$$$"),
            wayback(Distinction::SelectedRestaurants, "$$", SNAPSHOT_2022),
            wayback(Distinction::TwoStars, "$$$", SNAPSHOT_2022_LATER),
        ];

        for start in &candidates {
            for incoming in &candidates {
                // After one application the stored award is either `start` or `incoming`
                let after_once = match reconcile(Some(start), incoming) {
                    AwardChange::Unchanged => start.clone(),
                    _ => incoming.clone(),
                };
                assert_eq!(
                    reconcile(Some(&after_once), incoming),
                    AwardChange::Unchanged,
                    "{:?} then {:?}",
                    start,
                    incoming
                );
            }
        }
    }
}
