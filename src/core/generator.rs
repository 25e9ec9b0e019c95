//! Placeholder vehicle generation
//!
//! Numbering continues from the number of vehicles of the same type already
//! stored. Both dumper sizes share the `D` prefix and deletions leave gaps,
//! so a candidate VEH_ID that is already taken is skipped rather than
//! overwritten.

use crate::core::store::{StoreError, VehicleStore};
use crate::entities::vehicle::{VehicleRecord, VehicleType};

/// Generate `count` placeholder vehicles per requested type
///
/// All requests are written in one transaction. Returns the new records in
/// creation order.
pub fn generate_placeholders(
    store: &mut VehicleStore,
    requests: &[(VehicleType, u32)],
) -> Result<Vec<VehicleRecord>, StoreError> {
    let tx = store.begin()?;
    let mut created = Vec::new();

    for &(vehicle_type, count) in requests {
        if count == 0 {
            continue;
        }

        let mut n = tx.count_of_type(vehicle_type.label())? + 1;
        for _ in 0..count {
            let mut record = VehicleRecord::placeholder(vehicle_type, n);
            while tx.veh_id_exists(&record.veh_id)? {
                tracing::debug!(veh_id = %record.veh_id, "placeholder id taken, skipping");
                n += 1;
                record = VehicleRecord::placeholder(vehicle_type, n);
            }

            tx.insert(&record)?;
            created.push(record);
            n += 1;
        }

        tracing::info!(vehicle_type = %vehicle_type, count, "generated placeholder vehicles");
    }

    tx.commit()?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::vehicle::{PLACEHOLDER_MAKE, PLACEHOLDER_OWNER, PLACEHOLDER_YEAR};

    fn ids(records: &[VehicleRecord]) -> Vec<&str> {
        records.iter().map(|r| r.veh_id.as_str()).collect()
    }

    #[test]
    fn test_generate_compactors_on_empty_store() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let created = generate_placeholders(&mut store, &[(VehicleType::Compactor, 3)]).unwrap();

        assert_eq!(ids(&created), vec!["C1", "C2", "C3"]);
        let c2 = store.get("C2").unwrap().unwrap().record;
        assert_eq!(c2.reg_no, "Compactor REG 2");
        assert_eq!(c2.used_for, "Container Base Collection");
        assert_eq!(c2.make, PLACEHOLDER_MAKE);
        assert_eq!(c2.owner, PLACEHOLDER_OWNER);
        assert_eq!(c2.year, Some(PLACEHOLDER_YEAR));
    }

    #[test]
    fn test_numbering_continues_from_type_count() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        generate_placeholders(&mut store, &[(VehicleType::MiniTipper, 2)]).unwrap();
        let created = generate_placeholders(&mut store, &[(VehicleType::MiniTipper, 2)]).unwrap();

        assert_eq!(ids(&created), vec!["MT3", "MT4"]);
        assert_eq!(store.count().unwrap(), 4);
    }

    #[test]
    fn test_dumper_sizes_share_prefix_without_collision() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let created = generate_placeholders(
            &mut store,
            &[(VehicleType::Dumper20m3, 2), (VehicleType::Dumper5m3, 2)],
        )
        .unwrap();

        assert_eq!(ids(&created), vec!["D1", "D2", "D3", "D4"]);
        assert_eq!(store.get("D3").unwrap().unwrap().record.vehicle_type, "Dumper (5m3)");
        assert_eq!(store.get("D1").unwrap().unwrap().record.vehicle_type, "Dumper (20m3)");
    }

    #[test]
    fn test_gap_after_delete_does_not_overwrite() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        generate_placeholders(&mut store, &[(VehicleType::Compactor, 3)]).unwrap();
        store.delete_by_veh_id("C1").unwrap();

        let created = generate_placeholders(&mut store, &[(VehicleType::Compactor, 1)]).unwrap();
        assert_eq!(ids(&created), vec!["C4"]);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_type_without_usage_rule() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let created = generate_placeholders(&mut store, &[(VehicleType::DrainCleaner, 1)]).unwrap();

        assert_eq!(created[0].veh_id, "DC1");
        assert_eq!(created[0].used_for, "");
    }

    #[test]
    fn test_zero_count_is_noop() {
        let mut store = VehicleStore::open_in_memory().unwrap();
        let created = generate_placeholders(&mut store, &[(VehicleType::Compactor, 0)]).unwrap();
        assert!(created.is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }
}
