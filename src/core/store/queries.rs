//! Record queries: upsert, delete, count, lookup and search

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::{StoreError, VehicleStore, TABLE};
use crate::entities::vehicle::{StoredVehicle, VehicleColumn, VehicleRecord};

const SELECT_COLUMNS: &str =
    "p_key, VEH_ID, REG_NO, VEHICLE_TYPE, MAKE, MODEL, YEAR, OWNER, USED_FOR";

/// Where a search term is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    /// Substring match OR-ed across every text column
    #[default]
    AllFields,
    /// Substring match on a single column
    Column(VehicleColumn),
}

impl VehicleStore {
    /// Insert a record or overwrite the row with the same VEH_ID
    ///
    /// On collision every non-key field is replaced and the internal key is
    /// kept. Returns the internal key of the written row.
    pub fn upsert(&self, record: &VehicleRecord) -> Result<i64, StoreError> {
        let key = upsert_record(&self.conn, record)?;
        tracing::info!(veh_id = %record.veh_id, key, "vehicle saved");
        Ok(key)
    }

    /// Plain insert; fails if VEH_ID already exists
    pub fn insert(&self, record: &VehicleRecord) -> Result<i64, StoreError> {
        let key = insert_record(&self.conn, record)?;
        tracing::info!(veh_id = %record.veh_id, key, "vehicle inserted");
        Ok(key)
    }

    /// Delete by VEH_ID; returns whether a row was removed
    ///
    /// Deleting an unknown VEH_ID is not an error.
    pub fn delete_by_veh_id(&self, veh_id: &str) -> Result<bool, StoreError> {
        let removed = self.conn.execute(
            &format!("DELETE FROM {TABLE} WHERE VEH_ID = ?1"),
            params![veh_id],
        )?;
        if removed > 0 {
            tracing::info!(veh_id, "vehicle deleted");
        } else {
            tracing::debug!(veh_id, "delete matched no vehicle");
        }
        Ok(removed > 0)
    }

    /// Total number of records
    pub fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Record counts grouped by VEHICLE_TYPE, sorted by type
    pub fn count_by_type(&self) -> Result<Vec<(String, u64)>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT COALESCE(VEHICLE_TYPE, ''), COUNT(*) FROM {TABLE} \
             GROUP BY VEHICLE_TYPE ORDER BY VEHICLE_TYPE"
        ))?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok((row.get::<_, String>(0)?, count as u64))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Look up a single record by VEH_ID
    pub fn get(&self, veh_id: &str) -> Result<Option<StoredVehicle>, StoreError> {
        let vehicle = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM {TABLE} WHERE VEH_ID = ?1"),
                params![veh_id],
                map_row,
            )
            .optional()?;
        Ok(vehicle)
    }

    /// Every record, in insertion order
    pub fn all(&self) -> Result<Vec<StoredVehicle>, StoreError> {
        self.query(SearchField::AllFields, None)
    }

    /// Substring search using SQLite's LIKE (ASCII case-insensitive)
    ///
    /// An absent or empty term returns every record. Results are never
    /// paginated.
    pub fn query(
        &self,
        field: SearchField,
        term: Option<&str>,
    ) -> Result<Vec<StoredVehicle>, StoreError> {
        let term = term.filter(|t| !t.is_empty());
        let Some(term) = term else {
            return self.select(
                &format!("SELECT {SELECT_COLUMNS} FROM {TABLE} ORDER BY p_key"),
                &[],
            );
        };

        let pattern = format!("%{}%", term);
        let columns: &[VehicleColumn] = match field {
            SearchField::AllFields => &VehicleColumn::TEXT,
            SearchField::Column(ref column) => std::slice::from_ref(column),
        };

        let clause = columns
            .iter()
            .map(|c| format!("{} LIKE ?1", c.name()))
            .collect::<Vec<_>>()
            .join(" OR ");

        self.select(
            &format!("SELECT {SELECT_COLUMNS} FROM {TABLE} WHERE {clause} ORDER BY p_key"),
            &[&pattern as &dyn rusqlite::ToSql],
        )
    }

    /// Records whose column equals `value` exactly (report filters)
    pub fn query_exact(
        &self,
        column: VehicleColumn,
        value: &str,
    ) -> Result<Vec<StoredVehicle>, StoreError> {
        self.select(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM {TABLE} WHERE {} = ?1 ORDER BY p_key",
                column.name()
            ),
            &[&value as &dyn rusqlite::ToSql],
        )
    }

    fn select(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<StoredVehicle>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredVehicle> {
    Ok(StoredVehicle {
        key: row.get(0)?,
        record: VehicleRecord {
            veh_id: text(row, 1)?,
            reg_no: text(row, 2)?,
            vehicle_type: text(row, 3)?,
            make: text(row, 4)?,
            model: text(row, 5)?,
            year: row.get(6)?,
            owner: text(row, 7)?,
            used_for: text(row, 8)?,
        },
    })
}

/// Text column that may hold NULL for imported rows
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

pub(super) fn insert_record(conn: &Connection, record: &VehicleRecord) -> Result<i64, StoreError> {
    conn.execute(
        &format!(
            "INSERT INTO {TABLE} (VEH_ID, REG_NO, VEHICLE_TYPE, MAKE, MODEL, YEAR, OWNER, USED_FOR) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        params_from_iter(record_values(record)),
    )?;
    Ok(conn.last_insert_rowid())
}

pub(super) fn upsert_record(conn: &Connection, record: &VehicleRecord) -> Result<i64, StoreError> {
    conn.execute(
        &format!(
            "INSERT INTO {TABLE} (VEH_ID, REG_NO, VEHICLE_TYPE, MAKE, MODEL, YEAR, OWNER, USED_FOR) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT(VEH_ID) DO UPDATE SET \
                REG_NO = excluded.REG_NO, \
                VEHICLE_TYPE = excluded.VEHICLE_TYPE, \
                MAKE = excluded.MAKE, \
                MODEL = excluded.MODEL, \
                YEAR = excluded.YEAR, \
                OWNER = excluded.OWNER, \
                USED_FOR = excluded.USED_FOR"
        ),
        params_from_iter(record_values(record)),
    )?;

    // a NULL VEH_ID never conflicts, so the row is always new
    if record.veh_id.is_empty() {
        return Ok(conn.last_insert_rowid());
    }

    let key = conn.query_row(
        &format!("SELECT p_key FROM {TABLE} WHERE VEH_ID = ?1"),
        params![record.veh_id],
        |row| row.get(0),
    )?;
    Ok(key)
}

pub(super) fn count_of_type(conn: &Connection, label: &str) -> Result<u64, StoreError> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {TABLE} WHERE VEHICLE_TYPE = ?1"),
        params![label],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

pub(super) fn veh_id_exists(conn: &Connection, veh_id: &str) -> Result<bool, StoreError> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT 1 FROM {TABLE} WHERE VEH_ID = ?1 LIMIT 1"),
            params![veh_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Column values in insert order; blank text is stored as NULL
fn record_values(record: &VehicleRecord) -> [Value; 8] {
    [
        text_value(&record.veh_id),
        text_value(&record.reg_no),
        text_value(&record.vehicle_type),
        text_value(&record.make),
        text_value(&record.model),
        record.year.map_or(Value::Null, Value::Integer),
        text_value(&record.owner),
        text_value(&record.used_for),
    ]
}

fn text_value(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::vehicle::{UsageCategory, VehicleType};

    fn sample(veh_id: &str, owner: &str) -> VehicleRecord {
        VehicleRecord {
            veh_id: veh_id.to_string(),
            reg_no: format!("FSD-{}", veh_id),
            vehicle_type: VehicleType::Compactor.label().to_string(),
            make: "Hino".to_string(),
            model: "500".to_string(),
            year: Some(2017),
            owner: owner.to_string(),
            used_for: UsageCategory::ContainerBaseCollection.label().to_string(),
        }
    }

    #[test]
    fn test_upsert_then_get_round_trips() {
        let store = VehicleStore::open_in_memory().unwrap();
        let record = sample("C10", "Municipal Corporation");
        store.upsert(&record).unwrap();

        let stored = store.get("C10").unwrap().unwrap();
        assert_eq!(stored.record, record);
    }

    #[test]
    fn test_upsert_same_id_keeps_one_row_with_latest_values() {
        let store = VehicleStore::open_in_memory().unwrap();
        let first_key = store.upsert(&sample("C10", "First Owner")).unwrap();

        let mut updated = sample("C10", "Second Owner");
        updated.year = Some(2021);
        let second_key = store.upsert(&updated).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(first_key, second_key);
        let stored = store.get("C10").unwrap().unwrap();
        assert_eq!(stored.record.owner, "Second Owner");
        assert_eq!(stored.record.year, Some(2021));
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let store = VehicleStore::open_in_memory().unwrap();
        store.insert(&sample("C10", "A")).unwrap();
        let err = store.insert(&sample("C10", "B")).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_search_all_fields_matches_owner_token() {
        let store = VehicleStore::open_in_memory().unwrap();
        store.upsert(&sample("C1", "Gulberg Town")).unwrap();
        store.upsert(&sample("C2", "Lyallpur Town")).unwrap();
        store.upsert(&sample("C3", "Madina Town")).unwrap();

        let found = store
            .query(SearchField::AllFields, Some("Lyallpur"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.veh_id, "C2");
    }

    #[test]
    fn test_search_is_case_insensitive_like() {
        let store = VehicleStore::open_in_memory().unwrap();
        store.upsert(&sample("C1", "Gulberg Town")).unwrap();

        let found = store.query(SearchField::AllFields, Some("gulberg")).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_search_single_column() {
        let store = VehicleStore::open_in_memory().unwrap();
        store.upsert(&sample("C1", "Owner C2")).unwrap();
        store.upsert(&sample("C2", "Someone")).unwrap();

        let by_id = store
            .query(SearchField::Column(VehicleColumn::VehId), Some("C2"))
            .unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].record.veh_id, "C2");

        let everywhere = store.query(SearchField::AllFields, Some("C2")).unwrap();
        assert_eq!(everywhere.len(), 2);
    }

    #[test]
    fn test_empty_term_returns_all_in_insertion_order() {
        let store = VehicleStore::open_in_memory().unwrap();
        for id in ["C3", "C1", "C2"] {
            store.upsert(&sample(id, "x")).unwrap();
        }

        let ids: Vec<_> = store
            .query(SearchField::AllFields, Some(""))
            .unwrap()
            .into_iter()
            .map(|v| v.record.veh_id)
            .collect();
        assert_eq!(ids, vec!["C3", "C1", "C2"]);
        assert_eq!(store.all().unwrap().len(), 3);
    }

    #[test]
    fn test_query_exact_filters_by_type() {
        let store = VehicleStore::open_in_memory().unwrap();
        store.upsert(&sample("C1", "x")).unwrap();
        store
            .upsert(&VehicleRecord::placeholder(VehicleType::MiniTipper, 1))
            .unwrap();

        let tippers = store
            .query_exact(VehicleColumn::VehicleType, "Mini Tipper")
            .unwrap();
        assert_eq!(tippers.len(), 1);
        assert_eq!(tippers[0].record.veh_id, "MT1");

        let none = store.query_exact(VehicleColumn::VehicleType, "Mini").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let store = VehicleStore::open_in_memory().unwrap();
        store.upsert(&sample("C1", "x")).unwrap();

        assert!(!store.delete_by_veh_id("C99").unwrap());
        assert_eq!(store.count().unwrap(), 1);

        assert!(store.delete_by_veh_id("C1").unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_blank_text_stored_as_null() {
        let store = VehicleStore::open_in_memory().unwrap();
        let mut blank = sample("", "");
        blank.used_for.clear();
        store.insert(&blank).unwrap();
        store.upsert(&blank).unwrap();

        let nulls: i64 = store
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {TABLE} WHERE VEH_ID IS NULL AND OWNER IS NULL"),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 2);

        let rows = store.all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].record.veh_id, "");
        assert_eq!(rows[1].record.used_for, "");
        assert_ne!(rows[0].key, rows[1].key);
    }

    #[test]
    fn test_count_by_type() {
        let store = VehicleStore::open_in_memory().unwrap();
        store.upsert(&sample("C1", "x")).unwrap();
        store.upsert(&sample("C2", "x")).unwrap();
        store
            .upsert(&VehicleRecord::placeholder(VehicleType::DrainCleaner, 1))
            .unwrap();

        let counts = store.count_by_type().unwrap();
        assert_eq!(
            counts,
            vec![("Compactor".to_string(), 2), ("Drain Cleaner".to_string(), 1)]
        );
    }
}
