//! Table creation and reset
//!
//! There is no migration path: the table is created when missing and a
//! reset drops it outright.

use super::{StoreError, VehicleStore, TABLE};

impl VehicleStore {
    /// Create the vehicles table if it does not exist yet
    pub fn create_if_missing(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {TABLE} (
                p_key INTEGER PRIMARY KEY AUTOINCREMENT,
                VEH_ID TEXT UNIQUE,
                REG_NO TEXT,
                VEHICLE_TYPE TEXT,
                MAKE TEXT,
                MODEL TEXT,
                YEAR INTEGER,
                OWNER TEXT,
                USED_FOR TEXT
            );
            "#
        ))?;
        Ok(())
    }

    /// Drop every record and recreate an empty table
    pub fn reset(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {TABLE};"))?;
        self.create_if_missing()?;
        tracing::info!("vehicle table reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::vehicle::{VehicleRecord, VehicleType};

    #[test]
    fn test_create_is_idempotent() {
        let store = VehicleStore::open_in_memory().unwrap();
        store.create_if_missing().unwrap();
        store.create_if_missing().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_reset_empties_table() {
        let store = VehicleStore::open_in_memory().unwrap();
        for n in 1..=3 {
            store
                .upsert(&VehicleRecord::placeholder(VehicleType::MiniTipper, n))
                .unwrap();
        }
        assert_eq!(store.count().unwrap(), 3);

        store.reset().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }
}
