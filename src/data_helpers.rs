use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::db;
use crate::error::{PosError, PosResult};

/// Settings category holding the state documents.
pub(crate) const STATE_CATEGORY: &str = "state";

/// Read one JSON document. `Ok(None)` means the document was never written;
/// a stored document that does not decode is an error, never a default.
pub(crate) fn read_local_json<T: DeserializeOwned>(
    conn: &Connection,
    key: &str,
) -> PosResult<Option<T>> {
    let Some(raw) = db::get_setting(conn, STATE_CATEGORY, key)? else {
        return Ok(None);
    };
    match serde_json::from_str::<T>(&raw) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            error!(key = %key, error = %e, "Stored document unreadable");
            Err(PosError::CorruptDocument {
                key: key.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

pub(crate) fn write_local_json<T: Serialize + ?Sized>(
    conn: &Connection,
    key: &str,
    value: &T,
) -> PosResult<()> {
    let raw = serde_json::to_string(value)?;
    db::set_setting(conn, STATE_CATEGORY, key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_missing_and_corrupt_documents() {
        let db = db::test_state();
        let conn = db.lock().unwrap();

        assert_eq!(
            read_local_json::<Vec<String>>(&conn, "categories").unwrap(),
            None
        );

        db::set_setting(&conn, STATE_CATEGORY, "categories", "{not json").unwrap();
        match read_local_json::<Vec<String>>(&conn, "categories") {
            Err(PosError::CorruptDocument { key, .. }) => assert_eq!(key, "categories"),
            other => panic!("expected CorruptDocument, got {other:?}"),
        }

        write_local_json(&conn, "categories", &json!(["PAINT", "ESSEN"])).unwrap();
        assert_eq!(
            read_local_json::<Vec<String>>(&conn, "categories").unwrap(),
            Some(vec!["PAINT".to_string(), "ESSEN".to_string()])
        );
    }
}
