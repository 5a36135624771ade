use std::collections::BTreeSet;

use rusqlite::{params, params_from_iter, types::Value, Connection, Row};

use crate::db::DatabaseError;
use crate::models::MedicineRecord;

const MEDICINE_COLUMNS: &str = "id, name, price, is_discontinued, manufacturer_name, type,
     pack_size_label, short_composition1, short_composition2, name_lower";

fn medicine_from_row(row: &Row<'_>) -> rusqlite::Result<MedicineRecord> {
    Ok(MedicineRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        is_discontinued: row.get::<_, i64>(3)? != 0,
        manufacturer_name: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        medicine_type: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        pack_size_label: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        composition1: row.get(7)?,
        composition2: row.get(8)?,
        name_lower: row.get(9)?,
    })
}

/// Smallest string greater than every string starting with `prefix`.
///
/// `name_lower` uses BINARY collation and UTF-8 byte order matches code
/// point order, so `[prefix, upper)` is exactly the set of names with
/// that prefix. `None` when no such bound exists.
fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = (u32::from(last) + 1..=u32::from(char::MAX)).find_map(char::from_u32) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

/// Catalog names whose lowercase form starts with `prefix`, or every name
/// when no prefix is given. Returned in catalog (`id`) order.
///
/// The prefix is matched as a range on `name_lower` so the lookup can use
/// `idx_medicines_name_lower`.
pub fn candidate_names(
    conn: &Connection,
    prefix: Option<&str>,
) -> Result<Vec<String>, DatabaseError> {
    let names = match prefix.map(|p| (p, prefix_upper_bound(p))) {
        Some((prefix, Some(upper))) => {
            let mut stmt = conn.prepare_cached(
                "SELECT name FROM medicines
                 WHERE name_lower >= ?1 AND name_lower < ?2
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![prefix, upper], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        Some((prefix, None)) => {
            let mut stmt = conn.prepare_cached(
                "SELECT name FROM medicines WHERE name_lower >= ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![prefix], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare_cached("SELECT name FROM medicines ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(names)
}

/// First non-discontinued record with exactly this name.
pub fn find_live_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<MedicineRecord>, DatabaseError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE name = ?1 AND is_discontinued = 0
         ORDER BY id LIMIT 1"
    ))?;
    let mut rows = stmt.query_map(params![name], medicine_from_row)?;
    let first = rows.next().transpose()?;
    Ok(first)
}

/// Non-discontinued records sharing any of `compositions` in either
/// composition column, skipping `exclude_names`, at most `limit` rows.
pub fn find_related(
    conn: &Connection,
    compositions: &BTreeSet<String>,
    exclude_names: &BTreeSet<String>,
    limit: usize,
) -> Result<Vec<MedicineRecord>, DatabaseError> {
    if compositions.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let comp_placeholders = placeholders(1, compositions.len());
    let comp2_placeholders = placeholders(1 + compositions.len(), compositions.len());
    let mut sql = format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE (short_composition1 IN ({comp_placeholders})
                OR short_composition2 IN ({comp2_placeholders}))
           AND is_discontinued = 0"
    );
    let mut next_param = 1 + 2 * compositions.len();
    if !exclude_names.is_empty() {
        sql.push_str(&format!(
            " AND name NOT IN ({})",
            placeholders(next_param, exclude_names.len())
        ));
        next_param += exclude_names.len();
    }
    sql.push_str(&format!(" ORDER BY id LIMIT ?{next_param}"));

    let mut values: Vec<Value> = Vec::with_capacity(next_param);
    values.extend(compositions.iter().cloned().map(Value::Text));
    values.extend(compositions.iter().cloned().map(Value::Text));
    values.extend(exclude_names.iter().cloned().map(Value::Text));
    values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values), medicine_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// `?start, ?start+1, ...` for `count` numbered parameters.
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn insert_medicine(conn: &Connection, med: &MedicineRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (id, name, price, is_discontinued, manufacturer_name, type,
         pack_size_label, short_composition1, short_composition2, name_lower)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            med.id,
            med.name,
            med.price,
            med.is_discontinued as i32,
            med.manufacturer_name,
            med.medicine_type,
            med.pack_size_label,
            med.composition1,
            med.composition2,
            med.name.to_lowercase(),
        ],
    )?;
    Ok(())
}

pub fn count_medicines(conn: &Connection) -> Result<u64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM medicines", [], |row| row.get::<_, i64>(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Remove every catalog row (the import replaces the table wholesale).
pub fn clear_medicines(conn: &Connection) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM medicines", [])?)
}
