//! State loader (spec §4.2): projects the four tabular inputs into
//! per-unit counts of FMC aircraft, payloads by type, and crew by MOS.

use std::collections::{HashMap, HashSet};

use crate::error::SimError;
use crate::types::State;

const MOS_PILOT: &str = "7318";
const MOS_SO: &str = "7314";
const MOS_INTEL: &str = "0231";

#[derive(Debug, Clone, Default)]
pub struct CrewCounts {
    pub pilot: u32,
    pub so: u32,
    pub intel: u32,
}

#[derive(Debug, Clone, Default)]
pub struct InitialResources {
    pub units: Vec<String>,
    pub aircraft_by_unit: HashMap<String, u32>,
    pub crew_by_unit: HashMap<String, CrewCounts>,
    pub payload_by_unit: HashMap<String, HashMap<String, u32>>,
    pub overrides_applied: bool,
}

fn rows<'a>(state: &'a State, table: &str) -> &'a [HashMap<String, serde_json::Value>] {
    state.tables.get(table).map(|t| t.rows.as_slice()).unwrap_or(&[])
}

fn str_field<'a>(row: &'a HashMap<String, serde_json::Value>, key: &str) -> Option<&'a str> {
    row.get(key).and_then(|v| v.as_str())
}

/// Derive `InitialResources` from the four snapshot tables. Fails with
/// `InvalidSnapshot` when no units can be found in either the units table
/// or any resource table.
pub fn load(state: &State) -> Result<InitialResources, SimError> {
    let mut units: HashSet<String> = rows(state, "v_unit")
        .iter()
        .filter_map(|r| str_field(r, "Unit").map(|s| s.to_string()))
        .collect();

    let mut aircraft_by_unit: HashMap<String, u32> = HashMap::new();
    for r in rows(state, "v_aircraft") {
        if let (Some("FMC"), Some(unit)) = (str_field(r, "Status"), str_field(r, "Unit")) {
            *aircraft_by_unit.entry(unit.to_string()).or_insert(0) += 1;
        }
    }

    let mut payload_by_unit: HashMap<String, HashMap<String, u32>> = HashMap::new();
    for r in rows(state, "v_payload") {
        let Some(ptype) = str_field(r, "Type") else { continue };
        let unit = str_field(r, "Unit").unwrap_or("UNKNOWN").to_string();
        *payload_by_unit.entry(unit).or_default().entry(ptype.to_string()).or_insert(0) += 1;
    }

    let mut crew_by_unit: HashMap<String, CrewCounts> = HashMap::new();
    for r in rows(state, "v_staffing") {
        if let (Some(unit), Some(mos)) = (str_field(r, "Unit Name"), str_field(r, "MOS Number")) {
            let crew = crew_by_unit.entry(unit.to_string()).or_default();
            match mos {
                MOS_PILOT => crew.pilot += 1,
                MOS_SO => crew.so += 1,
                MOS_INTEL => crew.intel += 1,
                _ => {}
            }
        }
    }

    units.extend(aircraft_by_unit.keys().cloned());
    units.extend(payload_by_unit.keys().cloned());
    units.extend(crew_by_unit.keys().cloned());

    if units.is_empty() {
        return Err(SimError::InvalidSnapshot);
    }

    let mut units: Vec<String> = units.into_iter().collect();
    units.sort();

    Ok(InitialResources {
        units,
        aircraft_by_unit,
        crew_by_unit,
        payload_by_unit,
        overrides_applied: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StateTable;
    use serde_json::json;

    fn table(rows: Vec<HashMap<String, serde_json::Value>>) -> StateTable {
        StateTable { rows }
    }

    fn row(pairs: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn empty_snapshot_is_invalid() {
        let state = State::default();
        assert!(matches!(load(&state), Err(SimError::InvalidSnapshot)));
    }

    #[test]
    fn counts_fmc_aircraft_only() {
        let mut state = State::default();
        state.tables.insert(
            "v_aircraft".to_string(),
            table(vec![
                row(&[("Unit", json!("U1")), ("Status", json!("FMC"))]),
                row(&[("Unit", json!("U1")), ("Status", json!("NMC"))]),
                row(&[("Unit", json!("U2")), ("Status", json!("FMC"))]),
            ]),
        );
        let r = load(&state).unwrap();
        assert_eq!(r.aircraft_by_unit.get("U1"), Some(&1));
        assert_eq!(r.aircraft_by_unit.get("U2"), Some(&1));
    }

    #[test]
    fn payload_without_unit_buckets_unknown() {
        let mut state = State::default();
        state.tables.insert(
            "v_payload".to_string(),
            table(vec![row(&[("Type", json!("Pod"))])]),
        );
        let r = load(&state).unwrap();
        assert_eq!(r.payload_by_unit.get("UNKNOWN").and_then(|m| m.get("Pod")), Some(&1));
    }

    #[test]
    fn payload_without_type_skipped() {
        let mut state = State::default();
        state.tables.insert(
            "v_payload".to_string(),
            table(vec![row(&[("Unit", json!("U1"))])]),
        );
        let r = load(&state).unwrap();
        assert!(r.payload_by_unit.get("U1").map_or(true, |m| m.is_empty()));
    }

    #[test]
    fn staffing_maps_mos_codes() {
        let mut state = State::default();
        state.tables.insert(
            "v_staffing".to_string(),
            table(vec![
                row(&[("Unit Name", json!("U1")), ("MOS Number", json!("7318"))]),
                row(&[("Unit Name", json!("U1")), ("MOS Number", json!("7314"))]),
                row(&[("Unit Name", json!("U1")), ("MOS Number", json!("0231"))]),
                row(&[("Unit Name", json!("U1")), ("MOS Number", json!("9999"))]),
            ]),
        );
        let r = load(&state).unwrap();
        let crew = r.crew_by_unit.get("U1").unwrap();
        assert_eq!(crew.pilot, 1);
        assert_eq!(crew.so, 1);
        assert_eq!(crew.intel, 1);
    }
}
