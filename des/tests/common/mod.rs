use serde_json::{json, Value};
use squadron_des::{Overrides, Scenario, State};

pub fn scenario(value: Value) -> Scenario {
    serde_json::from_value(value).expect("scenario fixture must deserialize")
}

pub fn state(value: Value) -> State {
    serde_json::from_value(value).expect("state fixture must deserialize")
}

pub fn no_overrides() -> Overrides {
    Overrides::default()
}

/// A single unit `U` with `aircraft` FMC airframes, `pilot`/`so` crew, one
/// payload of type `X`, and no personnel-availability attrition.
pub fn single_unit_state(aircraft: u32, pilot: u32, so: u32, payload_x: u32) -> State {
    let mut aircraft_rows: Vec<Value> = Vec::new();
    for _ in 0..aircraft {
        aircraft_rows.push(json!({"Unit": "U", "Status": "FMC"}));
    }
    let mut payload_rows: Vec<Value> = Vec::new();
    for _ in 0..payload_x {
        payload_rows.push(json!({"Unit": "U", "Type": "X"}));
    }
    let mut staffing_rows: Vec<Value> = Vec::new();
    for _ in 0..pilot {
        staffing_rows.push(json!({"Unit Name": "U", "MOS Number": "7318"}));
    }
    for _ in 0..so {
        staffing_rows.push(json!({"Unit Name": "U", "MOS Number": "7314"}));
    }
    state(json!({
        "tables": {
            "v_aircraft": {"rows": aircraft_rows},
            "v_payload": {"rows": payload_rows},
            "v_staffing": {"rows": staffing_rows},
        }
    }))
}

/// Two units `A` and `B`, each with the given aircraft/pilot/so counts and no
/// payload requirements.
pub fn two_unit_state(aircraft_each: u32, pilot_each: u32, so_each: u32) -> State {
    let mut aircraft_rows: Vec<Value> = Vec::new();
    let mut staffing_rows: Vec<Value> = Vec::new();
    for unit in ["A", "B"] {
        for _ in 0..aircraft_each {
            aircraft_rows.push(json!({"Unit": unit, "Status": "FMC"}));
        }
        for _ in 0..pilot_each {
            staffing_rows.push(json!({"Unit Name": unit, "MOS Number": "7318"}));
        }
        for _ in 0..so_each {
            staffing_rows.push(json!({"Unit Name": unit, "MOS Number": "7314"}));
        }
    }
    state(json!({
        "tables": {
            "v_aircraft": {"rows": aircraft_rows},
            "v_staffing": {"rows": staffing_rows},
        }
    }))
}
