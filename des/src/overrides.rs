//! Settings override (spec §4.3): operator-supplied per-unit counts that
//! replace derived state-loader output.

use std::collections::HashSet;

use crate::state_loader::InitialResources;
use crate::types::{MissionType, Overrides};

pub fn apply(initial: &mut InitialResources, overrides: &Overrides, mission_types: &[MissionType]) {
    if overrides.units.is_empty() {
        return;
    }

    let mut required_payload_types: HashSet<String> = HashSet::new();
    for mt in mission_types {
        required_payload_types.extend(mt.required_payload_types.iter().cloned());
    }

    for (unit, o) in &overrides.units {
        if !initial.units.contains(unit) {
            initial.units.push(unit.clone());
        }

        if let Some(ac) = o.aircraft.filter(|v| v.is_finite() && *v >= 0.0) {
            initial.aircraft_by_unit.insert(unit.clone(), ac.floor() as u32);
        }

        let crew = initial.crew_by_unit.entry(unit.clone()).or_default();
        if let Some(pilot) = o.pilot.filter(|v| v.is_finite() && *v >= 0.0) {
            crew.pilot = pilot.floor() as u32;
        }
        if let Some(so) = o.so.filter(|v| v.is_finite() && *v >= 0.0) {
            crew.so = so.floor() as u32;
        }
        if let Some(intel) = o.intel.filter(|v| v.is_finite() && *v >= 0.0) {
            crew.intel = intel.floor() as u32;
        }

        if let Some(payload_by_type) = &o.payload_by_type {
            let unit_payloads = initial.payload_by_unit.entry(unit.clone()).or_default();
            for (ptype, val) in payload_by_type {
                if val.is_finite() && *val >= 0.0 {
                    unit_payloads.insert(ptype.clone(), val.floor() as u32);
                }
            }
        }

        if let Some(per_type) = o.payload_per_type.filter(|v| v.is_finite() && *v >= 0.0) {
            let val = per_type.floor() as u32;
            let unit_payloads = initial.payload_by_unit.entry(unit.clone()).or_default();
            let mut types: HashSet<String> = unit_payloads.keys().cloned().collect();
            types.extend(required_payload_types.iter().cloned());
            for t in types {
                unit_payloads.insert(t, val);
            }
        }
    }

    initial.overrides_applied = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnitOverrides;
    use std::collections::HashMap;

    fn mt(name: &str, payloads: &[&str]) -> MissionType {
        MissionType {
            name: name.to_string(),
            flight_time: crate::types::FlightTime {
                dist: crate::distribution::Distribution::Deterministic { value_hours: Some(1.0) },
                transit_in_hours: 0.0,
                transit_out_hours: 0.0,
            },
            required_aircrew: None,
            required_payload_types: payloads.iter().map(|s| s.to_string()).collect(),
            crew_rotation: None,
            crew_distribution: Default::default(),
        }
    }

    #[test]
    fn new_unit_added_and_counts_floored() {
        let mut initial = InitialResources::default();
        let mut overrides = Overrides::default();
        overrides.units.insert(
            "NEW".to_string(),
            UnitOverrides { aircraft: Some(3.9), pilot: Some(2.0), ..Default::default() },
        );
        apply(&mut initial, &overrides, &[]);
        assert!(initial.units.contains(&"NEW".to_string()));
        assert_eq!(initial.aircraft_by_unit.get("NEW"), Some(&3));
        assert_eq!(initial.crew_by_unit.get("NEW").unwrap().pilot, 2);
        assert!(initial.overrides_applied);
    }

    #[test]
    fn non_finite_values_ignored() {
        let mut initial = InitialResources::default();
        initial.units.push("U1".to_string());
        initial.aircraft_by_unit.insert("U1".to_string(), 5);
        let mut overrides = Overrides::default();
        overrides.units.insert(
            "U1".to_string(),
            UnitOverrides { aircraft: Some(f64::NAN), ..Default::default() },
        );
        apply(&mut initial, &overrides, &[]);
        assert_eq!(initial.aircraft_by_unit.get("U1"), Some(&5));
    }

    #[test]
    fn payload_per_type_covers_existing_and_required_types() {
        let mut initial = InitialResources::default();
        initial.units.push("U1".to_string());
        let mut payloads = HashMap::new();
        payloads.insert("X".to_string(), 1u32);
        initial.payload_by_unit.insert("U1".to_string(), payloads);

        let mut overrides = Overrides::default();
        overrides.units.insert(
            "U1".to_string(),
            UnitOverrides { payload_per_type: Some(4.0), ..Default::default() },
        );
        apply(&mut initial, &overrides, &[mt("ISR", &["Y"])]);

        let unit_payloads = initial.payload_by_unit.get("U1").unwrap();
        assert_eq!(unit_payloads.get("X"), Some(&4));
        assert_eq!(unit_payloads.get("Y"), Some(&4));
    }
}
