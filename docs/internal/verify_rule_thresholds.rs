// Standalone verification of the metric threshold rules
// This demonstrates the boundary arithmetic without dependencies

const HUMAN_TEMPERATURE_MAX: f64 = 38.5;
const HUMAN_HEART_RATE_MIN: i64 = 60;
const HUMAN_HEART_RATE_MAX: i64 = 100;

const ANIMAL_TEMPERATURE_CRITICAL_HIGH: f64 = 40.5;
const ANIMAL_TEMPERATURE_CRITICAL_LOW: f64 = 37.0;

const SOIL_PH_MIN: f64 = 5.5;
const SOIL_PH_MAX: f64 = 8.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Severity {
    High,
    Critical,
}

fn species_range(species: Option<&str>) -> (f64, f64) {
    match species {
        Some("bovine") => (38.0, 39.5),
        Some("porcine") => (38.7, 39.8),
        Some("ovine") => (38.5, 40.0),
        _ => (38.0, 40.0),
    }
}

fn animal_temperature_severity(temperature: f64, species: Option<&str>) -> Option<Severity> {
    let (low, high) = species_range(species);
    if temperature > high || temperature < low {
        if temperature > ANIMAL_TEMPERATURE_CRITICAL_HIGH
            || temperature < ANIMAL_TEMPERATURE_CRITICAL_LOW
        {
            Some(Severity::Critical)
        } else {
            Some(Severity::High)
        }
    } else {
        None
    }
}

fn main() {
    println!("Threshold Rule Verification");
    println!("===========================\n");

    // Test 1: Fever comparison is strict, the boundary itself is quiet
    assert!(!(38.5 > HUMAN_TEMPERATURE_MAX), "38.5 exactly is not a fever");
    assert!(38.6 > HUMAN_TEMPERATURE_MAX, "38.6 is a fever");
    println!("✓ Fever threshold strict: 38.5 quiet, 38.6 fires");

    // Test 2: Heart rate band endpoints are quiet, values beyond them fire
    let pulse_cases = [(60, false), (100, false), (59, true), (101, true), (72, false)];
    for (heart_rate, expected) in pulse_cases {
        let fires = heart_rate > HUMAN_HEART_RATE_MAX || heart_rate < HUMAN_HEART_RATE_MIN;
        assert_eq!(fires, expected, "heart rate {}", heart_rate);
    }
    println!("✓ Pulse band 60-100 exclusive: endpoints quiet, 59 and 101 fire");

    // Test 3: Each species gets its own band, unknown species the widest one
    assert_eq!(animal_temperature_severity(38.6, Some("porcine")), Some(Severity::High));
    assert_eq!(animal_temperature_severity(38.6, Some("ovine")), None);
    assert_eq!(animal_temperature_severity(38.6, Some("bovine")), None);
    assert_eq!(animal_temperature_severity(39.9, Some("caprine")), None);
    assert_eq!(animal_temperature_severity(39.9, None), None);
    println!("✓ 38.6 °C fires for porcine only; caprine and unnamed use 38.0-40.0");

    // Test 4: Band edges are quiet for every species
    for species in [Some("bovine"), Some("porcine"), Some("ovine"), None] {
        let (low, high) = species_range(species);
        assert_eq!(animal_temperature_severity(low, species), None);
        assert_eq!(animal_temperature_severity(high, species), None);
        assert!(animal_temperature_severity(low - 0.1, species).is_some());
        assert!(animal_temperature_severity(high + 0.1, species).is_some());
    }
    println!("✓ Band edges quiet, one tenth beyond fires, for all four bands");

    // Test 5: Severity escalates only past the critical marks, also strict
    assert_eq!(animal_temperature_severity(39.6, Some("bovine")), Some(Severity::High));
    assert_eq!(animal_temperature_severity(40.5, Some("ovine")), Some(Severity::High));
    assert_eq!(animal_temperature_severity(40.6, Some("ovine")), Some(Severity::Critical));
    assert_eq!(animal_temperature_severity(37.5, Some("bovine")), Some(Severity::High));
    assert_eq!(animal_temperature_severity(36.9, Some("bovine")), Some(Severity::Critical));
    println!("✓ 40.5 °C stays high, 40.6 °C critical; 37.5 °C high, 36.9 °C critical");

    // Test 6: Soil pH band is exclusive on both ends
    let ph_cases = [(5.5, false), (8.5, false), (5.4, true), (8.6, true), (7.0, false)];
    for (soil_ph, expected) in ph_cases {
        let fires = soil_ph < SOIL_PH_MIN || soil_ph > SOIL_PH_MAX;
        assert_eq!(fires, expected, "soil pH {}", soil_ph);
    }
    println!("✓ Soil pH band 5.5-8.5 exclusive: endpoints quiet, 5.4 and 8.6 fire");

    println!("\n✅ All threshold rules verified successfully!");
}
