use ad_preflight::violation::{
    ImageRegion, RawViolation, Severity, Violation, DEFAULT_CONFIDENCE,
    DETECTOR_DEFAULT_CONFIDENCE,
};
use serde_json::json;

fn raw(value: serde_json::Value) -> RawViolation {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_severity_parse_is_case_insensitive() {
    assert_eq!(Severity::parse("CRITICAL"), Severity::Critical);
    assert_eq!(Severity::parse(" Warning "), Severity::Warning);
    assert_eq!(Severity::parse("info"), Severity::Info);
}

#[test]
fn test_unknown_severity_becomes_info() {
    assert_eq!(Severity::parse("severe"), Severity::Info);
    assert_eq!(Severity::parse(""), Severity::Info);

    let v = Violation::from_raw(raw(json!({ "severity": 3 })), 0, DEFAULT_CONFIDENCE);
    assert_eq!(v.severity, Severity::Info);

    let v = Violation::from_raw(raw(json!({})), 0, DEFAULT_CONFIDENCE);
    assert_eq!(v.severity, Severity::Info);
}

#[test]
fn test_severity_ordering() {
    assert!(Severity::Critical > Severity::Warning);
    assert!(Severity::Warning > Severity::Info);
}

#[test]
fn test_severity_display() {
    assert_eq!(format!("{}", Severity::Critical), "critical");
    assert_eq!(format!("{}", Severity::Warning), "warning");
    assert_eq!(format!("{}", Severity::Info), "info");
}

#[test]
fn test_missing_confidence_uses_supplied_default() {
    let v = Violation::from_raw(raw(json!({ "severity": "warning" })), 0, DEFAULT_CONFIDENCE);
    assert_eq!(v.confidence, 1.0);

    let v = Violation::from_raw(
        raw(json!({ "severity": "warning" })),
        0,
        DETECTOR_DEFAULT_CONFIDENCE,
    );
    assert_eq!(v.confidence, 0.5);
}

#[test]
fn test_non_numeric_confidence_uses_default() {
    let v = Violation::from_raw(raw(json!({ "confidence": "high" })), 0, DEFAULT_CONFIDENCE);
    assert_eq!(v.confidence, 1.0);

    let v = Violation::from_raw(raw(json!({ "confidence": null })), 0, DEFAULT_CONFIDENCE);
    assert_eq!(v.confidence, 1.0);
}

#[test]
fn test_confidence_is_clamped_to_unit_interval() {
    let v = Violation::from_raw(raw(json!({ "confidence": 3.0 })), 0, DEFAULT_CONFIDENCE);
    assert_eq!(v.confidence, 1.0);

    let v = Violation::from_raw(raw(json!({ "confidence": -0.4 })), 0, DEFAULT_CONFIDENCE);
    assert_eq!(v.confidence, 0.0);

    let v = Violation::from_raw(raw(json!({ "confidence": 0.42 })), 0, DEFAULT_CONFIDENCE);
    assert_eq!(v.confidence, 0.42);

    assert_eq!(Violation::new(Severity::Info, "x").with_confidence(7.0).confidence, 1.0);
}

#[test]
fn test_descriptive_fields_are_defaulted() {
    let v = Violation::from_raw(raw(json!({ "id": "", "offendingText": "" })), 4, 1.0);
    assert_eq!(v.id, "V-4");
    assert_eq!(v.category, "General");
    assert_eq!(v.policy_reference, "POLICY");
    assert_eq!(v.explanation, "No explanation provided.");
    assert_eq!(v.suggested_fix, "Provide a safer alternative.");
    assert_eq!(v.offending_text, None);
    assert_eq!(v.offending_image_region, None);
}

#[test]
fn test_detector_fields_are_preserved() {
    let v = Violation::from_raw(
        raw(json!({
            "id": "IMG-BA-1",
            "severity": "warning",
            "category": "Before/After Imagery",
            "offendingText": null,
            "offendingImageRegion": { "x": "10%", "y": "10%", "width": "35%", "height": "80%", "label": "before" },
            "policyReference": "POL-4",
            "explanation": "Detected potential before/after imagery.",
            "suggestedFix": "Avoid before/after layouts.",
            "confidence": 0.65
        })),
        9,
        DETECTOR_DEFAULT_CONFIDENCE,
    );
    assert_eq!(v.id, "IMG-BA-1");
    assert_eq!(v.severity, Severity::Warning);
    assert_eq!(v.category, "Before/After Imagery");
    assert_eq!(v.policy_reference, "POL-4");
    assert_eq!(v.confidence, 0.65);
    assert_eq!(
        v.offending_image_region,
        Some(ImageRegion {
            x: "10%".to_string(),
            y: "10%".to_string(),
            width: "35%".to_string(),
            height: "80%".to_string(),
            label: "before".to_string(),
        })
    );
}

#[test]
fn test_violation_serialization_uses_camel_case() {
    let v = Violation::new(Severity::Critical, "Prohibited claims")
        .with_offending_text("guaranteed results")
        .with_confidence(0.98);
    let json = serde_json::to_string(&v).unwrap();
    assert!(json.contains("\"severity\":\"critical\""));
    assert!(json.contains("\"offendingText\":\"guaranteed results\""));
    assert!(json.contains("\"policyReference\":\"POLICY\""));
    assert!(json.contains("\"confidence\":0.98"));
}

#[test]
fn test_mistyped_fields_are_coerced() {
    let v = Violation::from_raw(
        raw(json!({
            "id": 7,
            "severity": "critical",
            "category": ["Nudity"],
            "offendingText": false,
            "offendingImageRegion": { "x": 10, "y": 12.5, "width": "35%", "height": null, "label": 3 },
            "explanation": {},
            "confidence": 0.9
        })),
        2,
        DETECTOR_DEFAULT_CONFIDENCE,
    );
    assert_eq!(v.id, "7");
    assert_eq!(v.severity, Severity::Critical);
    assert_eq!(v.category, "General");
    assert_eq!(v.offending_text, None);
    assert_eq!(v.explanation, "No explanation provided.");
    assert_eq!(
        v.offending_image_region,
        Some(ImageRegion {
            x: "10".to_string(),
            y: "12.5".to_string(),
            width: "35%".to_string(),
            height: String::new(),
            label: "3".to_string(),
        })
    );
}

#[test]
fn test_non_object_region_is_dropped() {
    let v = Violation::from_raw(
        raw(json!({ "id": null, "offendingImageRegion": "top-left" })),
        5,
        DEFAULT_CONFIDENCE,
    );
    assert_eq!(v.id, "V-5");
    assert_eq!(v.offending_image_region, None);

    let v = Violation::from_raw(raw(json!({ "offendingImageRegion": [1, 2] })), 0, 1.0);
    assert_eq!(v.offending_image_region, None);
}
