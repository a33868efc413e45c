//! Common source code fixtures for tests.

pub const ROOT: &str = "/proj";

pub const VEHICLE_URI: &str = "file:///proj/vehicle.sysml";
pub const ENGINE_URI: &str = "file:///proj/engine.sysml";
pub const OUTSIDE_URI: &str = "file:///elsewhere/scratch.sysml";

pub const VEHICLE: &str = r#"package Vehicles {
    part def Vehicle {
        part engine : Engine;
    }
}
"#;

pub const ENGINE: &str = r#"package Engines {
    part def Engine;
    attribute def Power;
}
"#;

/// Missing closing brace.
pub const UNCLOSED: &str = "package Broken {\n    part def Half;\n";
