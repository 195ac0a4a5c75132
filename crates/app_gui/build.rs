use std::env;

fn main() {
    let version = env::var("PLANT_DOCTOR_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=PLANT_DOCTOR_VERSION={version}");
    println!("cargo:rerun-if-env-changed=PLANT_DOCTOR_VERSION");
}
