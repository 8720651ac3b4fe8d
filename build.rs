fn main() -> Result<(), Box<dyn std::error::Error>> {
    let result = tonic_build::configure()
        // Serde derives so query responses can flow into JSON reports.
        .type_attribute(".", "#[derive(serde::Serialize, serde::Deserialize)]")
        .compile_protos(&["proto/fleetgrep.proto"], &["proto"]);
    if result.is_err() {
        // protoc is unavailable; fall back to the vendored generated code so
        // `tonic::include_proto!("fleetgrep")` still resolves.
        println!("cargo:rerun-if-changed=proto/fleetgrep.generated.rs");
        let out_dir = std::env::var("OUT_DIR")?;
        std::fs::copy(
            "proto/fleetgrep.generated.rs",
            format!("{out_dir}/fleetgrep.rs"),
        )?;
    }
    Ok(())
}
